use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

use super::{Decision, SignupEvent};
use crate::services::GateError;

/// Payload of a Cognito pre-sign-up trigger.
///
/// Only the fields the gate reads or writes are typed. Everything else lands
/// in `extra` so the event goes back to Cognito intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignupEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    pub request: PreSignupRequest,
    #[serde(default, deserialize_with = "null_as_default")]
    pub response: PreSignupResponse,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignupRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_attributes: HashMap<String, String>,
    #[serde(default)]
    pub validation_data: Option<HashMap<String, String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSignupResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_confirm_user: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_verify_email: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_verify_phone: bool,
}

impl PreSignupEvent {
    /// Extracts the sign-up the gate decides on. Fails if the user pool sent no email.
    pub fn signup(&self) -> Result<SignupEvent, GateError> {
        let email = self
            .request
            .user_attributes
            .get("email")
            .ok_or_else(|| GateError::InvalidEvent("missing email user attribute".to_string()))?;

        Ok(SignupEvent {
            requested_email: email.clone(),
            validation_data: self.request.validation_data.clone(),
        })
    }

    pub fn apply(&mut self, decision: Decision) {
        self.response.auto_confirm_user = decision.auto_confirm;
        self.response.auto_verify_email = decision.auto_verify_email;
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
