use std::sync::Arc;

use crate::config::GateConfig;
use crate::models::{normalize_email, Decision, SignupEvent};
use crate::services::{GateError, IdentityVerifier, UserDirectory, VerifyError};

/// Deployment-bound values the gate decides with.
#[derive(Debug, Clone)]
pub struct GateSettings {
    /// Client id the identity token must be issued for.
    pub audience: String,
    /// Validation-data key carrying the identity token.
    pub id_token_key: String,
}

impl From<&GateConfig> for GateSettings {
    fn from(config: &GateConfig) -> Self {
        Self {
            audience: config.google.client_id.clone(),
            id_token_key: config.id_token_key.clone(),
        }
    }
}

/// Decides whether a self-registration is auto-confirmed.
///
/// Only a token that verifies, names the same email and does not collide with
/// a confirmed account confirms the sign-up. A missing or bad token leaves the
/// account pending; a collision rejects it.
pub struct SignupGate {
    verifier: Arc<dyn IdentityVerifier>,
    directory: Arc<dyn UserDirectory>,
    settings: GateSettings,
}

impl SignupGate {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        directory: Arc<dyn UserDirectory>,
        settings: GateSettings,
    ) -> Self {
        Self {
            verifier,
            directory,
            settings,
        }
    }

    pub async fn decide(&self, event: &SignupEvent) -> Result<Decision, GateError> {
        let email = event.email();

        let Some(token) = event.validation_value(&self.settings.id_token_key) else {
            tracing::debug!("No identity token supplied, leaving sign-up pending");
            return Ok(Decision::PENDING);
        };

        if !self.verify_identity(token, &email).await? {
            return Ok(Decision::PENDING);
        }

        let existing = self.directory.find_by_email(&email).await?;
        if let Some(user) = existing.iter().find(|u| u.is_confirmed()) {
            tracing::warn!(
                existing_user = %user.username,
                "Verified email already belongs to a confirmed account, rejecting sign-up"
            );
            return Err(GateError::DuplicateAccount { email });
        }

        tracing::info!("Identity token verified, auto-confirming sign-up");
        Ok(Decision::CONFIRMED)
    }

    /// True when `token` verifies and its email claim equals `email`.
    ///
    /// Token problems are answered with `false`; only an unreachable issuer is an error.
    async fn verify_identity(&self, token: &str, email: &str) -> Result<bool, GateError> {
        match self.verifier.verify(token, &self.settings.audience).await {
            Ok(claims) => {
                let matches = normalize_email(&claims.email) == email;
                if !matches {
                    tracing::info!("Identity token email does not match requested email");
                }
                Ok(matches)
            }
            Err(VerifyError::InvalidToken(reason)) => {
                tracing::info!(reason = %reason, "Identity token rejected");
                Ok(false)
            }
            Err(e) => Err(e.into()),
        }
    }
}
