use std::collections::HashMap;

/// A pending self-registration, reduced to what the gate looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignupEvent {
    pub requested_email: String,
    pub validation_data: Option<HashMap<String, String>>,
}

impl SignupEvent {
    pub fn new(requested_email: impl Into<String>) -> Self {
        Self {
            requested_email: requested_email.into(),
            validation_data: None,
        }
    }

    pub fn with_validation_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.validation_data
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// The requested email, case-folded. All comparisons use this form.
    pub fn email(&self) -> String {
        normalize_email(&self.requested_email)
    }

    /// Looks up a validation-data entry; `None` when there is no validation data at all.
    pub fn validation_value(&self, key: &str) -> Option<&str> {
        self.validation_data
            .as_ref()
            .and_then(|data| data.get(key))
            .map(String::as_str)
    }
}

/// Unicode lowercase. Unlike full case folding this leaves `ß` as is, which is
/// accepted: both emails go through the same function.
pub fn normalize_email(email: &str) -> String {
    email.to_lowercase()
}

/// What the user pool should do with the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Decision {
    pub auto_confirm: bool,
    pub auto_verify_email: bool,
}

impl Decision {
    /// Leave the account unconfirmed and the email unverified.
    pub const PENDING: Decision = Decision {
        auto_confirm: false,
        auto_verify_email: false,
    };

    pub const CONFIRMED: Decision = Decision {
        auto_confirm: true,
        auto_verify_email: true,
    };
}
