/// Account status as reported by the user pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserStatus {
    Confirmed,
    Unconfirmed,
    ExternalProvider,
    ForceChangePassword,
    ResetRequired,
    Archived,
    Compromised,
    Unknown(String),
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            UserStatus::Confirmed => "CONFIRMED",
            UserStatus::Unconfirmed => "UNCONFIRMED",
            UserStatus::ExternalProvider => "EXTERNAL_PROVIDER",
            UserStatus::ForceChangePassword => "FORCE_CHANGE_PASSWORD",
            UserStatus::ResetRequired => "RESET_REQUIRED",
            UserStatus::Archived => "ARCHIVED",
            UserStatus::Compromised => "COMPROMISED",
            UserStatus::Unknown(other) => other,
        }
    }
}

impl From<&str> for UserStatus {
    fn from(s: &str) -> Self {
        match s {
            "CONFIRMED" => UserStatus::Confirmed,
            "UNCONFIRMED" => UserStatus::Unconfirmed,
            "EXTERNAL_PROVIDER" => UserStatus::ExternalProvider,
            "FORCE_CHANGE_PASSWORD" => UserStatus::ForceChangePassword,
            "RESET_REQUIRED" => UserStatus::ResetRequired,
            "ARCHIVED" => UserStatus::Archived,
            "COMPROMISED" => UserStatus::Compromised,
            other => UserStatus::Unknown(other.to_string()),
        }
    }
}

/// One account returned by a directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    pub username: String,
    pub status: Option<UserStatus>,
}

impl DirectoryUser {
    pub fn new(username: impl Into<String>, status: UserStatus) -> Self {
        Self {
            username: username.into(),
            status: Some(status),
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == Some(UserStatus::Confirmed)
    }
}
