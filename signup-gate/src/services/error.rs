use service_core::error::AppError;
use thiserror::Error;

/// Outcome of a failed identity-token verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VerifyError {
    /// The token itself is bad: malformed, badly signed, expired, or issued
    /// for another audience or by another issuer.
    #[error("Invalid identity token: {0}")]
    InvalidToken(String),

    /// The issuer's signing keys could not be obtained.
    #[error("Identity issuer unavailable: {0}")]
    Unavailable(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Invalid filter value: {0}")]
    InvalidFilterValue(String),

    #[error("Directory query failed: {0}")]
    Query(String),
}

#[derive(Error, Debug)]
pub enum GateError {
    /// The verified email already belongs to a confirmed account.
    #[error("Email is already associated with an account")]
    DuplicateAccount { email: String },

    #[error(transparent)]
    Verifier(#[from] VerifyError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("Invalid sign-up event: {0}")]
    InvalidEvent(String),
}

impl From<GateError> for AppError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::DuplicateAccount { .. } => AppError::Conflict(anyhow::anyhow!(err.to_string())),
            GateError::Verifier(e) => AppError::BadGateway(e.to_string()),
            GateError::Directory(DirectoryError::InvalidFilterValue(e)) => {
                AppError::BadRequest(anyhow::anyhow!("Invalid filter value: {}", e))
            }
            GateError::Directory(e) => AppError::BadGateway(e.to_string()),
            GateError::InvalidEvent(e) => AppError::BadRequest(anyhow::anyhow!(e)),
        }
    }
}
