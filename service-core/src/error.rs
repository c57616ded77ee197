use thiserror::Error;

/// Error reported back to the invoking platform.
///
/// The Lambda runtime surfaces the `Display` text as the invocation's error
/// message, and Cognito shows that text to the user on a failed sign-up.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    /// Shown verbatim: the message is user-facing.
    #[error("{0}")]
    Conflict(anyhow::Error),

    #[error("Bad Gateway: {0}")]
    BadGateway(String),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}
