use async_trait::async_trait;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::UserType;
use aws_sdk_cognitoidentityprovider::Client as CognitoClient;
use std::collections::HashMap;
use std::sync::Mutex;

use super::error::DirectoryError;
use crate::models::{normalize_email, DirectoryUser, UserStatus};

/// Read access to the user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// All accounts whose email equals `email` exactly.
    async fn find_by_email(&self, email: &str) -> Result<Vec<DirectoryUser>, DirectoryError>;
}

/// Builds a ListUsers filter matching `email` exactly.
///
/// Backslashes and double quotes are escaped so the value cannot close the
/// quoted string early. Empty values and control characters are refused.
pub fn email_filter(email: &str) -> Result<String, DirectoryError> {
    if email.is_empty() {
        return Err(DirectoryError::InvalidFilterValue(
            "email is empty".to_string(),
        ));
    }
    if email.chars().any(char::is_control) {
        return Err(DirectoryError::InvalidFilterValue(
            "email contains a control character".to_string(),
        ));
    }

    let mut escaped = String::with_capacity(email.len());
    for c in email.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Ok(format!("email = \"{}\"", escaped))
}

/// Cognito user pool backed directory.
#[derive(Clone)]
pub struct CognitoDirectory {
    client: CognitoClient,
    user_pool_id: String,
}

impl CognitoDirectory {
    pub fn new(client: CognitoClient, user_pool_id: impl Into<String>) -> Self {
        Self {
            client,
            user_pool_id: user_pool_id.into(),
        }
    }

    /// Builds a client from the ambient AWS configuration (the Lambda role).
    pub async fn connect(user_pool_id: impl Into<String>) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let user_pool_id = user_pool_id.into();

        tracing::info!(user_pool_id = %user_pool_id, "Cognito directory client initialized");

        Self::new(CognitoClient::new(&sdk_config), user_pool_id)
    }
}

fn to_directory_user(user: &UserType) -> DirectoryUser {
    DirectoryUser {
        username: user.username().unwrap_or_default().to_string(),
        status: user.user_status().map(|s| UserStatus::from(s.as_str())),
    }
}

#[async_trait]
impl UserDirectory for CognitoDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let filter = email_filter(email)?;
        let mut users = Vec::new();
        let mut pagination_token: Option<String> = None;

        loop {
            let output = self
                .client
                .list_users()
                .user_pool_id(&self.user_pool_id)
                .filter(&filter)
                .set_pagination_token(pagination_token.take())
                .send()
                .await
                .map_err(|e| DirectoryError::Query(DisplayErrorContext(&e).to_string()))?;

            users.extend(output.users().iter().map(to_directory_user));

            match output.pagination_token() {
                Some(token) if !token.is_empty() => pagination_token = Some(token.to_string()),
                _ => break,
            }
        }

        tracing::debug!(matches = users.len(), "Directory lookup by email completed");
        Ok(users)
    }
}

/// In-memory directory for tests.
#[derive(Default)]
pub struct MockDirectory {
    users: HashMap<String, Vec<DirectoryUser>>,
    failure: Option<DirectoryError>,
    queries: Mutex<Vec<String>>,
}

impl MockDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an account. Lookups match the case-folded email.
    pub fn with_user(mut self, email: &str, user: DirectoryUser) -> Self {
        self.users
            .entry(normalize_email(email))
            .or_default()
            .push(user);
        self
    }

    /// Makes every lookup fail with `error`.
    pub fn failing(mut self, error: DirectoryError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl UserDirectory for MockDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Vec<DirectoryUser>, DirectoryError> {
        self.queries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(email.to_string());

        if let Some(err) = &self.failure {
            return Err(err.clone());
        }

        Ok(self.users.get(email).cloned().unwrap_or_default())
    }
}
