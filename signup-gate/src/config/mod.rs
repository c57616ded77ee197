use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_JWKS_URI: &str = "https://www.googleapis.com/oauth2/v3/certs";
pub const DEFAULT_ISSUERS: &str = "accounts.google.com,https://accounts.google.com";
pub const DEFAULT_ID_TOKEN_KEY: &str = "idTokenGoogle";

#[derive(Debug, Clone, Deserialize)]
pub struct GateConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub environment: Environment,
    pub service_name: String,
    pub service_version: String,
    pub google: GoogleConfig,
    pub directory: DirectoryConfig,
    /// Validation-data key carrying the Google ID token.
    pub id_token_key: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Dev,
    Prod,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    /// OAuth client id the tokens must be issued for (the `aud` claim).
    pub client_id: String,
    pub jwks_uri: String,
    pub issuers: Vec<String>,
    pub jwks_cache_ttl_seconds: u64,
    /// Shortest gap between two refetches forced by an unknown `kid`.
    pub jwks_min_refresh_seconds: u64,
    pub clock_skew_seconds: u64,
    pub http_timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub user_pool_id: String,
}

impl GateConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_source(common_config, |key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_source<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_str = lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string());
        let environment: Environment = env_str
            .parse()
            .map_err(|e: String| AppError::ConfigError(anyhow::anyhow!(e)))?;

        let is_prod = environment == Environment::Prod;
        let get = |key: &str, default: Option<&str>| get_env(&lookup, key, default, is_prod);

        let config = GateConfig {
            common,
            environment: environment.clone(),
            service_name: get("SERVICE_NAME", Some("signup-gate"))?,
            service_version: get("SERVICE_VERSION", Some(env!("CARGO_PKG_VERSION")))?,
            google: GoogleConfig {
                client_id: get("GOOGLE_CLIENT_ID", None)?,
                jwks_uri: get("GOOGLE_JWKS_URI", Some(DEFAULT_JWKS_URI))?,
                issuers: get("GOOGLE_ISSUERS", Some(DEFAULT_ISSUERS))?
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                jwks_cache_ttl_seconds: parse_u64(
                    "GOOGLE_JWKS_CACHE_TTL_SECONDS",
                    get("GOOGLE_JWKS_CACHE_TTL_SECONDS", Some("3600"))?,
                )?,
                jwks_min_refresh_seconds: parse_u64(
                    "GOOGLE_JWKS_MIN_REFRESH_SECONDS",
                    get("GOOGLE_JWKS_MIN_REFRESH_SECONDS", Some("10"))?,
                )?,
                clock_skew_seconds: parse_u64(
                    "GOOGLE_CLOCK_SKEW_SECONDS",
                    get("GOOGLE_CLOCK_SKEW_SECONDS", Some("0"))?,
                )?,
                http_timeout_seconds: parse_u64(
                    "GOOGLE_HTTP_TIMEOUT_SECONDS",
                    get("GOOGLE_HTTP_TIMEOUT_SECONDS", Some("10"))?,
                )?,
            },
            directory: DirectoryConfig {
                user_pool_id: get("COGNITO_USER_POOL_ID", None)?,
            },
            id_token_key: get("ID_TOKEN_KEY", Some(DEFAULT_ID_TOKEN_KEY))?,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.google.client_id.trim().is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_CLIENT_ID must not be empty"
            )));
        }

        if self.google.issuers.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_ISSUERS must name at least one issuer"
            )));
        }

        if self.google.http_timeout_seconds == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_HTTP_TIMEOUT_SECONDS must be positive"
            )));
        }

        // Pool ids look like "us-east-1_vLSsBubHd"
        match self.directory.user_pool_id.split_once('_') {
            Some((region, id)) if !region.is_empty() && !id.is_empty() => {}
            _ => {
                return Err(AppError::ConfigError(anyhow::anyhow!(
                    "COGNITO_USER_POOL_ID '{}' is not of the form <region>_<id>",
                    self.directory.user_pool_id
                )));
            }
        }

        if self.id_token_key.is_empty() {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "ID_TOKEN_KEY must not be empty"
            )));
        }

        // In production, ensure stricter validation
        if self.environment == Environment::Prod && !self.google.jwks_uri.starts_with("https://") {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "GOOGLE_JWKS_URI must use https in production"
            )));
        }

        Ok(())
    }
}

fn get_env<F>(lookup: &F, key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(val) => Ok(val),
        None => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required in production but not set",
                    key
                ))))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(format!(
                    "{} is required but not set",
                    key
                ))))
            }
        }
    }
}

fn parse_u64(key: &str, value: String) -> Result<u64, AppError> {
    value.trim().parse().map_err(|e: std::num::ParseIntError| {
        AppError::ConfigError(anyhow::anyhow!("{} is not a valid number: {}", key, e))
    })
}

impl std::str::FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            _ => Err(format!("Invalid environment: {}", s)),
        }
    }
}
