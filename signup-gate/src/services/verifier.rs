use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use super::error::VerifyError;
use crate::config::GoogleConfig;
use crate::models::IdentityClaims;

/// Largest JWKS document accepted from the key endpoint.
const MAX_JWKS_SIZE: usize = 512 * 1024;

/// Checks a bearer identity token and returns its claims.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str, audience: &str) -> Result<IdentityClaims, VerifyError>;
}

struct CachedKeys {
    set: JwkSet,
    fetched_at: Instant,
}

/// Verifies Google-issued ID tokens against Google's published signing keys.
///
/// Keys are cached for the configured TTL and survive across warm Lambda
/// invocations. A `kid` that is not in the cache forces one refetch, which is
/// how Google key rotation is picked up before the TTL runs out. Forced
/// refetches are at least `min_refresh` apart, so tokens naming made-up kids
/// cannot turn every sign-up into a call to Google.
pub struct GoogleIdTokenVerifier {
    http_client: Client,
    jwks_uri: String,
    issuers: Vec<String>,
    cache_ttl: Duration,
    min_refresh: Duration,
    leeway: u64,
    keys: RwLock<Option<CachedKeys>>,
}

impl GoogleIdTokenVerifier {
    pub fn new(config: &GoogleConfig) -> Result<Self, AppError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_seconds))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Failed to build HTTP client: {}", e)))?;

        tracing::info!(jwks_uri = %config.jwks_uri, "Google ID token verifier initialized");

        Ok(Self {
            http_client,
            jwks_uri: config.jwks_uri.clone(),
            issuers: config.issuers.clone(),
            cache_ttl: Duration::from_secs(config.jwks_cache_ttl_seconds),
            min_refresh: Duration::from_secs(config.jwks_min_refresh_seconds),
            leeway: config.clock_skew_seconds,
            keys: RwLock::new(None),
        })
    }

    async fn signing_key(&self, kid: &str) -> Result<Jwk, VerifyError> {
        if let Some(jwk) = self.cached_key(kid).await {
            return Ok(jwk);
        }

        let unknown_kid =
            || VerifyError::InvalidToken(format!("No signing key matches kid '{}'", kid));

        if !self.refresh_due().await {
            tracing::debug!(kid = %kid, "Signing key not cached, keys refreshed too recently to refetch");
            return Err(unknown_kid());
        }

        tracing::debug!(kid = %kid, "Signing key not cached, fetching JWKS");
        let set = self.refresh_keys().await?;
        set.find(kid).cloned().ok_or_else(unknown_kid)
    }

    /// Whether the key endpoint may be contacted now.
    async fn refresh_due(&self) -> bool {
        match self.keys.read().await.as_ref() {
            None => true,
            Some(cached) => {
                let age = cached.fetched_at.elapsed();
                age >= self.cache_ttl || age >= self.min_refresh
            }
        }
    }

    async fn cached_key(&self, kid: &str) -> Option<Jwk> {
        let guard = self.keys.read().await;
        let cached = guard.as_ref()?;
        if cached.fetched_at.elapsed() >= self.cache_ttl {
            return None;
        }
        cached.set.find(kid).cloned()
    }

    async fn refresh_keys(&self) -> Result<JwkSet, VerifyError> {
        let set = self.fetch_keys().await?;
        *self.keys.write().await = Some(CachedKeys {
            set: set.clone(),
            fetched_at: Instant::now(),
        });
        Ok(set)
    }

    async fn fetch_keys(&self) -> Result<JwkSet, VerifyError> {
        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("JWKS request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(VerifyError::Unavailable(format!(
                "JWKS endpoint returned HTTP {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| VerifyError::Unavailable(format!("Failed to read JWKS: {}", e)))?;

        if bytes.len() > MAX_JWKS_SIZE {
            return Err(VerifyError::Unavailable(format!(
                "JWKS too large: {} bytes (max {})",
                bytes.len(),
                MAX_JWKS_SIZE
            )));
        }

        serde_json::from_slice(&bytes)
            .map_err(|e| VerifyError::Unavailable(format!("Failed to parse JWKS: {}", e)))
    }
}

#[async_trait]
impl IdentityVerifier for GoogleIdTokenVerifier {
    async fn verify(&self, token: &str, audience: &str) -> Result<IdentityClaims, VerifyError> {
        let header = decode_header(token)
            .map_err(|e| VerifyError::InvalidToken(format!("Malformed token header: {}", e)))?;

        // Google signs with RS256 only; never let the header pick the algorithm
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::InvalidToken(format!(
                "Unexpected signing algorithm {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::InvalidToken("Token header has no kid".to_string()))?;

        let jwk = self.signing_key(&kid).await?;
        let decoding_key = DecodingKey::from_jwk(&jwk)
            .map_err(|e| VerifyError::InvalidToken(format!("Unusable signing key: {}", e)))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[audience]);
        validation.set_issuer(self.issuers.as_slice());
        validation.set_required_spec_claims(&["exp", "iat", "iss", "aud"]);
        validation.leeway = self.leeway;

        let token_data = decode::<IdentityClaims>(token, &decoding_key, &validation).map_err(|e| {
            VerifyError::InvalidToken(format!("Signature or claims validation failed: {}", e))
        })?;

        let now = Utc::now().timestamp();
        if token_data.claims.iat > now + self.leeway as i64 {
            return Err(VerifyError::InvalidToken(
                "Token issued in the future".to_string(),
            ));
        }

        Ok(token_data.claims)
    }
}

/// Verifier answering from a fixed token table, for tests.
#[derive(Default)]
pub struct MockVerifier {
    tokens: HashMap<String, Result<IdentityClaims, VerifyError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl MockVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `token` as valid. Verifying it for an audience its claims
    /// don't name fails like a real wrong-audience token.
    pub fn with_token(mut self, token: impl Into<String>, claims: IdentityClaims) -> Self {
        self.tokens.insert(token.into(), Ok(claims));
        self
    }

    pub fn with_failure(mut self, token: impl Into<String>, error: VerifyError) -> Self {
        self.tokens.insert(token.into(), Err(error));
        self
    }

    /// `(token, audience)` pairs seen so far.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl IdentityVerifier for MockVerifier {
    async fn verify(&self, token: &str, audience: &str) -> Result<IdentityClaims, VerifyError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((token.to_string(), audience.to_string()));

        match self.tokens.get(token) {
            Some(Ok(claims)) if claims.aud.contains(audience) => Ok(claims.clone()),
            Some(Ok(_)) => Err(VerifyError::InvalidToken("InvalidAudience".to_string())),
            Some(Err(e)) => Err(e.clone()),
            None => Err(VerifyError::InvalidToken("InvalidSignature".to_string())),
        }
    }
}
