// service/identity.rs
use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::{decode, decode_header, jwk::JwkSet, Algorithm, DecodingKey, Validation};
use reqwest::header::CACHE_CONTROL;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;

const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedIdentity {
    pub uid: String,
    pub email: Option<String>,
}

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("unsupported signing algorithm {0:?}")]
    UnsupportedAlgorithm(Algorithm),

    #[error("no signing key for kid {0}")]
    UnknownKey(String),

    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("could not fetch signing keys: {0}")]
    KeyFetch(String),
}

/// Verifies externally issued ID tokens and yields the caller's UID.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError>;
}

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
}

struct CachedKeys {
    keys: JwkSet,
    expires_at: Instant,
}

/// Checks Firebase Authentication ID tokens against Google's published
/// signing keys. Keys are cached for the `max-age` the endpoint advertises and
/// refreshed early when a token names an unknown `kid`.
pub struct FirebaseTokenVerifier {
    http: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    pub fn new(http: reqwest::Client, project_id: impl Into<String>) -> Self {
        Self {
            http,
            project_id: project_id.into(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            cache: RwLock::new(None),
        }
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[self.project_id.as_str()]);
        validation.set_issuer(&[format!("https://securetoken.google.com/{}", self.project_id)]);
        validation.set_required_spec_claims(&["exp", "iat", "sub", "aud", "iss"]);
        validation
    }

    async fn cached_key(&self, kid: &str) -> Option<DecodingKey> {
        let cache = self.cache.read().await;
        let cached = cache.as_ref().filter(|c| c.expires_at > Instant::now())?;
        cached.keys.find(kid).and_then(|jwk| DecodingKey::from_jwk(jwk).ok())
    }

    async fn refresh_keys(&self) -> Result<(), IdentityError> {
        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?
            .error_for_status()
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        let ttl = response
            .headers()
            .get(CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_max_age)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response
            .json()
            .await
            .map_err(|e| IdentityError::KeyFetch(e.to_string()))?;

        tracing::debug!("refreshed {} identity signing keys, ttl {:?}", keys.keys.len(), ttl);

        *self.cache.write().await = Some(CachedKeys {
            keys,
            expires_at: Instant::now() + ttl,
        });
        Ok(())
    }

    async fn key_for(&self, kid: &str) -> Result<DecodingKey, IdentityError> {
        if let Some(key) = self.cached_key(kid).await {
            return Ok(key);
        }

        self.refresh_keys().await?;

        self.cached_key(kid)
            .await
            .ok_or_else(|| IdentityError::UnknownKey(kid.to_string()))
    }
}

#[async_trait]
impl IdentityVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, IdentityError> {
        let header = decode_header(token).map_err(|e| IdentityError::Malformed(e.to_string()))?;

        if header.alg != Algorithm::RS256 {
            return Err(IdentityError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header
            .kid
            .ok_or_else(|| IdentityError::Malformed("missing kid".to_string()))?;

        let key = self.key_for(&kid).await?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation())?;

        let uid = data.claims.sub;
        if uid.is_empty() || uid.len() > 128 {
            return Err(IdentityError::Malformed("invalid subject".to_string()));
        }

        Ok(VerifiedIdentity {
            uid,
            email: data.claims.email,
        })
    }
}

/// Extracts `max-age` seconds from a Cache-Control header value.
pub fn parse_max_age(cache_control: &str) -> Option<u64> {
    cache_control
        .split(',')
        .map(str::trim)
        .find_map(|directive| directive.strip_prefix("max-age="))
        .and_then(|secs| secs.trim().parse::<u64>().ok())
}
