// service/push_provider.rs
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use futures::future::join_all;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::service::error::ServiceError;

const FCM_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// What the provider reported for one device token.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// Accepted for delivery; carries the provider's message name.
    Delivered { message_id: String },
    /// The token will never work again and should be forgotten.
    InvalidToken { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SendResponse {
    pub token: String,
    pub outcome: SendOutcome,
}

/// Multicast push delivery: one result per token, in input order.
#[async_trait]
pub trait PushProvider: Send + Sync {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> Result<Vec<SendResponse>, ServiceError>;
}

/// Used when no service account is configured. Every token fails, nothing is
/// stored and no token is pruned.
pub struct DisabledPushProvider;

#[async_trait]
impl PushProvider for DisabledPushProvider {
    async fn send_multicast(
        &self,
        tokens: &[String],
        _title: &str,
        _body: &str,
    ) -> Result<Vec<SendResponse>, ServiceError> {
        Ok(tokens
            .iter()
            .map(|token| SendResponse {
                token: token.clone(),
                outcome: SendOutcome::Failed {
                    reason: "push delivery is not configured".to_string(),
                },
            })
            .collect())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct AccessToken {
    value: String,
    expires_at: u64,
}

/// Firebase Cloud Messaging over the HTTP v1 API. The v1 API has no batch
/// endpoint, so a multicast is one request per token issued concurrently.
pub struct FcmPushProvider {
    http: reqwest::Client,
    account: ServiceAccountKey,
    signing_key: EncodingKey,
    access_token: Mutex<Option<AccessToken>>,
}

impl FcmPushProvider {
    pub fn new(http: reqwest::Client, account: ServiceAccountKey) -> anyhow::Result<Self> {
        let signing_key = EncodingKey::from_rsa_pem(account.private_key.as_bytes())?;
        Ok(Self {
            http,
            account,
            signing_key,
            access_token: Mutex::new(None),
        })
    }

    pub fn from_service_account_file(http: reqwest::Client, path: &str) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let account: ServiceAccountKey = serde_json::from_str(&raw)?;
        Self::new(http, account)
    }

    fn send_url(&self) -> String {
        format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.account.project_id
        )
    }

    async fn bearer_token(&self) -> Result<String, ServiceError> {
        let now = unix_now();
        let mut cached = self.access_token.lock().await;

        if let Some(token) = cached.as_ref() {
            // refresh a minute early
            if token.expires_at > now + 60 {
                return Ok(token.value.clone());
            }
        }

        let claims = AssertionClaims {
            iss: &self.account.client_email,
            scope: FCM_SCOPE,
            aud: &self.account.token_uri,
            iat: now,
            exp: now + 3600,
        };
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &self.signing_key)
            .map_err(|e| ServiceError::Push(format!("could not sign token request: {}", e)))?;

        let response = self
            .http
            .post(&self.account.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ServiceError::Push(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ServiceError::Push(format!(
                "token exchange failed with {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::Push(e.to_string()))?;

        let value = token.access_token.clone();
        *cached = Some(AccessToken {
            value: token.access_token,
            expires_at: now + token.expires_in,
        });
        Ok(value)
    }

    async fn send_one(&self, bearer: &str, token: &str, title: &str, body: &str) -> SendOutcome {
        let payload = serde_json::json!({
            "message": {
                "token": token,
                "notification": { "title": title, "body": body },
            }
        });

        let response = match self
            .http
            .post(self.send_url())
            .bearer_auth(bearer)
            .json(&payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return SendOutcome::Failed { reason: e.to_string() },
        };

        let status = response.status().as_u16();
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if (200..300).contains(&status) {
            return match body["name"].as_str() {
                Some(name) => SendOutcome::Delivered { message_id: name.to_string() },
                None => SendOutcome::Failed {
                    reason: "provider response had no message name".to_string(),
                },
            };
        }

        classify_fcm_error(status, &body)
    }
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    async fn send_multicast(
        &self,
        tokens: &[String],
        title: &str,
        body: &str,
    ) -> Result<Vec<SendResponse>, ServiceError> {
        let bearer = self.bearer_token().await?;

        let sends = tokens.iter().map(|token| {
            let bearer = bearer.as_str();
            async move {
                SendResponse {
                    token: token.clone(),
                    outcome: self.send_one(bearer, token, title, body).await,
                }
            }
        });

        Ok(join_all(sends).await)
    }
}

/// Sorts an FCM v1 error response into a permanent token failure or a
/// transient one.
pub fn classify_fcm_error(status: u16, body: &Value) -> SendOutcome {
    let error = &body["error"];
    let message = error["message"]
        .as_str()
        .unwrap_or("unknown provider error")
        .to_string();

    let fcm_code = error["details"]
        .as_array()
        .into_iter()
        .flatten()
        .find_map(|detail| detail["errorCode"].as_str());

    let token_is_dead = match fcm_code {
        Some("UNREGISTERED") => true,
        Some("INVALID_ARGUMENT") => message.to_lowercase().contains("registration token"),
        _ => status == 404 && error["status"].as_str() == Some("NOT_FOUND"),
    };

    if token_is_dead {
        SendOutcome::InvalidToken { reason: message }
    } else {
        SendOutcome::Failed {
            reason: format!("{} ({})", message, fcm_code.unwrap_or("no error code")),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::ZERO)
        .as_secs()
}
