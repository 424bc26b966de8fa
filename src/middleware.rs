use std::sync::Arc;

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::IntoResponse,
    Extension,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{ErrorMessage, HttpError},
    AppState,
};

/// The verified caller, inserted by `auth` for every protected route.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
}

impl AuthUser {
    /// Guards routes that only act on the caller's own records.
    pub fn ensure_self(&self, uid: &str) -> Result<(), HttpError> {
        if self.uid == uid {
            Ok(())
        } else {
            Err(HttpError::forbidden(ErrorMessage::PermissionDenied.to_string()))
        }
    }
}

pub fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|auth_header| auth_header.to_str().ok())
        .and_then(|auth_value| auth_value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_owned)
}

pub async fn auth(
    Extension(app_state): Extension<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<impl IntoResponse, HttpError> {
    let token = bearer_token(req.headers())
        .ok_or_else(|| HttpError::unauthorized(ErrorMessage::TokenNotProvided.to_string()))?;

    let identity = match app_state.identity_verifier.verify(&token).await {
        Ok(identity) => identity,
        Err(e) => {
            tracing::debug!("rejected bearer token: {}", e);
            return Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_string()));
        }
    };

    req.extensions_mut().insert(AuthUser {
        uid: identity.uid,
        email: identity.email,
    });

    Ok(next.run(req).await)
}
