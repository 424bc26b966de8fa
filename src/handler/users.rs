use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::userdtos::{
        total_pages, DeviceTokenDto, DeviceTokenResponseDto, FilterUserDto, RequestQueryDto,
        UpsertUserDto, UserData, UserListResponseDto, UserResponseDto,
    },
    error::{ErrorMessage, HttpError},
    middleware::AuthUser,
    service::error::ServiceError,
    AppState,
};

pub fn users_handler() -> Router {
    Router::new()
        .route("/user", post(upsert_user))
        .route("/user/update-device-token", post(update_device_token))
        .route("/user/:firebase_uid", get(get_user))
        .route("/users", get(get_users))
}

pub async fn upsert_user(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertUserDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    if body.firebase_uid != auth_user.uid {
        return Err(HttpError::forbidden(
            ErrorMessage::ProfileOwnershipMismatch.to_string(),
        ));
    }

    let user = app_state
        .db_client
        .upsert_user(body.into_profile())
        .await
        .map_err(|e| {
            let email_taken =
                matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
            if email_taken {
                HttpError::bad_request(ErrorMessage::EmailExist.to_string())
            } else {
                HttpError::from(ServiceError::from(e))
            }
        })?;

    tracing::info!("profile saved for {}", user.firebase_uid);

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn get_user(
    Path(firebase_uid): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let user = app_state
        .db_client
        .get_user(&firebase_uid)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(Json(UserResponseDto {
        status: "success".to_string(),
        data: UserData {
            user: FilterUserDto::filter_user(&user),
        },
    }))
}

pub async fn get_users(
    Query(query_params): Query<RequestQueryDto>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    query_params.validate().map_err(HttpError::validation)?;

    let page = query_params.page.unwrap_or(1);
    let limit = query_params.limit.unwrap_or(10);

    let users = app_state
        .db_client
        .get_users(page, limit)
        .await
        .map_err(ServiceError::from)?;

    let user_count = app_state
        .db_client
        .get_user_count()
        .await
        .map_err(ServiceError::from)?;

    Ok(Json(UserListResponseDto {
        status: "success".to_string(),
        users: FilterUserDto::filter_users(&users),
        total_pages: total_pages(user_count, limit),
        current_page: page,
        results: user_count,
    }))
}

pub async fn update_device_token(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<DeviceTokenDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let user = app_state
        .db_client
        .add_device_token(&auth_user.uid, body.token.trim())
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| HttpError::not_found(ErrorMessage::UserNotFound.to_string()))?;

    Ok(Json(DeviceTokenResponseDto {
        status: "success".to_string(),
        message: "Device token registered".to_string(),
        device_token_count: user.device_tokens.len(),
    }))
}
