use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, patch},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        notificationdtos::{
            FilterNotificationDto, NotificationData, NotificationListResponseDto,
            SendNotificationDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::AuthUser,
    service::{error::ServiceError, notification_service::DispatchOutcome},
    AppState,
};

pub fn notifications_handler() -> Router {
    Router::new()
        .route("/", get(get_notifications).post(send_notification))
        .route("/:id/read", patch(mark_notification_read))
}

pub async fn send_notification(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SendNotificationDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;
    auth_user.ensure_self(&body.user_id)?;

    let outcome = app_state
        .notification_service
        .send_notification(&body.user_id, &body.title, &body.body)
        .await?;

    if outcome == DispatchOutcome::NoTokens {
        return Err(HttpError::bad_request("No device tokens registered for user"));
    }

    Ok(Json(ApiResponse::success("Notification sent", outcome)))
}

pub async fn get_notifications(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = app_state
        .db_client
        .get_user_notifications(&auth_user.uid)
        .await
        .map_err(ServiceError::from)?;

    Ok(Json(NotificationListResponseDto {
        status: "success".to_string(),
        results: notifications.len(),
        notifications: FilterNotificationDto::filter_notifications(&notifications),
    }))
}

// Message ids contain slashes, so clients percent-encode them in the path.
pub async fn mark_notification_read(
    Path(message_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let notification = app_state
        .db_client
        .mark_notification_read(&message_id, &auth_user.uid)
        .await
        .map_err(ServiceError::from)?
        .ok_or_else(|| HttpError::not_found("Notification not found"))?;

    Ok(Json(ApiResponse::success(
        "Notification marked as read",
        NotificationData {
            notification: FilterNotificationDto::filter_notification(&notification),
        },
    )))
}
