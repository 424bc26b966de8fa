use std::sync::Arc;

use axum::{
    extract::Path,
    response::IntoResponse,
    routing::{get, patch, post},
    Extension, Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        matchdtos::{
            CallData, CallStartedDto, EndCallDto, MatchData, MatchListResponseDto,
            UpdateMatchStatusDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::AuthUser,
    AppState,
};

pub fn matches_handler() -> Router {
    Router::new()
        .route("/:id", get(get_user_matches))
        .route("/:id/status", patch(update_match_status))
        .route("/:id/start-call", post(start_call))
        .route("/:id/end-call", post(end_call))
}

// The same path segment is a user id on the listing route and a match id
// everywhere else.
pub async fn get_user_matches(
    Path(user_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    auth_user.ensure_self(&user_id)?;

    let matches = app_state.match_service.matches_for_user(&user_id).await?;

    Ok(Json(MatchListResponseDto {
        status: "success".to_string(),
        results: matches.len(),
        matches,
    }))
}

pub async fn update_match_status(
    Path(match_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpdateMatchStatusDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;
    let status = body.parsed_status().map_err(HttpError::bad_request)?;

    let swap = app_state
        .match_service
        .update_status(match_id, &auth_user.uid, status)
        .await?;

    Ok(Json(ApiResponse::success("Match status updated", MatchData { swap })))
}

pub async fn start_call(
    Path(match_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, HttpError> {
    let call = app_state
        .match_service
        .start_call(match_id, &auth_user.uid)
        .await?;

    // clients read the room id from the top level of the body
    Ok(Json(CallStartedDto { room_id: call.room_id }))
}

pub async fn end_call(
    Path(match_id): Path<Uuid>,
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<EndCallDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let call = app_state
        .match_service
        .end_call(match_id, &auth_user.uid, &body.room_id, body.duration_seconds)
        .await?;

    Ok(Json(ApiResponse::success("Call ended", CallData { call })))
}
