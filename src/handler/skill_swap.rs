use std::sync::Arc;

use axum::{response::IntoResponse, routing::post, Extension, Json, Router};
use validator::Validate;

use crate::{
    dtos::{matchdtos::MatchData, skillswapdtos::SkillSwapRequestDto, ApiResponse},
    error::HttpError,
    middleware::AuthUser,
    AppState,
};

pub fn skill_swap_handler() -> Router {
    Router::new().route("/request", post(request_skill_swap))
}

pub async fn request_skill_swap(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<SkillSwapRequestDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let swap = app_state
        .skill_swap_service
        .request_swap(&auth_user.uid, &body.target_user_id, &body.skill_name)
        .await?;

    Ok(Json(ApiResponse::success(
        "Skill swap request sent successfully",
        MatchData { swap },
    )))
}
