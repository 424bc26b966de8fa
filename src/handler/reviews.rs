use std::sync::Arc;

use axum::{
    extract::Path,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Extension, Json, Router,
};
use validator::Validate;

use crate::{
    dtos::{
        reviewdtos::{CreateReviewDto, ReviewData, ReviewListResponseDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::AuthUser,
    AppState,
};

pub fn reviews_handler() -> Router {
    Router::new()
        .route("/", post(create_review))
        .route("/:user_id", get(get_user_reviews))
}

pub async fn create_review(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateReviewDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate().map_err(HttpError::validation)?;

    let review = app_state
        .review_service
        .add_review(
            &auth_user.uid,
            &body.user_id,
            body.rating,
            body.comment.as_deref(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("Review added successfully", ReviewData { review })),
    ))
}

pub async fn get_user_reviews(
    Path(user_id): Path<String>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let reviews = app_state.review_service.reviews_for_user(&user_id).await?;

    Ok(Json(ReviewListResponseDto {
        status: "success".to_string(),
        results: reviews.len(),
        reviews,
    }))
}
