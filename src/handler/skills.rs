use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;

use crate::{error::HttpError, service::error::ServiceError, AppState};

pub fn skills_handler() -> Router {
    Router::new().route("/", get(get_skills))
}

pub async fn get_skills(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let skills = app_state
        .db_client
        .get_skills()
        .await
        .map_err(ServiceError::from)?;

    Ok(Json(json!({
        "status": "success",
        "results": skills.len(),
        "skills": skills,
    })))
}
