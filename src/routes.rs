use std::sync::Arc;

use axum::{middleware, response::IntoResponse, routing::get, Extension, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    error::{ErrorMessage, HttpError},
    handler::{
        matches::matches_handler, notifications::notifications_handler,
        reviews::reviews_handler, skill_swap::skill_swap_handler, skills::skills_handler,
        users::users_handler,
    },
    middleware::auth,
    AppState,
};

async fn root() -> &'static str {
    "Skill Swap Platform Backend"
}

async fn health_check() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn db_health_check(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let tables = app_state.db_client.list_tables().await.map_err(|e| {
        tracing::error!("database health check failed: {}", e);
        HttpError::server_error(ErrorMessage::ServerError.to_string())
    })?;

    Ok(Json(json!({
        "status": "ok",
        "tables": tables,
    })))
}

pub fn create_router(app_state: Arc<AppState>) -> Router {
    let api_route = Router::new()
        .merge(users_handler())
        .nest("/skill-swap", skill_swap_handler())
        .nest("/matches", matches_handler())
        .nest("/reviews", reviews_handler())
        .nest("/skills", skills_handler())
        .nest("/notifications", notifications_handler())
        .layer(middleware::from_fn(auth))
        .layer(TraceLayer::new_for_http());

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/db", get(db_health_check))
        .nest("/api", api_route)
        .layer(Extension(app_state))
}
