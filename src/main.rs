mod config;
mod db;
mod dtos;
mod error;
mod handler;
mod middleware;
mod models;
mod routes;
mod service;

#[cfg(test)]
mod test_support;

use std::{sync::Arc, time::Duration};

use anyhow::Context;
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    HeaderValue, Method,
};
use config::Config;
use db::{db::DBClient, Store};
use dotenv::dotenv;
use routes::create_router;
use service::{
    background_jobs::start_rating_recompute_job,
    identity::{FirebaseTokenVerifier, IdentityVerifier},
    match_service::MatchService,
    notification_service::NotificationService,
    push_provider::{DisabledPushProvider, FcmPushProvider, PushProvider},
    review_service::ReviewService,
    skill_swap_service::SkillSwapService,
};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct AppState {
    pub env: Config,
    pub db_client: Arc<dyn Store>,
    pub identity_verifier: Arc<dyn IdentityVerifier>,
    pub notification_service: Arc<NotificationService>,
    pub skill_swap_service: Arc<SkillSwapService>,
    pub match_service: Arc<MatchService>,
    pub review_service: Arc<ReviewService>,
}

impl AppState {
    pub fn new(
        env: Config,
        db_client: Arc<dyn Store>,
        identity_verifier: Arc<dyn IdentityVerifier>,
        push: Arc<dyn PushProvider>,
    ) -> Self {
        let notification_service = Arc::new(NotificationService::new(db_client.clone(), push));

        AppState {
            env,
            identity_verifier,
            skill_swap_service: Arc::new(SkillSwapService::new(
                db_client.clone(),
                notification_service.clone(),
            )),
            match_service: Arc::new(MatchService::new(
                db_client.clone(),
                notification_service.clone(),
            )),
            review_service: Arc::new(ReviewService::new(
                db_client.clone(),
                notification_service.clone(),
            )),
            notification_service,
            db_client,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::init()?;

    let pool = match PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            tracing::info!("✅ Connection to the database is successful!");
            pool
        }
        Err(err) => {
            tracing::error!("🔥 Failed to connect to the database: {:?}", err);
            return Err(err.into());
        }
    };

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("failed to run database migrations")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .context("failed to build HTTP client")?;

    let push: Arc<dyn PushProvider> = match &config.firebase_service_account {
        Some(path) => {
            let provider = FcmPushProvider::from_service_account_file(http.clone(), path)
                .with_context(|| format!("failed to load service account from {}", path))?;
            tracing::info!("push notifications enabled");
            Arc::new(provider)
        }
        None => {
            tracing::warn!("FIREBASE_SERVICE_ACCOUNT not set, push notifications are disabled");
            Arc::new(DisabledPushProvider)
        }
    };

    let verifier = Arc::new(FirebaseTokenVerifier::new(
        http,
        config.firebase_project_id.clone(),
    ));

    let allowed_origins = config
        .client_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<Result<Vec<_>, _>>()
        .context("CLIENT_ORIGINS contains an invalid origin")?;

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed_origins))
        .allow_headers([AUTHORIZATION, ACCEPT, CONTENT_TYPE])
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PATCH]);

    let app_state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(DBClient::new(pool)),
        verifier,
        push,
    ));

    tokio::spawn(start_rating_recompute_job(app_state.clone()));

    let app = create_router(app_state).layer(cors);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;

    tracing::info!("🚀 Server is running on http://localhost:{}", config.port);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
