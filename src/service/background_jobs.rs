// service/background_jobs.rs
use std::sync::Arc;

use chrono::Utc;
use tokio::time::{interval, Duration};

use crate::{db::Store, service::error::ServiceError, AppState};

/// Periodically refreshes every user's aggregate rating from their reviews.
pub async fn start_rating_recompute_job(app_state: Arc<AppState>) {
    let period = Duration::from_secs(app_state.env.rating_recompute_interval_secs.max(1));
    let mut interval = interval(period);

    loop {
        interval.tick().await;

        tracing::info!("Running rating recompute job at {}", Utc::now());

        match recompute_ratings(app_state.db_client.as_ref()).await {
            Ok(updated) => {
                tracing::info!("Rating recompute job completed: {} users updated", updated)
            }
            Err(e) => tracing::error!("Rating recompute job failed: {}", e),
        }
    }
}

/// One pass over all users. A failure for one user is logged and skipped.
pub async fn recompute_ratings(store: &dyn Store) -> Result<usize, ServiceError> {
    let user_ids = store.get_user_ids().await?;
    let mut updated = 0;

    for uid in user_ids {
        match store.update_rating(&uid).await {
            Ok(_) => updated += 1,
            Err(e) => tracing::error!("Failed to recompute rating for {}: {}", uid, e),
        }
    }

    Ok(updated)
}
