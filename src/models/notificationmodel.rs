use chrono::prelude::*;
use serde::{Deserialize, Serialize};

/// A stored push delivery. `message_id` is the provider's message name and
/// doubles as the idempotency key.
#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub message_id: String,
    pub user_id: String,
    pub title: String,
    pub body: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}
