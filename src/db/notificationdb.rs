// db/notificationdb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::models::notificationmodel::Notification;

#[async_trait]
pub trait NotificationExt {
    /// Inserts keyed by `message_id`. Returns `None` when a row with that key
    /// already exists.
    async fn save_notification(
        &self,
        message_id: &str,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<Notification>, sqlx::Error>;

    async fn get_user_notifications(&self, user_id: &str) -> Result<Vec<Notification>, sqlx::Error>;

    /// Sets `read = true` on one of the user's notifications. Re-reading an
    /// already read notification succeeds.
    async fn mark_notification_read(
        &self,
        message_id: &str,
        user_id: &str,
    ) -> Result<Option<Notification>, sqlx::Error>;
}

#[async_trait]
impl NotificationExt for DBClient {
    async fn save_notification(
        &self,
        message_id: &str,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (message_id, user_id, title, body)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (message_id) DO NOTHING
            RETURNING message_id, user_id, title, body, read, created_at
            "#
        )
        .bind(message_id)
        .bind(user_id)
        .bind(title)
        .bind(body)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user_notifications(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            SELECT message_id, user_id, title, body, read, created_at
            FROM notifications
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn mark_notification_read(
        &self,
        message_id: &str,
        user_id: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        sqlx::query_as::<_, Notification>(
            r#"
            UPDATE notifications
            SET read = true
            WHERE message_id = $1 AND user_id = $2
            RETURNING message_id, user_id, title, body, read, created_at
            "#
        )
        .bind(message_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
    }
}
