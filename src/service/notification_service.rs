// service/notification_service.rs
use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::{
    db::Store,
    models::notificationmodel::Notification,
    service::{
        error::ServiceError,
        push_provider::{PushProvider, SendOutcome},
    },
};

#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// Recipient is unknown or has no registered devices. Not an error.
    NoTokens,
    #[serde(rename_all = "camelCase")]
    Sent {
        success_count: usize,
        failure_count: usize,
        pruned_tokens: usize,
        notifications: Vec<Notification>,
    },
}

#[derive(Clone)]
pub struct NotificationService {
    db_client: Arc<dyn Store>,
    push: Arc<dyn PushProvider>,
}

impl NotificationService {
    pub fn new(db_client: Arc<dyn Store>, push: Arc<dyn PushProvider>) -> Self {
        Self { db_client, push }
    }

    pub async fn send_notification(
        &self,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<DispatchOutcome, ServiceError> {
        let recipient = match self.db_client.get_user(user_id).await? {
            Some(user) if user.has_device_tokens() => user,
            _ => {
                tracing::info!("no device tokens for user {}, skipping push", user_id);
                return Ok(DispatchOutcome::NoTokens);
            }
        };

        let responses = self
            .push
            .send_multicast(&recipient.device_tokens, title, body)
            .await?;

        let mut notifications = Vec::new();
        let mut dead_tokens = Vec::new();
        let mut success_count = 0;
        let mut failure_count = 0;

        for response in responses {
            match response.outcome {
                SendOutcome::Delivered { message_id } => {
                    success_count += 1;
                    // the push already went out, so a failed insert must not stop pruning
                    match self
                        .db_client
                        .save_notification(&message_id, user_id, title, body)
                        .await
                    {
                        Ok(Some(saved)) => notifications.push(saved),
                        Ok(None) => tracing::debug!("notification {} already stored", message_id),
                        Err(e) => tracing::error!(
                            "failed to store notification {} for user {}: {}",
                            message_id,
                            user_id,
                            e
                        ),
                    }
                }
                SendOutcome::InvalidToken { reason } => {
                    failure_count += 1;
                    tracing::warn!(
                        "dropping invalid device token for user {}: {}",
                        user_id,
                        reason
                    );
                    dead_tokens.push(response.token);
                }
                SendOutcome::Failed { reason } => {
                    failure_count += 1;
                    tracing::error!("push to a device of user {} failed: {}", user_id, reason);
                }
            }
        }

        if !dead_tokens.is_empty() {
            self.db_client
                .remove_device_tokens(user_id, &dead_tokens)
                .await?;
        }

        tracing::info!(
            "push to user {}: {} delivered, {} failed, {} pruned",
            user_id,
            success_count,
            failure_count,
            dead_tokens.len()
        );

        Ok(DispatchOutcome::Sent {
            success_count,
            failure_count,
            pruned_tokens: dead_tokens.len(),
            notifications,
        })
    }

    /// Name used in notification texts, "Someone" for users without a
    /// profile or when the lookup fails.
    pub async fn display_name(&self, uid: &str) -> String {
        match self.db_client.get_user(uid).await {
            Ok(Some(user)) if !user.name.trim().is_empty() => user.name,
            Ok(_) => "Someone".to_string(),
            Err(e) => {
                tracing::warn!("could not load display name for {}: {}", uid, e);
                "Someone".to_string()
            }
        }
    }

    /// Fire-and-forget dispatch for workflows: errors are logged, never
    /// returned to the caller.
    pub fn notify_in_background(
        self: &Arc<Self>,
        user_id: String,
        title: String,
        body: String,
    ) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            if let Err(e) = service.send_notification(&user_id, &title, &body).await {
                tracing::error!("notification '{}' to user {} failed: {}", title, user_id, e);
            }
        })
    }
}
