// service/skill_swap_service.rs
use std::sync::Arc;

use crate::{
    db::Store,
    models::matchmodel::Match,
    service::{error::ServiceError, notification_service::NotificationService},
};

#[derive(Clone)]
pub struct SkillSwapService {
    db_client: Arc<dyn Store>,
    notification_service: Arc<NotificationService>,
}

impl SkillSwapService {
    pub fn new(db_client: Arc<dyn Store>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// Opens a pending match between `requester_uid` and the target for one of
    /// the target's offered skills, then notifies the target.
    pub async fn request_swap(
        &self,
        requester_uid: &str,
        target_uid: &str,
        skill_name: &str,
    ) -> Result<Match, ServiceError> {
        if requester_uid == target_uid {
            return Err(ServiceError::SelfRequest);
        }

        let skill_name = skill_name.trim();
        if skill_name.is_empty() {
            return Err(ServiceError::Validation("Skill name is required".to_string()));
        }

        let target = self
            .db_client
            .get_user(target_uid)
            .await?
            .ok_or(ServiceError::UserNotFound("Target user"))?;

        if !target.offers_skill(skill_name) {
            return Err(ServiceError::SkillNotOffered);
        }

        if self
            .db_client
            .find_pending_match(requester_uid, target_uid, skill_name)
            .await?
            .is_some()
        {
            return Err(ServiceError::DuplicatePendingRequest);
        }

        // the partial unique index catches requests that raced past the check above
        let created = self
            .db_client
            .save_match(requester_uid, target_uid, skill_name)
            .await
            .map_err(|e| {
                ServiceError::on_unique_violation(e, ServiceError::DuplicatePendingRequest)
            })?;

        tracing::info!(
            "skill swap {} requested: {} -> {} for '{}'",
            created.id,
            requester_uid,
            target_uid,
            created.skill_exchanged
        );

        let requester_name = self.notification_service.display_name(requester_uid).await;
        self.notification_service.notify_in_background(
            target_uid.to_string(),
            "New Skill Swap Request".to_string(),
            format!("{} wants to swap {} with you!", requester_name, created.skill_exchanged),
        );

        Ok(created)
    }
}
