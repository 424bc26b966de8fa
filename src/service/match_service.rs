// service/match_service.rs
use std::{collections::HashMap, sync::Arc};

use chrono::Utc;
use uuid::Uuid;

use crate::{
    db::Store,
    models::matchmodel::{room_id_for, CallRecord, Match, MatchStatus},
    service::{error::ServiceError, notification_service::NotificationService},
};

#[derive(Clone)]
pub struct MatchService {
    db_client: Arc<dyn Store>,
    notification_service: Arc<NotificationService>,
}

impl MatchService {
    pub fn new(db_client: Arc<dyn Store>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    async fn participant_match(
        &self,
        match_id: Uuid,
        requester_uid: &str,
    ) -> Result<Match, ServiceError> {
        let found = self
            .db_client
            .get_match(match_id)
            .await?
            .ok_or(ServiceError::MatchNotFound(match_id))?;

        if !found.is_participant(requester_uid) {
            return Err(ServiceError::NotParticipant(requester_uid.to_string(), match_id));
        }

        Ok(found)
    }

    async fn attach_call_history(
        &self,
        mut matches: Vec<Match>,
    ) -> Result<Vec<Match>, ServiceError> {
        if matches.is_empty() {
            return Ok(matches);
        }

        let ids: Vec<Uuid> = matches.iter().map(|m| m.id).collect();
        let mut by_match: HashMap<Uuid, Vec<CallRecord>> = HashMap::new();
        for call in self.db_client.get_call_history(&ids).await? {
            by_match.entry(call.match_id).or_default().push(call);
        }

        for m in matches.iter_mut() {
            m.call_history = by_match.remove(&m.id).unwrap_or_default();
        }
        Ok(matches)
    }

    /// Moves a match one step along pending -> accepted -> completed and
    /// notifies the other participant.
    pub async fn update_status(
        &self,
        match_id: Uuid,
        requester_uid: &str,
        new_status: MatchStatus,
    ) -> Result<Match, ServiceError> {
        let current = self.participant_match(match_id, requester_uid).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(ServiceError::InvalidTransition(current.status, new_status));
        }

        // lost a race against another status change
        let updated = self
            .db_client
            .update_match_status(match_id, current.status, new_status)
            .await?
            .ok_or(ServiceError::InvalidTransition(current.status, new_status))?;

        tracing::info!(
            "match {} moved from {} to {} by {}",
            match_id,
            current.status,
            new_status,
            requester_uid
        );

        let requester_name = self.notification_service.display_name(requester_uid).await;
        self.notification_service.notify_in_background(
            updated.counterpart(requester_uid).to_string(),
            "Skill Swap Request Updated".to_string(),
            format!("{} has {} your request.", requester_name, new_status),
        );

        let mut with_history = self.attach_call_history(vec![updated]).await?;
        with_history.pop().ok_or(ServiceError::MatchNotFound(match_id))
    }

    /// Opens a video room for an accepted match and records it in the call
    /// history.
    pub async fn start_call(
        &self,
        match_id: Uuid,
        requester_uid: &str,
    ) -> Result<CallRecord, ServiceError> {
        let found = self.participant_match(match_id, requester_uid).await?;

        if found.status != MatchStatus::Accepted {
            return Err(ServiceError::CallNotAllowed);
        }

        let started_at = Utc::now();
        let room_id = room_id_for(match_id, started_at);
        let record = self
            .db_client
            .add_call_record(match_id, &room_id, started_at)
            .await?;

        tracing::info!("call {} started for match {} by {}", room_id, match_id, requester_uid);
        Ok(record)
    }

    pub async fn end_call(
        &self,
        match_id: Uuid,
        requester_uid: &str,
        room_id: &str,
        duration_seconds: i32,
    ) -> Result<CallRecord, ServiceError> {
        self.participant_match(match_id, requester_uid).await?;

        if duration_seconds < 0 {
            return Err(ServiceError::Validation(
                "Duration must not be negative".to_string(),
            ));
        }

        let record = self
            .db_client
            .end_call_record(match_id, room_id, duration_seconds)
            .await?
            .ok_or_else(|| ServiceError::CallNotFound(room_id.to_string()))?;

        tracing::info!("call {} ended after {}s", room_id, duration_seconds);
        Ok(record)
    }

    /// Every match the user takes part in, newest first, with call history.
    pub async fn matches_for_user(&self, uid: &str) -> Result<Vec<Match>, ServiceError> {
        let matches = self.db_client.get_matches_for_user(uid).await?;
        self.attach_call_history(matches).await
    }
}
