// db/matchdb.rs
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::matchmodel::{CallRecord, Match, MatchStatus};

#[async_trait]
pub trait MatchExt {
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, sqlx::Error>;

    /// A pending match for the pair in either direction, skill compared
    /// case-insensitively.
    async fn find_pending_match(
        &self,
        first_uid: &str,
        second_uid: &str,
        skill_name: &str,
    ) -> Result<Option<Match>, sqlx::Error>;

    async fn save_match(
        &self,
        user_a: &str,
        user_b: &str,
        skill_exchanged: &str,
    ) -> Result<Match, sqlx::Error>;

    /// Compare-and-set on status. `None` when the match is no longer in `from`.
    async fn update_match_status(
        &self,
        match_id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
    ) -> Result<Option<Match>, sqlx::Error>;

    async fn get_matches_for_user(&self, firebase_uid: &str) -> Result<Vec<Match>, sqlx::Error>;

    async fn add_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<CallRecord, sqlx::Error>;

    async fn end_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        duration_seconds: i32,
    ) -> Result<Option<CallRecord>, sqlx::Error>;

    async fn get_call_history(&self, match_ids: &[Uuid]) -> Result<Vec<CallRecord>, sqlx::Error>;
}

#[async_trait]
impl MatchExt for DBClient {
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, user_a, user_b, skill_exchanged, status, created_at, updated_at
            FROM matches
            WHERE id = $1
            "#
        )
        .bind(match_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn find_pending_match(
        &self,
        first_uid: &str,
        second_uid: &str,
        skill_name: &str,
    ) -> Result<Option<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, user_a, user_b, skill_exchanged, status, created_at, updated_at
            FROM matches
            WHERE status = 'pending'::match_status
            AND ((user_a = $1 AND user_b = $2) OR (user_a = $2 AND user_b = $1))
            AND lower(skill_exchanged) = lower($3)
            LIMIT 1
            "#
        )
        .bind(first_uid)
        .bind(second_uid)
        .bind(skill_name.trim())
        .fetch_optional(&self.pool)
        .await
    }

    async fn save_match(
        &self,
        user_a: &str,
        user_b: &str,
        skill_exchanged: &str,
    ) -> Result<Match, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            INSERT INTO matches (user_a, user_b, skill_exchanged, status)
            VALUES ($1, $2, $3, 'pending'::match_status)
            RETURNING id, user_a, user_b, skill_exchanged, status, created_at, updated_at
            "#
        )
        .bind(user_a)
        .bind(user_b)
        .bind(skill_exchanged.trim())
        .fetch_one(&self.pool)
        .await
    }

    async fn update_match_status(
        &self,
        match_id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
    ) -> Result<Option<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            UPDATE matches
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING id, user_a, user_b, skill_exchanged, status, created_at, updated_at
            "#
        )
        .bind(match_id)
        .bind(from)
        .bind(to)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_matches_for_user(&self, firebase_uid: &str) -> Result<Vec<Match>, sqlx::Error> {
        sqlx::query_as::<_, Match>(
            r#"
            SELECT id, user_a, user_b, skill_exchanged, status, created_at, updated_at
            FROM matches
            WHERE user_a = $1 OR user_b = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(firebase_uid)
        .fetch_all(&self.pool)
        .await
    }

    async fn add_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<CallRecord, sqlx::Error> {
        sqlx::query_as::<_, CallRecord>(
            r#"
            INSERT INTO match_calls (match_id, room_id, started_at)
            VALUES ($1, $2, $3)
            RETURNING id, match_id, room_id, started_at, duration_seconds
            "#
        )
        .bind(match_id)
        .bind(room_id)
        .bind(started_at)
        .fetch_one(&self.pool)
        .await
    }

    async fn end_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        duration_seconds: i32,
    ) -> Result<Option<CallRecord>, sqlx::Error> {
        sqlx::query_as::<_, CallRecord>(
            r#"
            UPDATE match_calls
            SET duration_seconds = $3
            WHERE match_id = $1 AND room_id = $2
            RETURNING id, match_id, room_id, started_at, duration_seconds
            "#
        )
        .bind(match_id)
        .bind(room_id)
        .bind(duration_seconds)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_call_history(&self, match_ids: &[Uuid]) -> Result<Vec<CallRecord>, sqlx::Error> {
        if match_ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, CallRecord>(
            r#"
            SELECT id, match_id, room_id, started_at, duration_seconds
            FROM match_calls
            WHERE match_id = ANY($1)
            ORDER BY started_at
            "#
        )
        .bind(match_ids)
        .fetch_all(&self.pool)
        .await
    }
}
