// db/memory.rs
//
// In-memory stand-in for `DBClient` used by the unit and router tests.
// Notification keys are deduplicated the same way the primary key does it,
// and the unique constraints on `users.email` and pending matches are
// reported as the same database errors Postgres returns.
use std::{borrow::Cow, error::Error as StdError, fmt, sync::Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::error::{DatabaseError, ErrorKind};
use uuid::Uuid;

use super::{
    db::HealthExt, matchdb::MatchExt, notificationdb::NotificationExt, reviewdb::ReviewExt,
    skilldb::SkillExt, userdb::UserExt,
};
use crate::models::{
    matchmodel::{CallRecord, Match, MatchStatus},
    notificationmodel::Notification,
    reviewmodel::Review,
    skillmodel::{normalize_skill_name, Skill},
    usermodel::{User, UserProfile},
};

#[derive(Default)]
struct MemoryState {
    users: Vec<User>,
    skills: Vec<Skill>,
    matches: Vec<Match>,
    calls: Vec<CallRecord>,
    reviews: Vec<Review>,
    notifications: Vec<Notification>,
    fail_notification_inserts: bool,
    skip_pending_lookup: bool,
}

/// Unique constraint failure as raised by Postgres (SQLSTATE 23505).
#[derive(Debug)]
struct UniqueViolation {
    constraint: &'static str,
    message: String,
}

impl UniqueViolation {
    fn error(constraint: &'static str) -> sqlx::Error {
        sqlx::Error::Database(Box::new(UniqueViolation {
            constraint,
            message: format!(
                "duplicate key value violates unique constraint \"{}\"",
                constraint
            ),
        }))
    }
}

impl fmt::Display for UniqueViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl StdError for UniqueViolation {}

impl DatabaseError for UniqueViolation {
    fn message(&self) -> &str {
        &self.message
    }

    fn code(&self) -> Option<Cow<'_, str>> {
        Some(Cow::Borrowed("23505"))
    }

    fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
        self
    }

    fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
        self
    }

    fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
        self
    }

    fn constraint(&self) -> Option<&str> {
        Some(self.constraint)
    }

    fn kind(&self) -> ErrorKind {
        ErrorKind::UniqueViolation
    }
}

/// Mean of the given ratings, 0 when there are none.
fn average_rating(ratings: &[i16]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let total: i64 = ratings.iter().map(|r| *r as i64).sum();
    total as f64 / ratings.len() as f64
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(
        &self,
        uid: &str,
        name: &str,
        skills_offered: &[&str],
        device_tokens: &[&str],
    ) {
        let now = Utc::now();
        self.state.lock().unwrap().users.push(User {
            firebase_uid: uid.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", uid),
            profile_picture: None,
            skills_offered: skills_offered.iter().map(|s| s.to_string()).collect(),
            skills_wanted: vec![],
            rating: 0.0,
            reviews: vec![],
            device_tokens: device_tokens.iter().map(|s| s.to_string()).collect(),
            location: None,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn insert_skill(&self, name: &str, category: &str) {
        let now = Utc::now();
        self.state.lock().unwrap().skills.push(Skill {
            id: Uuid::new_v4(),
            name: name.to_string(),
            category: category.to_string(),
            description: None,
            created_at: now,
            updated_at: now,
        });
    }

    pub fn insert_match(
        &self,
        user_a: &str,
        user_b: &str,
        skill: &str,
        status: MatchStatus,
    ) -> Uuid {
        let now = Utc::now();
        let id = Uuid::new_v4();
        self.state.lock().unwrap().matches.push(Match {
            id,
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            skill_exchanged: skill.to_string(),
            status,
            call_history: vec![],
            created_at: now,
            updated_at: now,
        });
        id
    }

    /// Every later `save_notification` fails as if the pool were exhausted.
    pub fn fail_notification_inserts(&self) {
        self.state.lock().unwrap().fail_notification_inserts = true;
    }

    /// `find_pending_match` reports nothing, so only the unique constraint
    /// in `save_match` can catch a duplicate, as with two concurrent requests.
    pub fn skip_pending_lookup(&self) {
        self.state.lock().unwrap().skip_pending_lookup = true;
    }

    pub fn match_count(&self) -> usize {
        self.state.lock().unwrap().matches.len()
    }

    pub fn notification_count(&self) -> usize {
        self.state.lock().unwrap().notifications.len()
    }

    pub fn device_tokens(&self, uid: &str) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.firebase_uid == uid)
            .map(|u| u.device_tokens.clone())
            .unwrap_or_default()
    }

    pub fn rating_of(&self, uid: &str) -> Option<f64> {
        self.state
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.firebase_uid == uid)
            .map(|u| u.rating)
    }
}

fn with_reviews(mut user: User, reviews: &[Review]) -> User {
    user.reviews = reviews
        .iter()
        .filter(|r| r.reviewee == user.firebase_uid)
        .map(|r| r.id)
        .collect();
    user
}

fn same_pair(m: &Match, first: &str, second: &str) -> bool {
    (m.user_a == first && m.user_b == second) || (m.user_a == second && m.user_b == first)
}

#[async_trait]
impl UserExt for MemoryStore {
    async fn get_user(&self, firebase_uid: &str) -> Result<Option<User>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .users
            .iter()
            .find(|u| u.firebase_uid == firebase_uid)
            .cloned()
            .map(|u| with_reviews(u, &state.reviews)))
    }

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error> {
        let state = self.state.lock().unwrap();
        let skip = (page.max(1) as usize - 1) * limit;
        Ok(state
            .users
            .iter()
            .skip(skip)
            .take(limit)
            .cloned()
            .map(|u| with_reviews(u, &state.reviews))
            .collect())
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        Ok(self.state.lock().unwrap().users.len() as i64)
    }

    async fn get_user_ids(&self) -> Result<Vec<String>, sqlx::Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .users
            .iter()
            .map(|u| u.firebase_uid.clone())
            .collect())
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<User, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let email_taken = state.users.iter().any(|u| {
            u.firebase_uid != profile.firebase_uid && u.email == profile.email
        });
        if email_taken {
            return Err(UniqueViolation::error("users_email_key"));
        }

        let now = Utc::now();
        let user = match state.users.iter_mut().find(|u| u.firebase_uid == profile.firebase_uid) {
            Some(existing) => {
                existing.name = profile.name;
                existing.email = profile.email;
                existing.skills_offered = profile.skills_offered;
                existing.skills_wanted = profile.skills_wanted;
                if profile.profile_picture.is_some() {
                    existing.profile_picture = profile.profile_picture;
                }
                if profile.location.is_some() {
                    existing.location = profile.location;
                }
                existing.updated_at = now;
                existing.clone()
            }
            None => {
                let user = User {
                    firebase_uid: profile.firebase_uid,
                    name: profile.name,
                    email: profile.email,
                    profile_picture: profile.profile_picture,
                    skills_offered: profile.skills_offered,
                    skills_wanted: profile.skills_wanted,
                    rating: 0.0,
                    reviews: vec![],
                    device_tokens: vec![],
                    location: profile.location,
                    created_at: now,
                    updated_at: now,
                };
                state.users.push(user.clone());
                user
            }
        };

        Ok(with_reviews(user, &state.reviews))
    }

    async fn add_device_token(
        &self,
        firebase_uid: &str,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let Some(user) = state.users.iter_mut().find(|u| u.firebase_uid == firebase_uid) else {
            return Ok(None);
        };
        if !user.device_tokens.iter().any(|t| t == token) {
            user.device_tokens.push(token.to_string());
        }
        let user = user.clone();
        Ok(Some(with_reviews(user, &state.reviews)))
    }

    async fn remove_device_tokens(
        &self,
        firebase_uid: &str,
        tokens: &[String],
    ) -> Result<(), sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if let Some(user) = state.users.iter_mut().find(|u| u.firebase_uid == firebase_uid) {
            user.device_tokens.retain(|t| !tokens.contains(t));
        }
        Ok(())
    }

    async fn update_rating(&self, firebase_uid: &str) -> Result<f64, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        let ratings: Vec<i16> = state
            .reviews
            .iter()
            .filter(|r| r.reviewee == firebase_uid)
            .map(|r| r.rating)
            .collect();
        let rating = average_rating(&ratings);

        let user = state
            .users
            .iter_mut()
            .find(|u| u.firebase_uid == firebase_uid)
            .ok_or(sqlx::Error::RowNotFound)?;
        user.rating = rating;
        Ok(rating)
    }
}

#[async_trait]
impl MatchExt for MemoryStore {
    async fn get_match(&self, match_id: Uuid) -> Result<Option<Match>, sqlx::Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .matches
            .iter()
            .find(|m| m.id == match_id)
            .cloned())
    }

    async fn find_pending_match(
        &self,
        first_uid: &str,
        second_uid: &str,
        skill_name: &str,
    ) -> Result<Option<Match>, sqlx::Error> {
        let skill = normalize_skill_name(skill_name);
        let state = self.state.lock().unwrap();
        if state.skip_pending_lookup {
            return Ok(None);
        }
        Ok(state
            .matches
            .iter()
            .find(|m| {
                m.status == MatchStatus::Pending
                    && same_pair(m, first_uid, second_uid)
                    && normalize_skill_name(&m.skill_exchanged) == skill
            })
            .cloned())
    }

    async fn save_match(
        &self,
        user_a: &str,
        user_b: &str,
        skill_exchanged: &str,
    ) -> Result<Match, sqlx::Error> {
        if user_a == user_b {
            return Err(sqlx::Error::Protocol(
                "violates check constraint \"matches_distinct_participants\"".into(),
            ));
        }

        let mut state = self.state.lock().unwrap();
        let skill = normalize_skill_name(skill_exchanged);
        let duplicate = state.matches.iter().any(|m| {
            m.status == MatchStatus::Pending
                && same_pair(m, user_a, user_b)
                && normalize_skill_name(&m.skill_exchanged) == skill
        });
        if duplicate {
            return Err(UniqueViolation::error("matches_pending_unique_idx"));
        }

        let now = Utc::now();
        let created = Match {
            id: Uuid::new_v4(),
            user_a: user_a.to_string(),
            user_b: user_b.to_string(),
            skill_exchanged: skill_exchanged.trim().to_string(),
            status: MatchStatus::Pending,
            call_history: vec![],
            created_at: now,
            updated_at: now,
        };
        state.matches.push(created.clone());
        Ok(created)
    }

    async fn update_match_status(
        &self,
        match_id: Uuid,
        from: MatchStatus,
        to: MatchStatus,
    ) -> Result<Option<Match>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .matches
            .iter_mut()
            .find(|m| m.id == match_id && m.status == from)
            .map(|m| {
                m.status = to;
                m.updated_at = Utc::now();
                m.clone()
            }))
    }

    async fn get_matches_for_user(&self, firebase_uid: &str) -> Result<Vec<Match>, sqlx::Error> {
        let mut matches: Vec<Match> = self
            .state
            .lock()
            .unwrap()
            .matches
            .iter()
            .filter(|m| m.is_participant(firebase_uid))
            .cloned()
            .collect();
        matches.reverse();
        Ok(matches)
    }

    async fn add_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        started_at: DateTime<Utc>,
    ) -> Result<CallRecord, sqlx::Error> {
        let record = CallRecord {
            id: Uuid::new_v4(),
            match_id,
            room_id: room_id.to_string(),
            started_at,
            duration_seconds: None,
        };
        self.state.lock().unwrap().calls.push(record.clone());
        Ok(record)
    }

    async fn end_call_record(
        &self,
        match_id: Uuid,
        room_id: &str,
        duration_seconds: i32,
    ) -> Result<Option<CallRecord>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .calls
            .iter_mut()
            .find(|c| c.match_id == match_id && c.room_id == room_id)
            .map(|c| {
                c.duration_seconds = Some(duration_seconds);
                c.clone()
            }))
    }

    async fn get_call_history(&self, match_ids: &[Uuid]) -> Result<Vec<CallRecord>, sqlx::Error> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| match_ids.contains(&c.match_id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ReviewExt for MemoryStore {
    async fn save_review(
        &self,
        reviewer: &str,
        reviewee: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        let review = Review {
            id: Uuid::new_v4(),
            reviewer: reviewer.to_string(),
            reviewee: reviewee.to_string(),
            rating,
            comment: comment.map(str::to_string),
            created_at: Utc::now(),
        };
        self.state.lock().unwrap().reviews.push(review.clone());
        Ok(review)
    }

    async fn get_reviews_for_user(&self, reviewee: &str) -> Result<Vec<Review>, sqlx::Error> {
        let mut reviews: Vec<Review> = self
            .state
            .lock()
            .unwrap()
            .reviews
            .iter()
            .filter(|r| r.reviewee == reviewee)
            .cloned()
            .collect();
        reviews.reverse();
        Ok(reviews)
    }
}

#[async_trait]
impl NotificationExt for MemoryStore {
    async fn save_notification(
        &self,
        message_id: &str,
        user_id: &str,
        title: &str,
        body: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        if state.fail_notification_inserts {
            return Err(sqlx::Error::PoolTimedOut);
        }
        if state.notifications.iter().any(|n| n.message_id == message_id) {
            return Ok(None);
        }
        let notification = Notification {
            message_id: message_id.to_string(),
            user_id: user_id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            read: false,
            created_at: Utc::now(),
        };
        state.notifications.push(notification.clone());
        Ok(Some(notification))
    }

    async fn get_user_notifications(
        &self,
        user_id: &str,
    ) -> Result<Vec<Notification>, sqlx::Error> {
        let mut notifications: Vec<Notification> = self
            .state
            .lock()
            .unwrap()
            .notifications
            .iter()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.reverse();
        Ok(notifications)
    }

    async fn mark_notification_read(
        &self,
        message_id: &str,
        user_id: &str,
    ) -> Result<Option<Notification>, sqlx::Error> {
        let mut state = self.state.lock().unwrap();
        Ok(state
            .notifications
            .iter_mut()
            .find(|n| n.message_id == message_id && n.user_id == user_id)
            .map(|n| {
                n.read = true;
                n.clone()
            }))
    }
}

#[async_trait]
impl SkillExt for MemoryStore {
    async fn get_skills(&self) -> Result<Vec<Skill>, sqlx::Error> {
        let mut skills = self.state.lock().unwrap().skills.clone();
        skills.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(skills)
    }
}

#[async_trait]
impl HealthExt for MemoryStore {
    async fn list_tables(&self) -> Result<Vec<String>, sqlx::Error> {
        Ok(["match_calls", "matches", "notifications", "reviews", "skills", "users"]
            .iter()
            .map(|t| t.to_string())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_rating() {
        assert_eq!(average_rating(&[]), 0.0);
        assert_eq!(average_rating(&[5]), 5.0);
        assert_eq!(average_rating(&[4, 5]), 4.5);
        assert_eq!(average_rating(&[1, 2, 3, 4, 5]), 3.0);
    }

    #[test]
    fn unique_violation_is_recognised_by_sqlx() {
        match UniqueViolation::error("users_email_key") {
            sqlx::Error::Database(db_err) => {
                assert!(db_err.is_unique_violation());
                assert_eq!(db_err.constraint(), Some("users_email_key"));
                assert_eq!(db_err.code().as_deref(), Some("23505"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
