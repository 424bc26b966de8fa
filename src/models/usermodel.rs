use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::skillmodel::normalize_skill_name;

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "firebaseUID")]
    pub firebase_uid: String,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub rating: f64,

    // derived from reviews.reviewee, oldest first
    pub reviews: Vec<Uuid>,

    pub device_tokens: Vec<String>,
    pub location: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Case- and whitespace-insensitive membership test against `skills_offered`.
    pub fn offers_skill(&self, skill_name: &str) -> bool {
        let wanted = normalize_skill_name(skill_name);
        if wanted.is_empty() {
            return false;
        }
        self.skills_offered
            .iter()
            .any(|offered| normalize_skill_name(offered) == wanted)
    }

    pub fn has_device_tokens(&self) -> bool {
        !self.device_tokens.is_empty()
    }
}

/// Profile fields accepted by the upsert. Everything not listed here is owned
/// by other flows (rating job, device-token registration).
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub firebase_uid: String,
    pub name: String,
    pub email: String,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub profile_picture: Option<String>,
    pub location: Option<String>,
}
