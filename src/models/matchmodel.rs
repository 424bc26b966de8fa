use std::{fmt, str::FromStr};

use chrono::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Completed,
}

impl MatchStatus {
    pub fn to_str(&self) -> &str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Completed => "completed",
        }
    }

    /// The lifecycle is linear: pending -> accepted -> completed.
    pub fn next(&self) -> Option<MatchStatus> {
        match self {
            MatchStatus::Pending => Some(MatchStatus::Accepted),
            MatchStatus::Accepted => Some(MatchStatus::Completed),
            MatchStatus::Completed => None,
        }
    }

    pub fn can_transition_to(&self, target: MatchStatus) -> bool {
        self.next() == Some(target)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for MatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(MatchStatus::Pending),
            "accepted" => Ok(MatchStatus::Accepted),
            "completed" => Ok(MatchStatus::Completed),
            other => Err(format!("Invalid status value: {}", other)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: Uuid,
    pub user_a: String,
    pub user_b: String,
    pub skill_exchanged: String,
    pub status: MatchStatus,

    #[sqlx(skip)]
    pub call_history: Vec<CallRecord>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Match {
    pub fn is_participant(&self, uid: &str) -> bool {
        self.user_a == uid || self.user_b == uid
    }

    /// The participant on the other side of `uid`. Callers check
    /// `is_participant` first.
    pub fn counterpart(&self, uid: &str) -> &str {
        if self.user_a == uid {
            &self.user_b
        } else {
            &self.user_a
        }
    }
}

#[derive(Debug, Deserialize, Serialize, sqlx::FromRow, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CallRecord {
    pub id: Uuid,
    pub match_id: Uuid,
    pub room_id: String,
    pub started_at: DateTime<Utc>,
    pub duration_seconds: Option<i32>,
}

/// Room identifier handed to the video SDK.
pub fn room_id_for(match_id: Uuid, started_at: DateTime<Utc>) -> String {
    format!("match-{}-{}", match_id, started_at.timestamp_millis())
}
