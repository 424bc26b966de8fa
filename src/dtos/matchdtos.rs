use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::matchmodel::{CallRecord, Match, MatchStatus};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct UpdateMatchStatusDto {
    #[validate(custom = "validate_match_status")]
    pub status: String,
}

impl UpdateMatchStatusDto {
    /// Only meaningful after `validate` succeeded.
    pub fn parsed_status(&self) -> Result<MatchStatus, String> {
        self.status.parse()
    }
}

fn validate_match_status(status: &str) -> Result<(), ValidationError> {
    match status.parse::<MatchStatus>() {
        Ok(_) => Ok(()),
        Err(_) => {
            let mut err = ValidationError::new("invalid_status");
            err.message = Some("Status must be one of pending, accepted, completed".into());
            Err(err)
        }
    }
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndCallDto {
    #[validate(length(min = 1, message = "Room id is required"))]
    pub room_id: String,

    #[validate(range(min = 0, message = "Duration must not be negative"))]
    pub duration_seconds: i32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchData {
    #[serde(rename = "match")]
    pub swap: Match,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MatchListResponseDto {
    pub status: String,
    pub results: usize,
    pub matches: Vec<Match>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallStartedDto {
    pub room_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CallData {
    pub call: CallRecord,
}
