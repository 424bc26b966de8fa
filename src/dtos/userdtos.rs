use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::usermodel::{User, UserProfile};

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertUserDto {
    #[serde(rename = "firebaseUID")]
    #[validate(length(min = 1, message = "Firebase UID is required"))]
    pub firebase_uid: String,

    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[serde(default)]
    pub skills_offered: Vec<String>,
    #[serde(default)]
    pub skills_wanted: Vec<String>,

    #[validate(url(message = "Profile picture must be a valid URL"))]
    pub profile_picture: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,
}

impl UpsertUserDto {
    pub fn into_profile(self) -> UserProfile {
        UserProfile {
            firebase_uid: self.firebase_uid,
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            skills_offered: clean_skills(self.skills_offered),
            skills_wanted: clean_skills(self.skills_wanted),
            profile_picture: self.profile_picture,
            location: self.location,
        }
    }
}

// trims entries and drops blanks and case-insensitive repeats, first spelling wins
fn clean_skills(skills: Vec<String>) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for skill in skills {
        let skill = skill.trim();
        if skill.is_empty() || cleaned.iter().any(|s| s.eq_ignore_ascii_case(skill)) {
            continue;
        }
        cleaned.push(skill.to_string());
    }
    cleaned
}

#[derive(Serialize, Deserialize, Validate)]
pub struct RequestQueryDto {
    #[validate(range(min = 1, max = 100000))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct DeviceTokenDto {
    #[validate(length(min = 1, max = 4096, message = "Device token is required"))]
    pub token: String,
}

/// Profile as shown to clients. Device tokens stay server side.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterUserDto {
    #[serde(rename = "firebaseUID")]
    pub firebase_uid: String,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub skills_offered: Vec<String>,
    pub skills_wanted: Vec<String>,
    pub rating: f64,
    pub reviews: Vec<Uuid>,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FilterUserDto {
    pub fn filter_user(user: &User) -> Self {
        FilterUserDto {
            firebase_uid: user.firebase_uid.to_owned(),
            name: user.name.to_owned(),
            email: user.email.to_owned(),
            profile_picture: user.profile_picture.clone(),
            skills_offered: user.skills_offered.clone(),
            skills_wanted: user.skills_wanted.clone(),
            rating: user.rating,
            reviews: user.reviews.clone(),
            location: user.location.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }

    pub fn filter_users(users: &[User]) -> Vec<FilterUserDto> {
        users.iter().map(FilterUserDto::filter_user).collect()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserData {
    pub user: FilterUserDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponseDto {
    pub status: String,
    pub data: UserData,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserListResponseDto {
    pub status: String,
    pub users: Vec<FilterUserDto>,
    pub total_pages: i64,
    pub current_page: u32,
    pub results: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceTokenResponseDto {
    pub status: String,
    pub message: String,
    pub device_token_count: usize,
}

pub fn total_pages(count: i64, limit: usize) -> i64 {
    let limit = limit.max(1) as i64;
    (count + limit - 1) / limit
}
