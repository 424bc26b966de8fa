use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::reviewmodel::Review;

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewDto {
    #[validate(length(min = 1, message = "User id is required"))]
    pub user_id: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: i16,

    #[validate(length(max = 500, message = "Comment must be at most 500 characters"))]
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewData {
    pub review: Review,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReviewListResponseDto {
    pub status: String,
    pub results: usize,
    pub reviews: Vec<Review>,
}
