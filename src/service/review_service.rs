// service/review_service.rs
use std::sync::Arc;

use crate::{
    db::Store,
    models::reviewmodel::Review,
    service::{error::ServiceError, notification_service::NotificationService},
};

#[derive(Clone)]
pub struct ReviewService {
    db_client: Arc<dyn Store>,
    notification_service: Arc<NotificationService>,
}

impl ReviewService {
    pub fn new(db_client: Arc<dyn Store>, notification_service: Arc<NotificationService>) -> Self {
        Self {
            db_client,
            notification_service,
        }
    }

    /// Stores a review and tells the reviewee. The aggregate rating is left
    /// to the rating job.
    pub async fn add_review(
        &self,
        reviewer_uid: &str,
        reviewee_uid: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, ServiceError> {
        if reviewer_uid == reviewee_uid {
            return Err(ServiceError::SelfReview);
        }

        if !(1..=5).contains(&rating) {
            return Err(ServiceError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        self.db_client
            .get_user(reviewee_uid)
            .await?
            .ok_or(ServiceError::UserNotFound("User"))?;

        let reviewer = self
            .db_client
            .get_user(reviewer_uid)
            .await?
            .ok_or(ServiceError::UserNotFound("Reviewer profile"))?;

        let comment = comment.map(str::trim).filter(|c| !c.is_empty());
        let review = self
            .db_client
            .save_review(reviewer_uid, reviewee_uid, rating, comment)
            .await?;

        tracing::info!("review {} left for {} by {}", review.id, reviewee_uid, reviewer_uid);

        self.notification_service.notify_in_background(
            reviewee_uid.to_string(),
            "New Review".to_string(),
            format!("{} left a review for you.", reviewer.name),
        );

        Ok(review)
    }

    pub async fn reviews_for_user(&self, uid: &str) -> Result<Vec<Review>, ServiceError> {
        Ok(self.db_client.get_reviews_for_user(uid).await?)
    }
}
