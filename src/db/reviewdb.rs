// db/reviewdb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::models::reviewmodel::Review;

#[async_trait]
pub trait ReviewExt {
    async fn save_review(
        &self,
        reviewer: &str,
        reviewee: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error>;

    async fn get_reviews_for_user(&self, reviewee: &str) -> Result<Vec<Review>, sqlx::Error>;
}

#[async_trait]
impl ReviewExt for DBClient {
    async fn save_review(
        &self,
        reviewer: &str,
        reviewee: &str,
        rating: i16,
        comment: Option<&str>,
    ) -> Result<Review, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (reviewer, reviewee, rating, comment)
            VALUES ($1, $2, $3, $4)
            RETURNING id, reviewer, reviewee, rating, comment, created_at
            "#
        )
        .bind(reviewer)
        .bind(reviewee)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await
    }

    async fn get_reviews_for_user(&self, reviewee: &str) -> Result<Vec<Review>, sqlx::Error> {
        sqlx::query_as::<_, Review>(
            r#"
            SELECT id, reviewer, reviewee, rating, comment, created_at
            FROM reviews
            WHERE reviewee = $1
            ORDER BY created_at DESC
            "#
        )
        .bind(reviewee)
        .fetch_all(&self.pool)
        .await
    }
}
