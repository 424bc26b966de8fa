// db/userdb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::models::usermodel::{User, UserProfile};

const USER_SELECT: &str = r#"
    SELECT
        u.firebase_uid, u.name, u.email, u.profile_picture,
        u.skills_offered, u.skills_wanted, u.rating,
        ARRAY(
            SELECT r.id FROM reviews r
            WHERE r.reviewee = u.firebase_uid
            ORDER BY r.created_at
        ) AS reviews,
        u.device_tokens, u.location,
        u.created_at, u.updated_at
    FROM users u
"#;

#[async_trait]
pub trait UserExt {
    async fn get_user(&self, firebase_uid: &str) -> Result<Option<User>, sqlx::Error>;

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error>;

    async fn get_user_count(&self) -> Result<i64, sqlx::Error>;

    async fn get_user_ids(&self) -> Result<Vec<String>, sqlx::Error>;

    /// Creates the profile on first save, otherwise overwrites the profile
    /// fields. Rating, reviews and device tokens are left untouched.
    async fn upsert_user(&self, profile: UserProfile) -> Result<User, sqlx::Error>;

    /// Adds a device token if not already present. `None` when the user has
    /// no profile yet.
    async fn add_device_token(
        &self,
        firebase_uid: &str,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error>;

    async fn remove_device_tokens(
        &self,
        firebase_uid: &str,
        tokens: &[String],
    ) -> Result<(), sqlx::Error>;

    /// Recomputes the aggregate rating from the user's reviews and returns it.
    async fn update_rating(&self, firebase_uid: &str) -> Result<f64, sqlx::Error>;
}

#[async_trait]
impl UserExt for DBClient {
    async fn get_user(&self, firebase_uid: &str) -> Result<Option<User>, sqlx::Error> {
        let sql = format!("{} WHERE u.firebase_uid = $1", USER_SELECT);

        sqlx::query_as::<_, User>(&sql)
            .bind(firebase_uid)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_users(&self, page: u32, limit: usize) -> Result<Vec<User>, sqlx::Error> {
        let offset = (page.max(1) - 1) as i64 * limit as i64;
        let sql = format!("{} ORDER BY u.created_at DESC LIMIT $1 OFFSET $2", USER_SELECT);

        sqlx::query_as::<_, User>(&sql)
            .bind(limit as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    async fn get_user_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.pool)
            .await
    }

    async fn get_user_ids(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(r#"SELECT firebase_uid FROM users ORDER BY firebase_uid"#)
            .fetch_all(&self.pool)
            .await
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<User, sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users
                (firebase_uid, name, email, skills_offered, skills_wanted,
                 profile_picture, location)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (firebase_uid) DO UPDATE
            SET name = EXCLUDED.name,
                email = EXCLUDED.email,
                skills_offered = EXCLUDED.skills_offered,
                skills_wanted = EXCLUDED.skills_wanted,
                profile_picture = COALESCE(EXCLUDED.profile_picture, users.profile_picture),
                location = COALESCE(EXCLUDED.location, users.location),
                updated_at = NOW()
            "#
        )
        .bind(&profile.firebase_uid)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.skills_offered)
        .bind(&profile.skills_wanted)
        .bind(&profile.profile_picture)
        .bind(&profile.location)
        .execute(&self.pool)
        .await?;

        self.get_user(&profile.firebase_uid)
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    async fn add_device_token(
        &self,
        firebase_uid: &str,
        token: &str,
    ) -> Result<Option<User>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET device_tokens = CASE
                    WHEN $2 = ANY(device_tokens) THEN device_tokens
                    ELSE array_append(device_tokens, $2)
                END,
                updated_at = NOW()
            WHERE firebase_uid = $1
            "#
        )
        .bind(firebase_uid)
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }

        self.get_user(firebase_uid).await
    }

    async fn remove_device_tokens(
        &self,
        firebase_uid: &str,
        tokens: &[String],
    ) -> Result<(), sqlx::Error> {
        if tokens.is_empty() {
            return Ok(());
        }

        sqlx::query(
            r#"
            UPDATE users
            SET device_tokens = ARRAY(
                    SELECT t FROM unnest(device_tokens) AS t
                    WHERE t <> ALL($2)
                ),
                updated_at = NOW()
            WHERE firebase_uid = $1
            "#
        )
        .bind(firebase_uid)
        .bind(tokens)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_rating(&self, firebase_uid: &str) -> Result<f64, sqlx::Error> {
        sqlx::query_scalar::<_, f64>(
            r#"
            UPDATE users
            SET rating = COALESCE(
                    (SELECT AVG(r.rating)::DOUBLE PRECISION FROM reviews r WHERE r.reviewee = $1),
                    0
                ),
                updated_at = NOW()
            WHERE firebase_uid = $1
            RETURNING rating
            "#
        )
        .bind(firebase_uid)
        .fetch_one(&self.pool)
        .await
    }
}
