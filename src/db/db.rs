// db/db.rs
use async_trait::async_trait;
use sqlx::{Pool, Postgres};

#[derive(Debug, Clone)]
pub struct DBClient {
    pub pool: Pool<Postgres>,
}

impl DBClient {
    pub fn new(pool: Pool<Postgres>) -> Self {
        DBClient { pool }
    }
}

#[async_trait]
pub trait HealthExt {
    /// Round-trips the database and lists the application tables.
    async fn list_tables(&self) -> Result<Vec<String>, sqlx::Error>;
}

#[async_trait]
impl HealthExt for DBClient {
    async fn list_tables(&self) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"
            SELECT table_name::TEXT
            FROM information_schema.tables
            WHERE table_schema = 'public'
            AND table_name NOT LIKE '\_sqlx%'
            ORDER BY table_name
            "#
        )
        .fetch_all(&self.pool)
        .await
    }
}
