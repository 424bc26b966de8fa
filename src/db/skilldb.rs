// db/skilldb.rs
use async_trait::async_trait;

use super::db::DBClient;
use crate::models::skillmodel::Skill;

#[async_trait]
pub trait SkillExt {
    async fn get_skills(&self) -> Result<Vec<Skill>, sqlx::Error>;
}

#[async_trait]
impl SkillExt for DBClient {
    async fn get_skills(&self) -> Result<Vec<Skill>, sqlx::Error> {
        sqlx::query_as::<_, Skill>(
            r#"
            SELECT id, name, category, description, created_at, updated_at
            FROM skills
            ORDER BY name
            "#
        )
        .fetch_all(&self.pool)
        .await
    }
}
