pub mod db;
pub mod matchdb;
pub mod notificationdb;
pub mod reviewdb;
pub mod skilldb;
pub mod userdb;

#[cfg(test)]
pub mod memory;

use self::{
    db::HealthExt, matchdb::MatchExt, notificationdb::NotificationExt, reviewdb::ReviewExt,
    skilldb::SkillExt, userdb::UserExt,
};

/// Everything the services need from persistence. Implemented by `DBClient`
/// in production and by `MemoryStore` in tests.
pub trait Store:
    UserExt + MatchExt + ReviewExt + NotificationExt + SkillExt + HealthExt + Send + Sync
{
}

impl<T> Store for T where
    T: UserExt + MatchExt + ReviewExt + NotificationExt + SkillExt + HealthExt + Send + Sync
{
}
