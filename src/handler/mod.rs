pub mod matches;
pub mod notifications;
pub mod reviews;
pub mod skill_swap;
pub mod skills;
pub mod users;
