pub mod background_jobs;
pub mod error;
pub mod identity;
pub mod match_service;
pub mod notification_service;
pub mod push_provider;
pub mod review_service;
pub mod skill_swap_service;
