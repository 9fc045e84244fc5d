pub mod appointment_repo;
pub mod call_history_repo;
pub mod favorite_repo;
pub mod location_filter_repo;
pub mod match_repo;
pub mod message_repo;
pub mod profile_repo;
pub mod project_repo;
pub mod quota_repo;
pub mod schema;
pub mod subscription_repo;
pub mod swipe_repo;
