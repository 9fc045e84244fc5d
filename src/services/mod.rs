pub mod appointment_service;
pub mod auth_service;
pub mod call_history_service;
pub mod favorite_service;
pub mod geo;
pub mod investor_swipe_service;
pub mod location_filter_service;
pub mod location_service;
pub mod message_service;
pub mod owner_swipe_service;
pub mod project_geo_service;
pub mod quota_service;
pub mod seeker_swipe_service;
pub mod subscription_service;
pub mod swipe_deck;
pub mod swipe_filters;
pub mod swipe_service;
