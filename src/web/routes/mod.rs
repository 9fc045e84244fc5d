pub mod appointments;
pub mod auth;
pub mod calls;
pub mod favorites;
pub mod location;
pub mod matches;
pub mod realtime;
pub mod subscription;
pub mod swipe;
