pub mod appointment;
pub mod call_history;
pub mod current_user;
pub mod experience;
pub mod favorite;
pub mod location_filter;
pub mod matches;
pub mod message;
pub mod project;
pub mod subscription;
pub mod swipe;
pub mod user_profile;

pub use appointment::AppointmentRow;
pub use call_history::CallHistoryRow;
pub use current_user::CurrentUserRow;
pub use experience::ExperienceLevel;
pub use favorite::FavoriteRow;
pub use location_filter::{City, GeoPoint, LocationFilter, LocationFilterRow};
pub use matches::MatchRow;
pub use message::MessageRow;
pub use project::{Project, ProjectGeoCandidateRow, ProjectRow};
pub use subscription::{Plan, QuotaKind};
pub use swipe::{Candidate, SwipeDirection, SwipeRecord, TargetKind};
pub use user_profile::{ProfileRow, Role, UserProfile};
