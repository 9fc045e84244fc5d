//! Narrow contract over the remote data service.
//!
//! Everything the swipe and call flows need from persistence goes through
//! [`MatchBackend`], one method per logical operation, so the storage/auth
//! provider can be swapped without touching the services.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::BackendError;
use crate::models::{Project, Role, SwipeRecord, TargetKind, UserProfile};

pub mod rest;
pub mod sqlite;

pub use rest::RestBackend;
pub use sqlite::SqliteBackend;

#[async_trait]
pub trait MatchBackend: Send + Sync {
    async fn search_projects_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Project>, BackendError>;

    async fn search_profiles_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        role: Option<Role>,
    ) -> Result<Vec<UserProfile>, BackendError>;

    async fn resolve_actor_profile_id(
        &self,
        auth_user_id: &str,
    ) -> Result<Option<String>, BackendError>;

    /// Inserts the actor's half of a match. Reciprocity is the backend's concern.
    async fn insert_pending_match(
        &self,
        actor_profile_id: &str,
        target_id: &str,
        target_kind: TargetKind,
    ) -> Result<(), BackendError>;

    async fn insert_swipe(&self, record: &SwipeRecord) -> Result<(), BackendError>;

    async fn profile_display_name(&self, user_id: &str) -> Result<Option<String>, BackendError>;

    /// Handle that acts with the signed-in user's access token. Backends
    /// without a remote auth check return themselves.
    fn with_access_token(self: Arc<Self>, access_token: &str) -> Arc<dyn MatchBackend>;
}
