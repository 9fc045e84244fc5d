use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;
use tracing::info;

use super::MatchBackend;
use crate::database::{match_repo, profile_repo, project_repo, swipe_repo};
use crate::error::BackendError;
use crate::models::{Project, Role, SwipeRecord, TargetKind, UserProfile};
use crate::services::geo::{bounding_box, haversine_km, sort_by_distance};

/// Local store: bounding-box prefilter in SQL, exact radius in Rust.
#[derive(Clone)]
pub struct SqliteBackend {
    pool: SqlitePool,
}

impl SqliteBackend {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MatchBackend for SqliteBackend {
    fn with_access_token(self: Arc<Self>, _access_token: &str) -> Arc<dyn MatchBackend> {
        self
    }

    async fn search_projects_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Project>, BackendError> {
        let bbox = bounding_box(center_lat, center_lon, radius_km);
        let rows = project_repo::load_projects_in_bbox(&self.pool, bbox).await?;

        let mut projects = Vec::new();
        for row in rows {
            let mut project = Project::from(row);
            let (Some(lat), Some(lon)) = (project.latitude, project.longitude) else {
                continue;
            };
            let dist = haversine_km(center_lat, center_lon, lat, lon);
            if dist > radius_km {
                continue;
            }
            project.distance_km = Some(dist);
            projects.push(project);
        }

        sort_by_distance(&mut projects, |p| p.distance_km);
        Ok(projects)
    }

    async fn search_profiles_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        role: Option<Role>,
    ) -> Result<Vec<UserProfile>, BackendError> {
        let bbox = bounding_box(center_lat, center_lon, radius_km);
        let rows =
            profile_repo::load_profiles_in_bbox(&self.pool, bbox, role.map(Role::as_str)).await?;

        let mut profiles = Vec::new();
        for row in rows {
            let mut profile = UserProfile::from(row);
            let (Some(lat), Some(lon)) = (profile.latitude, profile.longitude) else {
                continue;
            };
            let dist = haversine_km(center_lat, center_lon, lat, lon);
            if dist > radius_km {
                continue;
            }
            profile.distance_km = Some(dist);
            profiles.push(profile);
        }

        sort_by_distance(&mut profiles, |p| p.distance_km);
        Ok(profiles)
    }

    async fn resolve_actor_profile_id(
        &self,
        auth_user_id: &str,
    ) -> Result<Option<String>, BackendError> {
        Ok(profile_repo::load_profile_id_for_user(&self.pool, auth_user_id).await?)
    }

    async fn insert_pending_match(
        &self,
        actor_profile_id: &str,
        target_id: &str,
        target_kind: TargetKind,
    ) -> Result<(), BackendError> {
        let id = uuid::Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();
        match_repo::insert_pending_match(
            &self.pool,
            match_repo::NewPendingMatch {
                id: &id,
                actor_profile_id,
                target_id,
                target_kind,
                created_at: &created_at,
            },
        )
        .await?;

        if match_repo::reconcile_match(&self.pool, actor_profile_id, target_id, target_kind).await?
        {
            info!(actor = %actor_profile_id, target = %target_id, "💞 mutual interest, match made");
        }
        Ok(())
    }

    async fn insert_swipe(&self, record: &SwipeRecord) -> Result<(), BackendError> {
        Ok(swipe_repo::insert_swipe(&self.pool, record).await?)
    }

    async fn profile_display_name(&self, user_id: &str) -> Result<Option<String>, BackendError> {
        Ok(profile_repo::load_display_name(&self.pool, user_id).await?)
    }
}
