use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::MatchBackend;
use crate::error::BackendError;
use crate::models::{Candidate, Project, Role, SwipeDirection, TargetKind};
use crate::services::swipe_filters::{matches_skills, matches_text, stage_matches, SwipeFilters};
use crate::services::swipe_service::{fetch_fail_soft, record_swipe, SwipeLogic};

/// Investors swipe through projects; `stage` is a funding bucket.
pub struct InvestorSwipeLogic {
    backend: Arc<dyn MatchBackend>,
}

impl InvestorSwipeLogic {
    pub fn new(backend: Arc<dyn MatchBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch_projects(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Vec<Project> {
        fetch_fail_soft("investable projects", center_lat, center_lon, radius_km, || {
            self.backend
                .search_projects_by_location(center_lat, center_lon, radius_km)
        })
        .await
    }

    pub fn filter_projects(&self, projects: Vec<Project>, filters: &SwipeFilters) -> Vec<Project> {
        projects
            .into_iter()
            .filter(|p| matches_text(filters.sector(), p.category.as_deref()))
            .filter(|p| matches_text(filters.duration(), p.duration.as_deref()))
            .filter(|p| stage_matches(filters.stage(), p.stage.as_deref()))
            .filter(|p| matches_skills(&filters.skills, &p.required_skills))
            .collect()
    }

    pub async fn handle_project_swipe(
        &self,
        auth_user_id: &str,
        project_id: &str,
        direction: SwipeDirection,
    ) -> Result<(), BackendError> {
        record_swipe(
            self.backend.as_ref(),
            auth_user_id,
            project_id,
            TargetKind::Project,
            direction,
        )
        .await
    }
}

#[async_trait]
impl SwipeLogic for InvestorSwipeLogic {
    fn role(&self) -> Role {
        Role::Investor
    }

    async fn fetch(&self, center_lat: f64, center_lon: f64, radius_km: f64) -> Vec<Candidate> {
        self.fetch_projects(center_lat, center_lon, radius_km)
            .await
            .into_iter()
            .map(Candidate::Project)
            .collect()
    }

    fn filter(&self, items: Vec<Candidate>, filters: &SwipeFilters) -> Vec<Candidate> {
        let projects = items
            .into_iter()
            .filter_map(|c| match c {
                Candidate::Project(p) => Some(p),
                Candidate::Profile(_) => None,
            })
            .collect();
        self.filter_projects(projects, filters)
            .into_iter()
            .map(Candidate::Project)
            .collect()
    }

    async fn handle_swipe(
        &self,
        auth_user_id: &str,
        item_id: &str,
        direction: SwipeDirection,
    ) -> Result<(), BackendError> {
        self.handle_project_swipe(auth_user_id, item_id, direction)
            .await
    }
}
