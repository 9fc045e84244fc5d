use async_trait::async_trait;
use std::sync::Arc;

use crate::backend::MatchBackend;
use crate::error::BackendError;
use crate::models::{Candidate, Role, SwipeDirection, TargetKind, UserProfile};
use crate::services::swipe_filters::{
    experience_matches, matches_skills, matches_text, SwipeFilters,
};
use crate::services::swipe_service::{fetch_fail_soft, record_swipe, SwipeLogic};

pub struct OwnerSwipeLogic {
    backend: Arc<dyn MatchBackend>,
}

impl OwnerSwipeLogic {
    pub fn new(backend: Arc<dyn MatchBackend>) -> Self {
        Self { backend }
    }

    pub async fn fetch_seekers(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Vec<UserProfile> {
        fetch_fail_soft("seekers", center_lat, center_lon, radius_km, || {
            self.backend.search_profiles_by_location(
                center_lat,
                center_lon,
                radius_km,
                Some(Role::Seeker),
            )
        })
        .await
    }

    /// `duration` matches the seeker's availability.
    pub fn filter_seekers(
        &self,
        profiles: Vec<UserProfile>,
        filters: &SwipeFilters,
    ) -> Vec<UserProfile> {
        profiles
            .into_iter()
            .filter(|p| matches_text(filters.sector(), p.sector.as_deref()))
            .filter(|p| matches_text(filters.duration(), p.availability.as_deref()))
            .filter(|p| experience_matches(filters.stage(), p.experience_level))
            .filter(|p| matches_skills(&filters.skills, &p.skills))
            .collect()
    }

    pub async fn handle_seeker_swipe(
        &self,
        auth_user_id: &str,
        profile_id: &str,
        direction: SwipeDirection,
    ) -> Result<(), BackendError> {
        record_swipe(
            self.backend.as_ref(),
            auth_user_id,
            profile_id,
            TargetKind::Profile,
            direction,
        )
        .await
    }
}

#[async_trait]
impl SwipeLogic for OwnerSwipeLogic {
    fn role(&self) -> Role {
        Role::Owner
    }

    async fn fetch(&self, center_lat: f64, center_lon: f64, radius_km: f64) -> Vec<Candidate> {
        self.fetch_seekers(center_lat, center_lon, radius_km)
            .await
            .into_iter()
            .map(Candidate::Profile)
            .collect()
    }

    fn filter(&self, items: Vec<Candidate>, filters: &SwipeFilters) -> Vec<Candidate> {
        let profiles = items
            .into_iter()
            .filter_map(|c| match c {
                Candidate::Profile(p) => Some(p),
                Candidate::Project(_) => None,
            })
            .collect();
        self.filter_seekers(profiles, filters)
            .into_iter()
            .map(Candidate::Profile)
            .collect()
    }

    async fn handle_swipe(
        &self,
        auth_user_id: &str,
        item_id: &str,
        direction: SwipeDirection,
    ) -> Result<(), BackendError> {
        self.handle_seeker_swipe(auth_user_id, item_id, direction)
            .await
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::{ExperienceLevel, Role, UserProfile};

    pub fn seeker(id: &str, level: ExperienceLevel) -> UserProfile {
        UserProfile {
            id: id.to_string(),
            user_id: format!("u-{}", id),
            full_name: Some(format!("Seeker {}", id)),
            role: Role::Seeker,
            sector: Some("fintech".to_string()),
            skills: vec!["TypeScript".to_string(), "Rust".to_string()],
            experience_level: level,
            availability: Some("part-time".to_string()),
            city: Some("Paris".to_string()),
            latitude: Some(48.8566),
            longitude: Some(2.3522),
            is_verified: false,
            bio: None,
            distance_km: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::seeker;
    use super::*;
    use crate::models::ExperienceLevel;
    use crate::services::swipe_service::test_support::{Call, RecordingBackend};

    #[tokio::test]
    async fn fetch_asks_for_seekers_only() {
        let backend = Arc::new(RecordingBackend {
            profiles: vec![seeker("a", ExperienceLevel::Junior)],
            ..Default::default()
        });
        let logic = OwnerSwipeLogic::new(backend.clone());
        assert_eq!(logic.fetch_seekers(48.8566, 2.3522, 25.0).await.len(), 1);
        assert_eq!(
            backend.calls(),
            vec![Call::SearchProfiles(48.8566, 2.3522, 25.0, Some(Role::Seeker))]
        );
    }

    #[test]
    fn experience_and_availability_filters_combine() {
        let logic = OwnerSwipeLogic::new(Arc::new(RecordingBackend::default()));
        let mut full_time = seeker("ft", ExperienceLevel::Senior);
        full_time.availability = Some("full-time".to_string());
        let items = vec![
            seeker("jr", ExperienceLevel::Junior),
            seeker("sr", ExperienceLevel::Senior),
            seeker("open", ExperienceLevel::Any),
            full_time,
        ];
        let filters = SwipeFilters {
            duration: Some("part-time".to_string()),
            stage: Some("senior".to_string()),
            ..Default::default()
        };
        let ids: Vec<_> = logic
            .filter_seekers(items, &filters)
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec!["sr", "open"]);
    }

    #[tokio::test]
    async fn swipe_targets_profiles() {
        let backend = Arc::new(RecordingBackend::with_actor("owner-1"));
        let logic = OwnerSwipeLogic::new(backend.clone());
        logic
            .handle_seeker_swipe("u-owner", "seeker-7", SwipeDirection::Left)
            .await
            .unwrap();
        assert_eq!(
            backend.calls().last(),
            Some(&Call::Swipe(
                "owner-1".to_string(),
                "seeker-7".to_string(),
                TargetKind::Profile,
                SwipeDirection::Left
            ))
        );
    }
}
