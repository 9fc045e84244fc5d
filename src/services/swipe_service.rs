//! Bridge between the swipe deck and the role-specific backend queries.

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use tracing::{info, warn};

use crate::backend::MatchBackend;
use crate::error::BackendError;
use crate::models::{Candidate, GeoPoint, Role, SwipeDirection, SwipeRecord, TargetKind};
use crate::services::swipe_filters::SwipeFilters;
use crate::services::{investor_swipe_service, owner_swipe_service, seeker_swipe_service};

#[async_trait]
pub trait SwipeLogic: Send + Sync {
    fn role(&self) -> Role;

    async fn fetch(&self, center_lat: f64, center_lon: f64, radius_km: f64) -> Vec<Candidate>;

    fn filter(&self, items: Vec<Candidate>, filters: &SwipeFilters) -> Vec<Candidate>;

    async fn handle_swipe(
        &self,
        auth_user_id: &str,
        item_id: &str,
        direction: SwipeDirection,
    ) -> Result<(), BackendError>;
}

pub fn logic_for_role(role: Role, backend: Arc<dyn MatchBackend>) -> Arc<dyn SwipeLogic> {
    match role {
        Role::Owner => Arc::new(owner_swipe_service::OwnerSwipeLogic::new(backend)),
        Role::Seeker => Arc::new(seeker_swipe_service::SeekerSwipeLogic::new(backend)),
        Role::Investor => Arc::new(investor_swipe_service::InvestorSwipeLogic::new(backend)),
    }
}

pub async fn fetch_fail_soft<T, F, Fut>(
    what: &str,
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
    query: F,
) -> Vec<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Vec<T>, BackendError>>,
{
    let center = GeoPoint {
        latitude: center_lat,
        longitude: center_lon,
    };
    if !center.is_valid() || !radius_km.is_finite() || radius_km <= 0.0 {
        warn!(
            center_lat,
            center_lon, radius_km, "📍 Skipping {} fetch: invalid search area", what
        );
        return Vec::new();
    }

    match query().await {
        Ok(items) => items,
        Err(e) => {
            warn!(error = %e, "📍 Fetching {} failed, showing empty deck", what);
            Vec::new()
        }
    }
}

/// Resolves the acting profile, writes the pending-match half on a right
/// swipe, then appends the history record. The two writes are not atomic;
/// a history failure after the match write comes back as
/// `BackendError::HistoryAfterMatch`.
pub async fn record_swipe(
    backend: &dyn MatchBackend,
    auth_user_id: &str,
    target_id: &str,
    target_kind: TargetKind,
    direction: SwipeDirection,
) -> Result<(), BackendError> {
    let result: Result<(), BackendError> = async {
        let actor = backend
            .resolve_actor_profile_id(auth_user_id)
            .await?
            .ok_or(BackendError::ProfileMissing)?;

        let match_written = direction == SwipeDirection::Right;
        if match_written {
            backend
                .insert_pending_match(&actor, target_id, target_kind)
                .await?;
        }

        let record = SwipeRecord::new(&actor, target_id, target_kind, direction);
        match backend.insert_swipe(&record).await {
            Err(e) if match_written => Err(BackendError::HistoryAfterMatch(Box::new(e))),
            other => other,
        }
    }
    .await;

    match &result {
        Ok(()) => info!(
            user = %auth_user_id,
            target = %target_id,
            direction = direction.as_str(),
            "swipe_recorded"
        ),
        Err(e) => warn!(
            user = %auth_user_id,
            target = %target_id,
            direction = direction.as_str(),
            error = %e,
            "swipe_record_failed"
        ),
    }
    result
}
