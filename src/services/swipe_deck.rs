use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::error::AppError;
use crate::models::{Candidate, LocationFilter, QuotaKind, Role, SwipeDirection};
use crate::services::quota_service::{QuotaService, Reservation};
use crate::services::swipe_filters::SwipeFilters;
use crate::services::swipe_service::SwipeLogic;

pub struct SwipeContext<'a> {
    pub logic: &'a dyn SwipeLogic,
    pub quota: &'a QuotaService,
    pub user_id: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct SwipeStep {
    pub item_id: String,
    pub direction: SwipeDirection,
    pub remaining_swipes: Option<u32>,
    pub cards_left: usize,
}

/// One card at a time from a fixed queue. A card is only left behind once
/// its swipe has been recorded.
#[derive(Debug)]
pub struct SwipeDeck {
    role: Role,
    items: Vec<Candidate>,
    position: usize,
}

impl SwipeDeck {
    pub fn new(role: Role, items: Vec<Candidate>) -> Self {
        Self {
            role,
            items,
            position: 0,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn current(&self) -> Option<&Candidate> {
        self.items.get(self.position)
    }

    pub fn cards_left(&self) -> usize {
        self.items.len().saturating_sub(self.position)
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_none()
    }

    /// Right swipes take a unit of daily quota before anything is written;
    /// with none left the swipe is refused and the card stays put.
    pub async fn swipe(
        &mut self,
        ctx: &SwipeContext<'_>,
        direction: SwipeDirection,
    ) -> Result<SwipeStep, AppError> {
        let item_id = self
            .current()
            .map(|c| c.id().to_string())
            .ok_or(AppError::DeckFinished)?;

        let mut grant = None;
        let mut remaining_swipes = None;
        if direction == SwipeDirection::Right {
            match ctx.quota.reserve(ctx.user_id, QuotaKind::Swipe).await? {
                Reservation::Granted(granted) => {
                    remaining_swipes = granted.remaining;
                    grant = Some(granted);
                }
                Reservation::Exhausted => {
                    debug!(user = %ctx.user_id, item = %item_id, "right swipe refused, quota spent");
                    return Err(AppError::QuotaExhausted(QuotaKind::Swipe));
                }
            }
        }

        if let Err(e) = ctx
            .logic
            .handle_swipe(ctx.user_id, &item_id, direction)
            .await
        {
            // A stored match keeps its unit, or the cap could be walked past.
            if let Some(grant) = grant.filter(|_| !e.match_committed()) {
                if let Err(release_err) = ctx.quota.release(ctx.user_id, &grant).await {
                    warn!(user = %ctx.user_id, error = %release_err, "swipe quota refund failed");
                }
            }
            return Err(e.into());
        }

        if direction == SwipeDirection::Left {
            remaining_swipes = ctx.quota.remaining(ctx.user_id, QuotaKind::Swipe).await?;
        }

        self.position += 1;
        Ok(SwipeStep {
            item_id,
            direction,
            remaining_swipes,
            cards_left: self.cards_left(),
        })
    }
}

pub async fn build_deck(
    logic: &dyn SwipeLogic,
    location: &LocationFilter,
    filters: &SwipeFilters,
) -> SwipeDeck {
    let items = match &location.city {
        Some(city) => {
            let fetched = logic
                .fetch(city.latitude, city.longitude, f64::from(location.radius_km))
                .await;
            logic.filter(fetched, filters)
        }
        None => Vec::new(),
    };
    SwipeDeck::new(logic.role(), items)
}

pub type SharedDeck = Arc<tokio::sync::Mutex<SwipeDeck>>;

/// Live decks keyed by (user, role). Each deck has its own async lock so a
/// burst of swipes from one user is handled one at a time.
#[derive(Default)]
pub struct DeckRegistry {
    decks: Mutex<HashMap<(String, Role), SharedDeck>>,
}

impl DeckRegistry {
    pub fn replace(&self, user_id: &str, deck: SwipeDeck) -> SharedDeck {
        let key = (user_id.to_string(), deck.role());
        let shared = Arc::new(tokio::sync::Mutex::new(deck));
        if let Ok(mut decks) = self.decks.lock() {
            decks.insert(key, shared.clone());
        }
        shared
    }

    pub fn get(&self, user_id: &str, role: Role) -> Option<SharedDeck> {
        self.decks
            .lock()
            .ok()
            .and_then(|decks| decks.get(&(user_id.to_string(), role)).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::memory_pool;
    use crate::models::City;
    use crate::services::seeker_swipe_service::fixtures::project;
    use crate::services::seeker_swipe_service::SeekerSwipeLogic;
    use crate::services::swipe_service::test_support::{Call, RecordingBackend};

    fn deck(ids: &[&str]) -> SwipeDeck {
        SwipeDeck::new(
            Role::Seeker,
            ids.iter().map(|id| Candidate::Project(project(id))).collect(),
        )
    }

    async fn exhaust(quota: &QuotaService, user_id: &str) {
        while let Reservation::Granted(_) = quota.reserve(user_id, QuotaKind::Swipe).await.unwrap() {}
    }

    #[tokio::test]
    async fn each_swipe_advances_by_one() {
        let backend = Arc::new(RecordingBackend::with_actor("seeker-1"));
        let logic = SeekerSwipeLogic::new(backend.clone());
        let quota = QuotaService::new(memory_pool().await);
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a", "b"]);
        let step = deck.swipe(&ctx, SwipeDirection::Right).await.unwrap();
        assert_eq!(step.item_id, "a");
        assert_eq!(step.remaining_swipes, Some(9));
        assert_eq!(deck.current().map(Candidate::id), Some("b"));

        let step = deck.swipe(&ctx, SwipeDirection::Left).await.unwrap();
        assert_eq!(step.cards_left, 0);
        assert_eq!(step.remaining_swipes, Some(9));
        assert!(deck.is_finished());
        assert_eq!(backend.swipe_count(), 2);

        let err = deck.swipe(&ctx, SwipeDirection::Left).await.unwrap_err();
        assert!(matches!(err, AppError::DeckFinished));
    }

    #[tokio::test]
    async fn right_swipe_with_zero_quota_creates_no_match() {
        let backend = Arc::new(RecordingBackend::with_actor("seeker-1"));
        let logic = SeekerSwipeLogic::new(backend.clone());
        let quota = QuotaService::new(memory_pool().await);
        exhaust(&quota, "u-1").await;
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a"]);
        let err = deck.swipe(&ctx, SwipeDirection::Right).await.unwrap_err();

        assert!(matches!(err, AppError::QuotaExhausted(QuotaKind::Swipe)));
        assert_eq!(backend.pending_match_count(), 0);
        assert!(backend.calls().is_empty());
        assert_eq!(deck.current().map(Candidate::id), Some("a"));
    }

    #[tokio::test]
    async fn left_swipe_still_works_without_quota() {
        let backend = Arc::new(RecordingBackend::with_actor("seeker-1"));
        let logic = SeekerSwipeLogic::new(backend.clone());
        let quota = QuotaService::new(memory_pool().await);
        exhaust(&quota, "u-1").await;
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a"]);
        let step = deck.swipe(&ctx, SwipeDirection::Left).await.unwrap();
        assert_eq!(step.remaining_swipes, Some(0));
        assert_eq!(backend.swipe_count(), 1);
    }

    #[tokio::test]
    async fn failed_right_swipe_refunds_quota_and_keeps_card() {
        let backend = Arc::new(RecordingBackend {
            actor_profile_id: Some("seeker-1".to_string()),
            fail_match_insert: true,
            ..Default::default()
        });
        let logic = SeekerSwipeLogic::new(backend.clone());
        let quota = QuotaService::new(memory_pool().await);
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a"]);
        assert!(deck.swipe(&ctx, SwipeDirection::Right).await.is_err());
        assert_eq!(deck.current().map(Candidate::id), Some("a"));
        assert_eq!(
            quota.remaining("u-1", QuotaKind::Swipe).await.unwrap(),
            Some(10)
        );
        assert_eq!(backend.swipe_count(), 0);
    }

    #[tokio::test]
    async fn stored_match_keeps_its_quota_when_history_fails() {
        let backend = Arc::new(RecordingBackend {
            actor_profile_id: Some("seeker-1".to_string()),
            fail_swipe_insert: true,
            ..Default::default()
        });
        let logic = SeekerSwipeLogic::new(backend.clone());
        let pool = memory_pool().await;
        let quota = QuotaService::new(pool);
        for _ in 0..9 {
            quota.reserve("u-1", QuotaKind::Swipe).await.unwrap();
        }
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a"]);
        for _ in 0..3 {
            let _ = deck.swipe(&ctx, SwipeDirection::Right).await;
        }

        assert_eq!(backend.pending_match_count(), 1);
        assert_eq!(
            quota.remaining("u-1", QuotaKind::Swipe).await.unwrap(),
            Some(0)
        );
        assert_eq!(deck.current().map(Candidate::id), Some("a"));
    }

    #[tokio::test]
    async fn failed_left_swipe_has_nothing_to_refund() {
        let backend = Arc::new(RecordingBackend {
            actor_profile_id: Some("seeker-1".to_string()),
            fail_swipe_insert: true,
            ..Default::default()
        });
        let logic = SeekerSwipeLogic::new(backend.clone());
        let quota = QuotaService::new(memory_pool().await);
        let ctx = SwipeContext {
            logic: &logic,
            quota: &quota,
            user_id: "u-1",
        };

        let mut deck = deck(&["a"]);
        let err = deck.swipe(&ctx, SwipeDirection::Left).await.unwrap_err();
        assert!(matches!(err, AppError::Backend(ref e) if !e.match_committed()));
        assert_eq!(
            quota.remaining("u-1", QuotaKind::Swipe).await.unwrap(),
            Some(10)
        );
    }

    #[tokio::test]
    async fn deck_without_city_is_empty_and_never_fetches() {
        let backend = Arc::new(RecordingBackend::default());
        let logic = SeekerSwipeLogic::new(backend.clone());
        let deck = build_deck(&logic, &LocationFilter::default(), &SwipeFilters::default()).await;
        assert!(deck.is_finished());
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn deck_searches_around_selected_city() {
        let backend = Arc::new(RecordingBackend {
            projects: vec![project("a"), project("b")],
            ..Default::default()
        });
        let logic = SeekerSwipeLogic::new(backend.clone());
        let location = LocationFilter {
            city: Some(City {
                id: "paris".to_string(),
                name: "Paris".to_string(),
                latitude: 48.8566,
                longitude: 2.3522,
            }),
            radius_km: 10,
        };
        let deck = build_deck(&logic, &location, &SwipeFilters::default()).await;
        assert_eq!(deck.cards_left(), 2);
        assert_eq!(backend.calls(), vec![Call::SearchProjects(48.8566, 2.3522, 10.0)]);
    }

    #[test]
    fn registry_keeps_one_deck_per_user_and_role() {
        let registry = DeckRegistry::default();
        registry.replace("u-1", deck(&["a"]));
        registry.replace("u-1", deck(&["b", "c"]));
        let shared = registry.get("u-1", Role::Seeker).unwrap();
        assert_eq!(shared.try_lock().unwrap().cards_left(), 2);
        assert!(registry.get("u-1", Role::Owner).is_none());
    }
}
