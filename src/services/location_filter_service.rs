use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::database::location_filter_repo;
use crate::error::AppError;
use crate::models::location_filter::{is_radius_step, RADIUS_STEPS_KM};
use crate::models::{City, LocationFilter};

/// Per-user city + radius selection, read by every swipe and search screen.
///
/// Writes go to SQLite first and then to the in-memory cache. Each setter
/// only touches its own field, so concurrent city and radius updates for
/// the same user both survive; writes to the same field are last-write-wins.
pub struct LocationFilterStore {
    pool: SqlitePool,
    cache: RwLock<HashMap<String, LocationFilter>>,
}

impl LocationFilterStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, user_id: &str) -> Result<LocationFilter, AppError> {
        if let Some(cached) = self.cached(user_id) {
            return Ok(cached);
        }

        let filter = location_filter_repo::load_location_filter(&self.pool, user_id)
            .await?
            .map(LocationFilter::from)
            .unwrap_or_default();
        self.remember(user_id, filter.clone());
        Ok(filter)
    }

    pub async fn set_city(&self, user_id: &str, city: City) -> Result<LocationFilter, AppError> {
        if !city.center().is_valid() {
            return Err(AppError::BadRequest(format!(
                "invalid coordinates for {}",
                city.name
            )));
        }
        location_filter_repo::upsert_city(&self.pool, user_id, &city).await?;
        self.merge(user_id, |filter| filter.city = Some(city)).await
    }

    pub async fn set_radius(&self, user_id: &str, radius_km: u32) -> Result<LocationFilter, AppError> {
        if !is_radius_step(radius_km) {
            return Err(AppError::BadRequest(format!(
                "radius must be one of {:?} km",
                RADIUS_STEPS_KM
            )));
        }
        location_filter_repo::upsert_radius(&self.pool, user_id, radius_km).await?;
        self.merge(user_id, |filter| filter.radius_km = radius_km).await
    }

    pub async fn reset(&self, user_id: &str) -> Result<LocationFilter, AppError> {
        location_filter_repo::delete_location_filter(&self.pool, user_id).await?;
        let filter = LocationFilter::default();
        self.remember(user_id, filter.clone());
        Ok(filter)
    }

    async fn merge<F>(&self, user_id: &str, apply: F) -> Result<LocationFilter, AppError>
    where
        F: FnOnce(&mut LocationFilter),
    {
        let stored = location_filter_repo::load_location_filter(&self.pool, user_id)
            .await?
            .map(LocationFilter::from)
            .unwrap_or_default();
        let mut cache = self.cache.write().unwrap_or_else(|p| p.into_inner());
        let filter = match cache.get_mut(user_id) {
            Some(cached) => {
                apply(cached);
                cached.clone()
            }
            None => {
                cache.insert(user_id.to_string(), stored.clone());
                stored
            }
        };
        Ok(filter)
    }

    fn cached(&self, user_id: &str) -> Option<LocationFilter> {
        self.cache
            .read()
            .ok()
            .and_then(|cache| cache.get(user_id).cloned())
    }

    fn remember(&self, user_id: &str, filter: LocationFilter) {
        if let Ok(mut cache) = self.cache.write() {
            cache.insert(user_id.to_string(), filter);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::memory_pool;
    use crate::models::location_filter::DEFAULT_RADIUS_KM;

    fn paris() -> City {
        City {
            id: "paris".to_string(),
            name: "Paris".to_string(),
            latitude: 48.8566,
            longitude: 2.3522,
        }
    }

    #[tokio::test]
    async fn unknown_user_gets_defaults() {
        let store = LocationFilterStore::new(memory_pool().await);
        let filter = store.get("u-1").await.unwrap();
        assert_eq!(filter.city, None);
        assert_eq!(filter.radius_km, DEFAULT_RADIUS_KM);
    }

    #[tokio::test]
    async fn selection_survives_a_fresh_store() {
        let pool = memory_pool().await;
        let store = LocationFilterStore::new(pool.clone());
        store.set_city("u-1", paris()).await.unwrap();
        store.set_radius("u-1", 10).await.unwrap();

        let reopened = LocationFilterStore::new(pool);
        let filter = reopened.get("u-1").await.unwrap();
        assert_eq!(filter.city, Some(paris()));
        assert_eq!(filter.radius_km, 10);
    }

    #[tokio::test]
    async fn radius_outside_the_steps_is_rejected() {
        let store = LocationFilterStore::new(memory_pool().await);
        let err = store.set_radius("u-1", 7).await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
        assert_eq!(store.get("u-1").await.unwrap().radius_km, DEFAULT_RADIUS_KM);
    }

    #[tokio::test]
    async fn reset_clears_persisted_state() {
        let pool = memory_pool().await;
        let store = LocationFilterStore::new(pool.clone());
        store.set_city("u-1", paris()).await.unwrap();
        store.reset("u-1").await.unwrap();

        let reopened = LocationFilterStore::new(pool);
        assert_eq!(reopened.get("u-1").await.unwrap(), LocationFilter::default());
    }

    #[tokio::test]
    async fn last_write_wins() {
        let store = LocationFilterStore::new(memory_pool().await);
        store.set_radius("u-1", 25).await.unwrap();
        store.set_radius("u-1", 100).await.unwrap();
        assert_eq!(store.get("u-1").await.unwrap().radius_km, 100);
    }

    #[tokio::test]
    async fn concurrent_city_and_radius_updates_both_stick() {
        let pool = memory_pool().await;
        let store = LocationFilterStore::new(pool.clone());

        let (city, radius) = tokio::join!(store.set_city("u-1", paris()), store.set_radius("u-1", 10));
        city.unwrap();
        radius.unwrap();

        let cached = store.get("u-1").await.unwrap();
        assert_eq!(cached.city, Some(paris()));
        assert_eq!(cached.radius_km, 10);

        let reopened = LocationFilterStore::new(pool);
        assert_eq!(reopened.get("u-1").await.unwrap(), cached);
    }

    #[tokio::test]
    async fn a_stale_store_cannot_erase_another_field() {
        let pool = memory_pool().await;
        let first = LocationFilterStore::new(pool.clone());
        let second = LocationFilterStore::new(pool.clone());
        first.get("u-1").await.unwrap();

        second.set_city("u-1", paris()).await.unwrap();
        first.set_radius("u-1", 25).await.unwrap();

        let persisted = LocationFilterStore::new(pool).get("u-1").await.unwrap();
        assert_eq!(persisted.city, Some(paris()));
        assert_eq!(persisted.radius_km, 25);
    }
}
