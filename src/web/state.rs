use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::backend::MatchBackend;
use crate::config::AppConfig;
use crate::realtime::Relay;
use crate::services::auth_service::AuthClient;
use crate::services::location_filter_service::LocationFilterStore;
use crate::services::quota_service::QuotaService;
use crate::services::swipe_deck::DeckRegistry;
use crate::web::middleware::auth::AuthenticatedUser;

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub backend: Arc<dyn MatchBackend>,
    pub relay: Arc<Relay>,
    pub location_filters: Arc<LocationFilterStore>,
    pub decks: Arc<DeckRegistry>,
    pub quota: QuotaService,
    pub auth: AuthClient,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: SqlitePool, backend: Arc<dyn MatchBackend>, config: AppConfig) -> Self {
        Self {
            backend,
            relay: Relay::new(),
            location_filters: Arc::new(LocationFilterStore::new(pool.clone())),
            decks: Arc::new(DeckRegistry::default()),
            quota: QuotaService::new(pool.clone()),
            auth: AuthClient::new(&config.auth_url, &config.rest.api_key),
            config: Arc::new(config),
            pool,
        }
    }

    pub fn backend_for(&self, user: &AuthenticatedUser) -> Arc<dyn MatchBackend> {
        match user.access_token.as_deref() {
            Some(token) => self.backend.clone().with_access_token(token),
            None => self.backend.clone(),
        }
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.pool.clone()
    }
}
