use async_trait::async_trait;
use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::MatchBackend;
use crate::config::RestBackendConfig;
use crate::error::BackendError;
use crate::models::{Project, Role, SwipeRecord, TargetKind, UserProfile};

/// PostgREST-style remote backend: `/rest/v1/rpc/*` for geo search, plain
/// table endpoints for row access.
#[derive(Clone)]
pub struct RestBackend {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    full_name: Option<String>,
}

impl RestBackend {
    pub fn new(config: &RestBackendConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            access_token: None,
        }
    }

    /// Same client, but requests run as the given user so row-level
    /// policies and token checks apply upstream.
    pub fn for_user(&self, access_token: &str) -> Self {
        Self {
            access_token: Some(access_token.to_string()),
            ..self.clone()
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        if let Ok(bearer) = HeaderValue::from_str(&format!("Bearer {}", bearer)) {
            headers.insert(AUTHORIZATION, bearer);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers
    }

    fn url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, BackendError> {
        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let bytes = resp.bytes().await?;
        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).ok();
            return Err(BackendError::Status { status, body });
        }
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn expect_success(resp: reqwest::Response) -> Result<(), BackendError> {
        let status =
            StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        if status.is_success() {
            return Ok(());
        }
        let body = resp.json::<Value>().await.ok();
        Err(BackendError::Status { status, body })
    }

    async fn rpc<T: DeserializeOwned>(&self, name: &str, params: Value) -> Result<T, BackendError> {
        let resp = self
            .client
            .post(self.url(&format!("rpc/{}", name)))
            .headers(self.headers())
            .json(&params)
            .send()
            .await?;
        Self::read_json(resp).await
    }

    async fn insert_row(&self, table: &str, row: Value) -> Result<(), BackendError> {
        let resp = self
            .client
            .post(self.url(table))
            .headers(self.headers())
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;
        Self::expect_success(resp).await
    }

    async fn select_profile<T: DeserializeOwned>(
        &self,
        columns: &str,
        user_id: &str,
    ) -> Result<Option<T>, BackendError> {
        let user_filter = format!("eq.{}", user_id);
        let resp = self
            .client
            .get(self.url("profiles"))
            .headers(self.headers())
            .query(&[
                ("select", columns),
                ("user_id", user_filter.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;
        let rows: Vec<T> = Self::read_json(resp).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl MatchBackend for RestBackend {
    fn with_access_token(self: Arc<Self>, access_token: &str) -> Arc<dyn MatchBackend> {
        Arc::new(self.for_user(access_token))
    }

    async fn search_projects_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
    ) -> Result<Vec<Project>, BackendError> {
        self.rpc(
            "search_projects_by_location",
            json!({
                "center_lat": center_lat,
                "center_lon": center_lon,
                "radius_km": radius_km,
            }),
        )
        .await
    }

    async fn search_profiles_by_location(
        &self,
        center_lat: f64,
        center_lon: f64,
        radius_km: f64,
        role: Option<Role>,
    ) -> Result<Vec<UserProfile>, BackendError> {
        self.rpc(
            "search_profiles_by_location",
            json!({
                "center_lat": center_lat,
                "center_lon": center_lon,
                "radius_km": radius_km,
                "role_filter": role.map(Role::as_str),
            }),
        )
        .await
    }

    async fn resolve_actor_profile_id(
        &self,
        auth_user_id: &str,
    ) -> Result<Option<String>, BackendError> {
        let row: Option<IdRow> = self.select_profile("id", auth_user_id).await?;
        Ok(row.map(|r| r.id))
    }

    async fn insert_pending_match(
        &self,
        actor_profile_id: &str,
        target_id: &str,
        target_kind: TargetKind,
    ) -> Result<(), BackendError> {
        self.insert_row(
            "matches",
            json!({
                "actor_profile_id": actor_profile_id,
                "target_id": target_id,
                "target_kind": target_kind.as_str(),
                "status": "pending",
            }),
        )
        .await
    }

    async fn insert_swipe(&self, record: &SwipeRecord) -> Result<(), BackendError> {
        self.insert_row("swipes", serde_json::to_value(record)?).await
    }

    async fn profile_display_name(&self, user_id: &str) -> Result<Option<String>, BackendError> {
        let row: Option<NameRow> = self.select_profile("full_name", user_id).await?;
        Ok(row.and_then(|r| r.full_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unreachable_backend() -> RestBackend {
        RestBackend::new(&RestBackendConfig {
            base_url: "http://127.0.0.1:9/".to_string(),
            api_key: "anon".to_string(),
        })
    }

    #[test]
    fn urls_are_built_under_rest_v1() {
        let backend = unreachable_backend();
        assert_eq!(
            backend.url("rpc/search_projects_by_location"),
            "http://127.0.0.1:9/rest/v1/rpc/search_projects_by_location"
        );
    }

    #[test]
    fn every_request_carries_api_key_and_bearer() {
        let headers = unreachable_backend().headers();
        assert_eq!(headers.get("apikey").unwrap(), "anon");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer anon");
    }

    #[test]
    fn user_requests_carry_the_user_token() {
        let backend = unreachable_backend();
        let headers = backend.for_user("user-jwt").headers();
        assert_eq!(headers.get("apikey").unwrap(), "anon");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer user-jwt");
        assert_eq!(backend.headers().get(AUTHORIZATION).unwrap(), "Bearer anon");
    }

    #[tokio::test]
    async fn transport_failure_is_reported_not_panicked() {
        let err = unreachable_backend()
            .search_projects_by_location(48.8566, 2.3522, 10.0)
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }
}
