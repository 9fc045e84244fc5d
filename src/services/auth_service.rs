use axum::http::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{AppError, BackendError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
}

#[derive(Clone)]
pub struct AuthClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AuthClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(key) = HeaderValue::from_str(&self.api_key) {
            headers.insert("apikey", key);
        }
        headers
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthTokens, AppError> {
        validate_credentials(email, password)?;
        let body = self
            .post(
                &self.url("token?grant_type=password"),
                json!({ "email": email.trim(), "password": password }),
            )
            .await?;
        serde_json::from_value(body).map_err(|e| AppError::Backend(BackendError::Decode(e)))
    }

    /// Asks the backend to send a reset mail. The answer does not reveal
    /// whether the address is known.
    pub async fn recover(&self, email: &str) -> Result<(), AppError> {
        if !looks_like_email(email) {
            return Err(AppError::Validation("Enter a valid email address.".to_string()));
        }
        self.post(&self.url("recover"), json!({ "email": email.trim() }))
            .await?;
        Ok(())
    }

    async fn post(&self, url: &str, payload: Value) -> Result<Value, BackendError> {
        let resp = self
            .client
            .post(url)
            .headers(self.headers())
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                warn!("🔐 Auth upstream unreachable: {}", e);
                BackendError::Transport(e)
            })?;

        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let text = resp.text().await.map_err(BackendError::Transport)?;
        let body: Value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text)?
        };

        if !status.is_success() {
            warn!("🔐 Auth upstream returned {}", status);
            return Err(BackendError::Status {
                status,
                body: Some(body),
            });
        }
        Ok(body)
    }
}

fn looks_like_email(email: &str) -> bool {
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.ends_with('.'),
        None => false,
    }
}

pub fn validate_credentials(email: &str, password: &str) -> Result<(), AppError> {
    if !looks_like_email(email) {
        return Err(AppError::Validation("Enter a valid email address.".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::Validation("Enter your password.".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_follow_backend_layout() {
        let client = AuthClient::new("http://backend.local/", "anon");
        assert_eq!(
            client.url("token?grant_type=password"),
            "http://backend.local/auth/v1/token?grant_type=password"
        );
        assert_eq!(client.headers().get("apikey").unwrap(), "anon");
    }

    #[test]
    fn credentials_are_checked_before_any_request() {
        assert!(validate_credentials("sam@example.com", "secret").is_ok());
        assert!(validate_credentials("sam", "secret").is_err());
        assert!(validate_credentials("sam@example.com", "").is_err());
        assert!(!looks_like_email("sam@localhost."));
    }

    #[tokio::test]
    async fn unreachable_auth_service_is_a_transport_error() {
        let client = AuthClient::new("http://127.0.0.1:9", "anon");
        let err = client.sign_in("sam@example.com", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::Backend(BackendError::Transport(_))));
    }
}
