use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose, Engine as _};
use serde::Deserialize;
use sqlx::SqlitePool;

use crate::database::profile_repo;
use crate::error::AppError;

#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub id: String,
    /// Raw cookie token, forwarded to the REST backend. `None` for the
    /// local `current_user` fallback.
    pub access_token: Option<String>,
}

#[derive(Deserialize)]
struct JwtPayload {
    sub: String,
}

pub fn cookie_value<'a>(cookies: &'a str, name: &str) -> Option<&'a str> {
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|c| c.strip_prefix(name).and_then(|rest| rest.strip_prefix('=')))
        .filter(|v| !v.is_empty())
}

/// Reads `sub` from the JWT payload without checking the signature. With
/// the REST backend the token is forwarded and verified upstream; the
/// SQLite backend is a local store and trusts it.
fn subject_from_token(token: &str) -> Option<String> {
    let mut parts = token.split('.');
    let (_, payload, _) = (parts.next()?, parts.next()?, parts.next()?);
    if parts.next().is_some() {
        return None;
    }
    let bytes = general_purpose::URL_SAFE_NO_PAD.decode(payload).ok()?;
    let payload: JwtPayload = serde_json::from_slice(&bytes).ok()?;
    (!payload.sub.is_empty()).then_some(payload.sub)
}

pub async fn require_auth(
    State(pool): State<SqlitePool>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::COOKIE)
        .and_then(|hv| hv.to_str().ok())
        .and_then(|cookies| cookie_value(cookies, "access_token"))
        .map(str::to_string);

    if let Some((id, token)) = token.and_then(|t| subject_from_token(&t).map(|id| (id, t))) {
        request.extensions_mut().insert(AuthenticatedUser {
            id,
            access_token: Some(token),
        });
        return next.run(request).await;
    }

    // Fallback for offline/local usage: use the current_user table
    if let Ok(Some(id)) = profile_repo::load_current_user_id(&pool).await {
        request.extensions_mut().insert(AuthenticatedUser {
            id,
            access_token: None,
        });
        return next.run(request).await;
    }

    AppError::Unauthorized.into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::schema::test_support::memory_pool;
    use axum::body::{to_bytes, Body};
    use axum::routing::get;
    use axum::{middleware, Extension, Router};
    use tower::ServiceExt;

    async fn whoami(Extension(user): Extension<AuthenticatedUser>) -> String {
        format!("{}|{}", user.id, user.access_token.unwrap_or_default())
    }

    #[test]
    fn subject_is_read_from_payload() {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"sub":"u-1","role":"authenticated"}"#);
        assert_eq!(
            subject_from_token(&format!("h.{}.s", payload)).as_deref(),
            Some("u-1")
        );
        assert_eq!(subject_from_token("not-a-jwt"), None);
        assert_eq!(subject_from_token(&format!("h.{}.s.x", payload)), None);
    }

    #[test]
    fn cookie_lookup_matches_whole_name() {
        let cookies = "refresh_token=r; xaccess_token=bad;access_token=good";
        assert_eq!(cookie_value(cookies, "access_token"), Some("good"));
        assert_eq!(cookie_value("access_token=", "access_token"), None);
    }

    #[tokio::test]
    async fn cookie_token_travels_with_the_user() {
        let pool = memory_pool().await;
        let app = Router::new()
            .route("/me", get(whoami))
            .layer(middleware::from_fn_with_state(pool.clone(), require_auth));

        let payload = general_purpose::URL_SAFE_NO_PAD.encode(br#"{"sub":"u-7"}"#);
        let token = format!("h.{}.s", payload);
        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/me")
                    .header(header::COOKIE, format!("access_token={}", token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(body, format!("u-7|{}", token).as_bytes());

        let response = app
            .oneshot(axum::http::Request::builder().uri("/me").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::UNAUTHORIZED);
    }
}
