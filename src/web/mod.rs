pub mod middleware;
pub mod routes;
pub mod state;

pub use state::AppState;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use self::middleware::auth as auth_middleware;
use self::routes::{
    appointments, auth, calls, favorites, location, matches, realtime, subscription, swipe,
};

pub fn build_router(state: AppState) -> Router {
    // Protected routes onder één middleware layer
    let protected_routes = Router::new()
        .route("/api/session", get(auth::session_handler))
        .route("/api/location/search", get(location::search_cities))
        .route(
            "/api/location-filter",
            get(location::get_filter).delete(location::reset_filter),
        )
        .route("/api/location-filter/city", put(location::set_city))
        .route("/api/location-filter/radius", put(location::set_radius))
        .route(
            "/api/swipe/:role/deck",
            get(swipe::get_deck).post(swipe::create_deck),
        )
        .route("/api/swipe/:role/swipe", post(swipe::swipe))
        .route("/api/matches", get(matches::list_matches))
        .route(
            "/api/matches/:match_id/messages",
            get(matches::list_messages).post(matches::send_message),
        )
        .route(
            "/api/subscription",
            get(subscription::get_subscription).put(subscription::change_plan),
        )
        .route("/api/favorites", get(favorites::list_favorites))
        .route(
            "/api/favorites/:project_id",
            put(favorites::add_favorite).delete(favorites::remove_favorite),
        )
        .route(
            "/api/appointments",
            get(appointments::list_appointments).post(appointments::create_appointment),
        )
        .route(
            "/api/appointments/:appointment_id/cancel",
            post(appointments::cancel_appointment),
        )
        .route("/api/calls", post(calls::start_call))
        .route("/api/calls/history", get(calls::call_history))
        .route("/api/calls/incoming", get(calls::wait_for_incoming))
        .route("/api/calls/ice-servers", get(calls::ice_servers))
        .route("/api/calls/:call_id/end", post(calls::end_call))
        .route("/ws/realtime/:channel", get(realtime::realtime_ws))
        .layer(axum_middleware::from_fn_with_state(
            state.pool.clone(),
            auth_middleware::require_auth,
        ));

    Router::new()
        // Public routes
        .route("/health", get(|| async { "ok" }))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/recover", post(auth::recover_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .merge(protected_routes)
        // Layers
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::sqlite::SqliteBackend;
    use crate::config::{AppConfig, BackendKind, LocationApiConfig, RestBackendConfig};
    use crate::database::schema::test_support::{insert_profile, insert_project, memory_pool};
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use base64::{engine::general_purpose, Engine as _};
    use serde_json::{json, Value};
    use sqlx::SqlitePool;
    use std::sync::Arc;
    use tower::ServiceExt;

    const PARIS: (f64, f64) = (48.8566, 2.3522);

    fn test_config() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
            backend_kind: BackendKind::Sqlite,
            rest: RestBackendConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                api_key: "anon".to_string(),
            },
            auth_url: "http://127.0.0.1:9".to_string(),
            location: LocationApiConfig::default(),
            ice_servers: crate::config::default_ice_servers(),
        }
    }

    async fn app() -> (Router, SqlitePool) {
        let pool = memory_pool().await;
        let backend = Arc::new(SqliteBackend::new(pool.clone()));
        let state = AppState::new(pool.clone(), backend, test_config());
        (build_router(state), pool)
    }

    fn token_for(user_id: &str) -> String {
        let payload = general_purpose::URL_SAFE_NO_PAD.encode(json!({ "sub": user_id }).to_string());
        format!("header.{}.signature", payload)
    }

    fn request(method: Method, uri: &str, user_id: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("cookie", format!("access_token={}", token_for(user_id)));
        match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    #[tokio::test]
    async fn health_is_public_and_not_cached() {
        let (app, _) = app().await;
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(resp.headers().get(CACHE_CONTROL).unwrap(), "no-store");
    }

    #[tokio::test]
    async fn protected_routes_need_a_principal() {
        let (app, _) = app().await;
        let resp = app
            .oneshot(Request::get("/api/matches").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn location_filter_defaults_and_rejects_off_step_radius() {
        let (app, _) = app().await;

        let (status, body) = send(&app, request(Method::GET, "/api/location-filter", "u-1", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["radius_km"], 50);
        assert_eq!(body["city"], Value::Null);

        let (status, _) = send(
            &app,
            request(
                Method::PUT,
                "/api/location-filter/radius",
                "u-1",
                Some(json!({ "radius_km": 7 })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn swipe_flow_runs_until_the_deck_is_empty() {
        let (app, pool) = app().await;
        insert_profile(&pool, "seeker-1", "u-seeker", "seeker", "Sam", Some(PARIS)).await;
        insert_profile(&pool, "owner-1", "u-owner", "owner", "Olivia", Some(PARIS)).await;
        insert_project(&pool, "proj-1", "owner-1", "Ledger", Some(PARIS)).await;

        let city = json!({ "id": "paris", "name": "Paris", "latitude": PARIS.0, "longitude": PARIS.1 });
        let (status, _) = send(
            &app,
            request(Method::PUT, "/api/location-filter/city", "u-seeker", Some(city)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, deck) = send(
            &app,
            request(Method::POST, "/api/swipe/seeker/deck", "u-seeker", Some(json!({}))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deck["cards_left"], 1);
        assert_eq!(deck["current"]["item"]["id"], "proj-1");
        assert_eq!(deck["remaining_swipes"], 10);

        let (status, _) = send(
            &app,
            request(
                Method::POST,
                "/api/swipe/seeker/swipe",
                "u-seeker",
                Some(json!({ "direction": "right", "item_id": "someone-else" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, step) = send(
            &app,
            request(
                Method::POST,
                "/api/swipe/seeker/swipe",
                "u-seeker",
                Some(json!({ "direction": "right", "item_id": "proj-1" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(step["remaining_swipes"], 9);
        assert_eq!(step["next"], Value::Null);

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/api/swipe/seeker/swipe",
                "u-seeker",
                Some(json!({ "direction": "left" })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "deck_finished");
    }

    #[tokio::test]
    async fn unknown_role_and_missing_deck_are_distinguished() {
        let (app, _) = app().await;
        let (status, _) = send(&app, request(Method::GET, "/api/swipe/pirate/deck", "u-1", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = send(&app, request(Method::GET, "/api/swipe/seeker/deck", "u-1", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ice_servers_default_to_public_stun() {
        let (app, _) = app().await;
        let (status, body) =
            send(&app, request(Method::GET, "/api/calls/ice-servers", "u-1", None)).await;
        assert_eq!(status, StatusCode::OK);
        let servers = body["iceServers"].as_array().unwrap();
        assert_eq!(servers.len(), crate::call::peer::DEFAULT_STUN_SERVERS.len());
    }

    #[tokio::test]
    async fn incoming_poll_times_out_with_no_content() {
        let (app, _) = app().await;
        let resp = app
            .oneshot(request(Method::GET, "/api/calls/incoming?wait_secs=0", "u-1", None))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn favorites_round_trip_through_the_api() {
        let (app, pool) = app().await;
        insert_project(&pool, "proj-1", "owner-1", "Ledger", Some(PARIS)).await;

        let (status, _) =
            send(&app, request(Method::PUT, "/api/favorites/proj-1", "u-1", None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (_, list) = send(&app, request(Method::GET, "/api/favorites", "u-1", None)).await;
        assert_eq!(list.as_array().unwrap().len(), 1);

        let (status, _) =
            send(&app, request(Method::DELETE, "/api/favorites/proj-1", "u-1", None)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) =
            send(&app, request(Method::DELETE, "/api/favorites/proj-1", "u-1", None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
