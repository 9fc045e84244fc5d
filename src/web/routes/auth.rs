use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use cookie::Cookie;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::database::profile_repo;
use crate::error::AppError;
use crate::services::subscription_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Deserialize)]
pub struct LoginBody {
    email: String,
    password: String,
}

#[derive(Deserialize)]
pub struct RecoverBody {
    email: String,
}

fn session_cookie(name: &str, value: String) -> Cookie<'static> {
    let mut cookie = Cookie::new(name.to_string(), value);
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_same_site(cookie::SameSite::Lax);
    cookie
}

fn with_cookies(mut response: Response, cookies: [Cookie<'static>; 2]) -> Response {
    for cookie in cookies {
        if let Ok(value) = cookie.to_string().parse() {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(body): Json<LoginBody>,
) -> Result<Response, AppError> {
    let tokens = state.auth.sign_in(&body.email, &body.password).await?;
    info!("🔐 Login succeeded for {}", body.email.trim());

    let response = Json(json!({ "ok": true, "expires_in": tokens.expires_in })).into_response();
    Ok(with_cookies(
        response,
        [
            session_cookie("access_token", tokens.access_token),
            session_cookie("refresh_token", tokens.refresh_token),
        ],
    ))
}

pub async fn recover_handler(
    State(state): State<AppState>,
    Json(body): Json<RecoverBody>,
) -> Result<Response, AppError> {
    state.auth.recover(&body.email).await?;
    Ok((StatusCode::ACCEPTED, Json(json!({ "ok": true }))).into_response())
}

pub async fn logout_handler() -> Response {
    let expired = |name: &str| {
        let mut cookie = session_cookie(name, String::new());
        cookie.make_removal();
        cookie
    };
    with_cookies(
        Json(json!({ "ok": true })).into_response(),
        [expired("access_token"), expired("refresh_token")],
    )
}

pub async fn session_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<serde_json::Value>, AppError> {
    let profile_id = profile_repo::load_profile_id_for_user(&state.pool, &user.id).await?;
    let plan = subscription_service::load_plan(&state.pool, &user.id).await?;
    Ok(Json(json!({
        "user_id": user.id,
        "profile_id": profile_id,
        "plan": plan,
    })))
}
