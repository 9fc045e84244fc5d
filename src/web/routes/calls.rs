use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use serde::Deserialize;
use std::time::Duration;

use crate::call::incoming::IncomingCallListener;
use crate::call::peer::RtcConfiguration;
use crate::error::AppError;
use crate::models::CallHistoryRow;
use crate::services::call_history_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

const MAX_WAIT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
pub struct StartCallBody {
    participant_user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingQuery {
    wait_secs: Option<u64>,
}

pub async fn start_call(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<StartCallBody>,
) -> Result<(StatusCode, Json<CallHistoryRow>), AppError> {
    let row = call_history_service::start_call(
        &state.pool,
        &state.relay,
        &user.id,
        &body.participant_user_id,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn end_call(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(call_id): Path<String>,
) -> Result<Json<CallHistoryRow>, AppError> {
    Ok(Json(
        call_history_service::end_call(&state.pool, &state.relay, &call_id, &user.id).await?,
    ))
}

pub async fn call_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CallHistoryRow>>, AppError> {
    let limit = query.limit.unwrap_or(20);
    Ok(Json(
        call_history_service::list_history(&state.pool, &user.id, limit).await?,
    ))
}

/// Long-polls the user's inbox for a ring. 204 when nothing arrived in time.
pub async fn wait_for_incoming(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<IncomingQuery>,
) -> Response {
    let wait = Duration::from_secs(query.wait_secs.unwrap_or(20).min(MAX_WAIT_SECS));
    let mut listener = IncomingCallListener::subscribe(&state.relay, &user.id);
    let backend = state.backend_for(&user);

    match tokio::time::timeout(wait, listener.next_call(backend.as_ref())).await {
        Ok(Some(call)) => Json(call).into_response(),
        Ok(None) | Err(_) => StatusCode::NO_CONTENT.into_response(),
    }
}

pub async fn ice_servers(State(state): State<AppState>) -> Json<RtcConfiguration> {
    Json(RtcConfiguration {
        ice_servers: state.config.ice_servers.clone(),
    })
}
