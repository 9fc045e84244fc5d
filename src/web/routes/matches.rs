use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{MatchRow, MessageRow};
use crate::services::message_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct MessagesQuery {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    content: String,
}

pub async fn list_matches(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<MatchRow>>, AppError> {
    Ok(Json(message_service::list_matches(&state.pool, &user.id).await?))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(match_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageRow>>, AppError> {
    let limit = query.limit.unwrap_or(50);
    Ok(Json(
        message_service::list_messages(&state.pool, &user.id, &match_id, limit).await?,
    ))
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(match_id): Path<String>,
    Json(body): Json<SendMessageBody>,
) -> Result<(StatusCode, Json<MessageRow>), AppError> {
    let row = message_service::send_message(
        &state.pool,
        &state.quota,
        &user.id,
        &match_id,
        &body.content,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(row)))
}
