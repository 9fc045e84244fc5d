use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::AppError;
use crate::models::FavoriteRow;
use crate::services::favorite_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

pub async fn list_favorites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<FavoriteRow>>, AppError> {
    Ok(Json(favorite_service::list_favorites(&state.pool, &user.id).await?))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, AppError> {
    favorite_service::add_favorite(&state.pool, &user.id, &project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(project_id): Path<String>,
) -> Result<StatusCode, AppError> {
    favorite_service::remove_favorite(&state.pool, &user.id, &project_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
