use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::models::{City, LocationFilter};
use crate::services::location_service;
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

#[derive(Debug, Deserialize)]
pub struct CitySearchQuery {
    q: Option<String>,
    limit: Option<usize>,
}

pub async fn search_cities(
    State(state): State<AppState>,
    Query(query): Query<CitySearchQuery>,
) -> Result<Json<Vec<City>>, AppError> {
    let q = query.q.unwrap_or_default();
    let limit = query.limit.unwrap_or(8);
    Ok(Json(
        location_service::search_cities(&state.config.location, &q, limit).await?,
    ))
}

#[derive(Debug, Deserialize)]
pub struct RadiusBody {
    radius_km: u32,
}

pub async fn get_filter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<LocationFilter>, AppError> {
    Ok(Json(state.location_filters.get(&user.id).await?))
}

pub async fn set_city(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(city): Json<City>,
) -> Result<Json<LocationFilter>, AppError> {
    Ok(Json(state.location_filters.set_city(&user.id, city).await?))
}

pub async fn set_radius(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<RadiusBody>,
) -> Result<Json<LocationFilter>, AppError> {
    Ok(Json(
        state
            .location_filters
            .set_radius(&user.id, body.radius_km)
            .await?,
    ))
}

pub async fn reset_filter(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<LocationFilter>, AppError> {
    Ok(Json(state.location_filters.reset(&user.id).await?))
}
