use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};

use crate::error::AppError;
use crate::models::AppointmentRow;
use crate::services::appointment_service::{self, AppointmentRequest};
use crate::web::middleware::auth::AuthenticatedUser;
use crate::web::AppState;

pub async fn list_appointments(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<AppointmentRow>>, AppError> {
    Ok(Json(
        appointment_service::list_upcoming(&state.pool, &user.id, chrono::Utc::now()).await?,
    ))
}

pub async fn create_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(req): Json<AppointmentRequest>,
) -> Result<(StatusCode, Json<AppointmentRow>), AppError> {
    let row = appointment_service::create_appointment(&state.pool, &user.id, req).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

pub async fn cancel_appointment(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(appointment_id): Path<String>,
) -> Result<StatusCode, AppError> {
    appointment_service::cancel_appointment(&state.pool, &appointment_id, &user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
