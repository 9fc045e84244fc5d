use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::database::appointment_repo;
use crate::error::AppError;
use crate::models::AppointmentRow;

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentRequest {
    pub participant_user_id: String,
    pub title: String,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

// Fixed-width UTC so stored timestamps compare correctly as text.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub async fn create_appointment(
    pool: &SqlitePool,
    organizer_user_id: &str,
    req: AppointmentRequest,
) -> Result<AppointmentRow, AppError> {
    let title = req.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Give the appointment a title.".to_string()));
    }
    if req.ends_at <= req.starts_at {
        return Err(AppError::Validation(
            "An appointment must end after it starts.".to_string(),
        ));
    }
    let participant = req.participant_user_id.trim();
    if participant.is_empty() || participant == organizer_user_id {
        return Err(AppError::Validation(
            "Pick someone else to meet with.".to_string(),
        ));
    }

    let row = AppointmentRow {
        id: Uuid::new_v4().to_string(),
        organizer_user_id: organizer_user_id.to_string(),
        participant_user_id: participant.to_string(),
        title: title.to_string(),
        starts_at: timestamp(req.starts_at),
        ends_at: timestamp(req.ends_at),
        status: "scheduled".to_string(),
    };
    appointment_repo::insert_appointment(
        pool,
        appointment_repo::NewAppointment {
            id: &row.id,
            organizer_user_id: &row.organizer_user_id,
            participant_user_id: &row.participant_user_id,
            title: &row.title,
            starts_at: &row.starts_at,
            ends_at: &row.ends_at,
        },
    )
    .await?;

    info!(appointment_id = %row.id, organizer = %organizer_user_id, "appointment_created");
    Ok(row)
}

pub async fn list_upcoming(
    pool: &SqlitePool,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<Vec<AppointmentRow>, AppError> {
    Ok(appointment_repo::list_upcoming(pool, user_id, &timestamp(now)).await?)
}

pub async fn cancel_appointment(
    pool: &SqlitePool,
    appointment_id: &str,
    user_id: &str,
) -> Result<(), AppError> {
    match appointment_repo::cancel_appointment(pool, appointment_id, user_id).await? {
        0 => Err(AppError::NotFound("appointment")),
        _ => {
            info!(appointment_id = %appointment_id, "appointment_cancelled");
            Ok(())
        }
    }
}
