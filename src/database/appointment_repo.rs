use sqlx::SqlitePool;

use crate::models::AppointmentRow;

pub struct NewAppointment<'a> {
    pub id: &'a str,
    pub organizer_user_id: &'a str,
    pub participant_user_id: &'a str,
    pub title: &'a str,
    pub starts_at: &'a str,
    pub ends_at: &'a str,
}

const SQL_INSERT_APPOINTMENT: &str = r#"
INSERT INTO appointments (
  id,
  organizer_user_id,
  participant_user_id,
  title,
  starts_at,
  ends_at
) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
"#;

const SQL_LIST_UPCOMING: &str = r#"
SELECT id, organizer_user_id, participant_user_id, title, starts_at, ends_at, status
FROM appointments
WHERE (organizer_user_id = ?1 OR participant_user_id = ?1)
    AND status = 'scheduled'
    AND ends_at >= ?2
ORDER BY starts_at ASC
"#;

const SQL_CANCEL_APPOINTMENT: &str = r#"
UPDATE appointments
SET status = 'cancelled'
WHERE id = ?1 AND organizer_user_id = ?2 AND status = 'scheduled'
"#;

pub async fn insert_appointment(pool: &SqlitePool, a: NewAppointment<'_>) -> sqlx::Result<()> {
    sqlx::query(SQL_INSERT_APPOINTMENT)
        .bind(a.id)
        .bind(a.organizer_user_id)
        .bind(a.participant_user_id)
        .bind(a.title)
        .bind(a.starts_at)
        .bind(a.ends_at)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn list_upcoming(
    pool: &SqlitePool,
    user_id: &str,
    now: &str,
) -> sqlx::Result<Vec<AppointmentRow>> {
    sqlx::query_as::<_, AppointmentRow>(SQL_LIST_UPCOMING)
        .bind(user_id)
        .bind(now)
        .fetch_all(pool)
        .await
}

pub async fn cancel_appointment(
    pool: &SqlitePool,
    appointment_id: &str,
    organizer_user_id: &str,
) -> sqlx::Result<u64> {
    let result = sqlx::query(SQL_CANCEL_APPOINTMENT)
        .bind(appointment_id)
        .bind(organizer_user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
