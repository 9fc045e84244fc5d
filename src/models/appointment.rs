use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AppointmentRow {
    pub id: String,
    pub organizer_user_id: String,
    pub participant_user_id: String,
    pub title: String,
    pub starts_at: String,
    pub ends_at: String,
    pub status: String,
}
