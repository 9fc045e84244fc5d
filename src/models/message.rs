use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MessageRow {
    pub id: String,
    pub sender_profile_id: String,
    pub recipient_profile_id: String,
    pub content: String,
    pub created_at: String,
}
