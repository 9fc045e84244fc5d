use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct CallHistoryRow {
    pub call_id: String,
    pub caller_user_id: String,
    pub participant_user_id: String,
    pub started_at: String,
    pub ended_at: Option<String>,
    pub status: String,
}
