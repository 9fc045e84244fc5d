use serde::Serialize;

// Match row plus the profile on the other side (project owner for project targets).
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MatchRow {
    pub id: String,
    pub actor_profile_id: String,
    pub target_id: String,
    pub target_kind: String,
    pub status: String,
    pub created_at: String,
    pub counterpart_profile_id: Option<String>,
}

impl MatchRow {
    pub fn is_matched(&self) -> bool {
        self.status == "matched"
    }
}
