use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct FavoriteRow {
    pub project_id: String,
    pub title: Option<String>,
    pub created_at: String,
}
