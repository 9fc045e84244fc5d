use serde::{Deserialize, Serialize};

use super::ExperienceLevel;

// Raw row; skills are stored as a JSON array in TEXT.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectRow {
    pub id: String,
    pub owner_profile_id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub required_skills: String,
    pub experience_level: String,
    pub collaboration_type: Option<String>,
    pub duration: Option<String>,
    pub stage: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub owner_profile_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub collaboration_type: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<ProjectRow> for Project {
    fn from(row: ProjectRow) -> Self {
        Project {
            id: row.id,
            owner_profile_id: row.owner_profile_id,
            title: row.title,
            description: row.description,
            category: row.category,
            required_skills: serde_json::from_str(&row.required_skills).unwrap_or_default(),
            experience_level: ExperienceLevel::parse(&row.experience_level),
            collaboration_type: row.collaboration_type,
            duration: row.duration,
            stage: row.stage,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            is_verified: row.is_verified != 0,
            distance_km: None,
        }
    }
}

// Projects that have a city but were never geocoded.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProjectGeoCandidateRow {
    pub id: String,
    pub title: String,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
