use serde::{Deserialize, Serialize};

use super::ExperienceLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Seeker,
    Investor,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Seeker => "seeker",
            Role::Investor => "investor",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "owner" => Some(Role::Owner),
            "seeker" => Some(Role::Seeker),
            "investor" => Some(Role::Investor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub user_id: String,
    pub full_name: Option<String>,
    pub role: String,
    pub sector: Option<String>,
    pub skills: String,
    pub experience_level: String,
    pub availability: Option<String>,
    pub city: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_verified: i64,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub experience_level: ExperienceLevel,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            id: row.id,
            user_id: row.user_id,
            full_name: row.full_name,
            // The role column is constrained by the schema; seekers are the safe default.
            role: Role::parse(&row.role).unwrap_or(Role::Seeker),
            sector: row.sector,
            skills: serde_json::from_str(&row.skills).unwrap_or_default(),
            experience_level: ExperienceLevel::parse(&row.experience_level),
            availability: row.availability,
            city: row.city,
            latitude: row.latitude,
            longitude: row.longitude,
            is_verified: row.is_verified != 0,
            bio: row.bio,
            distance_km: None,
        }
    }
}
