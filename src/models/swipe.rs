use serde::{Deserialize, Serialize};

use super::{Project, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Left,
    Right,
}

impl SwipeDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    Project,
    Profile,
}

impl TargetKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TargetKind::Project => "project",
            TargetKind::Profile => "profile",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwipeRecord {
    pub id: String,
    pub actor_profile_id: String,
    pub target_id: String,
    pub target_kind: TargetKind,
    pub direction: SwipeDirection,
    pub created_at: String,
}

impl SwipeRecord {
    pub fn new(
        actor_profile_id: &str,
        target_id: &str,
        target_kind: TargetKind,
        direction: SwipeDirection,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            actor_profile_id: actor_profile_id.to_string(),
            target_id: target_id.to_string(),
            target_kind,
            direction,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "item", rename_all = "lowercase")]
pub enum Candidate {
    Project(Project),
    Profile(UserProfile),
}

impl Candidate {
    pub fn id(&self) -> &str {
        match self {
            Candidate::Project(p) => &p.id,
            Candidate::Profile(p) => &p.id,
        }
    }

    pub fn target_kind(&self) -> TargetKind {
        match self {
            Candidate::Project(_) => TargetKind::Project,
            Candidate::Profile(_) => TargetKind::Profile,
        }
    }
}
