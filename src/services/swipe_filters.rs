use serde::Deserialize;

use crate::models::ExperienceLevel;

/// Attribute filters shared by every swipe screen. Blank or `"all"` values
/// are inactive, so `SwipeFilters::default()` keeps everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwipeFilters {
    #[serde(default)]
    pub sector: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl SwipeFilters {
    pub fn sector(&self) -> Option<&str> {
        active(&self.sector)
    }

    pub fn duration(&self) -> Option<&str> {
        active(&self.duration)
    }

    pub fn stage(&self) -> Option<&str> {
        active(&self.stage)
    }
}

fn active(value: &Option<String>) -> Option<&str> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case("all"))
}

/// Experience filter key -> levels it accepts. `any` is the wildcard key.
pub const EXPERIENCE_LOOKUP: &[(&str, &[ExperienceLevel])] = &[
    ("any", &[]),
    (
        "beginner",
        &[ExperienceLevel::Beginner, ExperienceLevel::Junior],
    ),
    (
        "junior",
        &[ExperienceLevel::Junior, ExperienceLevel::Beginner],
    ),
    ("intermediate", &[ExperienceLevel::Intermediate]),
    (
        "experienced",
        &[ExperienceLevel::Experienced, ExperienceLevel::Senior],
    ),
    (
        "senior",
        &[ExperienceLevel::Senior, ExperienceLevel::Experienced],
    ),
];

/// Investor stage filter key -> project stages it accepts.
pub const STAGE_LOOKUP: &[(&str, &[&str])] = &[
    ("early", &["idea", "prototype"]),
    ("seed", &["mvp"]),
    ("growth", &["launched", "growth"]),
    ("scale", &["scaling"]),
];

pub fn matches_text(filter: Option<&str>, value: Option<&str>) -> bool {
    match filter {
        None => true,
        Some(f) => value.is_some_and(|v| v.trim().eq_ignore_ascii_case(f)),
    }
}

/// Any filter skill that is a case-insensitive substring of any item skill.
pub fn matches_skills(filter: &[String], skills: &[String]) -> bool {
    let wanted: Vec<String> = filter
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if wanted.is_empty() {
        return true;
    }
    skills.iter().any(|skill| {
        let skill = skill.to_lowercase();
        wanted.iter().any(|w| skill.contains(w.as_str()))
    })
}

pub fn experience_matches(filter: Option<&str>, level: ExperienceLevel) -> bool {
    let Some(key) = filter else {
        return true;
    };
    if level == ExperienceLevel::Any {
        return true;
    }
    let key = key.to_lowercase();
    match EXPERIENCE_LOOKUP.iter().find(|(k, _)| *k == key) {
        Some((_, accepted)) => accepted.is_empty() || accepted.contains(&level),
        None => true,
    }
}

pub fn stage_matches(filter: Option<&str>, stage: Option<&str>) -> bool {
    let (Some(key), Some(stage)) = (filter, stage) else {
        return true;
    };
    let key = key.to_lowercase();
    match STAGE_LOOKUP.iter().find(|(k, _)| *k == key) {
        Some((_, accepted)) => accepted.iter().any(|s| s.eq_ignore_ascii_case(stage.trim())),
        None => true,
    }
}
