use serde::{Deserialize, Serialize};

/// Experience level carried by projects (`any|beginner|experienced`) and
/// profiles (`any|junior|intermediate|senior`). Unknown values read as `Any`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    Beginner,
    Experienced,
    Junior,
    Intermediate,
    Senior,
    // serde only accepts `other` on the last variant.
    #[default]
    #[serde(other)]
    Any,
}

impl ExperienceLevel {
    pub fn parse(input: &str) -> Self {
        match input.trim().to_lowercase().as_str() {
            "beginner" => ExperienceLevel::Beginner,
            "experienced" => ExperienceLevel::Experienced,
            "junior" => ExperienceLevel::Junior,
            "intermediate" => ExperienceLevel::Intermediate,
            "senior" => ExperienceLevel::Senior,
            _ => ExperienceLevel::Any,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Any => "any",
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Experienced => "experienced",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Senior => "senior",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_levels_read_as_any() {
        let level: ExperienceLevel = serde_json::from_str(r#""wizard""#).unwrap();
        assert_eq!(level, ExperienceLevel::Any);
        let level: ExperienceLevel = serde_json::from_str(r#""senior""#).unwrap();
        assert_eq!(level, ExperienceLevel::Senior);
        assert_eq!(serde_json::to_string(&ExperienceLevel::Any).unwrap(), r#""any""#);
    }
}
