use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The free-text parts of a candidate profile used for matching.
#[derive(Debug, Clone, Default, Serialize, Deserialize, FromRow)]
pub struct CandidateProfile {
    pub skills: Option<String>,
    pub experience: Option<String>,
    pub location_preference: Option<String>,
}

impl CandidateProfile {
    /// True when the profile carries skills or experience. Location alone is
    /// not enough to generate stored recommendations.
    pub fn has_matchable_content(&self) -> bool {
        is_filled(&self.skills) || is_filled(&self.experience)
    }

    /// True when both skills and experience are present.
    pub fn is_complete(&self) -> bool {
        is_filled(&self.skills) && is_filled(&self.experience)
    }
}

pub(crate) fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_fields_are_not_matchable() {
        let profile = CandidateProfile {
            skills: Some("   ".to_string()),
            experience: None,
            location_preference: Some("Kuala Lumpur".to_string()),
        };
        assert!(!profile.has_matchable_content());
        assert!(!profile.is_complete());
    }

    #[test]
    fn test_skills_only_is_matchable_but_incomplete() {
        let profile = CandidateProfile {
            skills: Some("rust".to_string()),
            ..Default::default()
        };
        assert!(profile.has_matchable_content());
        assert!(!profile.is_complete());
    }
}
