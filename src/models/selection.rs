use serde::{Deserialize, Serialize};

use super::{Difficulty, Goal, Location, ProgramFilter};

/// Preferences submitted by the onboarding form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub difficulty: Difficulty,
    pub goal: Goal,
    pub location: Location,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_restriction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_preference: Option<String>,
}

impl Selection {
    pub fn new(difficulty: Difficulty, goal: Goal, location: Location) -> Self {
        Self {
            difficulty,
            goal,
            location,
            gender: None,
            health_restriction: None,
            program_preference: None,
        }
    }

    pub fn to_filter(&self) -> ProgramFilter {
        ProgramFilter {
            search: None,
            difficulty: Some(self.difficulty),
            goal: Some(self.goal),
            location: Some(self.location),
            gender: self.gender.clone(),
            health_restriction: self.health_restriction.clone(),
            program_preference: self.program_preference.clone(),
        }
    }
}

/// Last successful match persisted for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedMatch {
    pub selection: Selection,
    pub program_id: i64,
    pub program_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_carries_optional_fields_only_when_set() {
        let selection = Selection::new(Difficulty::Beginner, Goal::WeightLoss, Location::Home);
        let pairs = selection.to_filter().query_pairs();
        assert_eq!(
            pairs,
            vec![
                ("difficulty", "beginner".to_string()),
                ("goal", "weight_loss".to_string()),
                ("location", "home".to_string()),
            ]
        );

        let mut selection = selection;
        selection.health_restriction = Some("knees".to_string());
        let pairs = selection.to_filter().query_pairs();
        assert_eq!(pairs.len(), 4);
        assert_eq!(pairs[3], ("health_restriction", "knees".to_string()));
    }
}
