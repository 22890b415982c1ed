use serde::{Deserialize, Serialize};

use super::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    WeightLoss,
    MuscleGain,
    Endurance,
    Flexibility,
}

impl Goal {
    pub fn as_str(&self) -> &'static str {
        match self {
            Goal::WeightLoss => "weight_loss",
            Goal::MuscleGain => "muscle_gain",
            Goal::Endurance => "endurance",
            Goal::Flexibility => "flexibility",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    Home,
    Gym,
    Street,
}

impl Location {
    pub fn as_str(&self) -> &'static str {
        match self {
            Location::Home => "home",
            Location::Gym => "gym",
            Location::Street => "street",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub goal: Goal,
    pub location: Location,
    #[serde(default)]
    pub workouts: Vec<Workout>,
}

/// Query filters accepted by the program listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProgramFilter {
    pub search: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub goal: Option<Goal>,
    pub location: Option<Location>,
    pub gender: Option<String>,
    pub health_restriction: Option<String>,
    pub program_preference: Option<String>,
}

impl ProgramFilter {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(search) = &self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(difficulty) = self.difficulty {
            pairs.push(("difficulty", difficulty.as_str().to_string()));
        }
        if let Some(goal) = self.goal {
            pairs.push(("goal", goal.as_str().to_string()));
        }
        if let Some(location) = self.location {
            pairs.push(("location", location.as_str().to_string()));
        }
        if let Some(gender) = &self.gender {
            pairs.push(("gender", gender.clone()));
        }
        if let Some(restriction) = &self.health_restriction {
            pairs.push(("health_restriction", restriction.clone()));
        }
        if let Some(preference) = &self.program_preference {
            pairs.push(("program_preference", preference.clone()));
        }
        pairs
    }
}
