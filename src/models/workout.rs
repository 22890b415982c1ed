use serde::{Deserialize, Serialize};

/// One training day of a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub program_id: i64,
    pub day_number: i32,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub workout_id: i64,
    pub name: String,
    pub sets: i32,
    pub reps: String,
    pub rest_time: i32,
    #[serde(default)]
    pub description: Option<String>,
}

/// Result of a workout lookup by id. The collaborator may answer with the
/// record itself or with a collection that has to be searched.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum WorkoutLookup {
    Single(Workout),
    Collection(Vec<Workout>),
}

impl WorkoutLookup {
    pub fn resolve(self, workout_id: i64) -> Option<Workout> {
        match self {
            WorkoutLookup::Single(workout) if workout.id == workout_id => Some(workout),
            WorkoutLookup::Single(_) => None,
            WorkoutLookup::Collection(workouts) => {
                workouts.into_iter().find(|w| w.id == workout_id)
            }
        }
    }
}
