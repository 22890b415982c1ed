use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Completion flag for one (user, workout) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub id: i64,
    pub user_id: i64,
    pub program_id: i64,
    pub workout_id: i64,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub completed_at: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProgressRequest {
    pub user_id: i64,
    pub program_id: i64,
    pub workout_id: i64,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionUpdate {
    pub is_completed: bool,
}

/// Completion state of a workout as seen by the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionState {
    Unknown,
    Complete,
    Incomplete,
    Toggling { from: bool, to: bool },
}

impl CompletionState {
    pub fn from_flag(is_completed: bool) -> Self {
        if is_completed {
            CompletionState::Complete
        } else {
            CompletionState::Incomplete
        }
    }

    /// Settled boolean value, if any.
    pub fn as_flag(&self) -> Option<bool> {
        match self {
            CompletionState::Complete => Some(true),
            CompletionState::Incomplete => Some(false),
            CompletionState::Unknown | CompletionState::Toggling { .. } => None,
        }
    }
}
