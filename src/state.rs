use std::sync::Arc;

use sqlx::SqlitePool;

use crate::client::FitnessApi;
use crate::models::CompletionState;
use crate::scope::ScopeHandle;
use crate::services::{
    CompletionToggle, ProgramMatcher, ProgressStore, SessionBootstrap, TrackerAggregator,
    WorkoutDetailHydrator,
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub api: Arc<dyn FitnessApi>,
    pub progress: ProgressStore,
}

impl AppState {
    pub fn new(db: SqlitePool, api: Arc<dyn FitnessApi>) -> Self {
        let progress = ProgressStore::new(api.clone());
        Self { db, api, progress }
    }

    pub fn bootstrap(&self) -> SessionBootstrap {
        SessionBootstrap::new(self.api.clone(), self.db.clone())
    }

    pub fn matcher(&self, scope: ScopeHandle) -> ProgramMatcher {
        ProgramMatcher::new(self.api.clone(), self.db.clone(), scope)
    }

    pub fn tracker(&self, scope: ScopeHandle, program_id: i64) -> TrackerAggregator {
        TrackerAggregator::new(self.api.clone(), self.progress.clone(), scope, program_id)
    }

    pub fn hydrator(&self, scope: ScopeHandle) -> WorkoutDetailHydrator {
        WorkoutDetailHydrator::new(self.api.clone(), self.progress.clone(), scope)
    }

    pub fn toggle(
        &self,
        scope: ScopeHandle,
        workout_id: i64,
        program_id: i64,
        initial: CompletionState,
    ) -> CompletionToggle {
        CompletionToggle::new(self.progress.clone(), scope, workout_id, program_id, initial)
    }
}
