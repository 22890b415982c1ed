use std::sync::Arc;

use tracing::{debug, warn};

use crate::client::FitnessApi;
use crate::error::AppError;
use crate::models::{CompletionState, Exercise, SessionContext, Workout};
use crate::scope::ScopeHandle;
use crate::services::ProgressStore;

/// Workout metadata with its exercises.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutContent {
    pub workout: Workout,
    pub exercises: Vec<Exercise>,
}

impl From<Workout> for WorkoutContent {
    fn from(mut workout: Workout) -> Self {
        let exercises = std::mem::take(&mut workout.exercises);
        Self { workout, exercises }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Ready {
        content: WorkoutContent,
        completion: CompletionState,
        status_error: Option<String>,
    },
    /// Terminal; the only way out is going back.
    NotFound,
    Failed {
        message: String,
    },
}

pub struct WorkoutDetailHydrator {
    api: Arc<dyn FitnessApi>,
    progress: ProgressStore,
    scope: ScopeHandle,
}

impl WorkoutDetailHydrator {
    pub fn new(api: Arc<dyn FitnessApi>, progress: ProgressStore, scope: ScopeHandle) -> Self {
        Self {
            api,
            progress,
            scope,
        }
    }

    /// Workout content from the caller's payload, or fetched when absent.
    pub async fn load_content(
        &self,
        workout_id: i64,
        payload: Option<Workout>,
    ) -> Result<WorkoutContent, AppError> {
        match payload {
            Some(workout) if workout.id == workout_id => {
                debug!("workout {} hydrated from navigation payload", workout_id);
                return Ok(WorkoutContent::from(workout));
            }
            Some(workout) => {
                warn!(
                    "ignoring payload for workout {} while opening {}",
                    workout.id, workout_id
                );
            }
            None => {}
        }

        self.scope.run(self.fetch_content(workout_id)).await
    }

    async fn fetch_content(&self, workout_id: i64) -> Result<WorkoutContent, AppError> {
        let exercises = match self.api.list_exercises(workout_id).await {
            Ok(exercises) => exercises,
            Err(AppError::MalformedResponse(detail)) => {
                warn!("exercise list of workout {} unreadable: {}", workout_id, detail);
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let mut workout = self
            .api
            .get_workout(workout_id)
            .await?
            .resolve(workout_id)
            .ok_or(AppError::NotFound)?;
        workout.exercises.clear();

        debug!("workout {} hydrated from server", workout_id);
        Ok(WorkoutContent { workout, exercises })
    }

    pub async fn load_status(
        &self,
        ctx: &SessionContext,
        workout_id: i64,
    ) -> Result<CompletionState, AppError> {
        self.scope.run(self.progress.load_status(ctx, workout_id)).await
    }

    /// Content and completion are hydrated independently and combined.
    pub async fn hydrate(
        &self,
        ctx: &SessionContext,
        workout_id: i64,
        payload: Option<Workout>,
    ) -> Result<DetailView, AppError> {
        let (content, status) = tokio::join!(
            self.load_content(workout_id, payload),
            self.load_status(ctx, workout_id),
        );
        self.scope.ensure_active()?;

        let content = match content {
            Ok(content) => content,
            Err(AppError::Cancelled) => return Err(AppError::Cancelled),
            Err(e) if e.is_not_found() => return Ok(DetailView::NotFound),
            Err(e) => {
                return Ok(DetailView::Failed {
                    message: e.user_message(),
                });
            }
        };

        let (completion, status_error) = match status {
            Ok(state) => (state, None),
            Err(AppError::Cancelled) => return Err(AppError::Cancelled),
            Err(e) => {
                warn!("completion status of workout {} unavailable: {}", workout_id, e);
                (CompletionState::Unknown, Some(e.user_message()))
            }
        };

        Ok(DetailView::Ready {
            content,
            completion,
            status_error,
        })
    }
}
