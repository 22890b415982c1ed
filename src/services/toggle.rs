use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::{CompletionState, SessionContext};
use crate::scope::ScopeHandle;
use crate::services::ProgressStore;

/// Completion checkbox of the detail view.
///
/// The published state only settles on a value the server confirmed. While a
/// mutation is in flight it reads `Toggling`; on failure it returns to the
/// value held before the toggle.
pub struct CompletionToggle {
    store: ProgressStore,
    scope: ScopeHandle,
    workout_id: i64,
    program_id: i64,
    state: watch::Sender<CompletionState>,
}

impl CompletionToggle {
    pub fn new(
        store: ProgressStore,
        scope: ScopeHandle,
        workout_id: i64,
        program_id: i64,
        initial: CompletionState,
    ) -> Self {
        let (state, _rx) = watch::channel(initial);
        Self {
            store,
            scope,
            workout_id,
            program_id,
            state,
        }
    }

    pub fn state(&self) -> CompletionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<CompletionState> {
        self.state.subscribe()
    }

    pub async fn load(&mut self, ctx: &SessionContext) -> Result<CompletionState, AppError> {
        let loaded = self
            .scope
            .run(self.store.load_status(ctx, self.workout_id))
            .await?;
        self.scope.ensure_active()?;
        self.state.send_replace(loaded);
        Ok(loaded)
    }

    /// Inverts the completion flag and returns the confirmed value.
    pub async fn toggle(&mut self, ctx: &SessionContext) -> Result<bool, AppError> {
        self.scope.ensure_active()?;
        let current = match self.state() {
            CompletionState::Unknown => self.load(ctx).await?,
            settled => settled,
        };
        let Some(from) = current.as_flag() else {
            return Err(AppError::InProgress);
        };
        let to = !from;

        self.state.send_replace(CompletionState::Toggling { from, to });

        let result = self
            .store
            .set_completion(ctx, self.workout_id, self.program_id, to)
            .await;

        if self.scope.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        match result {
            Ok(record) => {
                self.state
                    .send_replace(CompletionState::from_flag(record.is_completed));
                info!(
                    "workout {} marked {} for user {}",
                    self.workout_id,
                    if record.is_completed { "complete" } else { "incomplete" },
                    ctx.user_id
                );
                Ok(record.is_completed)
            }
            Err(e) => {
                warn!("toggle of workout {} failed: {}", self.workout_id, e);
                self.state.send_replace(CompletionState::from_flag(from));
                Err(e)
            }
        }
    }
}
