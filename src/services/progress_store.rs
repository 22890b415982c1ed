use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::FitnessApi;
use crate::error::AppError;
use crate::models::{CompletionState, NewProgressRequest, ProgressRecord, SessionContext};

/// Hook invoked when more than one progress record exists for the same
/// (user, workout) pair.
pub trait ProgressReconciler: Send + Sync {
    fn on_duplicates(&self, user_id: i64, workout_id: i64, records: &[ProgressRecord]);
}

/// Default hook: report and keep using the first record.
pub struct LogDuplicates;

impl ProgressReconciler for LogDuplicates {
    fn on_duplicates(&self, user_id: i64, workout_id: i64, records: &[ProgressRecord]) {
        let ids: Vec<i64> = records.iter().map(|r| r.id).collect();
        warn!(
            "Duplicate progress records for user {} workout {}: {:?}",
            user_id, workout_id, ids
        );
    }
}

#[derive(Clone)]
pub struct ProgressStore {
    api: Arc<dyn FitnessApi>,
    reconciler: Arc<dyn ProgressReconciler>,
}

impl ProgressStore {
    pub fn new(api: Arc<dyn FitnessApi>) -> Self {
        Self {
            api,
            reconciler: Arc::new(LogDuplicates),
        }
    }

    pub fn with_reconciler(mut self, reconciler: Arc<dyn ProgressReconciler>) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub async fn list(&self, ctx: &SessionContext) -> Result<Vec<ProgressRecord>, AppError> {
        self.api.list_progress(ctx.user_id).await
    }

    /// Records of the user that belong to `program_id`.
    pub async fn list_for_program(
        &self,
        ctx: &SessionContext,
        program_id: i64,
    ) -> Result<Vec<ProgressRecord>, AppError> {
        let records = self.list(ctx).await?;
        Ok(records
            .into_iter()
            .filter(|r| r.program_id == program_id)
            .collect())
    }

    /// Completion of one workout; no record means incomplete.
    pub async fn load_status(
        &self,
        ctx: &SessionContext,
        workout_id: i64,
    ) -> Result<CompletionState, AppError> {
        let records = self.list(ctx).await?;
        let state = match self.find_record(ctx, &records, workout_id) {
            Some(record) => CompletionState::from_flag(record.is_completed),
            None => CompletionState::Incomplete,
        };
        debug!("status of workout {} for user {}: {:?}", workout_id, ctx.user_id, state);
        Ok(state)
    }

    /// Sets the completion flag through an upsert by lookup.
    ///
    /// The progress collection is re-fetched so the update never targets a
    /// stale record id. Without a record, one is created incomplete and then
    /// updated to `target`. Two concurrent callers can both take the create
    /// branch; the resulting duplicate is left to the reconciliation hook.
    pub async fn set_completion(
        &self,
        ctx: &SessionContext,
        workout_id: i64,
        program_id: i64,
        target: bool,
    ) -> Result<ProgressRecord, AppError> {
        let records = self.list(ctx).await?;

        let record_id = match self.find_record(ctx, &records, workout_id) {
            Some(existing) => existing.id,
            None => {
                let req = NewProgressRequest {
                    user_id: ctx.user_id,
                    program_id,
                    workout_id,
                    is_completed: false,
                };
                let created = self.api.create_progress(&req).await?;
                info!(
                    "Created progress record {} for user {} workout {}",
                    created.id, ctx.user_id, workout_id
                );
                created.id
            }
        };

        let updated = self.api.update_progress_completion(record_id, target).await?;
        if updated.is_completed != target {
            return Err(AppError::MalformedResponse(format!(
                "progress {} reported is_completed={} after update to {}",
                updated.id, updated.is_completed, target
            )));
        }
        Ok(updated)
    }

    fn find_record<'a>(
        &self,
        ctx: &SessionContext,
        records: &'a [ProgressRecord],
        workout_id: i64,
    ) -> Option<&'a ProgressRecord> {
        let matching: Vec<ProgressRecord> = records
            .iter()
            .filter(|r| r.user_id == ctx.user_id && r.workout_id == workout_id)
            .cloned()
            .collect();
        if matching.len() > 1 {
            self.reconciler.on_duplicates(ctx.user_id, workout_id, &matching);
        }
        records
            .iter()
            .find(|r| r.user_id == ctx.user_id && r.workout_id == workout_id)
    }
}
