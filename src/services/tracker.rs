use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use crate::client::FitnessApi;
use crate::error::AppError;
use crate::models::{ProgressRecord, SessionContext, Workout};
use crate::scope::ScopeHandle;
use crate::services::ProgressStore;

/// Orders workouts by day number; equal days keep their arrival order.
pub fn order_by_day(mut workouts: Vec<Workout>) -> Vec<Workout> {
    workouts.sort_by_key(|w| w.day_number);
    workouts
}

/// Ids of completed workouts of `program_id` that are part of `workouts`.
pub fn completed_set(records: &[ProgressRecord], program_id: i64, workouts: &[Workout]) -> BTreeSet<i64> {
    records
        .iter()
        .filter(|r| r.program_id == program_id && r.is_completed)
        .map(|r| r.workout_id)
        .filter(|id| workouts.iter().any(|w| w.id == *id))
        .collect()
}

/// Share of completed workouts in percent, rounded half up. Zero when the
/// program has no workouts.
pub fn completion_percent(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = completed.min(total);
    ((200 * completed + total) / (2 * total)) as u8
}

#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSummary {
    pub program_id: i64,
    pub workouts: Vec<Workout>,
    pub completed: BTreeSet<i64>,
    pub percent: u8,
}

impl TrackerSummary {
    pub fn is_completed(&self, workout_id: i64) -> bool {
        self.completed.contains(&workout_id)
    }

    /// Day cards in display order with their completion flag.
    pub fn days(&self) -> impl Iterator<Item = (&Workout, bool)> + '_ {
        self.workouts.iter().map(|w| (w, self.is_completed(w.id)))
    }
}

/// Progress screen of one program.
pub struct TrackerAggregator {
    api: Arc<dyn FitnessApi>,
    progress: ProgressStore,
    scope: ScopeHandle,
    program_id: i64,
    summary: Option<TrackerSummary>,
}

impl TrackerAggregator {
    pub fn new(
        api: Arc<dyn FitnessApi>,
        progress: ProgressStore,
        scope: ScopeHandle,
        program_id: i64,
    ) -> Self {
        Self {
            api,
            progress,
            scope,
            program_id,
            summary: None,
        }
    }

    pub fn program_id(&self) -> i64 {
        self.program_id
    }

    pub fn summary(&self) -> Option<&TrackerSummary> {
        self.summary.as_ref()
    }

    /// Loads the workout list and the user's progress.
    pub async fn load(&mut self, ctx: &SessionContext) -> Result<&TrackerSummary, AppError> {
        let program_id = self.program_id;
        let (workouts, records) = self
            .scope
            .run(async {
                tokio::try_join!(
                    self.api.list_program_workouts(program_id),
                    self.progress.list_for_program(ctx, program_id),
                )
            })
            .await?;
        self.scope.ensure_active()?;

        let workouts = order_by_day(workouts);
        let completed = completed_set(&records, program_id, &workouts);
        let percent = completion_percent(completed.len(), workouts.len());
        info!(
            "tracker for program {}: {}/{} days complete ({}%)",
            program_id,
            completed.len(),
            workouts.len(),
            percent
        );

        Ok(&*self.summary.insert(TrackerSummary {
            program_id,
            workouts,
            completed,
            percent,
        }))
    }

    /// Re-syncs completion after returning from a detail view. The workout
    /// list is kept as loaded.
    pub async fn refresh_progress(&mut self, ctx: &SessionContext) -> Result<&TrackerSummary, AppError> {
        if self.summary.is_none() {
            return self.load(ctx).await;
        }

        let program_id = self.program_id;
        let records = self
            .scope
            .run(self.progress.list_for_program(ctx, program_id))
            .await?;
        self.scope.ensure_active()?;

        let summary = self.summary.as_mut().ok_or(AppError::NotFound)?;
        summary.completed = completed_set(&records, program_id, &summary.workouts);
        summary.percent = completion_percent(summary.completed.len(), summary.workouts.len());
        debug!("progress refreshed for program {}: {}%", program_id, summary.percent);
        Ok(&*summary)
    }

    /// Payload handed to the detail view when a day is opened.
    pub fn open_day(&self, workout_id: i64) -> Option<Workout> {
        self.summary
            .as_ref()?
            .workouts
            .iter()
            .find(|w| w.id == workout_id)
            .cloned()
    }
}
