mod common;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fitplan::error::AppError;
use fitplan::models::{CompletionState, ProgressRecord};
use fitplan::scope::ViewScope;
use fitplan::services::{ProgressReconciler, ProgressStore};

use common::{fixture, seed_program};

#[derive(Default)]
struct RecordingReconciler {
    seen: Mutex<Vec<(i64, i64, usize)>>,
}

impl ProgressReconciler for RecordingReconciler {
    fn on_duplicates(&self, user_id: i64, workout_id: i64, records: &[ProgressRecord]) {
        self.seen
            .lock()
            .expect("lock")
            .push((user_id, workout_id, records.len()));
    }
}

#[tokio::test]
async fn test_status_without_record_is_incomplete() {
    let f = fixture().await;
    let (_, workouts) = seed_program(&f.api, 3);

    let state = f
        .state
        .progress
        .load_status(&f.ctx, workouts[0].id)
        .await
        .expect("status");
    assert_eq!(state, CompletionState::Incomplete);
}

#[tokio::test]
async fn test_first_toggle_creates_exactly_one_record() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 3);
    let workout_id = workouts[1].id;

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workout_id, program.id, CompletionState::Incomplete);

    let done = toggle.toggle(&f.ctx).await.expect("toggle");
    assert!(done);
    assert_eq!(toggle.state(), CompletionState::Complete);

    let records = f.api.progress_for(f.ctx.user_id, workout_id);
    assert_eq!(records.len(), 1);
    assert!(records[0].is_completed);
    assert_eq!(records[0].program_id, program.id);
    assert_eq!(f.api.call_count("create_progress"), 1);
    assert_eq!(f.api.call_count("update_progress_completion"), 1);
}

#[tokio::test]
async fn test_double_toggle_restores_value_with_one_record() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 2);
    let workout_id = workouts[0].id;

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workout_id, program.id, CompletionState::Unknown);

    assert!(toggle.toggle(&f.ctx).await.expect("first toggle"));
    assert!(!toggle.toggle(&f.ctx).await.expect("second toggle"));
    assert_eq!(toggle.state(), CompletionState::Incomplete);

    let records = f.api.progress_for(f.ctx.user_id, workout_id);
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_completed);
    assert_eq!(f.api.call_count("create_progress"), 1);
}

#[tokio::test]
async fn test_toggle_updates_existing_record_in_place() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 2);
    let workout_id = workouts[0].id;
    let seeded = f.api.seed_progress(ProgressRecord {
        id: 0,
        user_id: f.ctx.user_id,
        program_id: program.id,
        workout_id,
        is_completed: true,
        completed_at: None,
    });

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workout_id, program.id, CompletionState::Unknown);

    let done = toggle.toggle(&f.ctx).await.expect("toggle");
    assert!(!done);

    let records = f.api.progress_for(f.ctx.user_id, workout_id);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, seeded.id);
    assert!(!records[0].is_completed);
    assert_eq!(f.api.call_count("create_progress"), 0);
}

#[tokio::test]
async fn test_failed_update_reverts_to_previous_value() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 2);
    let workout_id = workouts[0].id;
    f.api.fail("update_progress_completion");

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workout_id, program.id, CompletionState::Incomplete);

    let err = toggle.toggle(&f.ctx).await.expect_err("update fails");
    assert_eq!(err.user_message(), "Service unavailable");
    assert_eq!(toggle.state(), CompletionState::Incomplete);

    // The create step already ran; the stray record stays incomplete.
    let records = f.api.progress_for(f.ctx.user_id, workout_id);
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_completed);

    // Retry is up to the user and reuses the record.
    f.api.recover("update_progress_completion");
    assert!(toggle.toggle(&f.ctx).await.expect("retry"));
    assert_eq!(f.api.progress_for(f.ctx.user_id, workout_id).len(), 1);
}

#[tokio::test]
async fn test_failed_lookup_commits_nothing() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 2);
    f.api.fail("list_progress");

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workouts[0].id, program.id, CompletionState::Complete);

    assert!(toggle.toggle(&f.ctx).await.is_err());
    assert_eq!(toggle.state(), CompletionState::Complete);
    assert_eq!(f.api.call_count("update_progress_completion"), 0);
}

#[tokio::test]
async fn test_toggling_state_is_published_before_confirmation() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 1);
    f.api.set_latency(Some(Duration::from_millis(30)));

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workouts[0].id, program.id, CompletionState::Incomplete);
    let mut rx = toggle.subscribe();

    let observer = tokio::spawn(async move {
        let mut seen = Vec::new();
        while rx.changed().await.is_ok() {
            let state = *rx.borrow_and_update();
            seen.push(state);
            if state == CompletionState::Complete {
                break;
            }
        }
        seen
    });

    assert!(toggle.toggle(&f.ctx).await.expect("toggle"));
    let seen = observer.await.expect("observer");
    assert_eq!(
        seen,
        vec![
            CompletionState::Toggling { from: false, to: true },
            CompletionState::Complete,
        ]
    );
}

#[tokio::test]
async fn test_abandoned_view_commits_nothing() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 1);

    let scope = ViewScope::new();
    let mut toggle = f
        .state
        .toggle(scope.handle(), workouts[0].id, program.id, CompletionState::Incomplete);
    scope.cancel();

    let err = toggle.toggle(&f.ctx).await.expect_err("view gone");
    assert!(matches!(err, AppError::Cancelled));
    assert_eq!(toggle.state(), CompletionState::Incomplete);
    assert_eq!(f.api.call_count("list_progress"), 0);
}

#[tokio::test]
async fn test_duplicates_are_reported_and_first_record_wins() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 1);
    let workout_id = workouts[0].id;
    for is_completed in [true, false] {
        f.api.seed_progress(ProgressRecord {
            id: 0,
            user_id: f.ctx.user_id,
            program_id: program.id,
            workout_id,
            is_completed,
            completed_at: None,
        });
    }

    let reconciler = Arc::new(RecordingReconciler::default());
    let store = ProgressStore::new(f.api.clone()).with_reconciler(reconciler.clone());

    let state = store.load_status(&f.ctx, workout_id).await.expect("status");
    assert_eq!(state, CompletionState::Complete);

    let seen = reconciler.seen.lock().expect("lock").clone();
    assert_eq!(seen, vec![(f.ctx.user_id, workout_id, 2)]);
}

#[tokio::test]
async fn test_concurrent_first_toggles_may_duplicate() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 1);
    let workout_id = workouts[0].id;
    f.api.set_latency(Some(Duration::from_millis(10)));

    let store = f.state.progress.clone();
    let (a, b) = tokio::join!(
        store.set_completion(&f.ctx, workout_id, program.id, true),
        store.set_completion(&f.ctx, workout_id, program.id, true),
    );
    assert!(a.expect("first").is_completed);
    assert!(b.expect("second").is_completed);

    let records = f.api.progress_for(f.ctx.user_id, workout_id);
    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.is_completed));
}
