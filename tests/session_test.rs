mod common;

use fitplan::db::repository;
use fitplan::models::{CachedMatch, Difficulty, Goal, Location, ProgressRecord, Selection};
use fitplan::services::Landing;

use common::{fixture, seed_program};

#[tokio::test]
async fn test_new_user_is_created_and_onboarded() {
    let f = fixture().await;

    let (ctx, landing) = f.state.bootstrap().bootstrap("tg-5555").await.expect("bootstrap");
    assert_eq!(landing, Landing::Onboarding);
    assert_eq!(ctx.session_key, "tg-5555");
    assert_ne!(ctx.user_id, f.ctx.user_id);
    assert_eq!(f.api.call_count("create_user"), 1);

    let (again, _) = f.state.bootstrap().bootstrap("tg-5555").await.expect("bootstrap");
    assert_eq!(again.user_id, ctx.user_id);
    assert_eq!(f.api.call_count("create_user"), 1);
}

#[tokio::test]
async fn test_cached_match_wins_over_progress() {
    let f = fixture().await;
    let (program, _) = seed_program(&f.api, 2);
    let (other, other_workouts) = seed_program(&f.api, 2);
    f.api.seed_progress(ProgressRecord {
        id: 0,
        user_id: f.ctx.user_id,
        program_id: other.id,
        workout_id: other_workouts[0].id,
        is_completed: true,
        completed_at: None,
    });
    repository::save_match(
        &f.state.db,
        &f.ctx.session_key,
        &CachedMatch {
            selection: Selection::new(Difficulty::Beginner, Goal::WeightLoss, Location::Home),
            program_id: program.id,
            program_name: program.name.clone(),
        },
    )
    .await
    .expect("save");

    let (ctx, landing) = f
        .state
        .bootstrap()
        .bootstrap(&f.ctx.session_key)
        .await
        .expect("bootstrap");
    assert_eq!(ctx, f.ctx);
    assert_eq!(landing, Landing::Tracker { program_id: program.id });
    assert_eq!(f.api.call_count("list_progress"), 0);
}

#[tokio::test]
async fn test_existing_progress_resumes_its_program() {
    let f = fixture().await;
    let (program, workouts) = seed_program(&f.api, 2);
    f.api.seed_progress(ProgressRecord {
        id: 0,
        user_id: f.ctx.user_id,
        program_id: program.id,
        workout_id: workouts[1].id,
        is_completed: false,
        completed_at: None,
    });

    let (_, landing) = f
        .state
        .bootstrap()
        .bootstrap(&f.ctx.session_key)
        .await
        .expect("bootstrap");
    assert_eq!(landing, Landing::Tracker { program_id: program.id });
}
