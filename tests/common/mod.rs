#![allow(dead_code)]

use std::sync::Arc;

use fitplan::client::InMemoryFitnessApi;
use fitplan::db;
use fitplan::models::{
    Difficulty, Exercise, Goal, Location, Program, SessionContext, Workout,
};
use fitplan::state::AppState;

pub struct Fixture {
    pub api: Arc<InMemoryFitnessApi>,
    pub state: AppState,
    pub ctx: SessionContext,
}

pub async fn fixture() -> Fixture {
    let api = Arc::new(InMemoryFitnessApi::new());
    let pool = db::connect_in_memory()
        .await
        .expect("Failed to create test db");
    let state = AppState::new(pool, api.clone());
    let user = api.add_user("tg-1001");
    let ctx = SessionContext::new(user.id, "tg-1001");
    Fixture { api, state, ctx }
}

pub fn program(name: &str, difficulty: Difficulty, goal: Goal, location: Location) -> Program {
    Program {
        id: 0,
        name: name.to_string(),
        description: Some(format!("{} plan", name)),
        difficulty,
        goal,
        location,
        workouts: Vec::new(),
    }
}

pub fn workout(program_id: i64, day_number: i32, title: &str) -> Workout {
    Workout {
        id: 0,
        program_id,
        day_number,
        title: title.to_string(),
        description: None,
        exercises: vec![
            Exercise {
                id: 0,
                workout_id: 0,
                name: "Squat".to_string(),
                sets: 4,
                reps: "10-12".to_string(),
                rest_time: 90,
                description: Some("Keep the back straight".to_string()),
            },
            Exercise {
                id: 0,
                workout_id: 0,
                name: "Plank".to_string(),
                sets: 3,
                reps: "45s".to_string(),
                rest_time: 60,
                description: None,
            },
        ],
    }
}

/// A beginner home program with `days` workouts, returned with its days.
pub fn seed_program(api: &InMemoryFitnessApi, days: i32) -> (Program, Vec<Workout>) {
    let program = api.add_program(program(
        "Home Start",
        Difficulty::Beginner,
        Goal::WeightLoss,
        Location::Home,
    ));
    let workouts = (1..=days)
        .map(|day| api.add_workout(workout(program.id, day, &format!("Day {} circuit", day))))
        .collect();
    (program, workouts)
}
