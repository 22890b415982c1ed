use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fitplan::client::{ApiConfig, HttpFitnessApi};
use fitplan::db;
use fitplan::error::AppError;
use fitplan::models::Selection;
use fitplan::scope::ViewScope;
use fitplan::services::{Landing, MatchOutcome};
use fitplan::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "fitplan=debug".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let external_id = std::env::var("FITPLAN_EXTERNAL_ID")
        .map_err(|_| AppError::Config("FITPLAN_EXTERNAL_ID is not set".to_string()))?;

    let pool = db::connect(&db::database_url_from_env()).await?;
    let api = Arc::new(HttpFitnessApi::new(ApiConfig::new_from_env()?)?);
    let state = AppState::new(pool, api);

    let (ctx, landing) = state.bootstrap().bootstrap(&external_id).await?;

    let program_id = match landing {
        Landing::Tracker { program_id } => program_id,
        Landing::Onboarding => {
            let Some(selection) = selection_from_env()? else {
                info!("no program selected yet; set FITPLAN_DIFFICULTY, FITPLAN_GOAL and FITPLAN_LOCATION");
                return Ok(());
            };
            let scope = ViewScope::new();
            match state.matcher(scope.handle()).match_program(&ctx, &selection).await {
                Ok(MatchOutcome::Matched(program)) => program.id,
                Ok(MatchOutcome::NoMatch) => {
                    warn!("no program matches this selection, try different preferences");
                    return Ok(());
                }
                Err(e) => {
                    warn!("{}", e.user_message());
                    return Ok(());
                }
            }
        }
    };

    let scope = ViewScope::new();
    let mut tracker = state.tracker(scope.handle(), program_id);
    match tracker.load(&ctx).await {
        Ok(summary) => {
            info!("progress: {}%", summary.percent);
            for (workout, done) in summary.days() {
                info!(
                    "day {} {} {}",
                    workout.day_number,
                    if done { "[x]" } else { "[ ]" },
                    workout.title
                );
            }
        }
        Err(e) => warn!("{}", e.user_message()),
    }

    Ok(())
}

fn selection_from_env() -> Result<Option<Selection>, AppError> {
    let (Some(difficulty), Some(goal), Some(location)) = (
        env_choice("FITPLAN_DIFFICULTY")?,
        env_choice("FITPLAN_GOAL")?,
        env_choice("FITPLAN_LOCATION")?,
    ) else {
        return Ok(None);
    };

    let mut selection = Selection::new(difficulty, goal, location);
    selection.gender = std::env::var("FITPLAN_GENDER").ok();
    selection.health_restriction = std::env::var("FITPLAN_HEALTH_RESTRICTION").ok();
    selection.program_preference = std::env::var("FITPLAN_PROGRAM_PREFERENCE").ok();
    Ok(Some(selection))
}

fn env_choice<T: DeserializeOwned>(key: &str) -> Result<Option<T>, AppError> {
    let Ok(raw) = std::env::var(key) else {
        return Ok(None);
    };
    serde_json::from_value(serde_json::Value::String(raw.clone()))
        .map(Some)
        .map_err(|_| AppError::Config(format!("{} has an unknown value: {}", key, raw)))
}
