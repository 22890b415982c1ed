use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::client::FitnessApi;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{SessionContext, User};

/// First view shown after startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Landing {
    Tracker { program_id: i64 },
    Onboarding,
}

pub struct SessionBootstrap {
    api: Arc<dyn FitnessApi>,
    db: SqlitePool,
}

impl SessionBootstrap {
    pub fn new(api: Arc<dyn FitnessApi>, db: SqlitePool) -> Self {
        Self { api, db }
    }

    /// Signs in by external identity and picks the landing view.
    pub async fn bootstrap(&self, external_id: &str) -> Result<(SessionContext, Landing), AppError> {
        let user = self.get_or_create_user(external_id).await?;
        let ctx = SessionContext::new(user.id, external_id);

        if let Some(cached) = repository::load_match(&self.db, &ctx.session_key).await? {
            info!("resuming cached program {} for user {}", cached.program_id, user.id);
            return Ok((ctx, Landing::Tracker { program_id: cached.program_id }));
        }

        let progress = self.api.list_progress(user.id).await?;
        let landing = match progress.first() {
            Some(record) => Landing::Tracker {
                program_id: record.program_id,
            },
            None => Landing::Onboarding,
        };
        info!("user {} lands on {:?}", user.id, landing);

        Ok((ctx, landing))
    }

    async fn get_or_create_user(&self, external_id: &str) -> Result<User, AppError> {
        if let Some(user) = self.api.find_user(external_id).await? {
            return Ok(user);
        }
        let user = self.api.create_user(external_id).await?;
        info!("registered user {} for {}", user.id, external_id);
        Ok(user)
    }
}
