use std::sync::Arc;

use sqlx::SqlitePool;
use tracing::info;

use crate::client::FitnessApi;
use crate::db::repository;
use crate::error::AppError;
use crate::models::{CachedMatch, Program, Selection, SessionContext};
use crate::scope::ScopeHandle;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome {
    Matched(Program),
    /// Nothing fits; the user should revise the selection.
    NoMatch,
}

pub struct ProgramMatcher {
    api: Arc<dyn FitnessApi>,
    db: SqlitePool,
    scope: ScopeHandle,
}

impl ProgramMatcher {
    pub fn new(api: Arc<dyn FitnessApi>, db: SqlitePool, scope: ScopeHandle) -> Self {
        Self { api, db, scope }
    }

    /// Picks the first program the collaborator returns for `selection`.
    pub async fn match_program(
        &self,
        ctx: &SessionContext,
        selection: &Selection,
    ) -> Result<MatchOutcome, AppError> {
        let filter = selection.to_filter();
        let programs = self.scope.run(self.api.list_programs(&filter)).await?;
        self.scope.ensure_active()?;

        let Some(program) = programs.into_iter().next() else {
            info!(
                "no program for {}/{}/{}",
                selection.difficulty.as_str(),
                selection.goal.as_str(),
                selection.location.as_str()
            );
            return Ok(MatchOutcome::NoMatch);
        };

        let cached = CachedMatch {
            selection: selection.clone(),
            program_id: program.id,
            program_name: program.name.clone(),
        };
        repository::save_match(&self.db, &ctx.session_key, &cached).await?;
        info!("matched program {} ({}) for session {}", program.id, program.name, ctx.session_key);

        Ok(MatchOutcome::Matched(program))
    }

    pub async fn cached_match(&self, ctx: &SessionContext) -> Result<Option<CachedMatch>, AppError> {
        Ok(repository::load_match(&self.db, &ctx.session_key).await?)
    }

    pub async fn clear_selection(&self, ctx: &SessionContext) -> Result<(), AppError> {
        let removed = repository::clear_session(&self.db, &ctx.session_key).await?;
        if removed {
            info!("cleared selection for session {}", ctx.session_key);
        }
        Ok(())
    }
}
