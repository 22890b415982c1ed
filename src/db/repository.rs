use chrono::Utc;
use sqlx::{FromRow, SqlitePool};

use crate::error::AppError;
use crate::models::{CachedMatch, Selection};

pub const SELECTION_KEY: &str = "selection";
pub const PROGRAM_ID_KEY: &str = "current_program_id";
pub const PROGRAM_NAME_KEY: &str = "current_program_name";

#[derive(Debug, Clone, FromRow)]
pub struct CacheEntry {
    pub cache_key: String,
    pub value: String,
    pub updated_at: String,
}

pub async fn fetch_entries(db: &SqlitePool, session_key: &str) -> Result<Vec<CacheEntry>, sqlx::Error> {
    sqlx::query_as::<_, CacheEntry>(
        "SELECT cache_key, value, updated_at FROM selection_cache WHERE session_key = ? ORDER BY cache_key",
    )
    .bind(session_key)
    .fetch_all(db)
    .await
}

pub async fn find_value(
    db: &SqlitePool,
    session_key: &str,
    cache_key: &str,
) -> Result<Option<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT value FROM selection_cache WHERE session_key = ? AND cache_key = ?",
    )
    .bind(session_key)
    .bind(cache_key)
    .fetch_optional(db)
    .await
}

pub async fn put_value(
    db: &SqlitePool,
    session_key: &str,
    cache_key: &str,
    value: &str,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        r#"
        INSERT INTO selection_cache (session_key, cache_key, value, updated_at)
        VALUES (?1, ?2, ?3, ?4)
        ON CONFLICT (session_key, cache_key)
        DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
        "#,
    )
    .bind(session_key)
    .bind(cache_key)
    .bind(value)
    .bind(now)
    .execute(db)
    .await?;
    Ok(())
}

/// Persists the selection and chosen program in one transaction.
pub async fn save_match(db: &SqlitePool, session_key: &str, cached: &CachedMatch) -> Result<(), AppError> {
    let selection = serde_json::to_string(&cached.selection)
        .map_err(|e| AppError::Config(format!("Failed to encode selection: {}", e)))?;
    let program_id = cached.program_id.to_string();
    let now = Utc::now().to_rfc3339();

    let mut tx = db.begin().await?;
    for (key, value) in [
        (SELECTION_KEY, selection.as_str()),
        (PROGRAM_ID_KEY, program_id.as_str()),
        (PROGRAM_NAME_KEY, cached.program_name.as_str()),
    ] {
        sqlx::query(
            r#"
            INSERT INTO selection_cache (session_key, cache_key, value, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (session_key, cache_key)
            DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(session_key)
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&mut *tx)
        .await?;
    }
    tx.commit().await?;
    Ok(())
}

/// Reads the persisted match. Entries that no longer decode are treated as absent.
pub async fn load_match(db: &SqlitePool, session_key: &str) -> Result<Option<CachedMatch>, sqlx::Error> {
    let entries = fetch_entries(db, session_key).await?;
    let value_of = |key: &str| {
        entries
            .iter()
            .find(|e| e.cache_key == key)
            .map(|e| e.value.as_str())
    };

    let (Some(selection), Some(program_id), Some(program_name)) = (
        value_of(SELECTION_KEY),
        value_of(PROGRAM_ID_KEY),
        value_of(PROGRAM_NAME_KEY),
    ) else {
        return Ok(None);
    };

    let selection = match serde_json::from_str::<Selection>(selection) {
        Ok(s) => s,
        Err(e) => {
            tracing::warn!("Ignoring cached selection for {}: {}", session_key, e);
            return Ok(None);
        }
    };
    let Ok(program_id) = program_id.parse::<i64>() else {
        tracing::warn!("Ignoring cached program id for {}: {}", session_key, program_id);
        return Ok(None);
    };

    Ok(Some(CachedMatch {
        selection,
        program_id,
        program_name: program_name.to_string(),
    }))
}

pub async fn clear_session(db: &SqlitePool, session_key: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM selection_cache WHERE session_key = ?")
        .bind(session_key)
        .execute(db)
        .await?
        .rows_affected();

    Ok(result > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;
    use crate::models::{Difficulty, Goal, Location};

    fn sample_match(program_id: i64) -> CachedMatch {
        CachedMatch {
            selection: Selection::new(Difficulty::Intermediate, Goal::MuscleGain, Location::Gym),
            program_id,
            program_name: "Mass Builder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_match() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        save_match(&pool, "tg-100", &sample_match(3))
            .await
            .expect("Failed to save match");

        let loaded = load_match(&pool, "tg-100")
            .await
            .expect("Failed to load match")
            .expect("Match not found");
        assert_eq!(loaded, sample_match(3));

        let other = load_match(&pool, "tg-200").await.expect("Failed to load match");
        assert!(other.is_none());
    }

    #[tokio::test]
    async fn test_save_match_overwrites_previous() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        save_match(&pool, "tg-100", &sample_match(3)).await.expect("first save");
        save_match(&pool, "tg-100", &sample_match(9)).await.expect("second save");

        let entries = fetch_entries(&pool, "tg-100").await.expect("entries");
        assert_eq!(entries.len(), 3);

        let loaded = load_match(&pool, "tg-100").await.expect("load").expect("present");
        assert_eq!(loaded.program_id, 9);
    }

    #[tokio::test]
    async fn test_clear_session() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        save_match(&pool, "tg-100", &sample_match(3)).await.expect("save");
        assert!(clear_session(&pool, "tg-100").await.expect("clear"));
        assert!(!clear_session(&pool, "tg-100").await.expect("clear again"));

        let loaded = load_match(&pool, "tg-100").await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_corrupt_entry_reads_as_absent() {
        let pool = connect_in_memory().await.expect("Failed to create test db");

        save_match(&pool, "tg-100", &sample_match(3)).await.expect("save");
        put_value(&pool, "tg-100", PROGRAM_ID_KEY, "not-a-number")
            .await
            .expect("overwrite");

        assert_eq!(
            find_value(&pool, "tg-100", PROGRAM_ID_KEY).await.expect("find"),
            Some("not-a-number".to_string())
        );
        let loaded = load_match(&pool, "tg-100").await.expect("load");
        assert!(loaded.is_none());
    }
}
