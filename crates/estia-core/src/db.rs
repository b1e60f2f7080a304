//! Shared database helpers.
//!
//! Provides `DatabaseError`, pool creation, `unix_timestamp()`, and the
//! `with_deadline` wrapper that bounds every store call made by a service.

use std::future::Future;
use std::path::Path;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use tracing::info;

use crate::error::Error;

/// Database errors shared across Estia storage layers.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Migration error: {0}")]
    Migration(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(e: sqlx::Error) -> Self {
        Self::Query(e.to_string())
    }
}

/// Open (or create) a `SQLite` connection pool at the given file path.
///
/// Creates the parent directory if it does not exist, enables WAL journal
/// mode, foreign keys, and sets a 5-second busy timeout.
pub async fn open_pool(path: &Path) -> Result<Pool<Sqlite>, DatabaseError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| DatabaseError::Io(e.to_string()))?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
        .map_err(|e| DatabaseError::Connection(e.to_string()))?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    info!(path = %path.display(), "Database opened");

    Ok(pool)
}

/// Open an in-memory `SQLite` connection pool (for testing).
pub async fn open_pool_in_memory() -> Result<Pool<Sqlite>, DatabaseError> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .map_err(|e| DatabaseError::Connection(e.to_string()))?
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| DatabaseError::Connection(e.to_string()))?;

    Ok(pool)
}

/// Returns the current time as a Unix timestamp (seconds since epoch).
#[allow(clippy::cast_possible_wrap)]
pub fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

/// Run a store call under a request-scoped deadline.
///
/// Maps an elapsed deadline to [`Error::Timeout`] and a storage failure to
/// [`Error::StoreFailure`], both carrying `step` so a caller knows which call of a
/// multi-step workflow failed. A missing row keeps its meaning and comes
/// back as [`Error::NotFound`].
pub async fn with_deadline<T, F>(
    step: &'static str,
    deadline: Duration,
    fut: F,
) -> Result<T, Error>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(DatabaseError::NotFound(what))) => Err(Error::NotFound(what)),
        Ok(Err(e)) => Err(Error::store(step, e)),
        Err(_) => Err(Error::Timeout { step }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deadline_maps_elapse_to_timeout() {
        let result: Result<(), Error> =
            with_deadline("test_step", Duration::from_millis(10), async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(())
            })
            .await;

        match result {
            Err(Error::Timeout { step }) => assert_eq!(step, "test_step"),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn deadline_passes_through_values_and_errors() {
        let ok: Result<i64, Error> =
            with_deadline("ok_step", Duration::from_secs(1), async { Ok(7) }).await;
        assert_eq!(ok.unwrap(), 7);

        let err: Result<i64, Error> = with_deadline("err_step", Duration::from_secs(1), async {
            Err(DatabaseError::Query("boom".into()))
        })
        .await;
        match err {
            Err(Error::StoreFailure { step, message }) => {
                assert_eq!(step, "err_step");
                assert!(message.contains("boom"));
            }
            other => panic!("expected store failure, got {other:?}"),
        }

        let missing: Result<i64, Error> =
            with_deadline("missing_step", Duration::from_secs(1), async {
                Err(DatabaseError::NotFound("User u1".into()))
            })
            .await;
        assert!(matches!(missing, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn open_in_memory_pool() {
        let pool = open_pool_in_memory().await.unwrap();
        let row: (i64,) = sqlx::query_as("SELECT 1")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.0, 1);
    }
}
