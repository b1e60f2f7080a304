//! SQLite database handle for the Estia marketplace core.

use std::path::Path;

use sqlx::{Pool, Sqlite};
use tracing::info;

pub use estia_core::db::DatabaseError;
use estia_core::db::{open_pool, open_pool_in_memory};

/// Clone-able handle over the marketplace database pool.
///
/// Constructed once at process start and passed into each service by
/// dependency injection; there are no ambient globals.
#[derive(Clone)]
pub struct MarketDatabase {
    pool: Pool<Sqlite>,
}

impl MarketDatabase {
    /// Open or create the database at the given path and run migrations.
    pub async fn open(path: &Path) -> Result<Self, DatabaseError> {
        let pool = open_pool(path).await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub async fn open_in_memory() -> Result<Self, DatabaseError> {
        let pool = open_pool_in_memory().await?;
        let db = Self { pool };
        db.run_migrations().await?;
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DatabaseError::Migration(e.to_string()))?;

        info!("Marketplace database migrations complete");
        Ok(())
    }

    pub const fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}
