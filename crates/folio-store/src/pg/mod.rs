//! PostgreSQL store
//!
//! One pool serves every collection plus the identity tables. The expected
//! schema is in `sql/schema.sql`; it is not applied automatically.

mod content;
mod identity;

use folio_core::{FolioError, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};

/// PostgreSQL-backed content repositories, user store and refresh token store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new connection pool
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| FolioError::DatabaseError(format!("PostgreSQL connection failed: {e}")))?;

        tracing::info!(max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    /// Get the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error, turning unique violations into conflicts
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> FolioError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            return FolioError::Conflict(format!("{context}: {db_err}"));
        }
    }
    FolioError::DatabaseError(format!("{context}: {err}"))
}

/// Fail with NotFound when a statement touched no rows
pub(crate) fn expect_affected(rows: u64, what: &str, id: &str) -> Result<()> {
    if rows == 0 {
        return Err(FolioError::NotFound(format!("{what} {id}")));
    }
    Ok(())
}
