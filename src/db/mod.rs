//! Database module: connection setup and the local term store.
//!
//! Layout:
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `store.rs`: `TermStore`, the lookup/add/remove operations over the pool

pub mod schema;
pub mod store;

pub use store::{EntryType, TermStore};

use crate::error::StoreError;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

/// Opens the SQLite pool and applies the idempotent schema.
pub async fn connect(database_url: &str) -> Result<SqlitePool, StoreError> {
    let connect_opts = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_secs(5))
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal);

    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;

    apply_schema(&pool).await?;

    info!("database initialized");
    Ok(pool)
}

async fn apply_schema(pool: &SqlitePool) -> Result<(), StoreError> {
    for stmt in schema::SQLITE_INIT.split(';') {
        let s = stmt.trim();
        if s.is_empty() {
            continue;
        }
        sqlx::query(s).execute(pool).await?;
    }
    Ok(())
}
