/*
 *  Copyright 2025-2026 Colliery Software
 *
 *  Licensed under the Apache License, Version 2.0 (the "License");
 *  you may not use this file except in compliance with the License.
 *  You may obtain a copy of the License at
 *
 *      http://www.apache.org/licenses/LICENSE-2.0
 *
 *  Unless required by applicable law or agreed to in writing, software
 *  distributed under the License is distributed on an "AS IS" BASIS,
 *  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *  See the License for the specific language governing permissions and
 *  limitations under the License.
 */

//! SQLite connection pool and transaction helpers.
//!
//! The pool is built on `deadpool-diesel`. Diesel work is blocking, so every
//! query runs inside the pooled connection's `interact` on a blocking
//! thread. Callers never see the pool directly: they hand a closure to
//! [`Database::write`] or [`Database::read`] and receive an explicit
//! `&mut SqliteConnection` that is already inside a transaction.
//!
//! ```rust,no_run
//! use keyledger::database::Database;
//!
//! # async fn demo() -> keyledger::Result<()> {
//! let db = Database::new("sqlite://keyledger.db")?;
//! db.run_migrations().await?;
//! # Ok(())
//! # }
//! ```

use deadpool_diesel::sqlite::{
    Manager as SqliteManager, Pool as SqlitePool, Runtime as SqliteRuntime,
};
use diesel::SqliteConnection;
use tracing::{debug, info};

use crate::error::LedgerError;

/// Shared handle to the ledger's SQLite database.
///
/// `Database` is `Clone`; clones share the same pool.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    url: String,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("url", &self.url)
            .field("pool", &"SqlitePool(...)")
            .finish()
    }
}

impl Database {
    /// Opens a pool for a file path, `:memory:`, or a `sqlite://` URL.
    ///
    /// PostgreSQL URLs are rejected; the ledger runs on SQLite only.
    pub fn new(connection_string: &str) -> Result<Self, LedgerError> {
        if connection_string.starts_with("postgres://")
            || connection_string.starts_with("postgresql://")
        {
            return Err(LedgerError::Persistence(format!(
                "Unsupported database URL '{}': only SQLite is supported",
                connection_string
            )));
        }

        let url = Self::build_sqlite_url(connection_string);
        let manager = SqliteManager::new(url.clone(), SqliteRuntime::Tokio1);
        // SQLite has a single writer. One pooled connection avoids
        // "database is locked" errors between our own transactions.
        let sqlite_pool_size = 1;
        let pool = SqlitePool::builder(manager)
            .max_size(sqlite_pool_size)
            .build()
            .map_err(|e| {
                LedgerError::Persistence(format!("Failed to create SQLite connection pool: {}", e))
            })?;

        info!(
            url = %url,
            "SQLite connection pool initialized (size: {})",
            sqlite_pool_size
        );

        Ok(Self { pool, url })
    }

    /// The resolved SQLite path.
    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_sqlite_url(connection_string: &str) -> String {
        connection_string
            .strip_prefix("sqlite://")
            .unwrap_or(connection_string)
            .to_string()
    }

    /// Applies connection pragmas and runs pending migrations.
    pub async fn run_migrations(&self) -> Result<(), LedgerError> {
        let conn = self.get_connection().await?;
        let applied = conn
            .interact(|conn| -> Result<usize, LedgerError> {
                use diesel::prelude::*;
                use diesel_migrations::MigrationHarness;

                // WAL lets readers proceed during a write.
                diesel::sql_query("PRAGMA journal_mode=WAL;").execute(conn)?;
                diesel::sql_query("PRAGMA busy_timeout=30000;").execute(conn)?;
                diesel::sql_query("PRAGMA foreign_keys=ON;").execute(conn)?;

                conn.run_pending_migrations(crate::database::MIGRATIONS)
                    .map(|versions| versions.len())
                    .map_err(|e| LedgerError::Persistence(format!("Migration failed: {}", e)))
            })
            .await??;

        info!(applied, "Database migrations complete");
        Ok(())
    }

    /// Checks a connection out of the pool.
    pub async fn get_connection(
        &self,
    ) -> Result<deadpool::managed::Object<SqliteManager>, LedgerError> {
        Ok(self.pool.get().await?)
    }

    /// Runs `f` inside a `BEGIN IMMEDIATE` transaction.
    ///
    /// The write lock is taken up front, so two writers never both read the
    /// same chain head before one of them commits. Any error rolls the whole
    /// closure back.
    pub async fn write<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, LedgerError> + Send + 'static,
    {
        let conn = self.get_connection().await?;
        debug!("Starting immediate transaction");
        conn.interact(move |conn| conn.immediate_transaction(f))
            .await?
    }

    /// Runs `f` inside a deferred (read) transaction for a consistent snapshot.
    pub async fn read<T, F>(&self, f: F) -> Result<T, LedgerError>
    where
        T: Send + 'static,
        F: FnOnce(&mut SqliteConnection) -> Result<T, LedgerError> + Send + 'static,
    {
        use diesel::Connection;

        let conn = self.get_connection().await?;
        conn.interact(move |conn| conn.transaction(f)).await?
    }
}
