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

//! Top-level handle wiring the registry, store and sweeper to one database.

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::database::Database;
use crate::error::LedgerError;
use crate::registry::KeyTypeRegistry;
use crate::store::VersionedKeyStore;
use crate::sweeper::ExpirationSweeper;

/// A connected ledger.
///
/// ```rust,no_run
/// use keyledger::{KeyLedger, LedgerConfig};
///
/// # async fn demo() -> keyledger::Result<()> {
/// let ledger = KeyLedger::connect(LedgerConfig::default()).await?;
/// let sweeper = ledger.start_sweeper();
/// // ... serve requests ...
/// if let Some(sweeper) = sweeper {
///     sweeper.shutdown().await;
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct KeyLedger {
    config: LedgerConfig,
    database: Database,
    registry: KeyTypeRegistry,
    store: VersionedKeyStore,
    sweeper: ExpirationSweeper,
}

impl KeyLedger {
    /// Opens the database, applies migrations and builds the components.
    pub async fn connect(config: LedgerConfig) -> Result<Self, LedgerError> {
        let database = Database::new(config.database_url())?;
        database.run_migrations().await?;

        let store = VersionedKeyStore::new(database.clone());
        let registry =
            KeyTypeRegistry::new(database.clone(), store.clone(), config.max_cryptoperiod_days());
        let sweeper = ExpirationSweeper::new(
            database.clone(),
            store.clone(),
            config.sweep_interval(),
            config.sweep_on_startup(),
        );

        info!(database = %database.url(), "Key ledger ready");
        Ok(Self {
            config,
            database,
            registry,
            store,
            sweeper,
        })
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn registry(&self) -> &KeyTypeRegistry {
        &self.registry
    }

    pub fn store(&self) -> &VersionedKeyStore {
        &self.store
    }

    pub fn sweeper(&self) -> &ExpirationSweeper {
        &self.sweeper
    }

    /// Starts the periodic sweeper, or returns `None` when it is disabled
    /// in the configuration.
    pub fn start_sweeper(&self) -> Option<SweeperHandle> {
        if !self.config.enable_sweeper() {
            warn!("Expiration sweeper disabled by configuration");
            return None;
        }
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
        let handle = self.sweeper.clone().spawn(shutdown_rx);
        Some(SweeperHandle {
            shutdown_tx,
            handle,
        })
    }
}

/// Handle to a running sweeper task.
#[derive(Debug)]
pub struct SweeperHandle {
    shutdown_tx: broadcast::Sender<()>,
    handle: JoinHandle<()>,
}

impl SweeperHandle {
    /// Signals the sweeper and waits for it to stop. A sweep in progress
    /// finishes first.
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
        if let Err(e) = self.handle.await {
            warn!("Expiration sweeper task ended abnormally: {}", e);
        }
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}
