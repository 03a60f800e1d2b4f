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

//! Expiration sweeper.
//!
//! Finds every key whose latest version is Active or Suspended and whose
//! expiration date has passed, and appends an Expired version to each.
//!
//! The sweep is not privileged. It goes through the transition table like a
//! user transition and only skips the justification requirement, so a
//! Compromised key is never expired by it. Each key is expired in its own
//! transaction; one failing key is logged and counted without stopping the
//! pass.
//!
//! # Running
//!
//! [`ExpirationSweeper::run`] sweeps once at startup (unless disabled) and
//! then on every tick of the configured interval until a shutdown signal
//! arrives on the broadcast channel.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use crate::audit;
use crate::dal;
use crate::database::universal_types::UniversalTimestamp;
use crate::database::Database;
use crate::error::LedgerError;
use crate::store::VersionedKeyStore;

/// Counts from one sweep pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SweepReport {
    /// Keys selected as due.
    pub candidates: usize,
    /// Keys that received an Expired version.
    pub expired: usize,
    /// Keys that changed between selection and expiry and were left alone.
    pub skipped: usize,
    /// Keys whose expiry transaction failed.
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct ExpirationSweeper {
    database: Database,
    store: VersionedKeyStore,
    interval: Duration,
    sweep_on_startup: bool,
}

impl ExpirationSweeper {
    pub fn new(
        database: Database,
        store: VersionedKeyStore,
        interval: Duration,
        sweep_on_startup: bool,
    ) -> Self {
        Self {
            database,
            store,
            interval,
            sweep_on_startup,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sweeps as of the current time.
    pub async fn sweep_once(&self) -> Result<SweepReport, LedgerError> {
        self.sweep_at(Utc::now()).await
    }

    /// Sweeps as of `now`.
    ///
    /// Only the candidate query can fail the whole pass; per-key failures
    /// are counted in the report.
    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<SweepReport, LedgerError> {
        let cutoff = UniversalTimestamp::clamped(now);
        let candidates = self
            .database
            .read(move |conn| dal::crypto_key::due_for_expiry(conn, cutoff))
            .await?;

        let mut report = SweepReport {
            candidates: candidates.len(),
            ..Default::default()
        };

        for key_corr_id in &candidates {
            match self.store.expire_if_due(key_corr_id, now).await {
                Ok(Some(_)) => report.expired += 1,
                Ok(None) => report.skipped += 1,
                Err(e) => {
                    error!(key_corr_id = %key_corr_id, "Failed to expire key: {}", e);
                    report.failed += 1;
                }
            }
        }

        audit::log_sweep_completed(
            report.candidates,
            report.expired,
            report.skipped,
            report.failed,
        );
        Ok(report)
    }

    /// Runs until `shutdown` receives a message or its sender is dropped.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        info!(
            "Starting expiration sweeper (interval: {:?}, startup sweep: {})",
            self.interval, self.sweep_on_startup
        );

        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        interval.tick().await;

        if self.sweep_on_startup {
            self.sweep_logged().await;
        }

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    self.sweep_logged().await;
                }
                _ = shutdown.recv() => {
                    info!("Expiration sweeper shutdown requested");
                    break;
                }
            }
        }
    }

    /// Spawns [`Self::run`] on the current runtime.
    pub fn spawn(self, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn sweep_logged(&self) {
        if let Err(e) = self.sweep_once().await {
            error!("Expiration sweep failed: {}", e);
        }
    }
}
