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


use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use keyledger::KeyLedger;
use serde_json::Value;
use tracing::info;

pub async fn sweep(ledger: &KeyLedger, at: Option<DateTime<Utc>>) -> Result<Value> {
    let sweeper = ledger.sweeper();
    let report = match at {
        Some(instant) => sweeper.sweep_at(instant).await,
        None => sweeper.sweep_once().await,
    }
    .context("Expiration sweep failed")?;
    Ok(serde_json::to_value(report)?)
}

/// Runs the sweeper until Ctrl-C.
pub async fn serve(ledger: &KeyLedger) -> Result<()> {
    let Some(handle) = ledger.start_sweeper() else {
        info!("Nothing to serve with the sweeper disabled");
        return Ok(());
    };

    info!(
        "Sweeping every {:?}; press Ctrl-C to stop",
        ledger.sweeper().interval()
    );
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    info!("Shutting down expiration sweeper");
    handle.shutdown().await;
    Ok(())
}
