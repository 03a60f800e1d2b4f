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
use keyledger::{
    CryptoKeyFilter, KeyDescriptor, KeyLedger, LedgerError, NewCryptoKey, Page,
};
use serde_json::Value;
use std::fs;
use std::path::Path;

use crate::cli::KeyCommands;

pub async fn execute(ledger: &KeyLedger, command: KeyCommands) -> Result<Value> {
    let store = ledger.store();

    let value = match command {
        KeyCommands::Issue {
            key_type,
            descriptor,
            activation_date,
        } => {
            let descriptor = read_descriptor(&descriptor)?;
            let key = store
                .issue(NewCryptoKey {
                    key_type_corr_id: key_type.clone(),
                    activation_date,
                    descriptor,
                })
                .await
                .with_context(|| format!("Failed to issue key of type {}", key_type))?;
            serde_json::to_value(key)?
        }
        KeyCommands::Transition {
            key_corr_id,
            to,
            justification,
        } => {
            let key = store
                .transition(&key_corr_id, to, justification.as_deref())
                .await
                .with_context(|| format!("Failed to move key {} to {}", key_corr_id, to))?;
            serde_json::to_value(key)?
        }
        KeyCommands::Show { key_corr_id } => {
            let key = store
                .current(&key_corr_id)
                .await
                .with_context(|| format!("Failed to load key {}", key_corr_id))?;
            serde_json::to_value(key)?
        }
        KeyCommands::History { key_corr_id } => {
            let history = store
                .history(&key_corr_id)
                .await
                .with_context(|| format!("Failed to load history of key {}", key_corr_id))?;
            // Every issued key has at least version 1.
            if history.is_empty() {
                return Err(LedgerError::NotFound(format!(
                    "No history found for key {}",
                    key_corr_id
                ))
                .into());
            }
            serde_json::to_value(history)?
        }
        KeyCommands::List {
            key_type,
            status,
            offset,
            limit,
        } => {
            let filter = CryptoKeyFilter {
                key_type_corr_id: key_type,
                status,
            };
            let keys = store
                .list_current(filter, Page::new(offset, limit))
                .await
                .context("Failed to list keys")?;
            serde_json::to_value(keys)?
        }
        KeyCommands::ForceDestroy { key_corr_id } => {
            let key = store
                .force_destroy(&key_corr_id)
                .await
                .with_context(|| format!("Failed to destroy key {}", key_corr_id))?;
            serde_json::to_value(key)?
        }
    };

    Ok(value)
}

/// Reads a [`KeyDescriptor`] from a JSON file.
pub fn read_descriptor(path: &Path) -> Result<KeyDescriptor> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read descriptor file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid descriptor JSON in {}", path.display()))
}
