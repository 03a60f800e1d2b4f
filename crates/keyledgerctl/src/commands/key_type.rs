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
    KeyLedger, KeyTypeDefinition, KeyTypeFilter, KeyTypeSort, Page, SortDirection,
};
use serde_json::{json, Value};

use crate::cli::KeyTypeCommands;

pub async fn execute(ledger: &KeyLedger, command: KeyTypeCommands) -> Result<Value> {
    let registry = ledger.registry();

    match command {
        KeyTypeCommands::Define {
            name,
            description,
            algorithm,
            size_bits,
            generated_by,
            form_factor,
            uniqueness_scope,
            cryptoperiod,
        } => {
            let key_type = registry
                .define(KeyTypeDefinition {
                    name: name.clone(),
                    description,
                    algorithm,
                    size_bits,
                    generated_by,
                    form_factor,
                    uniqueness_scope,
                    cryptoperiod,
                })
                .await
                .with_context(|| format!("Failed to define key type '{}'", name))?;
            Ok(json!({
                "key_type": key_type,
                "cryptoperiod": key_type.cryptoperiod(),
            }))
        }
        KeyTypeCommands::Get { key_type_corr_id } => {
            let key_type = registry
                .get(&key_type_corr_id)
                .await
                .with_context(|| format!("Failed to load key type {}", key_type_corr_id))?;
            Ok(serde_json::to_value(key_type)?)
        }
        KeyTypeCommands::List {
            name,
            algorithm,
            size_bits,
            status,
            sort,
            desc,
            offset,
            limit,
        } => {
            let filter = KeyTypeFilter {
                name,
                algorithm,
                size_bits,
                status,
            };
            let sort = KeyTypeSort {
                field: sort.into(),
                direction: if desc {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                },
            };
            let key_types = registry
                .list(filter, sort, Page::new(offset, limit))
                .await
                .context("Failed to list key types")?;
            Ok(serde_json::to_value(key_types)?)
        }
        KeyTypeCommands::Disable {
            key_type_corr_id,
            force,
        } => {
            let outcome = registry
                .disable(&key_type_corr_id, force)
                .await
                .with_context(|| format!("Failed to disable key type {}", key_type_corr_id))?;
            Ok(serde_json::to_value(outcome)?)
        }
    }
}
