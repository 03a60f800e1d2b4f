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


mod key;
mod key_type;
mod sweep;

use anyhow::Result;
use keyledger::KeyLedger;
use serde_json::{json, Value};

use crate::cli::Commands;

pub use key::read_descriptor;

/// Runs `command` against a connected ledger. Returns the JSON document to
/// print, if the command produces one.
pub async fn dispatch(ledger: &KeyLedger, command: Commands) -> Result<Option<Value>> {
    match command {
        // Migrations are applied on connect.
        Commands::Migrate => Ok(Some(json!({
            "database_url": ledger.database().url(),
            "migrated": true,
        }))),
        Commands::KeyType(command) => key_type::execute(ledger, command).await.map(Some),
        Commands::Key(command) => key::execute(ledger, command).await.map(Some),
        Commands::Sweep { at } => sweep::sweep(ledger, at).await.map(Some),
        Commands::Serve => sweep::serve(ledger).await.map(|()| None),
    }
}
