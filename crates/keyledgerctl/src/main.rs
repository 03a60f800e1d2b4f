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
use clap::Parser;
use keyledger::KeyLedger;
use keyledgerctl::{dispatch, log_directive, Cli, ConfigLoader};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = ConfigLoader::new()
        .load_config(cli.config.as_deref())
        .context("Failed to load configuration")?;
    keyledger::init_logging(log_directive(cli.verbose, &config).as_deref());

    let ledger_config = config.to_ledger_config(cli.database_url.as_deref());
    let ledger = KeyLedger::connect(ledger_config)
        .await
        .context("Failed to open key ledger")?;

    if let Some(output) = dispatch(&ledger, cli.command).await? {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }
    Ok(())
}
