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


use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use keyledger::{KeyStatus, KeyTypeSortField, KeyTypeStatus};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "keyledgerctl",
    version,
    about = "Command-line interface for the keyledger key lifecycle engine",
    long_about = "Define key types, issue keys, move them through their lifecycle and \
                  run the expiration sweeper against a keyledger database"
)]
pub struct Cli {
    /// Configuration file (defaults to KEYLEDGER_CONFIG or the search path)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Database URL, overriding the configuration file
    #[arg(long, global = true, env = "KEYLEDGER_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Key type operations
    #[command(subcommand)]
    KeyType(KeyTypeCommands),

    /// Key operations
    #[command(subcommand)]
    Key(KeyCommands),

    /// Run one expiration sweep and exit
    Sweep {
        /// Sweep as of this instant instead of now (RFC 3339)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },

    /// Run the expiration sweeper until interrupted
    Serve,
}

#[derive(Subcommand, Debug)]
pub enum KeyTypeCommands {
    /// Define a new key type
    Define {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        algorithm: String,
        #[arg(long)]
        size_bits: i32,
        #[arg(long, default_value = "")]
        generated_by: String,
        #[arg(long, default_value = "")]
        form_factor: String,
        #[arg(long, default_value = "")]
        uniqueness_scope: String,
        /// Cryptoperiod token such as 30d, 6m or 1y
        #[arg(long)]
        cryptoperiod: String,
    },

    /// Show one key type
    Get { key_type_corr_id: String },

    /// List key types
    List {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        algorithm: Option<String>,
        #[arg(long)]
        size_bits: Option<i32>,
        #[arg(long)]
        status: Option<KeyTypeStatus>,
        #[arg(long, value_enum, default_value_t = SortBy::CreatedAt)]
        sort: SortBy,
        /// Sort descending
        #[arg(long)]
        desc: bool,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Disable a key type
    Disable {
        key_type_corr_id: String,
        /// Destroy dependent keys instead of refusing
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyCommands {
    /// Issue a key against an Active key type
    Issue {
        #[arg(long)]
        key_type: String,
        /// JSON file holding the key descriptor
        #[arg(long)]
        descriptor: PathBuf,
        /// Activation date (RFC 3339), defaults to now
        #[arg(long)]
        activation_date: Option<DateTime<Utc>>,
    },

    /// Move a key to a new status
    Transition {
        key_corr_id: String,
        #[arg(long)]
        to: KeyStatus,
        #[arg(long)]
        justification: Option<String>,
    },

    /// Show the latest version of a key
    Show { key_corr_id: String },

    /// Show every version of a key
    History { key_corr_id: String },

    /// List the latest version of each key
    List {
        #[arg(long)]
        key_type: Option<String>,
        #[arg(long)]
        status: Option<KeyStatus>,
        #[arg(long, default_value_t = 0)]
        offset: i64,
        #[arg(long, default_value_t = 10)]
        limit: i64,
    },

    /// Destroy a key without transition checks
    ForceDestroy { key_corr_id: String },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortBy {
    Name,
    Algorithm,
    SizeBits,
    CreatedAt,
}

impl From<SortBy> for KeyTypeSortField {
    fn from(value: SortBy) -> Self {
        match value {
            SortBy::Name => KeyTypeSortField::Name,
            SortBy::Algorithm => KeyTypeSortField::Algorithm,
            SortBy::SizeBits => KeyTypeSortField::SizeBits,
            SortBy::CreatedAt => KeyTypeSortField::CreatedAt,
        }
    }
}
