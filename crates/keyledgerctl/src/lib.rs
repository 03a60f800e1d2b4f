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


//! # keyledgerctl
//!
//! Command-line collaborator for [`keyledger`]. Commands print JSON to
//! stdout; logs go to stderr.

pub mod cli;
pub mod commands;
pub mod config;

pub use cli::{Cli, Commands, KeyCommands, KeyTypeCommands, SortBy};
pub use commands::dispatch;
pub use config::{ConfigError, ConfigLoader, CtlConfig};

/// Chooses the log filter: `-v` forces debug, then `RUST_LOG`, then the
/// configured level.
pub fn log_directive(verbose: bool, config: &CtlConfig) -> Option<String> {
    if verbose {
        Some("debug".to_string())
    } else if std::env::var_os("RUST_LOG").is_some() {
        None
    } else {
        Some(config.logging.level.clone())
    }
}
