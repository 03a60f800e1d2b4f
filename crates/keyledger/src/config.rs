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

//! Configuration for a [`crate::KeyLedger`].

use std::time::Duration;

use crate::cryptoperiod::DEFAULT_MAX_CRYPTOPERIOD_DAYS;

/// Ledger configuration.
///
/// # Construction
///
/// ```rust
/// use keyledger::LedgerConfig;
/// use std::time::Duration;
///
/// let config = LedgerConfig::builder()
///     .database_url("/var/lib/keyledger/ledger.db")
///     .sweep_interval(Duration::from_secs(600))
///     .build();
///
/// assert_eq!(config.max_cryptoperiod_days(), 36_500);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct LedgerConfig {
    database_url: String,
    max_cryptoperiod_days: i32,
    sweep_interval: Duration,
    sweep_on_startup: bool,
    enable_sweeper: bool,
}

impl LedgerConfig {
    /// Creates a new configuration builder with default values.
    pub fn builder() -> LedgerConfigBuilder {
        LedgerConfigBuilder::default()
    }

    /// SQLite path, `:memory:`, or `sqlite://` URL.
    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    /// Upper bound accepted for a key type's cryptoperiod.
    pub fn max_cryptoperiod_days(&self) -> i32 {
        self.max_cryptoperiod_days
    }

    /// Time between expiration sweeps.
    pub fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Whether the sweeper runs a pass as soon as it starts.
    pub fn sweep_on_startup(&self) -> bool {
        self.sweep_on_startup
    }

    /// Whether [`crate::KeyLedger::start_sweeper`] starts a background task.
    pub fn enable_sweeper(&self) -> bool {
        self.enable_sweeper
    }
}

/// Builder for [`LedgerConfig`].
#[derive(Debug, Clone)]
pub struct LedgerConfigBuilder {
    config: LedgerConfig,
}

impl Default for LedgerConfigBuilder {
    fn default() -> Self {
        Self {
            config: LedgerConfig {
                database_url: "keyledger.db".to_string(),
                max_cryptoperiod_days: DEFAULT_MAX_CRYPTOPERIOD_DAYS,
                sweep_interval: Duration::from_secs(3600),
                sweep_on_startup: true,
                enable_sweeper: true,
            },
        }
    }
}

impl LedgerConfigBuilder {
    pub fn database_url(mut self, value: impl Into<String>) -> Self {
        self.config.database_url = value.into();
        self
    }

    pub fn max_cryptoperiod_days(mut self, value: i32) -> Self {
        self.config.max_cryptoperiod_days = value;
        self
    }

    /// Sets the sweep interval. Zero is raised to one second.
    pub fn sweep_interval(mut self, value: Duration) -> Self {
        self.config.sweep_interval = value.max(Duration::from_secs(1));
        self
    }

    pub fn sweep_on_startup(mut self, value: bool) -> Self {
        self.config.sweep_on_startup = value;
        self
    }

    pub fn enable_sweeper(mut self, value: bool) -> Self {
        self.config.enable_sweeper = value;
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> LedgerConfig {
        self.config
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfigBuilder::default().build()
    }
}
