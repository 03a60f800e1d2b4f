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


//! Configuration file schema. Every section and field has a default, so an
//! empty file is a valid configuration.

use keyledger::cryptoperiod::DEFAULT_MAX_CRYPTOPERIOD_DAYS;
use keyledger::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ConfigError;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CtlConfig {
    pub database: DatabaseConfig,
    pub lifecycle: LifecycleConfig,
    pub sweeper: SweeperConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifecycleConfig {
    pub max_cryptoperiod_days: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweeperConfig {
    pub enabled: bool,
    pub interval_secs: u64,
    pub on_startup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `"info"` or `"keyledger=debug,info"`.
    pub level: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "keyledger.db".to_string(),
        }
    }
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            max_cryptoperiod_days: DEFAULT_MAX_CRYPTOPERIOD_DAYS,
        }
    }
}

impl Default for SweeperConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 3600,
            on_startup: true,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CtlConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.url".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.lifecycle.max_cryptoperiod_days <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "lifecycle.max_cryptoperiod_days".to_string(),
                message: format!("must be positive, got {}", self.lifecycle.max_cryptoperiod_days),
            });
        }
        if self.sweeper.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "sweeper.interval_secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Builds the library configuration, letting `database_url` override
    /// the file.
    pub fn to_ledger_config(&self, database_url: Option<&str>) -> LedgerConfig {
        LedgerConfig::builder()
            .database_url(database_url.unwrap_or(self.database.url.as_str()))
            .max_cryptoperiod_days(self.lifecycle.max_cryptoperiod_days)
            .sweep_interval(Duration::from_secs(self.sweeper.interval_secs))
            .sweep_on_startup(self.sweeper.on_startup)
            .enable_sweeper(self.sweeper.enabled)
            .build()
    }
}
