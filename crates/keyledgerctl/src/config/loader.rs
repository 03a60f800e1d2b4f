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


use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::config::{ConfigError, CtlConfig};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "KEYLEDGER_CONFIG";

// Matches ${VAR}, ${VAR:-default} and ${VAR:?message}.
static ENV_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("substitution pattern is valid"));

pub struct ConfigLoader {
    search_paths: Vec<PathBuf>,
}

impl ConfigLoader {
    /// Loader with the default search paths: the working directory, the
    /// user config directory, then `/etc/keyledger`.
    pub fn new() -> Self {
        let mut search_paths = vec![PathBuf::from("./keyledger.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            search_paths.push(config_dir.join("keyledger").join("config.toml"));
        }

        search_paths.push(PathBuf::from("/etc/keyledger/config.toml"));

        Self { search_paths }
    }

    pub fn with_search_paths(search_paths: Vec<PathBuf>) -> Self {
        Self { search_paths }
    }

    /// Loads `config_file`, else the file named by `KEYLEDGER_CONFIG`, else
    /// the first search path that exists. With none of those, defaults.
    pub fn load_config(&self, config_file: Option<&Path>) -> Result<CtlConfig, ConfigError> {
        let config_path = match config_file {
            Some(path) => Some(path.to_path_buf()),
            None => env::var(CONFIG_ENV_VAR)
                .ok()
                .map(PathBuf::from)
                .or_else(|| self.find_config_file()),
        };

        let config = match config_path {
            Some(path) => {
                debug!("Loading configuration from {}", path.display());
                self.load_config_from_file(&path)?
            }
            None => {
                debug!("No configuration file found, using defaults");
                CtlConfig::default()
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn load_config_from_file(&self, path: &Path) -> Result<CtlConfig, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;

        let substituted = substitute_env_vars(&content)?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") | None => Ok(toml::from_str::<CtlConfig>(&substituted)?),
            Some(ext) => Err(ConfigError::UnsupportedFormat {
                extension: ext.to_string(),
            }),
        }
    }

    pub fn find_config_file(&self) -> Option<PathBuf> {
        self.search_paths
            .iter()
            .find(|path| path.is_file())
            .cloned()
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn substitute_env_vars(content: &str) -> Result<String, ConfigError> {
    let mut failure = None;
    let result = ENV_REFERENCE.replace_all(content, |caps: &Captures| {
        match process_var_expression(&caps[1]) {
            Ok(value) => value,
            Err(e) => {
                failure.get_or_insert(e);
                String::new()
            }
        }
    });

    match failure {
        Some(e) => Err(e),
        None => Ok(result.into_owned()),
    }
}

fn process_var_expression(expr: &str) -> Result<String, ConfigError> {
    if let Some((name, default)) = expr.split_once(":-") {
        Ok(env::var(name).unwrap_or_else(|_| default.to_string()))
    } else if let Some((name, message)) = expr.split_once(":?") {
        env::var(name).map_err(|_| {
            ConfigError::EnvSubstitutionError(format!(
                "Required environment variable '{}' is not set: {}",
                name, message
            ))
        })
    } else {
        env::var(expr).map_err(|_| {
            ConfigError::EnvSubstitutionError(format!(
                "Required environment variable '{}' is not set",
                expr
            ))
        })
    }
}
