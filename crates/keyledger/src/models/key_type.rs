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
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{check_length, SortDirection};
use crate::cryptoperiod;
use crate::error::LedgerError;

static NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9 ]+$").expect("key type name pattern is valid"));

/// Smallest accepted key size.
pub const MIN_SIZE_BITS: i32 = 64;
/// Largest accepted key size.
pub const MAX_SIZE_BITS: i32 = 4096;

/// Lifecycle status of a key type. Disabled is one-way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyTypeStatus {
    Active,
    Disabled,
}

impl KeyTypeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyTypeStatus::Active => "Active",
            KeyTypeStatus::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for KeyTypeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyTypeStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(KeyTypeStatus::Active),
            "disabled" => Ok(KeyTypeStatus::Disabled),
            other => Err(LedgerError::Persistence(format!(
                "Unknown key type status '{}'",
                other
            ))),
        }
    }
}

/// A stored key type definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyType {
    pub key_type_corr_id: String,
    pub name: String,
    pub description: String,
    pub algorithm: String,
    pub size_bits: i32,
    pub generated_by: String,
    pub form_factor: String,
    pub uniqueness_scope: String,
    pub cryptoperiod_days: i32,
    pub status: KeyTypeStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl KeyType {
    /// The cryptoperiod as an exchange token, e.g. `"1y"`.
    pub fn cryptoperiod(&self) -> String {
        cryptoperiod::format(self.cryptoperiod_days)
    }

    pub fn is_active(&self) -> bool {
        self.status == KeyTypeStatus::Active
    }
}

/// Request to define a new key type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTypeDefinition {
    pub name: String,
    pub description: String,
    pub algorithm: String,
    pub size_bits: i32,
    pub generated_by: String,
    pub form_factor: String,
    pub uniqueness_scope: String,
    /// Cryptoperiod token such as `"30d"`, `"6m"` or `"1y"`.
    pub cryptoperiod: String,
}

impl KeyTypeDefinition {
    /// Checks field shapes. Name uniqueness and the cryptoperiod are
    /// checked by the registry.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.name.is_empty() || !NAME_PATTERN.is_match(&self.name) {
            return Err(LedgerError::InvalidDefinition(format!(
                "name '{}' must contain only letters, digits and spaces",
                self.name
            )));
        }
        check_length("name", &self.name, 100)?;
        check_length("description", &self.description, 250)?;
        check_length("algorithm", &self.algorithm, 50)?;
        check_length("generated_by", &self.generated_by, 100)?;
        check_length("form_factor", &self.form_factor, 100)?;
        check_length("uniqueness_scope", &self.uniqueness_scope, 100)?;

        if !(MIN_SIZE_BITS..=MAX_SIZE_BITS).contains(&self.size_bits) {
            return Err(LedgerError::InvalidDefinition(format!(
                "size_bits must be between {} and {}, got {}",
                MIN_SIZE_BITS, MAX_SIZE_BITS, self.size_bits
            )));
        }
        Ok(())
    }
}

/// Equality filters for listing key types. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyTypeFilter {
    pub name: Option<String>,
    pub algorithm: Option<String>,
    pub size_bits: Option<i32>,
    pub status: Option<KeyTypeStatus>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KeyTypeSortField {
    Name,
    Algorithm,
    SizeBits,
    #[default]
    CreatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KeyTypeSort {
    pub field: KeyTypeSortField,
    pub direction: SortDirection,
}
