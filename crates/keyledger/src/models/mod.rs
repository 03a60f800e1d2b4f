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

//! Domain records exchanged with callers.
//!
//! These types never carry surrogate ids; records are addressed by their
//! correlation ids only. Storage row types live in [`crate::dal::models`].

pub mod crypto_key;
pub mod key_type;

use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

pub use crypto_key::{CryptoKeyFilter, CryptoKeyVersion, KeyDescriptor, NewCryptoKey};
pub use key_type::{
    KeyType, KeyTypeDefinition, KeyTypeFilter, KeyTypeSort, KeyTypeSortField, KeyTypeStatus,
};

/// Offset pagination for list operations.
///
/// Deserialization goes through [`Page::new`], so a stored or submitted
/// page is clamped the same way as one built in code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PageRequest")]
pub struct Page {
    offset: i64,
    limit: i64,
}

impl Page {
    /// Largest page a list call returns.
    pub const MAX_LIMIT: i64 = 100;
    /// Page size when none is requested.
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Builds a page, clamping `limit` into `1..=MAX_LIMIT` and `offset` to `>= 0`.
    pub fn new(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: limit.clamp(1, Self::MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}

/// Unclamped wire form of a [`Page`].
#[derive(Deserialize)]
struct PageRequest {
    #[serde(default)]
    offset: i64,
    #[serde(default = "default_limit")]
    limit: i64,
}

fn default_limit() -> i64 {
    Page::DEFAULT_LIMIT
}

impl From<PageRequest> for Page {
    fn from(request: PageRequest) -> Self {
        Page::new(request.offset, request.limit)
    }
}

/// Sort order for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

/// Checks a free-text field against a maximum character length.
pub(crate) fn check_length(field: &str, value: &str, max: usize) -> Result<(), LedgerError> {
    if value.chars().count() > max {
        return Err(LedgerError::InvalidDefinition(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}
