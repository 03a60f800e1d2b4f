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

//! Error types for ledger operations.
//!
//! Every failure inside a transactional step rolls that step back and comes
//! out as exactly one [`LedgerError`] variant, so a collaborator can map it
//! to its own status codes without inspecting messages.

use thiserror::Error;

use crate::cryptoperiod::CryptoperiodError;
use crate::lifecycle::KeyStatus;

/// Errors returned by registry, store and sweeper operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Key type name already exists: {0}")]
    DuplicateName(String),

    #[error("Invalid cryptoperiod: {0}")]
    InvalidCryptoperiod(#[from] CryptoperiodError),

    #[error("Invalid key type definition: {0}")]
    InvalidDefinition(String),

    #[error("Unknown key type: {0}")]
    UnknownKeyType(String),

    #[error("Key type is disabled: {0}")]
    KeyTypeDisabled(String),

    #[error("Transition from {from} to {to} is not allowed")]
    IllegalTransition { from: KeyStatus, to: KeyStatus },

    #[error("Justification is required for a transition to {0}")]
    MissingJustification(KeyStatus),

    #[error(
        "Key type {key_type} has {count} dependent key(s); disable with force to destroy them"
    )]
    HasDependentKeys { key_type: String, count: i64 },

    #[error(
        "Key type {key_type} was disabled but destroying {pending} dependent key(s) failed: {reason}"
    )]
    CascadeIncomplete {
        key_type: String,
        pending: usize,
        reason: String,
    },

    #[error("Key {0} was modified concurrently; reload and retry")]
    VersionConflict(String),

    #[error("Persistence failure: {0}")]
    Persistence(String),
}

impl LedgerError {
    /// True for failures caused by the request rather than the store.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            LedgerError::Persistence(_) | LedgerError::CascadeIncomplete { .. }
        )
    }
}

impl From<diesel::result::Error> for LedgerError {
    fn from(error: diesel::result::Error) -> Self {
        LedgerError::Persistence(error.to_string())
    }
}

impl From<deadpool_diesel::InteractError> for LedgerError {
    fn from(error: deadpool_diesel::InteractError) -> Self {
        LedgerError::Persistence(format!("Connection interaction failed: {}", error))
    }
}

impl From<deadpool::managed::PoolError<deadpool_diesel::Error>> for LedgerError {
    fn from(error: deadpool::managed::PoolError<deadpool_diesel::Error>) -> Self {
        LedgerError::Persistence(format!("Connection pool error: {}", error))
    }
}

/// Convenience alias used across the crate.
pub type Result<T, E = LedgerError> = std::result::Result<T, E>;
