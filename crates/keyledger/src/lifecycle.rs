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

//! Key status state machine.
//!
//! The whole legality rule lives in [`TRANSITION_TABLE`]:
//!
//! | From        | To                               |
//! |-------------|----------------------------------|
//! | Active      | Suspended, Compromised, Expired  |
//! | Suspended   | Active, Expired, Destroyed       |
//! | Compromised | Destroyed                        |
//! | Expired     | Destroyed                        |
//! | Destroyed   | (terminal)                       |
//!
//! Everything in this module is pure; persistence lives in [`crate::store`].

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;

/// Operational status of one key version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyStatus {
    /// Usable to encrypt and decrypt.
    Active,
    /// Temporarily unusable; may be reactivated.
    Suspended,
    /// Only usable to decrypt data protected before the compromise.
    Compromised,
    /// Past its cryptoperiod.
    Expired,
    /// Historical reference only.
    Destroyed,
}

impl KeyStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [KeyStatus; 5] = [
        KeyStatus::Active,
        KeyStatus::Suspended,
        KeyStatus::Compromised,
        KeyStatus::Expired,
        KeyStatus::Destroyed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            KeyStatus::Active => "Active",
            KeyStatus::Suspended => "Suspended",
            KeyStatus::Compromised => "Compromised",
            KeyStatus::Expired => "Expired",
            KeyStatus::Destroyed => "Destroyed",
        }
    }

    /// Statuses reachable from `self` by an ordinary transition.
    pub fn legal_successors(&self) -> &'static [KeyStatus] {
        TRANSITION_TABLE
            .iter()
            .find(|(from, _)| from == self)
            .map(|(_, to)| *to)
            .unwrap_or(&[])
    }

    /// True when no ordinary transition leaves this status.
    pub fn is_terminal(&self) -> bool {
        self.legal_successors().is_empty()
    }
}

impl fmt::Display for KeyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LedgerError::Persistence(format!("Unknown key status '{}'", s)))
    }
}

/// Source status and the statuses it may move to.
pub const TRANSITION_TABLE: &[(KeyStatus, &[KeyStatus])] = &[
    (
        KeyStatus::Active,
        &[KeyStatus::Suspended, KeyStatus::Compromised, KeyStatus::Expired],
    ),
    (
        KeyStatus::Suspended,
        &[KeyStatus::Active, KeyStatus::Expired, KeyStatus::Destroyed],
    ),
    (KeyStatus::Compromised, &[KeyStatus::Destroyed]),
    (KeyStatus::Expired, &[KeyStatus::Destroyed]),
    (KeyStatus::Destroyed, &[]),
];

static ADJACENCY: Lazy<HashMap<KeyStatus, HashSet<KeyStatus>>> = Lazy::new(|| {
    TRANSITION_TABLE
        .iter()
        .map(|(from, to)| (*from, to.iter().copied().collect()))
        .collect()
});

/// Pure lookup in the transition table.
pub fn is_legal(from: KeyStatus, to: KeyStatus) -> bool {
    ADJACENCY
        .get(&from)
        .map(|targets| targets.contains(&to))
        .unwrap_or(false)
}

/// Fails with [`LedgerError::IllegalTransition`] for any pair not in the table.
pub fn validate_transition(from: KeyStatus, to: KeyStatus) -> Result<(), LedgerError> {
    if is_legal(from, to) {
        Ok(())
    } else {
        Err(LedgerError::IllegalTransition { from, to })
    }
}

/// Only transitions into Expired may omit a justification.
pub fn requires_justification(to: KeyStatus) -> bool {
    to != KeyStatus::Expired
}

/// Returns the trimmed justification, or fails when one is required and absent.
///
/// Whitespace-only input counts as absent.
pub fn validate_justification(
    to: KeyStatus,
    justification: Option<&str>,
) -> Result<Option<String>, LedgerError> {
    let cleaned = justification
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    if cleaned.is_none() && requires_justification(to) {
        return Err(LedgerError::MissingJustification(to));
    }
    Ok(cleaned)
}
