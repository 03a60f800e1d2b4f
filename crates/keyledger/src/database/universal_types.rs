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

//! Domain wrappers for values that SQLite stores in a non-native form.
//!
//! Surrogate ids are UUIDs stored as 16-byte BLOBs. Timestamps are stored as
//! fixed-width RFC 3339 UTC text (`2025-01-31T08:15:00.000000Z`) so that string
//! comparison in SQL is chronological comparison; `expiration_date <= now`
//! in the sweep query relies on this. Only four-digit years have that
//! form, so instants outside years 0000 to 9999 are not storable.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::LedgerError;

/// Surrogate identity of a stored row. Never exposed as a correlation id.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct UniversalUuid(pub Uuid);

impl UniversalUuid {
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Bytes for BLOB storage.
    pub fn to_blob(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    /// Decode a BLOB column.
    pub fn from_blob(bytes: &[u8]) -> Result<Self, LedgerError> {
        Uuid::from_slice(bytes)
            .map(UniversalUuid)
            .map_err(|e| LedgerError::Persistence(format!("Corrupt row id: {}", e)))
    }
}

impl fmt::Display for UniversalUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for UniversalUuid {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

/// Generates a fresh opaque correlation id for a key type or key chain.
pub fn new_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Unix microseconds of `0000-01-01T00:00:00.000000Z`.
const MIN_STORABLE_MICROS: i64 = -62_167_219_200_000_000;
/// Unix microseconds of `9999-12-31T23:59:59.999999Z`.
const MAX_STORABLE_MICROS: i64 = 253_402_300_799_999_999;

/// UTC timestamp with a canonical SQLite text encoding.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct UniversalTimestamp(pub DateTime<Utc>);

impl UniversalTimestamp {
    /// Current time truncated to the stored (microsecond) precision, so a
    /// value compares equal to itself after a database round trip.
    pub fn now() -> Self {
        Self::truncated(Utc::now())
    }

    /// Drops sub-microsecond precision.
    pub fn truncated(dt: DateTime<Utc>) -> Self {
        Self(dt.trunc_subsecs(6))
    }

    /// True when `dt` has a four-digit year and so a fixed-width text form.
    pub fn is_storable(dt: &DateTime<Utc>) -> bool {
        (MIN_STORABLE_MICROS..=MAX_STORABLE_MICROS).contains(&dt.timestamp_micros())
    }

    /// Truncates `dt` and pulls it into the storable range. Every stored
    /// value is in range, so comparisons against a clamped bound keep
    /// their meaning.
    pub fn clamped(dt: DateTime<Utc>) -> Self {
        let micros = Self::truncated(dt)
            .0
            .timestamp_micros()
            .clamp(MIN_STORABLE_MICROS, MAX_STORABLE_MICROS);
        Self(DateTime::from_timestamp_micros(micros).unwrap_or(dt))
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }

    pub fn into_inner(self) -> DateTime<Utc> {
        self.0
    }

    /// Fixed-width text form used in every timestamp column.
    pub fn to_sql_text(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Decode a timestamp column.
    pub fn from_sql_text(s: &str) -> Result<Self, LedgerError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| UniversalTimestamp(dt.with_timezone(&Utc)))
            .map_err(|e| LedgerError::Persistence(format!("Corrupt timestamp '{}': {}", s, e)))
    }
}

impl fmt::Display for UniversalTimestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_sql_text())
    }
}

impl From<DateTime<Utc>> for UniversalTimestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl From<UniversalTimestamp> for DateTime<Utc> {
    fn from(wrapper: UniversalTimestamp) -> Self {
        wrapper.0
    }
}
