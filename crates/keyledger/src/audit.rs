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

//! Structured audit logging for key lifecycle operations.
//!
//! The version chain in the database is the authoritative audit trail. These
//! events mirror each committed mutation (and each rejected transition) into
//! the log stream so a SIEM can follow the ledger without reading it.
//!
//! Every event carries a stable `event_type` field from [`events`] and the
//! correlation ids involved. Events are emitted only after the owning
//! transaction has committed.

use chrono::{DateTime, Utc};

use crate::lifecycle::KeyStatus;

/// Event types for ledger operations.
pub mod events {
    /// Key type defined.
    pub const KEY_TYPE_DEFINED: &str = "key_type.defined";
    /// Key type disabled, directly or with a cascade.
    pub const KEY_TYPE_DISABLED: &str = "key_type.disabled";
    /// Cascade after a committed disable failed to destroy dependents.
    pub const KEY_TYPE_CASCADE_FAILED: &str = "key_type.cascade.failed";

    /// Key chain created with its first version.
    pub const KEY_ISSUED: &str = "key.issued";
    /// Ordinary transition appended a version.
    pub const KEY_TRANSITIONED: &str = "key.transitioned";
    /// Transition refused by the state machine or justification rule.
    pub const KEY_TRANSITION_REJECTED: &str = "key.transition.rejected";
    /// Privileged destroy appended a version.
    pub const KEY_FORCE_DESTROYED: &str = "key.force_destroyed";
    /// Sweep expired a key.
    pub const KEY_EXPIRED: &str = "key.expired";

    /// Sweep pass finished.
    pub const SWEEP_COMPLETED: &str = "sweep.completed";
}

/// Log a key type definition.
pub fn log_key_type_defined(key_type_corr_id: &str, name: &str, cryptoperiod: &str) {
    tracing::info!(
        event_type = events::KEY_TYPE_DEFINED,
        key_type_corr_id = %key_type_corr_id,
        name = %name,
        cryptoperiod = %cryptoperiod,
        "Key type defined"
    );
}

/// Log a key type disable. `dependents` is the number of live chains found.
pub fn log_key_type_disabled(key_type_corr_id: &str, name: &str, dependents: i64, forced: bool) {
    tracing::warn!(
        event_type = events::KEY_TYPE_DISABLED,
        key_type_corr_id = %key_type_corr_id,
        name = %name,
        dependents = dependents,
        forced = forced,
        "Key type disabled"
    );
}

/// Log a cascade that left the key type Disabled with live dependents.
pub fn log_cascade_failed(key_type_corr_id: &str, pending: usize, error: &str) {
    tracing::error!(
        event_type = events::KEY_TYPE_CASCADE_FAILED,
        key_type_corr_id = %key_type_corr_id,
        pending = pending,
        error = %error,
        "Cascade destroy of dependent keys failed"
    );
}

/// Log a key issue.
pub fn log_key_issued(
    key_corr_id: &str,
    key_type_corr_id: &str,
    expiration_date: &DateTime<Utc>,
    intended_lifetime: &str,
) {
    tracing::info!(
        event_type = events::KEY_ISSUED,
        key_corr_id = %key_corr_id,
        key_type_corr_id = %key_type_corr_id,
        expiration_date = %expiration_date.to_rfc3339(),
        intended_lifetime = %intended_lifetime,
        "Key issued"
    );
}

/// Log an ordinary status transition.
pub fn log_key_transitioned(
    key_corr_id: &str,
    version: i32,
    from: KeyStatus,
    to: KeyStatus,
    justification: Option<&str>,
) {
    tracing::info!(
        event_type = events::KEY_TRANSITIONED,
        key_corr_id = %key_corr_id,
        version = version,
        from = %from,
        to = %to,
        justification = justification.unwrap_or("<none>"),
        "Key status changed"
    );
}

/// Log a refused transition.
pub fn log_transition_rejected(key_corr_id: &str, to: KeyStatus, reason: &str) {
    tracing::warn!(
        event_type = events::KEY_TRANSITION_REJECTED,
        key_corr_id = %key_corr_id,
        to = %to,
        reason = %reason,
        "Key status change rejected"
    );
}

/// Log a privileged destroy.
pub fn log_key_force_destroyed(key_corr_id: &str, version: i32, from: KeyStatus) {
    tracing::warn!(
        event_type = events::KEY_FORCE_DESTROYED,
        key_corr_id = %key_corr_id,
        version = version,
        from = %from,
        "Key forcibly destroyed"
    );
}

/// Log an automatic expiry.
pub fn log_key_expired(key_corr_id: &str, version: i32, from: KeyStatus) {
    tracing::info!(
        event_type = events::KEY_EXPIRED,
        key_corr_id = %key_corr_id,
        version = version,
        from = %from,
        "Key expired by sweep"
    );
}

/// Log a finished sweep pass.
pub fn log_sweep_completed(candidates: usize, expired: usize, skipped: usize, failed: usize) {
    tracing::info!(
        event_type = events::SWEEP_COMPLETED,
        candidates = candidates,
        expired = expired,
        skipped = skipped,
        failed = failed,
        "Expiration sweep completed"
    );
}
