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

//! Versioned key store.
//!
//! A key is never updated in place. Every status change appends a new
//! immutable version to the key's chain, copying the dates, lifetime label
//! and descriptor from its predecessor. The chain is the audit trail.
//!
//! There are three ways to append:
//!
//! | Path | Legality | Justification |
//! |------|----------|---------------|
//! | [`VersionedKeyStore::transition`] | transition table | required except into Expired |
//! | sweep expiry (via [`crate::sweeper`]) | transition table | fixed system text |
//! | [`VersionedKeyStore::force_destroy`] | bypassed | fixed system text |
//!
//! Each append runs in one `BEGIN IMMEDIATE` transaction that inserts the
//! version and compare-and-sets the chain head, so two writers can never
//! both append a successor to the same version.

use chrono::{DateTime, Duration, Utc};
use diesel::SqliteConnection;
use tracing::debug;

use crate::audit;
use crate::cryptoperiod;
use crate::dal;
use crate::database::universal_types::{new_correlation_id, UniversalTimestamp};
use crate::database::Database;
use crate::error::LedgerError;
use crate::lifecycle::{self, KeyStatus};
use crate::models::{CryptoKeyFilter, CryptoKeyVersion, NewCryptoKey, Page};

/// Justification recorded on versions appended by the expiration sweep.
pub const SWEEP_JUSTIFICATION: &str = "Automatically expired due to expiration date";

/// Justification recorded on versions appended by [`VersionedKeyStore::force_destroy`].
pub const FORCE_DESTROY_JUSTIFICATION: &str =
    "Destroyed by privileged operation without transition checks";

/// Owns key version chains.
#[derive(Debug, Clone)]
pub struct VersionedKeyStore {
    database: Database,
}

impl VersionedKeyStore {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Issues a new key against an Active key type.
    ///
    /// The expiration date is computed once here and copied to every later
    /// version. Version 1 is Active and carries the usage purpose as its
    /// justification, or none when the usage purpose is blank.
    pub async fn issue(&self, request: NewCryptoKey) -> Result<CryptoKeyVersion, LedgerError> {
        request.descriptor.validate()?;
        let now = UniversalTimestamp::now();

        let version = self
            .database
            .write(move |conn| {
                let key_type = dal::key_type::find_by_corr_id(conn, &request.key_type_corr_id)?
                    .ok_or_else(|| {
                        LedgerError::UnknownKeyType(request.key_type_corr_id.clone())
                    })?;
                if !key_type.is_active() {
                    return Err(LedgerError::KeyTypeDisabled(key_type.key_type_corr_id));
                }

                let activation_date = request
                    .activation_date
                    .map(|d| UniversalTimestamp::truncated(d).0)
                    .unwrap_or(now.0);
                let expiration_date =
                    expiration_from(activation_date, key_type.cryptoperiod_days)?;
                let usage_purpose = request.descriptor.usage_purpose.trim();
                let justification = (!usage_purpose.is_empty()).then(|| usage_purpose.to_string());

                let first = CryptoKeyVersion {
                    key_corr_id: new_correlation_id(),
                    version: 1,
                    key_type_corr_id: key_type.key_type_corr_id,
                    status: KeyStatus::Active,
                    justification,
                    activation_date,
                    expiration_date,
                    intended_lifetime: cryptoperiod::format(key_type.cryptoperiod_days),
                    descriptor: request.descriptor,
                    created_at: now.0,
                };

                dal::crypto_key::insert_version(conn, &first)?;
                dal::crypto_key::insert_chain(conn, &first)?;
                Ok(first)
            })
            .await?;

        audit::log_key_issued(
            &version.key_corr_id,
            &version.key_type_corr_id,
            &version.expiration_date,
            &version.intended_lifetime,
        );
        Ok(version)
    }

    /// Appends a version with `new_status` if the transition table allows it.
    pub async fn transition(
        &self,
        key_corr_id: &str,
        new_status: KeyStatus,
        justification: Option<&str>,
    ) -> Result<CryptoKeyVersion, LedgerError> {
        let id = key_corr_id.to_string();
        let requested = justification.map(str::to_string);

        let result = self
            .database
            .write(move |conn| {
                let current = dal::crypto_key::latest_version(conn, &id)?
                    .ok_or_else(|| LedgerError::NotFound(format!("key {}", id)))?;
                lifecycle::validate_transition(current.status, new_status)?;
                let justification =
                    lifecycle::validate_justification(new_status, requested.as_deref())?;
                let next = append_version(conn, &current, new_status, justification)?;
                Ok((current.status, next))
            })
            .await;

        match result {
            Ok((from, next)) => {
                audit::log_key_transitioned(
                    &next.key_corr_id,
                    next.version,
                    from,
                    next.status,
                    next.justification.as_deref(),
                );
                Ok(next)
            }
            Err(
                e @ (LedgerError::IllegalTransition { .. } | LedgerError::MissingJustification(_)),
            ) => {
                audit::log_transition_rejected(key_corr_id, new_status, &e.to_string());
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    /// All versions of a key, oldest first. Empty for an unknown key.
    pub async fn history(&self, key_corr_id: &str) -> Result<Vec<CryptoKeyVersion>, LedgerError> {
        let id = key_corr_id.to_string();
        self.database
            .read(move |conn| dal::crypto_key::history(conn, &id))
            .await
    }

    /// Latest version of a key.
    pub async fn current(&self, key_corr_id: &str) -> Result<CryptoKeyVersion, LedgerError> {
        let id = key_corr_id.to_string();
        self.database
            .read(move |conn| {
                dal::crypto_key::latest_version(conn, &id)?
                    .ok_or_else(|| LedgerError::NotFound(format!("key {}", id)))
            })
            .await
    }

    /// Latest version of each key matching `filter`.
    pub async fn list_current(
        &self,
        filter: CryptoKeyFilter,
        page: Page,
    ) -> Result<Vec<CryptoKeyVersion>, LedgerError> {
        self.database
            .read(move |conn| dal::crypto_key::list_current(conn, &filter, page))
            .await
    }

    /// Appends a Destroyed version regardless of the current status.
    ///
    /// Privileged: the transition table is not consulted. Works on an
    /// already Destroyed key too, appending another Destroyed version.
    pub async fn force_destroy(&self, key_corr_id: &str) -> Result<CryptoKeyVersion, LedgerError> {
        let id = key_corr_id.to_string();
        let (from, destroyed) = self
            .database
            .write(move |conn| force_destroy_in(conn, &id))
            .await?;
        audit::log_key_force_destroyed(&destroyed.key_corr_id, destroyed.version, from);
        Ok(destroyed)
    }

    /// Expires a key if it is still Active or Suspended and due at `now`.
    ///
    /// Eligibility is re-checked inside the transaction, so a key that a
    /// user moved on since the sweep selected it is skipped (`Ok(None)`).
    pub(crate) async fn expire_if_due(
        &self,
        key_corr_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<CryptoKeyVersion>, LedgerError> {
        let id = key_corr_id.to_string();
        let result = self
            .database
            .write(move |conn| {
                let Some(current) = dal::crypto_key::latest_version(conn, &id)? else {
                    return Ok(None);
                };
                let eligible = matches!(current.status, KeyStatus::Active | KeyStatus::Suspended);
                if !eligible || current.expiration_date > now {
                    debug!(key_corr_id = %id, status = %current.status, "Key no longer due for expiry");
                    return Ok(None);
                }
                lifecycle::validate_transition(current.status, KeyStatus::Expired)?;
                let next = append_version(
                    conn,
                    &current,
                    KeyStatus::Expired,
                    Some(SWEEP_JUSTIFICATION.to_string()),
                )?;
                Ok(Some((current.status, next)))
            })
            .await?;

        Ok(result.map(|(from, expired)| {
            audit::log_key_expired(&expired.key_corr_id, expired.version, from);
            expired
        }))
    }
}

/// Force-destroys one chain on an open transaction. Used by the cascade so
/// that all dependents are destroyed in a single transaction.
pub(crate) fn force_destroy_in(
    conn: &mut SqliteConnection,
    key_corr_id: &str,
) -> Result<(KeyStatus, CryptoKeyVersion), LedgerError> {
    let current = dal::crypto_key::latest_version(conn, key_corr_id)?
        .ok_or_else(|| LedgerError::NotFound(format!("key {}", key_corr_id)))?;
    let next = append_version(
        conn,
        &current,
        KeyStatus::Destroyed,
        Some(FORCE_DESTROY_JUSTIFICATION.to_string()),
    )?;
    Ok((current.status, next))
}

/// Appends the successor of `current` and advances the chain head.
///
/// `created_at` never goes backwards within a chain even if the clock does.
fn append_version(
    conn: &mut SqliteConnection,
    current: &CryptoKeyVersion,
    status: KeyStatus,
    justification: Option<String>,
) -> Result<CryptoKeyVersion, LedgerError> {
    let now = UniversalTimestamp::now();
    let next = CryptoKeyVersion {
        version: current.version + 1,
        status,
        justification,
        created_at: now.0.max(current.created_at),
        ..current.clone()
    };

    dal::crypto_key::insert_version(conn, &next)?;
    dal::crypto_key::advance_head(conn, current.version, &next, now)?;
    Ok(next)
}

/// Both dates must be storable; a chain with an unreadable date could
/// never be loaded or expired.
fn expiration_from(
    activation_date: DateTime<Utc>,
    cryptoperiod_days: i32,
) -> Result<DateTime<Utc>, LedgerError> {
    if !UniversalTimestamp::is_storable(&activation_date) {
        return Err(LedgerError::InvalidDefinition(format!(
            "activation date {} is outside years 0000 to 9999",
            activation_date
        )));
    }
    Duration::try_days(i64::from(cryptoperiod_days))
        .and_then(|period| activation_date.checked_add_signed(period))
        .filter(UniversalTimestamp::is_storable)
        .ok_or_else(|| {
            LedgerError::InvalidDefinition(format!(
                "activation date {} plus {} days is outside years 0000 to 9999",
                activation_date, cryptoperiod_days
            ))
        })
}
