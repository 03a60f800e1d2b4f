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

//! Key version and chain head queries.
//!
//! `crypto_keys` is append-only. `key_chains` holds one head row per chain
//! and is the only table updated after issue; [`advance_head`] moves it with
//! a compare-and-set on `head_version`, which is what serializes competing
//! appends to the same chain.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;

use super::models::{SqliteCryptoKey, SqliteKeyChain};
use crate::database::schema::{crypto_keys, key_chains};
use crate::database::universal_types::UniversalTimestamp;
use crate::error::LedgerError;
use crate::lifecycle::KeyStatus;
use crate::models::{CryptoKeyFilter, CryptoKeyVersion, Page};

/// Appends one version row.
///
/// A clash on `(key_corr_id, version)` means another writer appended the
/// same successor first and surfaces as [`LedgerError::VersionConflict`].
pub fn insert_version(
    conn: &mut SqliteConnection,
    version: &CryptoKeyVersion,
) -> Result<(), LedgerError> {
    let row = SqliteCryptoKey::from_version(version);
    match diesel::insert_into(crypto_keys::table)
        .values(&row)
        .execute(conn)
    {
        Ok(_) => Ok(()),
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => Err(
            LedgerError::VersionConflict(version.key_corr_id.clone()),
        ),
        Err(e) => Err(e.into()),
    }
}

/// Creates the head row for a freshly issued chain.
pub fn insert_chain(
    conn: &mut SqliteConnection,
    first_version: &CryptoKeyVersion,
) -> Result<(), LedgerError> {
    let row = SqliteKeyChain::for_first_version(first_version);
    diesel::insert_into(key_chains::table)
        .values(&row)
        .execute(conn)?;
    Ok(())
}

pub fn find_head(
    conn: &mut SqliteConnection,
    key_corr_id: &str,
) -> Result<Option<SqliteKeyChain>, LedgerError> {
    Ok(key_chains::table
        .filter(key_chains::key_corr_id.eq(key_corr_id))
        .first::<SqliteKeyChain>(conn)
        .optional()?)
}

/// A specific version of a chain.
pub fn version_at(
    conn: &mut SqliteConnection,
    key_corr_id: &str,
    version: i32,
) -> Result<Option<CryptoKeyVersion>, LedgerError> {
    let row: Option<SqliteCryptoKey> = crypto_keys::table
        .filter(crypto_keys::key_corr_id.eq(key_corr_id))
        .filter(crypto_keys::version.eq(version))
        .first(conn)
        .optional()?;
    row.map(CryptoKeyVersion::try_from).transpose()
}

/// The version the chain head points at, or `None` for an unknown chain.
pub fn latest_version(
    conn: &mut SqliteConnection,
    key_corr_id: &str,
) -> Result<Option<CryptoKeyVersion>, LedgerError> {
    let Some(head) = find_head(conn, key_corr_id)? else {
        return Ok(None);
    };
    let version = version_at(conn, key_corr_id, head.head_version)?;
    match version {
        Some(v) => Ok(Some(v)),
        None => Err(LedgerError::Persistence(format!(
            "Chain {} points at missing version {}",
            key_corr_id, head.head_version
        ))),
    }
}

/// All versions of a chain, oldest first.
pub fn history(
    conn: &mut SqliteConnection,
    key_corr_id: &str,
) -> Result<Vec<CryptoKeyVersion>, LedgerError> {
    let rows: Vec<SqliteCryptoKey> = crypto_keys::table
        .filter(crypto_keys::key_corr_id.eq(key_corr_id))
        .order(crypto_keys::version.asc())
        .load(conn)?;
    rows.into_iter().map(CryptoKeyVersion::try_from).collect()
}

/// Moves the head from `expected_version` to `next`.
///
/// Zero updated rows means the head moved underneath us.
pub fn advance_head(
    conn: &mut SqliteConnection,
    expected_version: i32,
    next: &CryptoKeyVersion,
    now: UniversalTimestamp,
) -> Result<(), LedgerError> {
    let updated = diesel::update(
        key_chains::table
            .filter(key_chains::key_corr_id.eq(&next.key_corr_id))
            .filter(key_chains::head_version.eq(expected_version)),
    )
    .set((
        key_chains::head_version.eq(next.version),
        key_chains::head_status.eq(next.status.as_str()),
        key_chains::updated_at.eq(now.to_sql_text()),
    ))
    .execute(conn)?;

    if updated != 1 {
        return Err(LedgerError::VersionConflict(next.key_corr_id.clone()));
    }
    Ok(())
}

/// Chains whose head is Active or Suspended and expired at or before `now`.
pub fn due_for_expiry(
    conn: &mut SqliteConnection,
    now: UniversalTimestamp,
) -> Result<Vec<String>, LedgerError> {
    Ok(key_chains::table
        .filter(
            key_chains::head_status
                .eq_any([KeyStatus::Active.as_str(), KeyStatus::Suspended.as_str()]),
        )
        .filter(key_chains::expiration_date.le(now.to_sql_text()))
        .order(key_chains::expiration_date.asc())
        .then_order_by(key_chains::key_corr_id.asc())
        .select(key_chains::key_corr_id)
        .load(conn)?)
}

/// Current version of each chain matching `filter`, oldest chain first.
pub fn list_current(
    conn: &mut SqliteConnection,
    filter: &CryptoKeyFilter,
    page: Page,
) -> Result<Vec<CryptoKeyVersion>, LedgerError> {
    let mut query: key_chains::BoxedQuery<'_, Sqlite> = key_chains::table.into_boxed();

    if let Some(key_type_corr_id) = &filter.key_type_corr_id {
        query = query.filter(key_chains::key_type_corr_id.eq(key_type_corr_id.clone()));
    }
    if let Some(status) = filter.status {
        query = query.filter(key_chains::head_status.eq(status.as_str()));
    }

    let heads: Vec<SqliteKeyChain> = query
        .order(key_chains::created_at.asc())
        .then_order_by(key_chains::key_corr_id.asc())
        .offset(page.offset())
        .limit(page.limit())
        .load(conn)?;

    let mut versions = Vec::with_capacity(heads.len());
    for head in heads {
        let version = version_at(conn, &head.key_corr_id, head.head_version)?.ok_or_else(|| {
            LedgerError::Persistence(format!(
                "Chain {} points at missing version {}",
                head.key_corr_id, head.head_version
            ))
        })?;
        versions.push(version);
    }
    Ok(versions)
}
