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

//! Key type queries.

use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel::sqlite::Sqlite;
use diesel::SqliteConnection;

use super::models::{NewSqliteKeyType, SqliteKeyType};
use crate::database::schema::{key_chains, key_types};
use crate::database::universal_types::{new_correlation_id, UniversalTimestamp, UniversalUuid};
use crate::error::LedgerError;
use crate::lifecycle::KeyStatus;
use crate::models::{
    KeyType, KeyTypeDefinition, KeyTypeFilter, KeyTypeSort, KeyTypeSortField, KeyTypeStatus,
    Page, SortDirection,
};

/// Inserts an Active key type with a fresh correlation id.
///
/// A UNIQUE violation on `name` comes back as [`LedgerError::DuplicateName`].
pub fn insert(
    conn: &mut SqliteConnection,
    definition: KeyTypeDefinition,
    cryptoperiod_days: i32,
    now: UniversalTimestamp,
) -> Result<KeyType, LedgerError> {
    let key_type_corr_id = new_correlation_id();
    let now_text = now.to_sql_text();
    let name = definition.name.clone();

    let row = NewSqliteKeyType {
        id: UniversalUuid::new_v4().to_blob(),
        key_type_corr_id: key_type_corr_id.clone(),
        name: definition.name,
        description: definition.description,
        algorithm: definition.algorithm,
        size_bits: definition.size_bits,
        generated_by: definition.generated_by,
        form_factor: definition.form_factor,
        uniqueness_scope: definition.uniqueness_scope,
        cryptoperiod_days,
        status: KeyTypeStatus::Active.as_str().to_string(),
        created_at: now_text.clone(),
        updated_at: now_text,
    };

    match diesel::insert_into(key_types::table)
        .values(&row)
        .execute(conn)
    {
        Ok(_) => {}
        Err(DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _)) => {
            return Err(LedgerError::DuplicateName(name));
        }
        Err(e) => return Err(e.into()),
    }

    find_by_corr_id(conn, &key_type_corr_id)?
        .ok_or_else(|| LedgerError::Persistence(format!("Key type {} vanished", key_type_corr_id)))
}

pub fn find_by_corr_id(
    conn: &mut SqliteConnection,
    key_type_corr_id: &str,
) -> Result<Option<KeyType>, LedgerError> {
    let row: Option<SqliteKeyType> = key_types::table
        .filter(key_types::key_type_corr_id.eq(key_type_corr_id))
        .first(conn)
        .optional()?;
    row.map(KeyType::try_from).transpose()
}

pub fn name_exists(conn: &mut SqliteConnection, name: &str) -> Result<bool, LedgerError> {
    let count: i64 = key_types::table
        .filter(key_types::name.eq(name))
        .count()
        .get_result(conn)?;
    Ok(count > 0)
}

/// Filtered, sorted page of key types. Ties break on correlation id so
/// pages are stable.
pub fn list(
    conn: &mut SqliteConnection,
    filter: &KeyTypeFilter,
    sort: KeyTypeSort,
    page: Page,
) -> Result<Vec<KeyType>, LedgerError> {
    let mut query: key_types::BoxedQuery<'_, Sqlite> = key_types::table.into_boxed();

    if let Some(name) = &filter.name {
        query = query.filter(key_types::name.eq(name.clone()));
    }
    if let Some(algorithm) = &filter.algorithm {
        query = query.filter(key_types::algorithm.eq(algorithm.clone()));
    }
    if let Some(size_bits) = filter.size_bits {
        query = query.filter(key_types::size_bits.eq(size_bits));
    }
    if let Some(status) = filter.status {
        query = query.filter(key_types::status.eq(status.as_str()));
    }

    query = match (sort.field, sort.direction) {
        (KeyTypeSortField::Name, SortDirection::Ascending) => query.order(key_types::name.asc()),
        (KeyTypeSortField::Name, SortDirection::Descending) => query.order(key_types::name.desc()),
        (KeyTypeSortField::Algorithm, SortDirection::Ascending) => {
            query.order(key_types::algorithm.asc())
        }
        (KeyTypeSortField::Algorithm, SortDirection::Descending) => {
            query.order(key_types::algorithm.desc())
        }
        (KeyTypeSortField::SizeBits, SortDirection::Ascending) => {
            query.order(key_types::size_bits.asc())
        }
        (KeyTypeSortField::SizeBits, SortDirection::Descending) => {
            query.order(key_types::size_bits.desc())
        }
        (KeyTypeSortField::CreatedAt, SortDirection::Ascending) => {
            query.order(key_types::created_at.asc())
        }
        (KeyTypeSortField::CreatedAt, SortDirection::Descending) => {
            query.order(key_types::created_at.desc())
        }
    };

    let rows: Vec<SqliteKeyType> = query
        .then_order_by(key_types::key_type_corr_id.asc())
        .offset(page.offset())
        .limit(page.limit())
        .load(conn)?;

    rows.into_iter().map(KeyType::try_from).collect()
}

/// Moves an Active key type to Disabled. Returns false when it was not Active.
pub fn set_disabled(
    conn: &mut SqliteConnection,
    key_type_corr_id: &str,
    now: UniversalTimestamp,
) -> Result<bool, LedgerError> {
    let updated = diesel::update(
        key_types::table
            .filter(key_types::key_type_corr_id.eq(key_type_corr_id))
            .filter(key_types::status.eq(KeyTypeStatus::Active.as_str())),
    )
    .set((
        key_types::status.eq(KeyTypeStatus::Disabled.as_str()),
        key_types::updated_at.eq(now.to_sql_text()),
    ))
    .execute(conn)?;
    Ok(updated == 1)
}

/// Number of chains of this type whose latest version is not Destroyed.
pub fn count_dependents(
    conn: &mut SqliteConnection,
    key_type_corr_id: &str,
) -> Result<i64, LedgerError> {
    Ok(key_chains::table
        .filter(key_chains::key_type_corr_id.eq(key_type_corr_id))
        .filter(key_chains::head_status.ne(KeyStatus::Destroyed.as_str()))
        .count()
        .get_result(conn)?)
}

/// Correlation ids of the chains counted by [`count_dependents`].
pub fn dependent_chain_ids(
    conn: &mut SqliteConnection,
    key_type_corr_id: &str,
) -> Result<Vec<String>, LedgerError> {
    Ok(key_chains::table
        .filter(key_chains::key_type_corr_id.eq(key_type_corr_id))
        .filter(key_chains::head_status.ne(KeyStatus::Destroyed.as_str()))
        .order(key_chains::created_at.asc())
        .then_order_by(key_chains::key_corr_id.asc())
        .select(key_chains::key_corr_id)
        .load(conn)?)
}
