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

//! SQLite row models.
//!
//! UUIDs are stored as BLOB (`Vec<u8>`), timestamps and enums as TEXT.
//! Rows are converted to domain types at the DAL boundary and never leave it.
//! Field order matches the column order in `schema.rs`.

use diesel::prelude::*;

use crate::database::schema::{crypto_keys, key_chains, key_types};
use crate::database::universal_types::{UniversalTimestamp, UniversalUuid};
use crate::error::LedgerError;
use crate::models::{CryptoKeyVersion, KeyDescriptor, KeyType};

// ============================================================================
// Key Type Models
// ============================================================================

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = key_types)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteKeyType {
    pub id: Vec<u8>,
    pub key_type_corr_id: String,
    pub name: String,
    pub description: String,
    pub algorithm: String,
    pub size_bits: i32,
    pub generated_by: String,
    pub form_factor: String,
    pub uniqueness_scope: String,
    pub cryptoperiod_days: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = key_types)]
pub struct NewSqliteKeyType {
    pub id: Vec<u8>,
    pub key_type_corr_id: String,
    pub name: String,
    pub description: String,
    pub algorithm: String,
    pub size_bits: i32,
    pub generated_by: String,
    pub form_factor: String,
    pub uniqueness_scope: String,
    pub cryptoperiod_days: i32,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<SqliteKeyType> for KeyType {
    type Error = LedgerError;

    fn try_from(row: SqliteKeyType) -> Result<Self, Self::Error> {
        Ok(KeyType {
            key_type_corr_id: row.key_type_corr_id,
            name: row.name,
            description: row.description,
            algorithm: row.algorithm,
            size_bits: row.size_bits,
            generated_by: row.generated_by,
            form_factor: row.form_factor,
            uniqueness_scope: row.uniqueness_scope,
            cryptoperiod_days: row.cryptoperiod_days,
            status: row.status.parse()?,
            created_at: UniversalTimestamp::from_sql_text(&row.created_at)?.into_inner(),
            updated_at: UniversalTimestamp::from_sql_text(&row.updated_at)?.into_inner(),
        })
    }
}

// ============================================================================
// Crypto Key Version Models
// ============================================================================

/// One `crypto_keys` row. Used for both reads and inserts since version
/// rows are written once in full.
#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = crypto_keys)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteCryptoKey {
    pub id: Vec<u8>,
    pub key_corr_id: String,
    pub version: i32,
    pub key_type_corr_id: String,
    pub status: String,
    pub justification: Option<String>,
    pub activation_date: String,
    pub expiration_date: String,
    pub intended_lifetime: String,
    pub description: String,
    pub generating_entity: String,
    pub generation_method: String,
    pub storage_location: String,
    pub encryption_under_lmk: String,
    pub form_factor: String,
    pub scope_of_uniqueness: String,
    pub usage_purpose: String,
    pub operational_environment: String,
    pub associated_parties: String,
    pub access_control_mechanisms: String,
    pub compliance_requirements: String,
    pub audit_log_reference: String,
    pub backup_and_recovery_details: String,
    pub notes: String,
    pub created_at: String,
}

impl SqliteCryptoKey {
    /// Builds a row for `version` with a fresh surrogate id.
    pub fn from_version(version: &CryptoKeyVersion) -> Self {
        let d = &version.descriptor;
        SqliteCryptoKey {
            id: UniversalUuid::new_v4().to_blob(),
            key_corr_id: version.key_corr_id.clone(),
            version: version.version,
            key_type_corr_id: version.key_type_corr_id.clone(),
            status: version.status.as_str().to_string(),
            justification: version.justification.clone(),
            activation_date: UniversalTimestamp(version.activation_date).to_sql_text(),
            expiration_date: UniversalTimestamp(version.expiration_date).to_sql_text(),
            intended_lifetime: version.intended_lifetime.clone(),
            description: d.description.clone(),
            generating_entity: d.generating_entity.clone(),
            generation_method: d.generation_method.clone(),
            storage_location: d.storage_location.clone(),
            encryption_under_lmk: d.encryption_under_lmk.clone(),
            form_factor: d.form_factor.clone(),
            scope_of_uniqueness: d.scope_of_uniqueness.clone(),
            usage_purpose: d.usage_purpose.clone(),
            operational_environment: d.operational_environment.clone(),
            associated_parties: d.associated_parties.clone(),
            access_control_mechanisms: d.access_control_mechanisms.clone(),
            compliance_requirements: d.compliance_requirements.clone(),
            audit_log_reference: d.audit_log_reference.clone(),
            backup_and_recovery_details: d.backup_and_recovery_details.clone(),
            notes: d.notes.clone(),
            created_at: UniversalTimestamp(version.created_at).to_sql_text(),
        }
    }
}

impl TryFrom<SqliteCryptoKey> for CryptoKeyVersion {
    type Error = LedgerError;

    fn try_from(row: SqliteCryptoKey) -> Result<Self, Self::Error> {
        Ok(CryptoKeyVersion {
            key_corr_id: row.key_corr_id,
            version: row.version,
            key_type_corr_id: row.key_type_corr_id,
            status: row.status.parse()?,
            justification: row.justification,
            activation_date: UniversalTimestamp::from_sql_text(&row.activation_date)?.into_inner(),
            expiration_date: UniversalTimestamp::from_sql_text(&row.expiration_date)?.into_inner(),
            intended_lifetime: row.intended_lifetime,
            descriptor: KeyDescriptor {
                description: row.description,
                generating_entity: row.generating_entity,
                generation_method: row.generation_method,
                storage_location: row.storage_location,
                encryption_under_lmk: row.encryption_under_lmk,
                form_factor: row.form_factor,
                scope_of_uniqueness: row.scope_of_uniqueness,
                usage_purpose: row.usage_purpose,
                operational_environment: row.operational_environment,
                associated_parties: row.associated_parties,
                access_control_mechanisms: row.access_control_mechanisms,
                compliance_requirements: row.compliance_requirements,
                audit_log_reference: row.audit_log_reference,
                backup_and_recovery_details: row.backup_and_recovery_details,
                notes: row.notes,
            },
            created_at: UniversalTimestamp::from_sql_text(&row.created_at)?.into_inner(),
        })
    }
}

// ============================================================================
// Key Chain Head Models
// ============================================================================

#[derive(Debug, Clone, Queryable, Selectable, Insertable)]
#[diesel(table_name = key_chains)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SqliteKeyChain {
    pub key_corr_id: String,
    pub key_type_corr_id: String,
    pub head_version: i32,
    pub head_status: String,
    pub expiration_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl SqliteKeyChain {
    /// Head row for a freshly issued chain.
    pub fn for_first_version(version: &CryptoKeyVersion) -> Self {
        let created = UniversalTimestamp(version.created_at).to_sql_text();
        SqliteKeyChain {
            key_corr_id: version.key_corr_id.clone(),
            key_type_corr_id: version.key_type_corr_id.clone(),
            head_version: version.version,
            head_status: version.status.as_str().to_string(),
            expiration_date: UniversalTimestamp(version.expiration_date).to_sql_text(),
            created_at: created.clone(),
            updated_at: created,
        }
    }
}
