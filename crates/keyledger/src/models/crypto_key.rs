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

//! Key version records.
//!
//! A logical key is a chain of [`CryptoKeyVersion`]s sharing one
//! `key_corr_id`. Everything in [`KeyDescriptor`] and the dates are fixed at
//! issue time and copied forward unchanged; only `status`, `justification`,
//! `version` and `created_at` differ between versions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::check_length;
use crate::error::LedgerError;
use crate::lifecycle::KeyStatus;

/// Static descriptive metadata of a key. Omitted fields deserialize empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyDescriptor {
    pub description: String,
    pub generating_entity: String,
    pub generation_method: String,
    pub storage_location: String,
    pub encryption_under_lmk: String,
    pub form_factor: String,
    pub scope_of_uniqueness: String,
    /// Also recorded as the justification of version 1.
    pub usage_purpose: String,
    pub operational_environment: String,
    pub associated_parties: String,
    pub access_control_mechanisms: String,
    pub compliance_requirements: String,
    pub audit_log_reference: String,
    pub backup_and_recovery_details: String,
    pub notes: String,
}

impl KeyDescriptor {
    pub fn validate(&self) -> Result<(), LedgerError> {
        let limits: [(&str, &str, usize); 15] = [
            ("description", self.description.as_str(), 250),
            ("generating_entity", self.generating_entity.as_str(), 100),
            ("generation_method", self.generation_method.as_str(), 50),
            ("storage_location", self.storage_location.as_str(), 100),
            ("encryption_under_lmk", self.encryption_under_lmk.as_str(), 50),
            ("form_factor", self.form_factor.as_str(), 100),
            ("scope_of_uniqueness", self.scope_of_uniqueness.as_str(), 100),
            ("usage_purpose", self.usage_purpose.as_str(), 100),
            ("operational_environment", self.operational_environment.as_str(), 100),
            ("associated_parties", self.associated_parties.as_str(), 250),
            ("access_control_mechanisms", self.access_control_mechanisms.as_str(), 250),
            ("compliance_requirements", self.compliance_requirements.as_str(), 250),
            ("audit_log_reference", self.audit_log_reference.as_str(), 100),
            ("backup_and_recovery_details", self.backup_and_recovery_details.as_str(), 250),
            ("notes", self.notes.as_str(), 500),
        ];
        for (field, value, max) in limits {
            check_length(field, value, max)?;
        }
        Ok(())
    }
}

/// One immutable version of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoKeyVersion {
    pub key_corr_id: String,
    /// 1 for the issued version, then +1 per transition.
    pub version: i32,
    pub key_type_corr_id: String,
    pub status: KeyStatus,
    /// Absent only for a transition into Expired requested without a reason.
    pub justification: Option<String>,
    pub activation_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    pub intended_lifetime: String,
    #[serde(flatten)]
    pub descriptor: KeyDescriptor,
    pub created_at: DateTime<Utc>,
}

/// Request to issue a new key against a key type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCryptoKey {
    pub key_type_corr_id: String,
    /// Defaults to the time of issue.
    #[serde(default)]
    pub activation_date: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub descriptor: KeyDescriptor,
}

/// Filters for listing the current version of each key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CryptoKeyFilter {
    pub key_type_corr_id: Option<String>,
    pub status: Option<KeyStatus>,
}
