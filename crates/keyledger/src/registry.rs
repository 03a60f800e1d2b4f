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

//! Key type registry and cascading disable.
//!
//! Disabling a key type that still has live keys is a two-step saga:
//!
//! 1. One transaction moves the key type to Disabled and commits.
//! 2. A second transaction force-destroys every dependent chain.
//!
//! Step 2 is all-or-nothing, but it cannot undo step 1. If it fails the
//! caller gets [`LedgerError::CascadeIncomplete`] and the key type stays
//! Disabled with its dependents untouched. Such a key type cannot be
//! disabled again (it is no longer Active); its remaining keys can be
//! destroyed individually with [`VersionedKeyStore::force_destroy`].

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::audit;
use crate::cryptoperiod;
use crate::dal;
use crate::database::universal_types::UniversalTimestamp;
use crate::database::Database;
use crate::error::LedgerError;
use crate::models::{
    CryptoKeyVersion, KeyType, KeyTypeDefinition, KeyTypeFilter, KeyTypeSort, Page,
};
use crate::store::{self, VersionedKeyStore};

/// Result of [`KeyTypeRegistry::disable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisableOutcome {
    /// The key type as it stands after step 1.
    pub key_type: KeyType,
    /// Destroyed versions appended by the cascade. Empty for a direct disable.
    pub destroyed_keys: Vec<CryptoKeyVersion>,
}

/// Owns key type definitions.
#[derive(Debug, Clone)]
pub struct KeyTypeRegistry {
    database: Database,
    store: VersionedKeyStore,
    max_cryptoperiod_days: i32,
}

impl KeyTypeRegistry {
    pub fn new(database: Database, store: VersionedKeyStore, max_cryptoperiod_days: i32) -> Self {
        Self {
            database,
            store,
            max_cryptoperiod_days,
        }
    }

    /// The store used for cascading destroys.
    pub fn store(&self) -> &VersionedKeyStore {
        &self.store
    }

    /// Defines a new Active key type.
    pub async fn define(&self, definition: KeyTypeDefinition) -> Result<KeyType, LedgerError> {
        definition.validate()?;
        let days =
            cryptoperiod::parse_and_validate(&definition.cryptoperiod, self.max_cryptoperiod_days)?;
        let now = UniversalTimestamp::now();

        let key_type = self
            .database
            .write(move |conn| {
                if dal::key_type::name_exists(conn, &definition.name)? {
                    return Err(LedgerError::DuplicateName(definition.name));
                }
                dal::key_type::insert(conn, definition, days, now)
            })
            .await?;

        audit::log_key_type_defined(
            &key_type.key_type_corr_id,
            &key_type.name,
            &key_type.cryptoperiod(),
        );
        Ok(key_type)
    }

    pub async fn get(&self, key_type_corr_id: &str) -> Result<KeyType, LedgerError> {
        let id = key_type_corr_id.to_string();
        self.database
            .read(move |conn| {
                dal::key_type::find_by_corr_id(conn, &id)?
                    .ok_or_else(|| LedgerError::NotFound(format!("key type {}", id)))
            })
            .await
    }

    /// Filtered, sorted page of key types.
    pub async fn list(
        &self,
        filter: KeyTypeFilter,
        sort: KeyTypeSort,
        page: Page,
    ) -> Result<Vec<KeyType>, LedgerError> {
        self.database
            .read(move |conn| dal::key_type::list(conn, &filter, sort, page))
            .await
    }

    /// Disables an Active key type.
    ///
    /// Without `force`, a key type with live dependents (chains whose latest
    /// version is not Destroyed) is refused with
    /// [`LedgerError::HasDependentKeys`] and left untouched.
    pub async fn disable(
        &self,
        key_type_corr_id: &str,
        force: bool,
    ) -> Result<DisableOutcome, LedgerError> {
        let id = key_type_corr_id.to_string();
        let now = UniversalTimestamp::now();

        // Step 1: disable and commit.
        let (key_type, dependents) = self
            .database
            .write(move |conn| {
                let not_found = || LedgerError::NotFound(format!("active key type {}", id));
                let key_type = dal::key_type::find_by_corr_id(conn, &id)?
                    .filter(KeyType::is_active)
                    .ok_or_else(not_found)?;

                let dependents = dal::key_type::count_dependents(conn, &id)?;
                if dependents > 0 && !force {
                    return Err(LedgerError::HasDependentKeys {
                        key_type: id.clone(),
                        count: dependents,
                    });
                }

                if !dal::key_type::set_disabled(conn, &id, now)? {
                    return Err(not_found());
                }
                let disabled = dal::key_type::find_by_corr_id(conn, &id)?.unwrap_or(key_type);
                Ok((disabled, dependents))
            })
            .await?;

        audit::log_key_type_disabled(
            &key_type.key_type_corr_id,
            &key_type.name,
            dependents,
            force,
        );

        if dependents == 0 {
            return Ok(DisableOutcome {
                key_type,
                destroyed_keys: Vec::new(),
            });
        }

        // Step 2: destroy every dependent in one transaction. The set is
        // re-read here since it may have changed after step 1 committed.
        info!(
            key_type_corr_id = %key_type.key_type_corr_id,
            dependents,
            "Cascading destroy to dependent keys"
        );
        let cascade_id = key_type.key_type_corr_id.clone();
        let cascade = self
            .database
            .write(move |conn| {
                let chain_ids = dal::key_type::dependent_chain_ids(conn, &cascade_id)?;
                chain_ids
                    .iter()
                    .map(|chain_id| store::force_destroy_in(conn, chain_id))
                    .collect::<Result<Vec<_>, LedgerError>>()
            })
            .await;

        match cascade {
            Ok(destroyed) => {
                let destroyed_keys = destroyed
                    .into_iter()
                    .map(|(from, version)| {
                        audit::log_key_force_destroyed(&version.key_corr_id, version.version, from);
                        version
                    })
                    .collect();
                Ok(DisableOutcome {
                    key_type,
                    destroyed_keys,
                })
            }
            Err(e) => {
                let pending = usize::try_from(dependents).unwrap_or(usize::MAX);
                let reason = e.to_string();
                audit::log_cascade_failed(&key_type.key_type_corr_id, pending, &reason);
                Err(LedgerError::CascadeIncomplete {
                    key_type: key_type.key_type_corr_id,
                    pending,
                    reason,
                })
            }
        }
    }
}
