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

//! Test fixtures: one migrated SQLite file per test in a temp directory.

use chrono::{DateTime, Utc};
use keyledger::{
    CryptoKeyVersion, KeyDescriptor, KeyLedger, KeyStatus, KeyType, KeyTypeDefinition,
    LedgerConfig, LedgerConfigBuilder, NewCryptoKey,
};
use std::ops::Deref;
use tempfile::TempDir;

/// A ledger backed by a database file that is removed on drop.
pub struct TestLedger {
    ledger: KeyLedger,
    _dir: TempDir,
}

impl Deref for TestLedger {
    type Target = KeyLedger;

    fn deref(&self) -> &Self::Target {
        &self.ledger
    }
}

pub async fn ledger() -> TestLedger {
    ledger_with(LedgerConfig::builder()).await
}

pub async fn ledger_with(builder: LedgerConfigBuilder) -> TestLedger {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("keyledger.db");
    let config = builder.database_url(path.to_string_lossy()).build();
    let ledger = KeyLedger::connect(config)
        .await
        .expect("Failed to connect ledger");
    TestLedger { ledger, _dir: dir }
}

pub fn definition(name: &str, cryptoperiod: &str) -> KeyTypeDefinition {
    KeyTypeDefinition {
        name: name.to_string(),
        description: format!("{} used in tests", name),
        algorithm: "AES".to_string(),
        size_bits: 256,
        generated_by: "Payment Processor".to_string(),
        form_factor: "Generated by HSM, stored encrypted under LMK".to_string(),
        uniqueness_scope: "Unique per device".to_string(),
        cryptoperiod: cryptoperiod.to_string(),
    }
}

pub fn descriptor() -> KeyDescriptor {
    KeyDescriptor {
        description: "AES key for payment transactions".to_string(),
        generating_entity: "Payment Processor".to_string(),
        generation_method: "HSM random".to_string(),
        storage_location: "HSM partition 2".to_string(),
        encryption_under_lmk: "Variant 1".to_string(),
        form_factor: "Cryptogram".to_string(),
        scope_of_uniqueness: "Unique per terminal".to_string(),
        usage_purpose: "Encrypt card data at rest".to_string(),
        operational_environment: "Production".to_string(),
        associated_parties: "Acquirer".to_string(),
        access_control_mechanisms: "Dual control".to_string(),
        compliance_requirements: "PCI DSS 3.6".to_string(),
        audit_log_reference: "AUD-2025-001".to_string(),
        backup_and_recovery_details: "Escrowed components in safe".to_string(),
        notes: String::new(),
    }
}

pub async fn define_type(ledger: &KeyLedger, name: &str, cryptoperiod: &str) -> KeyType {
    ledger
        .registry()
        .define(definition(name, cryptoperiod))
        .await
        .expect("Failed to define key type")
}

pub async fn issue_key(
    ledger: &KeyLedger,
    key_type: &KeyType,
    activation_date: Option<DateTime<Utc>>,
) -> CryptoKeyVersion {
    ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: key_type.key_type_corr_id.clone(),
            activation_date,
            descriptor: descriptor(),
        })
        .await
        .expect("Failed to issue key")
}

/// Issues a key and walks it to `status` using legal transitions.
pub async fn key_in_status(
    ledger: &KeyLedger,
    key_type: &KeyType,
    status: KeyStatus,
) -> CryptoKeyVersion {
    let key = issue_key(ledger, key_type, None).await;
    let path: &[KeyStatus] = match status {
        KeyStatus::Active => &[],
        KeyStatus::Suspended => &[KeyStatus::Suspended],
        KeyStatus::Compromised => &[KeyStatus::Compromised],
        KeyStatus::Expired => &[KeyStatus::Expired],
        KeyStatus::Destroyed => &[KeyStatus::Suspended, KeyStatus::Destroyed],
    };

    let mut latest = key;
    for step in path {
        latest = ledger
            .store()
            .transition(&latest.key_corr_id, *step, Some("test setup"))
            .await
            .expect("Failed to walk key to status");
    }
    assert_eq!(latest.status, status);
    latest
}
