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


use keyledger::cryptoperiod::CryptoperiodError;
use keyledger::{
    KeyTypeFilter, KeyTypeSort, KeyTypeSortField, KeyTypeStatus, LedgerConfig, LedgerError,
    Page, SortDirection,
};

use crate::fixtures::{self, define_type, definition};

#[tokio::test]
async fn test_define_and_get() {
    let ledger = fixtures::ledger().await;
    let zmk = define_type(&ledger, "ZMK", "1y").await;

    assert_eq!(zmk.name, "ZMK");
    assert_eq!(zmk.cryptoperiod_days, 365);
    assert_eq!(zmk.cryptoperiod(), "1y");
    assert_eq!(zmk.status, KeyTypeStatus::Active);
    assert!(!zmk.key_type_corr_id.is_empty());

    let fetched = ledger
        .registry()
        .get(&zmk.key_type_corr_id)
        .await
        .expect("Failed to get key type");
    assert_eq!(fetched, zmk);
}

#[tokio::test]
async fn test_cryptoperiod_units() {
    let ledger = fixtures::ledger().await;
    let cases = [("Days", "45d", 45), ("Months", "6M", 180), ("Years", " 2y ", 730)];
    for (name, token, days) in cases {
        let key_type = define_type(&ledger, name, token).await;
        assert_eq!(key_type.cryptoperiod_days, days, "token {:?}", token);
    }
}

#[tokio::test]
async fn test_get_unknown_key_type() {
    let ledger = fixtures::ledger().await;
    let result = ledger.registry().get("missing").await;
    assert!(matches!(result, Err(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_duplicate_name_is_rejected() {
    let ledger = fixtures::ledger().await;
    define_type(&ledger, "ZMK", "1y").await;

    let result = ledger.registry().define(definition("ZMK", "2y")).await;
    assert!(matches!(result, Err(LedgerError::DuplicateName(name)) if name == "ZMK"));

    // Names stay reserved after the type is disabled.
    let tpk = define_type(&ledger, "TPK", "30d").await;
    ledger
        .registry()
        .disable(&tpk.key_type_corr_id, false)
        .await
        .unwrap();
    let again = ledger.registry().define(definition("TPK", "30d")).await;
    assert!(matches!(again, Err(LedgerError::DuplicateName(_))));
}

#[tokio::test]
async fn test_invalid_cryptoperiods_are_rejected() {
    let ledger = fixtures::ledger().await;

    for token in ["", "1w", "y", "-1d", "1.5y", "12"] {
        let result = ledger.registry().define(definition("Bad Token", token)).await;
        assert!(
            matches!(
                result,
                Err(LedgerError::InvalidCryptoperiod(CryptoperiodError::InvalidFormat(_)))
            ),
            "token {:?} gave {:?}",
            token,
            result
        );
    }

    let zero = ledger.registry().define(definition("Zero", "0d")).await;
    assert!(matches!(zero, Err(LedgerError::InvalidCryptoperiod(_))));

    let too_long = ledger.registry().define(definition("Forever", "101y")).await;
    assert!(matches!(too_long, Err(LedgerError::InvalidCryptoperiod(_))));

    let listed = ledger
        .registry()
        .list(KeyTypeFilter::default(), KeyTypeSort::default(), Page::default())
        .await
        .unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_configured_maximum_cryptoperiod() {
    let ledger =
        fixtures::ledger_with(LedgerConfig::builder().max_cryptoperiod_days(365)).await;

    define_type(&ledger, "One Year", "12m").await;
    let result = ledger.registry().define(definition("Two Years", "2y")).await;
    assert!(matches!(result, Err(LedgerError::InvalidCryptoperiod(_))));
}

#[tokio::test]
async fn test_invalid_definitions_are_rejected() {
    let ledger = fixtures::ledger().await;

    let mut bad_name = definition("ZMK", "1y");
    bad_name.name = "ZMK-01".to_string();
    let mut long_description = definition("ZMK", "1y");
    long_description.description = "d".repeat(251);
    let mut small_key = definition("ZMK", "1y");
    small_key.size_bits = 32;
    let mut large_key = definition("ZMK", "1y");
    large_key.size_bits = 8192;

    for candidate in [bad_name, long_description, small_key, large_key] {
        let result = ledger.registry().define(candidate.clone()).await;
        assert!(
            matches!(result, Err(LedgerError::InvalidDefinition(_))),
            "{:?} gave {:?}",
            candidate,
            result
        );
    }
}

#[tokio::test]
async fn test_list_filters_sorts_and_pages() {
    let ledger = fixtures::ledger().await;
    let mut aes = definition("Alpha", "1y");
    aes.size_bits = 128;
    let mut rsa = definition("Bravo", "2y");
    rsa.algorithm = "RSA".to_string();
    rsa.size_bits = 2048;
    let charlie = definition("Charlie", "30d");
    for def in [rsa, charlie, aes] {
        ledger.registry().define(def).await.unwrap();
    }
    let registry = ledger.registry();

    let by_name = registry
        .list(
            KeyTypeFilter::default(),
            KeyTypeSort {
                field: KeyTypeSortField::Name,
                direction: SortDirection::Descending,
            },
            Page::default(),
        )
        .await
        .unwrap();
    let names: Vec<&str> = by_name.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["Charlie", "Bravo", "Alpha"]);

    let by_size = registry
        .list(
            KeyTypeFilter::default(),
            KeyTypeSort {
                field: KeyTypeSortField::SizeBits,
                direction: SortDirection::Ascending,
            },
            Page::default(),
        )
        .await
        .unwrap();
    let sizes: Vec<i32> = by_size.iter().map(|t| t.size_bits).collect();
    assert_eq!(sizes, vec![128, 256, 2048]);

    let aes_only = registry
        .list(
            KeyTypeFilter {
                algorithm: Some("AES".to_string()),
                ..Default::default()
            },
            KeyTypeSort::default(),
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(aes_only.len(), 2);

    let second_page = registry
        .list(
            KeyTypeFilter::default(),
            KeyTypeSort {
                field: KeyTypeSortField::Name,
                direction: SortDirection::Ascending,
            },
            Page::new(1, 1),
        )
        .await
        .unwrap();
    assert_eq!(second_page.len(), 1);
    assert_eq!(second_page[0].name, "Bravo");

    let bravo = &by_name[1];
    registry.disable(&bravo.key_type_corr_id, false).await.unwrap();
    let active = registry
        .list(
            KeyTypeFilter {
                status: Some(KeyTypeStatus::Active),
                ..Default::default()
            },
            KeyTypeSort::default(),
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|t| t.name != "Bravo"));
}
