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


use chrono::{Duration, TimeZone, Utc};
use diesel::RunQueryDsl;
use keyledger::lifecycle::is_legal;
use keyledger::{CryptoKeyFilter, KeyStatus, LedgerError, NewCryptoKey, Page};

use crate::fixtures::{self, define_type, descriptor, issue_key, key_in_status};

#[tokio::test]
async fn test_issue_creates_active_version_one() {
    let ledger = fixtures::ledger().await;
    let zmk = define_type(&ledger, "ZMK", "1y").await;
    let activation = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();

    let key = issue_key(&ledger, &zmk, Some(activation)).await;

    assert_eq!(key.version, 1);
    assert_eq!(key.status, KeyStatus::Active);
    assert_eq!(key.key_type_corr_id, zmk.key_type_corr_id);
    assert_eq!(key.activation_date, activation);
    assert_eq!(
        key.expiration_date,
        Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
    );
    assert_eq!(key.intended_lifetime, "1y");
    assert_eq!(key.justification.as_deref(), Some("Encrypt card data at rest"));
    assert_eq!(key.descriptor, descriptor());
}

#[tokio::test]
async fn test_issue_defaults_activation_to_now() {
    let ledger = fixtures::ledger().await;
    let tpk = define_type(&ledger, "TPK", "30d").await;
    let before = Utc::now() - Duration::seconds(1);

    let key = issue_key(&ledger, &tpk, None).await;

    assert!(key.activation_date >= before);
    assert!(key.activation_date <= Utc::now());
    assert_eq!(key.expiration_date - key.activation_date, Duration::days(30));
}

#[tokio::test]
async fn test_issue_with_blank_usage_purpose_has_no_justification() {
    let ledger = fixtures::ledger().await;
    let tpk = define_type(&ledger, "TPK", "30d").await;
    let mut blank = descriptor();
    blank.usage_purpose = "   ".to_string();

    let key = ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: tpk.key_type_corr_id.clone(),
            activation_date: None,
            descriptor: blank,
        })
        .await
        .unwrap();

    assert_eq!(key.justification, None);
    let stored = ledger.store().current(&key.key_corr_id).await.unwrap();
    assert_eq!(stored.justification, None);
}

#[tokio::test]
async fn test_issue_against_unknown_key_type() {
    let ledger = fixtures::ledger().await;
    let result = ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: "no-such-type".to_string(),
            activation_date: None,
            descriptor: descriptor(),
        })
        .await;

    assert!(matches!(result, Err(LedgerError::UnknownKeyType(id)) if id == "no-such-type"));
}

#[tokio::test]
async fn test_issue_against_disabled_key_type() {
    let ledger = fixtures::ledger().await;
    let bdk = define_type(&ledger, "BDK", "2y").await;
    ledger
        .registry()
        .disable(&bdk.key_type_corr_id, false)
        .await
        .expect("Failed to disable key type");

    let result = ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: bdk.key_type_corr_id.clone(),
            activation_date: None,
            descriptor: descriptor(),
        })
        .await;

    assert!(matches!(result, Err(LedgerError::KeyTypeDisabled(_))));
}

#[tokio::test]
async fn test_issue_rejects_oversized_descriptor() {
    let ledger = fixtures::ledger().await;
    let zpk = define_type(&ledger, "ZPK", "1y").await;
    let mut oversized = descriptor();
    oversized.notes = "n".repeat(501);

    let result = ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: zpk.key_type_corr_id.clone(),
            activation_date: None,
            descriptor: oversized,
        })
        .await;

    assert!(matches!(result, Err(LedgerError::InvalidDefinition(_))));
}

#[tokio::test]
async fn test_issue_rejects_expiration_past_year_9999() {
    let ledger = fixtures::ledger().await;
    let lmk = define_type(&ledger, "LMK", "100y").await;

    let result = ledger
        .store()
        .issue(NewCryptoKey {
            key_type_corr_id: lmk.key_type_corr_id.clone(),
            activation_date: Some(Utc.with_ymd_and_hms(9990, 1, 1, 0, 0, 0).unwrap()),
            descriptor: descriptor(),
        })
        .await;
    assert!(matches!(result, Err(LedgerError::InvalidDefinition(_))));

    let stored = ledger
        .store()
        .list_current(CryptoKeyFilter::default(), Page::default())
        .await
        .unwrap();
    assert!(stored.is_empty());

    // The latest issuable activation still round-trips and sweeps cleanly.
    let late = issue_key(
        &ledger,
        &lmk,
        Some(Utc.with_ymd_and_hms(9899, 1, 1, 0, 0, 0).unwrap()),
    )
    .await;
    let current = ledger.store().current(&late.key_corr_id).await.unwrap();
    assert_eq!(current.expiration_date, late.expiration_date);

    let report = ledger.sweeper().sweep_once().await.unwrap();
    assert_eq!(report.candidates, 0);
    assert_eq!(report.failed, 0);
}

#[tokio::test]
async fn test_every_transition_pair_matches_table() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;

    for from in KeyStatus::ALL {
        for to in KeyStatus::ALL {
            let key = key_in_status(&ledger, &kek, from).await;
            let result = ledger
                .store()
                .transition(&key.key_corr_id, to, Some("pairwise check"))
                .await;

            if is_legal(from, to) {
                let next = result.unwrap_or_else(|e| panic!("{} -> {} failed: {}", from, to, e));
                assert_eq!(next.status, to);
                assert_eq!(next.version, key.version + 1);
            } else {
                match result {
                    Err(LedgerError::IllegalTransition { from: f, to: t }) => {
                        assert_eq!((f, t), (from, to));
                    }
                    other => panic!("{} -> {} should be illegal, got {:?}", from, to, other),
                }
                let history = ledger.store().history(&key.key_corr_id).await.unwrap();
                assert_eq!(history.len() as i32, key.version, "rejected transition appended");
            }
        }
    }
}

#[tokio::test]
async fn test_transition_requires_justification() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let key = issue_key(&ledger, &kek, None).await;

    for blank in [None, Some(""), Some("   ")] {
        let result = ledger
            .store()
            .transition(&key.key_corr_id, KeyStatus::Suspended, blank)
            .await;
        assert!(matches!(
            result,
            Err(LedgerError::MissingJustification(KeyStatus::Suspended))
        ));
    }

    let suspended = ledger
        .store()
        .transition(&key.key_corr_id, KeyStatus::Suspended, Some("  HSM swap  "))
        .await
        .unwrap();
    assert_eq!(suspended.justification.as_deref(), Some("HSM swap"));
}

#[tokio::test]
async fn test_transition_to_expired_needs_no_justification() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let key = issue_key(&ledger, &kek, None).await;

    let expired = ledger
        .store()
        .transition(&key.key_corr_id, KeyStatus::Expired, None)
        .await
        .unwrap();

    assert_eq!(expired.status, KeyStatus::Expired);
    assert_eq!(expired.justification, None);
}

#[tokio::test]
async fn test_transition_unknown_key() {
    let ledger = fixtures::ledger().await;
    let result = ledger
        .store()
        .transition("missing", KeyStatus::Suspended, Some("reason"))
        .await;
    assert!(matches!(result, Err(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_destroyed_is_absorbing_but_force_destroy_still_appends() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let destroyed = key_in_status(&ledger, &kek, KeyStatus::Destroyed).await;

    for to in KeyStatus::ALL {
        let result = ledger
            .store()
            .transition(&destroyed.key_corr_id, to, Some("try"))
            .await;
        assert!(matches!(result, Err(LedgerError::IllegalTransition { .. })));
    }

    let again = ledger
        .store()
        .force_destroy(&destroyed.key_corr_id)
        .await
        .unwrap();
    assert_eq!(again.status, KeyStatus::Destroyed);
    assert_eq!(again.version, destroyed.version + 1);
}

#[tokio::test]
async fn test_force_destroy_bypasses_transition_table() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let key = issue_key(&ledger, &kek, None).await;

    // Active -> Destroyed is not an ordinary transition.
    assert!(!is_legal(KeyStatus::Active, KeyStatus::Destroyed));
    let destroyed = ledger.store().force_destroy(&key.key_corr_id).await.unwrap();

    assert_eq!(destroyed.status, KeyStatus::Destroyed);
    assert_eq!(destroyed.version, 2);
    assert_eq!(
        destroyed.justification.as_deref(),
        Some(keyledger::store::FORCE_DESTROY_JUSTIFICATION)
    );

    let missing = ledger.store().force_destroy("missing").await;
    assert!(matches!(missing, Err(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_history_is_gap_free_and_copies_descriptor() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let key = issue_key(&ledger, &kek, None).await;
    let store = ledger.store();

    store
        .transition(&key.key_corr_id, KeyStatus::Suspended, Some("maintenance"))
        .await
        .unwrap();
    store
        .transition(&key.key_corr_id, KeyStatus::Active, Some("maintenance done"))
        .await
        .unwrap();
    store
        .transition(&key.key_corr_id, KeyStatus::Compromised, Some("component leaked"))
        .await
        .unwrap();
    store
        .transition(&key.key_corr_id, KeyStatus::Destroyed, Some("zeroized"))
        .await
        .unwrap();

    let history = store.history(&key.key_corr_id).await.unwrap();
    let statuses: Vec<KeyStatus> = history.iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        vec![
            KeyStatus::Active,
            KeyStatus::Suspended,
            KeyStatus::Active,
            KeyStatus::Compromised,
            KeyStatus::Destroyed,
        ]
    );

    for (index, version) in history.iter().enumerate() {
        assert_eq!(version.version, index as i32 + 1);
        assert_eq!(version.key_corr_id, key.key_corr_id);
        assert_eq!(version.descriptor, key.descriptor);
        assert_eq!(version.activation_date, key.activation_date);
        assert_eq!(version.expiration_date, key.expiration_date);
        assert_eq!(version.intended_lifetime, key.intended_lifetime);
    }
    for pair in history.windows(2) {
        assert!(pair[0].created_at <= pair[1].created_at);
    }

    let current = store.current(&key.key_corr_id).await.unwrap();
    assert_eq!(&current, history.last().unwrap());
}

#[tokio::test]
async fn test_history_of_unknown_key_is_empty() {
    let ledger = fixtures::ledger().await;
    let history = ledger.store().history("missing").await.unwrap();
    assert!(history.is_empty());

    let current = ledger.store().current("missing").await;
    assert!(matches!(current, Err(LedgerError::NotFound(_))));
}

#[tokio::test]
async fn test_list_current_filters_by_type_and_status() {
    let ledger = fixtures::ledger().await;
    let zmk = define_type(&ledger, "ZMK", "1y").await;
    let tpk = define_type(&ledger, "TPK", "30d").await;

    let first = issue_key(&ledger, &zmk, None).await;
    issue_key(&ledger, &zmk, None).await;
    issue_key(&ledger, &tpk, None).await;
    ledger
        .store()
        .transition(&first.key_corr_id, KeyStatus::Suspended, Some("audit"))
        .await
        .unwrap();

    let zmk_keys = ledger
        .store()
        .list_current(
            CryptoKeyFilter {
                key_type_corr_id: Some(zmk.key_type_corr_id.clone()),
                status: None,
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(zmk_keys.len(), 2);

    let suspended = ledger
        .store()
        .list_current(
            CryptoKeyFilter {
                key_type_corr_id: None,
                status: Some(KeyStatus::Suspended),
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(suspended.len(), 1);
    assert_eq!(suspended[0].key_corr_id, first.key_corr_id);
    assert_eq!(suspended[0].version, 2);

    let paged = ledger
        .store()
        .list_current(CryptoKeyFilter::default(), Page::new(1, 1))
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
}

#[tokio::test]
async fn test_concurrent_transitions_admit_one_successor() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    let key = issue_key(&ledger, &kek, None).await;

    let suspend = {
        let store = ledger.store().clone();
        let id = key.key_corr_id.clone();
        tokio::spawn(async move {
            store
                .transition(&id, KeyStatus::Suspended, Some("suspend"))
                .await
        })
    };
    let compromise = {
        let store = ledger.store().clone();
        let id = key.key_corr_id.clone();
        tokio::spawn(async move {
            store
                .transition(&id, KeyStatus::Compromised, Some("compromise"))
                .await
        })
    };

    let results = [suspend.await.unwrap(), compromise.await.unwrap()];
    let successes = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(successes, 1, "exactly one transition must win: {:?}", results);
    for result in &results {
        if let Err(e) = result {
            assert!(
                matches!(
                    e,
                    LedgerError::IllegalTransition { .. } | LedgerError::VersionConflict(_)
                ),
                "unexpected error: {:?}",
                e
            );
        }
    }

    let history = ledger.store().history(&key.key_corr_id).await.unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_versions_cannot_be_updated_or_deleted() {
    let ledger = fixtures::ledger().await;
    let kek = define_type(&ledger, "KEK", "1y").await;
    issue_key(&ledger, &kek, None).await;

    let update = ledger
        .database()
        .write(|conn| {
            diesel::sql_query("UPDATE crypto_keys SET status = 'Destroyed'")
                .execute(conn)
                .map_err(LedgerError::from)
        })
        .await;
    assert!(matches!(update, Err(LedgerError::Persistence(_))));

    let delete = ledger
        .database()
        .write(|conn| {
            diesel::sql_query("DELETE FROM crypto_keys")
                .execute(conn)
                .map_err(LedgerError::from)
        })
        .await;
    assert!(matches!(delete, Err(LedgerError::Persistence(_))));
}
