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


use clap::Parser;
use keyledger::{KeyLedger, LedgerConfig, LedgerError};
use keyledgerctl::{dispatch, Cli};
use serde_json::Value;
use tempfile::TempDir;

async fn ledger(dir: &TempDir) -> KeyLedger {
    let config = LedgerConfig::builder()
        .database_url(dir.path().join("ctl.db").to_string_lossy())
        .build();
    KeyLedger::connect(config)
        .await
        .expect("Failed to connect ledger")
}

async fn run(ledger: &KeyLedger, args: &[&str]) -> anyhow::Result<Value> {
    let argv = std::iter::once("keyledgerctl").chain(args.iter().copied());
    let cli = Cli::try_parse_from(argv)?;
    let output = dispatch(ledger, cli.command).await?;
    Ok(output.unwrap_or(Value::Null))
}

#[tokio::test]
async fn test_define_issue_transition_flow() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger(&dir).await;

    let defined = run(
        &ledger,
        &[
            "key-type",
            "define",
            "--name",
            "ZMK",
            "--algorithm",
            "3DES",
            "--size-bits",
            "128",
            "--cryptoperiod",
            "12m",
        ],
    )
    .await
    .expect("Failed to define key type");
    assert_eq!(defined["cryptoperiod"], "12m");
    let key_type_id = defined["key_type"]["key_type_corr_id"]
        .as_str()
        .unwrap()
        .to_string();

    let descriptor_path = dir.path().join("descriptor.json");
    std::fs::write(
        &descriptor_path,
        r#"{"usage_purpose": "Exchange working keys", "storage_location": "HSM"}"#,
    )
    .unwrap();

    let issued = run(
        &ledger,
        &[
            "key",
            "issue",
            "--key-type",
            &key_type_id,
            "--descriptor",
            descriptor_path.to_str().unwrap(),
            "--activation-date",
            "2025-03-01T00:00:00Z",
        ],
    )
    .await
    .expect("Failed to issue key");
    assert_eq!(issued["status"], "Active");
    assert_eq!(issued["version"], 1);
    assert_eq!(issued["usage_purpose"], "Exchange working keys");
    let key_id = issued["key_corr_id"].as_str().unwrap().to_string();

    let suspended = run(
        &ledger,
        &["key", "transition", &key_id, "--to", "suspended", "--justification", "audit"],
    )
    .await
    .unwrap();
    assert_eq!(suspended["status"], "Suspended");

    let history = run(&ledger, &["key", "history", &key_id]).await.unwrap();
    assert_eq!(history.as_array().map(Vec::len), Some(2));

    let listed = run(&ledger, &["key", "list", "--status", "Suspended"])
        .await
        .unwrap();
    assert_eq!(listed.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_refused_disable_surfaces_error() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger(&dir).await;

    let defined = run(
        &ledger,
        &[
            "key-type", "define", "--name", "TPK", "--algorithm", "AES", "--size-bits", "256",
            "--cryptoperiod", "30d",
        ],
    )
    .await
    .unwrap();
    let key_type_id = defined["key_type"]["key_type_corr_id"]
        .as_str()
        .unwrap()
        .to_string();

    let descriptor_path = dir.path().join("descriptor.json");
    std::fs::write(&descriptor_path, "{}").unwrap();
    run(
        &ledger,
        &[
            "key",
            "issue",
            "--key-type",
            &key_type_id,
            "--descriptor",
            descriptor_path.to_str().unwrap(),
        ],
    )
    .await
    .unwrap();

    let refused = run(&ledger, &["key-type", "disable", &key_type_id]).await;
    let message = format!("{:#}", refused.unwrap_err());
    assert!(message.contains("dependent key"), "message: {}", message);

    let forced = run(&ledger, &["key-type", "disable", &key_type_id, "--force"])
        .await
        .unwrap();
    assert_eq!(forced["key_type"]["status"], "Disabled");
    assert_eq!(forced["destroyed_keys"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_history_of_unknown_key_is_not_found() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger(&dir).await;

    let err = run(&ledger, &["key", "history", "no-such-key"])
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<LedgerError>(),
        Some(LedgerError::NotFound(_))
    ));
    assert!(err.to_string().contains("no-such-key"), "error: {}", err);
}

#[tokio::test]
async fn test_sweep_command_reports_counts() {
    let dir = TempDir::new().unwrap();
    let ledger = ledger(&dir).await;

    let report = run(&ledger, &["sweep", "--at", "2099-01-01T00:00:00Z"])
        .await
        .unwrap();
    assert_eq!(report["candidates"], 0);
    assert_eq!(report["expired"], 0);

    let migrated = run(&ledger, &["migrate"]).await.unwrap();
    assert_eq!(migrated["migrated"], true);
}
