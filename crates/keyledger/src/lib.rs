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

//! # keyledger
//!
//! Lifecycle and audit engine for cryptographic key inventories.
//!
//! keyledger tracks key type definitions and the keys issued against them.
//! Every status change of a key appends an immutable version to the key's
//! chain, so the full history of every key can be reconstructed for a
//! compliance audit (PCI DSS and similar).
//!
//! ## Components
//!
//! - [`cryptoperiod`]: `"30d"` / `"6m"` / `"1y"` tokens to day counts and back
//! - [`lifecycle`]: the key status state machine
//! - [`KeyTypeRegistry`]: key type definitions and cascading disable
//! - [`VersionedKeyStore`]: issue, transition, history, forced destroy
//! - [`ExpirationSweeper`]: periodic expiry of keys past their expiration date
//! - [`KeyLedger`]: wires the above to one SQLite database
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use keyledger::{KeyLedger, KeyStatus, KeyTypeDefinition, LedgerConfig, NewCryptoKey};
//!
//! # async fn demo(descriptor: keyledger::KeyDescriptor) -> keyledger::Result<()> {
//! let ledger = KeyLedger::connect(LedgerConfig::default()).await?;
//!
//! let zmk = ledger
//!     .registry()
//!     .define(KeyTypeDefinition {
//!         name: "ZMK".into(),
//!         description: "Zone Master Key".into(),
//!         algorithm: "3DES".into(),
//!         size_bits: 128,
//!         generated_by: "Payment Processor".into(),
//!         form_factor: "Components on smartcards".into(),
//!         uniqueness_scope: "Unique per client".into(),
//!         cryptoperiod: "1y".into(),
//!     })
//!     .await?;
//!
//! let key = ledger
//!     .store()
//!     .issue(NewCryptoKey {
//!         key_type_corr_id: zmk.key_type_corr_id.clone(),
//!         activation_date: None,
//!         descriptor,
//!     })
//!     .await?;
//!
//! ledger
//!     .store()
//!     .transition(&key.key_corr_id, KeyStatus::Suspended, Some("HSM maintenance"))
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod audit;
pub mod config;
pub mod cryptoperiod;
pub mod dal;
pub mod database;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod models;
pub mod registry;
pub mod store;
pub mod sweeper;

pub use config::{LedgerConfig, LedgerConfigBuilder};
pub use database::Database;
pub use error::{LedgerError, Result};
pub use ledger::{KeyLedger, SweeperHandle};
pub use lifecycle::KeyStatus;
pub use models::{
    CryptoKeyFilter, CryptoKeyVersion, KeyDescriptor, KeyType, KeyTypeDefinition, KeyTypeFilter,
    KeyTypeSort, KeyTypeSortField, KeyTypeStatus, NewCryptoKey, Page, SortDirection,
};
pub use registry::{DisableOutcome, KeyTypeRegistry};
pub use store::VersionedKeyStore;
pub use sweeper::{ExpirationSweeper, SweepReport};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Installs a `tracing` subscriber writing to stderr.
///
/// `level` is an `EnvFilter` directive such as `"debug"` or
/// `"keyledger=debug,info"`. Without one, `RUST_LOG` is used, then `info`.
/// Does nothing if a global subscriber is already installed.
pub fn init_logging(level: Option<&str>) {
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(level))
        .try_init();
}

/// An unparsable directive falls back to `info` rather than silencing logs.
fn log_filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"))
}
