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

//! Database layer: SQLite pool, embedded migrations, schema and storage types.
//!
//! All ledger state lives in three tables:
//!
//! - `key_types`: key type definitions (mutable status, never deleted)
//! - `crypto_keys`: immutable key versions, guarded by triggers
//! - `key_chains`: one head pointer per version chain

pub mod connection;
pub mod schema;
pub mod universal_types;

use diesel_migrations::{embed_migrations, EmbeddedMigrations};

pub use connection::Database;
pub use universal_types::{new_correlation_id, UniversalTimestamp, UniversalUuid};

/// Migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/sqlite");
