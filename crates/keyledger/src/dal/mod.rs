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

//! Data access layer.
//!
//! Every function here is synchronous and takes the transaction's
//! `&mut SqliteConnection` explicitly. Callers compose them inside
//! [`crate::database::Database::write`] or [`crate::database::Database::read`],
//! so the transaction boundary is always visible at the call site.

pub mod crypto_key;
pub mod key_type;
pub mod models;
