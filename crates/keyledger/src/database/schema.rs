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

// Diesel table definitions matching migrations/sqlite.

diesel::table! {
    key_types (id) {
        id -> Binary,
        key_type_corr_id -> Text,
        name -> Text,
        description -> Text,
        algorithm -> Text,
        size_bits -> Integer,
        generated_by -> Text,
        form_factor -> Text,
        uniqueness_scope -> Text,
        cryptoperiod_days -> Integer,
        status -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::table! {
    crypto_keys (id) {
        id -> Binary,
        key_corr_id -> Text,
        version -> Integer,
        key_type_corr_id -> Text,
        status -> Text,
        justification -> Nullable<Text>,
        activation_date -> Text,
        expiration_date -> Text,
        intended_lifetime -> Text,
        description -> Text,
        generating_entity -> Text,
        generation_method -> Text,
        storage_location -> Text,
        encryption_under_lmk -> Text,
        form_factor -> Text,
        scope_of_uniqueness -> Text,
        usage_purpose -> Text,
        operational_environment -> Text,
        associated_parties -> Text,
        access_control_mechanisms -> Text,
        compliance_requirements -> Text,
        audit_log_reference -> Text,
        backup_and_recovery_details -> Text,
        notes -> Text,
        created_at -> Text,
    }
}

diesel::table! {
    key_chains (key_corr_id) {
        key_corr_id -> Text,
        key_type_corr_id -> Text,
        head_version -> Integer,
        head_status -> Text,
        expiration_date -> Text,
        created_at -> Text,
        updated_at -> Text,
    }
}

diesel::allow_tables_to_appear_in_same_query!(key_types, crypto_keys, key_chains);
