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

//! Cryptoperiod token codec.
//!
//! Key types carry their cryptoperiod as an integer day count internally and
//! exchange it as a short token such as `"30d"`, `"6m"` or `"1y"`.
//!
//! The mapping is deliberately lossy: months are 30 days and years are 365
//! days, and [`format`] always picks the largest unit that divides evenly.
//! `format(parse("360d"))` is therefore `"12m"`, not `"360d"`.
//!
//! ```rust
//! use keyledger::cryptoperiod;
//!
//! assert_eq!(cryptoperiod::parse("6m").unwrap(), 180);
//! assert_eq!(cryptoperiod::format(365), "1y");
//! assert_eq!(cryptoperiod::format(360), "12m");
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Days counted per month token.
pub const DAYS_IN_MONTH: i32 = 30;

/// Days counted per year token.
pub const DAYS_IN_YEAR: i32 = 365;

/// Default ceiling for a cryptoperiod (100 years).
pub const DEFAULT_MAX_CRYPTOPERIOD_DAYS: i32 = DAYS_IN_YEAR * 100;

static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(\d+)([dmy])$").expect("cryptoperiod pattern is valid"));

/// Errors produced while parsing or validating a cryptoperiod.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoperiodError {
    #[error("Invalid cryptoperiod format: '{0}' (expected e.g. 30d, 6m, 1y)")]
    InvalidFormat(String),

    #[error("Cryptoperiod must be a positive number of days, got {0}")]
    NotPositive(i32),

    #[error("Cryptoperiod of {days} days exceeds the maximum of {max} days")]
    TooLong { days: i32, max: i32 },
}

/// Converts a token like `"30d"`, `"6m"` or `"1Y "` into a day count.
///
/// The unit is case-insensitive and surrounding whitespace is ignored.
pub fn parse(token: &str) -> Result<i32, CryptoperiodError> {
    let trimmed = token.trim();
    let invalid = || CryptoperiodError::InvalidFormat(token.to_string());

    let captures = TOKEN_PATTERN.captures(trimmed).ok_or_else(invalid)?;
    let value: i32 = captures[1].parse().map_err(|_| invalid())?;

    let multiplier = match captures[2].to_ascii_lowercase().as_str() {
        "d" => 1,
        "m" => DAYS_IN_MONTH,
        "y" => DAYS_IN_YEAR,
        _ => return Err(invalid()),
    };

    value.checked_mul(multiplier).ok_or_else(invalid)
}

/// Renders a day count using the largest unit that divides it evenly.
pub fn format(days: i32) -> String {
    if days > 0 && days % DAYS_IN_YEAR == 0 {
        format!("{}y", days / DAYS_IN_YEAR)
    } else if days > 0 && days % DAYS_IN_MONTH == 0 {
        format!("{}m", days / DAYS_IN_MONTH)
    } else {
        format!("{}d", days)
    }
}

/// Fails when `days` exceeds `max`.
pub fn validate_maximum(days: i32, max: i32) -> Result<(), CryptoperiodError> {
    if days > max {
        return Err(CryptoperiodError::TooLong { days, max });
    }
    Ok(())
}

/// Checks that `days` is positive and no larger than `max`.
pub fn validate_days(days: i32, max: i32) -> Result<i32, CryptoperiodError> {
    if days <= 0 {
        return Err(CryptoperiodError::NotPositive(days));
    }
    validate_maximum(days, max)?;
    Ok(days)
}

/// Parses a token and applies [`validate_days`] in one step.
pub fn parse_and_validate(token: &str, max: i32) -> Result<i32, CryptoperiodError> {
    validate_days(parse(token)?, max)
}
