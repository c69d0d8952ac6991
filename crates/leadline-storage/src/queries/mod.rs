// SPDX-FileCopyrightText: 2026 Leadline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per storage entity.

pub mod blocked;
pub mod clients;
pub mod escalations;
pub mod leads;
pub mod messages;
pub mod rules;
pub mod scheduled;
pub mod team;

use std::str::FromStr;

/// Parse a TEXT column into a strum-backed enum inside a row mapper.
pub(crate) fn column_enum<T>(idx: usize, value: String) -> Result<T, rusqlite::Error>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    T::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

/// Parse a JSON TEXT column (trigger lists, notify channels, tags).
pub(crate) fn column_json<T: serde::de::DeserializeOwned>(
    idx: usize,
    value: String,
) -> Result<T, rusqlite::Error> {
    serde_json::from_str(&value).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}
