// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use serde::{Deserialize, Serialize};
use time::Date;
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;

use crate::error::PersistenceError;

/// Stored format of calendar dates.
const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// An operator account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorData {
    pub operator_id: i64,
    pub login_name: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: String,
    pub is_disabled: bool,
    pub created_at: String,
    pub disabled_at: Option<String>,
    pub last_login_at: Option<String>,
}

/// A new operator account. The password is hashed before storage.
#[derive(Debug, Clone, Copy)]
pub struct NewOperator<'a> {
    pub login_name: &'a str,
    pub display_name: &'a str,
    pub password: &'a str,
    pub role: &'a str,
}

/// How an operator is looked up.
#[derive(Debug, Clone, Copy)]
pub enum OperatorLookup<'a> {
    /// By login name, case-insensitively.
    Login(&'a str),
    /// By operator ID.
    Id(i64),
}

/// A bearer session belonging to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: i64,
    pub session_token: String,
    pub operator_id: i64,
    pub created_at: String,
    pub last_activity_at: String,
    pub expires_at: String,
}

/// Serializable representation of a Cause.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseData {
    pub id: String,
    pub description: String,
}

/// Serializable representation of an Action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionData {
    pub name: String,
    pub details: Option<String>,
}

/// Serializable representation of a `StateSnapshot`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateSnapshotData {
    pub data: String,
}

/// Formats a date for storage.
///
/// # Errors
///
/// Returns an error if the date cannot be formatted.
pub fn format_date(date: Date) -> Result<String, PersistenceError> {
    date.format(DATE_FORMAT)
        .map_err(|e| PersistenceError::SerializationError(format!("Invalid date: {e}")))
}

/// Parses a stored date.
///
/// # Errors
///
/// Returns an error if the text is not a `YYYY-MM-DD` date.
pub fn parse_date(value: &str) -> Result<Date, PersistenceError> {
    Date::parse(value, DATE_FORMAT).map_err(|e| {
        PersistenceError::ReconstructionError(format!("Invalid stored date '{value}': {e}"))
    })
}

/// Converts a stored flag column to a bool.
pub const fn flag(value: i32) -> bool {
    value != 0
}

/// Converts a bool to a stored flag column.
pub fn to_flag(value: bool) -> i32 {
    i32::from(value)
}
