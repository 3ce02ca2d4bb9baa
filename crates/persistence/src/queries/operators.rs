// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator account and login session queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use crate::data_models::{OperatorData, OperatorLookup, SessionData, flag};
use crate::diesel_schema::{operators, sessions};
use crate::error::PersistenceError;

/// Role whose credentials can confirm a rollover.
const CONFIRMING_ROLE: &str = "Admin";

#[derive(Queryable, Selectable)]
#[diesel(table_name = operators)]
struct OperatorRow {
    operator_id: i64,
    login_name: String,
    display_name: String,
    password_hash: String,
    role: String,
    is_disabled: i32,
    created_at: String,
    disabled_at: Option<String>,
    last_login_at: Option<String>,
}

impl From<OperatorRow> for OperatorData {
    fn from(row: OperatorRow) -> Self {
        Self {
            operator_id: row.operator_id,
            login_name: row.login_name,
            display_name: row.display_name,
            password_hash: row.password_hash,
            role: row.role,
            is_disabled: flag(row.is_disabled),
            created_at: row.created_at,
            disabled_at: row.disabled_at,
            last_login_at: row.last_login_at,
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = sessions)]
struct SessionRow {
    session_id: i64,
    session_token: String,
    operator_id: i64,
    created_at: String,
    last_activity_at: String,
    expires_at: String,
}

impl From<SessionRow> for SessionData {
    fn from(row: SessionRow) -> Self {
        Self {
            session_id: row.session_id,
            session_token: row.session_token,
            operator_id: row.operator_id,
            created_at: row.created_at,
            last_activity_at: row.last_activity_at,
            expires_at: row.expires_at,
        }
    }
}

backend_fn! {
/// Finds an operator by login name or ID.
///
/// Disabled operators are returned too; callers decide what that means.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_operator(
    conn: &mut _,
    lookup: OperatorLookup<'_>,
) -> Result<Option<OperatorData>, PersistenceError> {
    let query = operators::table.select(OperatorRow::as_select());

    let row: Option<OperatorRow> = match lookup {
        OperatorLookup::Login(login_name) => {
            let login_name: String = login_name.to_uppercase();
            debug!(login_name = %login_name, "Finding operator");
            query
                .filter(operators::login_name.eq(login_name))
                .first(conn)
                .optional()?
        }
        OperatorLookup::Id(operator_id) => {
            debug!(operator_id, "Finding operator");
            query
                .filter(operators::operator_id.eq(operator_id))
                .first(conn)
                .optional()?
        }
    };

    Ok(row.map(OperatorData::from))
}
}

backend_fn! {
/// Lists the enabled admins, oldest account first.
///
/// A rollover confirmation credential is checked against each of these.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_rollover_confirmers(conn: &mut _) -> Result<Vec<OperatorData>, PersistenceError> {
    let rows: Vec<OperatorRow> = operators::table
        .filter(operators::role.eq(CONFIRMING_ROLE))
        .filter(operators::is_disabled.eq(0))
        .order_by(operators::operator_id.asc())
        .select(OperatorRow::as_select())
        .load(conn)?;

    debug!(count = rows.len(), "Listed rollover confirmers");
    Ok(rows.into_iter().map(OperatorData::from).collect())
}
}

backend_fn! {
/// Finds a session by its bearer token.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn find_session(
    conn: &mut _,
    session_token: &str,
) -> Result<Option<SessionData>, PersistenceError> {
    let row: Option<SessionRow> = sessions::table
        .filter(sessions::session_token.eq(session_token))
        .select(SessionRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(SessionData::from))
}
}

/// Checks a password against a stored bcrypt hash.
///
/// # Errors
///
/// Returns an error if the hash is malformed.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, PersistenceError> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| PersistenceError::Other(format!("Failed to verify password: {e}")))
}
