// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator account and login session mutations.

use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info};

use crate::backend::PersistenceBackend;
use crate::data_models::NewOperator;
use crate::diesel_schema::{operators, sessions};
use crate::error::PersistenceError;

fn now() -> diesel::expression::SqlLiteral<Text> {
    diesel::dsl::sql::<Text>("CURRENT_TIMESTAMP")
}

fn now_nullable() -> diesel::expression::SqlLiteral<Nullable<Text>> {
    diesel::dsl::sql::<Nullable<Text>>("CURRENT_TIMESTAMP")
}

backend_fn! {
/// Registers an operator account and returns its ID.
///
/// Login names are stored uppercase, so lookups are case-insensitive.
/// The password is stored as a bcrypt hash.
///
/// # Errors
///
/// Returns an error if hashing fails or the login name is taken.
pub fn register_operator(
    conn: &mut _,
    operator: &NewOperator<'_>,
) -> Result<i64, PersistenceError> {
    let login_name: String = operator.login_name.to_uppercase();
    let password_hash: String = bcrypt::hash(operator.password, bcrypt::DEFAULT_COST)
        .map_err(|e| PersistenceError::Other(format!("Failed to hash password: {e}")))?;

    diesel::insert_into(operators::table)
        .values((
            operators::login_name.eq(&login_name),
            operators::display_name.eq(operator.display_name),
            operators::password_hash.eq(&password_hash),
            operators::role.eq(operator.role),
        ))
        .execute(conn)?;

    let operator_id: i64 = conn.get_last_insert_rowid()?;
    info!(operator_id, login_name = %login_name, role = operator.role, "Registered operator");

    Ok(operator_id)
}
}

backend_fn! {
/// Disables an operator and ends all of their sessions.
///
/// A disabled operator can neither log in nor confirm a rollover.
///
/// # Errors
///
/// Returns an error if either write fails. Nothing changes in that case.
pub fn disable_operator(conn: &mut _, operator_id: i64) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::update(operators::table.find(operator_id))
            .set((
                operators::is_disabled.eq(1),
                operators::disabled_at.eq(now_nullable()),
            ))
            .execute(conn)?;

        let revoked: usize = diesel::delete(sessions::table)
            .filter(sessions::operator_id.eq(operator_id))
            .execute(conn)?;

        info!(operator_id, revoked, "Disabled operator");
        Ok(())
    })
}
}

backend_fn! {
/// Opens a login session and stamps the operator's last login.
///
/// `expires_at` is an ISO 8601 timestamp.
///
/// # Returns
///
/// The new session ID.
///
/// # Errors
///
/// Returns an error if either write fails. Nothing changes in that case.
pub fn open_session(
    conn: &mut _,
    operator_id: i64,
    session_token: &str,
    expires_at: &str,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        diesel::insert_into(sessions::table)
            .values((
                sessions::session_token.eq(session_token),
                sessions::operator_id.eq(operator_id),
                sessions::expires_at.eq(expires_at),
            ))
            .execute(conn)?;
        let session_id: i64 = conn.get_last_insert_rowid()?;

        diesel::update(operators::table.find(operator_id))
            .set(operators::last_login_at.eq(now_nullable()))
            .execute(conn)?;

        debug!(session_id, operator_id, "Opened session");
        Ok(session_id)
    })
}
}

backend_fn! {
/// Records activity on a session.
///
/// # Errors
///
/// Returns an error if the update fails.
pub fn touch_session(conn: &mut _, session_id: i64) -> Result<(), PersistenceError> {
    diesel::update(sessions::table.find(session_id))
        .set(sessions::last_activity_at.eq(now()))
        .execute(conn)?;
    Ok(())
}
}

backend_fn! {
/// Closes the session with the given token.
///
/// # Returns
///
/// Whether a session was closed.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn close_session(conn: &mut _, session_token: &str) -> Result<bool, PersistenceError> {
    let closed: usize = diesel::delete(sessions::table)
        .filter(sessions::session_token.eq(session_token))
        .execute(conn)?;

    debug!(closed, "Closed session");
    Ok(closed > 0)
}
}
