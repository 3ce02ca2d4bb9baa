// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rollover workflow and lock mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::{debug, info, warn};

use term_rollover::{TransitionResult, WorkflowState};
use term_rollover_domain::{Division, RolloverStage, TermAdvancePlan};

use crate::data_models::to_flag;
use crate::diesel_schema::{rollover_locks, rollover_workflows};
use crate::error::PersistenceError;
use crate::mutations::academic::{apply_term_advance_mysql, apply_term_advance_sqlite};
use crate::mutations::audit::{persist_audit_event_mysql, persist_audit_event_sqlite};

backend_fn! {
/// Creates or replaces an operator's workflow record for a division.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn save_workflow(conn: &mut _, state: &WorkflowState) -> Result<(), PersistenceError> {
    let last_stage: Option<&str> = state.last_completed_stage.as_ref().map(RolloverStage::as_str);

    let updated: usize = diesel::update(rollover_workflows::table)
        .filter(rollover_workflows::division.eq(state.division.code()))
        .filter(rollover_workflows::operator_id.eq(state.operator_id))
        .set((
            rollover_workflows::phase.eq(state.phase.as_str()),
            rollover_workflows::prevent_logging.eq(to_flag(state.prevent_logging)),
            rollover_workflows::last_completed_stage.eq(last_stage),
            rollover_workflows::updated_at.eq(diesel::dsl::sql::<diesel::sql_types::Text>(
                "CURRENT_TIMESTAMP",
            )),
        ))
        .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(rollover_workflows::table)
            .values((
                rollover_workflows::division.eq(state.division.code()),
                rollover_workflows::operator_id.eq(state.operator_id),
                rollover_workflows::phase.eq(state.phase.as_str()),
                rollover_workflows::prevent_logging.eq(to_flag(state.prevent_logging)),
                rollover_workflows::last_completed_stage.eq(last_stage),
            ))
            .execute(conn)?;
    }

    debug!(
        division = state.division.code(),
        operator_id = state.operator_id,
        phase = state.phase.as_str(),
        "Saved rollover workflow"
    );

    Ok(())
}
}

backend_fn! {
/// Takes the rollover lock of a division for an operator.
///
/// Returns `true` if the operator now holds the lock, including when it
/// already did, and `false` if another operator holds it.
///
/// # Errors
///
/// Returns an error if the query or insert fails.
pub fn try_acquire_rollover_lock(
    conn: &mut _,
    division: &Division,
    operator_id: i64,
) -> Result<bool, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        let holder: Option<i64> = rollover_locks::table
            .filter(rollover_locks::division.eq(division.code()))
            .select(rollover_locks::operator_id)
            .first(conn)
            .optional()?;

        match holder {
            Some(existing) if existing == operator_id => Ok(true),
            Some(existing) => {
                warn!(
                    division = division.code(),
                    operator_id,
                    holder = existing,
                    "Rollover lock held by another operator"
                );
                Ok(false)
            }
            None => {
                diesel::insert_into(rollover_locks::table)
                    .values((
                        rollover_locks::division.eq(division.code()),
                        rollover_locks::operator_id.eq(operator_id),
                    ))
                    .execute(conn)?;
                info!(division = division.code(), operator_id, "Acquired rollover lock");
                Ok(true)
            }
        }
    })
}
}

backend_fn! {
/// Releases the rollover lock of a division if `operator_id` holds it.
///
/// # Returns
///
/// Whether a lock was released.
///
/// # Errors
///
/// Returns an error if the delete fails.
pub fn release_rollover_lock(
    conn: &mut _,
    division: &Division,
    operator_id: i64,
) -> Result<bool, PersistenceError> {
    let deleted: usize = diesel::delete(rollover_locks::table)
        .filter(rollover_locks::division.eq(division.code()))
        .filter(rollover_locks::operator_id.eq(operator_id))
        .execute(conn)?;

    if deleted > 0 {
        info!(division = division.code(), operator_id, "Released rollover lock");
    }

    Ok(deleted > 0)
}
}

/// Persists a workflow transition (`SQLite` version).
///
/// The new workflow state and its audit event are written in one
/// transaction.
///
/// # Returns
///
/// The event ID assigned to the audit event.
///
/// # Errors
///
/// Returns an error if persistence fails. Nothing is written in that case.
pub fn persist_transition_sqlite(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        save_workflow_sqlite(conn, &result.new_state)?;
        let event_id: i64 = persist_audit_event_sqlite(conn, &result.audit_event)?;
        info!(event_id, action = %result.audit_event.action.name, "Persisted transition");
        Ok(event_id)
    })
}

/// Persists a workflow transition (`MySQL` version).
///
/// The new workflow state and its audit event are written in one
/// transaction.
///
/// # Returns
///
/// The event ID assigned to the audit event.
///
/// # Errors
///
/// Returns an error if persistence fails. Nothing is written in that case.
pub fn persist_transition_mysql(
    conn: &mut MysqlConnection,
    result: &TransitionResult,
) -> Result<i64, PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        save_workflow_mysql(conn, &result.new_state)?;
        let event_id: i64 = persist_audit_event_mysql(conn, &result.audit_event)?;
        info!(event_id, action = %result.audit_event.action.name, "Persisted transition");
        Ok(event_id)
    })
}

/// Closes out a rollover (`SQLite` version).
///
/// In one transaction: moves the session/term pointer if `advance` is
/// given, stores the completed workflow and its audit event, and releases
/// the operator's rollover lock.
///
/// # Returns
///
/// The event ID assigned to the audit event.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is written in that case.
pub fn complete_rollover_sqlite(
    conn: &mut SqliteConnection,
    result: &TransitionResult,
    advance: Option<&TermAdvancePlan>,
) -> Result<i64, PersistenceError> {
    let state: &WorkflowState = &result.new_state;
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if let Some(plan) = advance {
            apply_term_advance_sqlite(conn, &state.division, plan)?;
        }
        save_workflow_sqlite(conn, state)?;
        let event_id: i64 = persist_audit_event_sqlite(conn, &result.audit_event)?;
        release_rollover_lock_sqlite(conn, &state.division, state.operator_id)?;
        info!(event_id, advanced = advance.is_some(), "Completed rollover");
        Ok(event_id)
    })
}

/// Closes out a rollover (`MySQL` version).
///
/// In one transaction: moves the session/term pointer if `advance` is
/// given, stores the completed workflow and its audit event, and releases
/// the operator's rollover lock.
///
/// # Returns
///
/// The event ID assigned to the audit event.
///
/// # Errors
///
/// Returns an error if any write fails. Nothing is written in that case.
pub fn complete_rollover_mysql(
    conn: &mut MysqlConnection,
    result: &TransitionResult,
    advance: Option<&TermAdvancePlan>,
) -> Result<i64, PersistenceError> {
    let state: &WorkflowState = &result.new_state;
    conn.transaction::<_, PersistenceError, _>(|conn| {
        if let Some(plan) = advance {
            apply_term_advance_mysql(conn, &state.division, plan)?;
        }
        save_workflow_mysql(conn, state)?;
        let event_id: i64 = persist_audit_event_mysql(conn, &result.audit_event)?;
        release_rollover_lock_mysql(conn, &state.division, state.operator_id)?;
        info!(event_id, advanced = advance.is_some(), "Completed rollover");
        Ok(event_id)
    })
}
