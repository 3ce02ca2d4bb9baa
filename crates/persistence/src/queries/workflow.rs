// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rollover workflow and lock queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use term_rollover::WorkflowState;
use term_rollover_domain::{Division, RolloverStage};

use crate::data_models::flag;
use crate::diesel_schema::{rollover_locks, rollover_workflows};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = rollover_workflows)]
struct WorkflowRow {
    division: String,
    operator_id: i64,
    phase: String,
    prevent_logging: i32,
    last_completed_stage: Option<String>,
}

impl TryFrom<WorkflowRow> for WorkflowState {
    type Error = PersistenceError;

    fn try_from(row: WorkflowRow) -> Result<Self, Self::Error> {
        let last_completed_stage: Option<RolloverStage> = row
            .last_completed_stage
            .as_deref()
            .map(str::parse)
            .transpose()?;

        Ok(Self {
            division: Division::new(&row.division),
            operator_id: row.operator_id,
            phase: row.phase.parse()?,
            prevent_logging: flag(row.prevent_logging),
            last_completed_stage,
        })
    }
}

backend_fn! {
/// Reads one operator's workflow for a division.
///
/// # Errors
///
/// Returns an error if the query fails or a stored phase is unknown.
/// Returns `Ok(None)` if the operator never requested confirmation.
pub fn get_workflow(
    conn: &mut _,
    division: &Division,
    operator_id: i64,
) -> Result<Option<WorkflowState>, PersistenceError> {
    debug!(division = division.code(), operator_id, "Reading rollover workflow");

    let row: Option<WorkflowRow> = rollover_workflows::table
        .filter(rollover_workflows::division.eq(division.code()))
        .filter(rollover_workflows::operator_id.eq(operator_id))
        .select(WorkflowRow::as_select())
        .first(conn)
        .optional()?;

    row.map(WorkflowState::try_from).transpose()
}
}

backend_fn! {
/// Returns the operator holding the rollover lock of a division, if any.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_lock_holder(conn: &mut _, division: &Division) -> Result<Option<i64>, PersistenceError> {
    let holder: Option<i64> = rollover_locks::table
        .filter(rollover_locks::division.eq(division.code()))
        .select(rollover_locks::operator_id)
        .first(conn)
        .optional()?;

    Ok(holder)
}
}
