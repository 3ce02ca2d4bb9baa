// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit event queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};

use term_rollover_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use term_rollover_domain::Division;

use crate::data_models::{ActionData, CauseData, StateSnapshotData};
use crate::diesel_schema::audit_events;
use crate::error::PersistenceError;

/// Diesel Queryable struct for full audit event rows.
#[derive(Queryable, Selectable)]
#[diesel(table_name = audit_events)]
struct AuditEventRow {
    event_id: i64,
    division: String,
    actor_id: String,
    actor_type: String,
    cause_json: String,
    action_json: String,
    before_snapshot_json: String,
    after_snapshot_json: String,
    #[allow(dead_code)]
    created_at: Option<String>,
}

impl TryFrom<AuditEventRow> for AuditEvent {
    type Error = PersistenceError;

    fn try_from(row: AuditEventRow) -> Result<Self, Self::Error> {
        let cause_data: CauseData = serde_json::from_str(&row.cause_json)?;
        let action_data: ActionData = serde_json::from_str(&row.action_json)?;
        let before_data: StateSnapshotData = serde_json::from_str(&row.before_snapshot_json)?;
        let after_data: StateSnapshotData = serde_json::from_str(&row.after_snapshot_json)?;

        Ok(Self::new(
            Actor::new(row.actor_id, row.actor_type),
            Cause::new(cause_data.id, cause_data.description),
            Action::new(action_data.name, action_data.details),
            StateSnapshot::new(before_data.data),
            StateSnapshot::new(after_data.data),
            Division::new(&row.division),
        )
        .with_id(row.event_id))
    }
}

backend_fn! {
/// Retrieves all audit events recorded for a division, oldest first.
///
/// # Errors
///
/// Returns an error if the query fails or a stored event cannot be deserialized.
pub fn get_audit_events(
    conn: &mut _,
    division: &Division,
) -> Result<Vec<AuditEvent>, PersistenceError> {
    let rows: Vec<AuditEventRow> = audit_events::table
        .filter(audit_events::division.eq(division.code()))
        .order_by(audit_events::event_id.asc())
        .select(AuditEventRow::as_select())
        .load(conn)?;

    rows.into_iter().map(AuditEvent::try_from).collect()
}
}
