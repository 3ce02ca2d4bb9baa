// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Academic calendar and promotion map mutations.
//!
//! The session/term pointer of an academic setting is written only by
//! [`apply_term_advance_sqlite`] / [`apply_term_advance_mysql`]; the other
//! functions here set up calendar data.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use time::Date;
use tracing::{debug, info};

use term_rollover_domain::{
    AcademicSession, Division, NextSession, PromotionMap, TermAdvancePlan, Term,
};

use crate::backend::PersistenceBackend;
use crate::data_models::{format_date, to_flag};
use crate::diesel_schema::{
    academic_sessions, academic_settings, classes, promotion_maps, sections, terms,
};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts an academic session.
///
/// # Returns
///
/// The new session ID.
///
/// # Errors
///
/// Returns an error if the insert fails, including when the division
/// already has a session with the same years.
pub fn create_academic_session(
    conn: &mut _,
    session: &AcademicSession,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(academic_sessions::table)
        .values((
            academic_sessions::division.eq(session.division.code()),
            academic_sessions::start_year.eq(i32::from(session.start_year)),
            academic_sessions::end_year.eq(i32::from(session.end_year)),
            academic_sessions::label_separator.eq(&session.separator),
            academic_sessions::status.eq(session.status.as_str()),
        ))
        .execute(conn)?;

    let session_id: i64 = conn.get_last_insert_rowid()?;

    info!(
        session_id,
        division = session.division.code(),
        label = %session.label(),
        "Created academic session"
    );

    Ok(session_id)
}
}

backend_fn! {
/// Inserts a term.
///
/// # Errors
///
/// Returns an error if the insert fails or the order does not fit the column.
pub fn create_term(conn: &mut _, term: &Term) -> Result<i64, PersistenceError> {
    let term_order: i32 = i32::try_from(term.order).map_err(|_| {
        PersistenceError::Other(format!("Term order {} out of range", term.order))
    })?;

    diesel::insert_into(terms::table)
        .values((
            terms::name.eq(&term.name),
            terms::term_order.eq(term_order),
            terms::is_promotion_term.eq(to_flag(term.is_promotion_term)),
        ))
        .execute(conn)?;

    let term_id: i64 = conn.get_last_insert_rowid()?;

    debug!(term_id, name = %term.name, "Created term");

    Ok(term_id)
}
}

backend_fn! {
/// Creates or replaces the academic setting of a division.
///
/// # Errors
///
/// Returns an error if a date cannot be formatted or the write fails.
pub fn save_academic_setting(
    conn: &mut _,
    division: &Division,
    session_id: i64,
    term_id: Option<i64>,
    next_resumption_date: Option<Date>,
    closing_date: Option<Date>,
) -> Result<(), PersistenceError> {
    let resumption: Option<String> = next_resumption_date.map(format_date).transpose()?;
    let closing: Option<String> = closing_date.map(format_date).transpose()?;

    let updated: usize = diesel::update(academic_settings::table)
        .filter(academic_settings::division.eq(division.code()))
        .set((
            academic_settings::session_id.eq(session_id),
            academic_settings::term_id.eq(term_id),
            academic_settings::next_resumption_date.eq(&resumption),
            academic_settings::closing_date.eq(&closing),
        ))
        .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(academic_settings::table)
            .values((
                academic_settings::division.eq(division.code()),
                academic_settings::session_id.eq(session_id),
                academic_settings::term_id.eq(term_id),
                academic_settings::next_resumption_date.eq(&resumption),
                academic_settings::closing_date.eq(&closing),
            ))
            .execute(conn)?;
    }

    info!(division = division.code(), session_id, ?term_id, "Saved academic setting");

    Ok(())
}
}

backend_fn! {
/// Inserts a class.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_class(
    conn: &mut _,
    name: &str,
    division: &Division,
) -> Result<i64, PersistenceError> {
    diesel::insert_into(classes::table)
        .values((classes::name.eq(name), classes::division.eq(division.code())))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}
}

backend_fn! {
/// Inserts a section.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_section(conn: &mut _, name: &str) -> Result<i64, PersistenceError> {
    diesel::insert_into(sections::table)
        .values(sections::name.eq(name))
        .execute(conn)?;

    conn.get_last_insert_rowid()
}
}

backend_fn! {
/// Creates or replaces the promotion map row of a source class and section.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn upsert_promotion_map(conn: &mut _, map: &PromotionMap) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(promotion_maps::table)
        .filter(promotion_maps::class_id.eq(map.source.class_id))
        .filter(promotion_maps::section_id.eq(map.source.section_id))
        .set((
            promotion_maps::target_class_id.eq(map.target_class_id),
            promotion_maps::target_section_id.eq(map.target_section_id),
            promotion_maps::is_graduation_class.eq(to_flag(map.is_graduation_class)),
        ))
        .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(promotion_maps::table)
            .values((
                promotion_maps::class_id.eq(map.source.class_id),
                promotion_maps::section_id.eq(map.source.section_id),
                promotion_maps::target_class_id.eq(map.target_class_id),
                promotion_maps::target_section_id.eq(map.target_section_id),
                promotion_maps::is_graduation_class.eq(to_flag(map.is_graduation_class)),
            ))
            .execute(conn)?;
    }

    debug!(
        class_id = map.source.class_id,
        section_id = map.source.section_id,
        "Saved promotion map"
    );

    Ok(())
}
}

backend_fn! {
/// Moves a division's setting to the term and session of `plan`.
///
/// Creating the next session and updating the pointer happen in a single
/// transaction.
///
/// # Returns
///
/// The ID of the session the setting now points to.
///
/// # Errors
///
/// Returns an error if the division has no setting, the plan refers to
/// an unsaved term or session, or any write fails. Nothing is changed in
/// that case.
pub fn apply_term_advance(
    conn: &mut _,
    division: &Division,
    plan: &TermAdvancePlan,
) -> Result<i64, PersistenceError> {
    let term_id: i64 = plan.next_term.term_id.ok_or_else(|| {
        PersistenceError::MissingIdentifier(format!("term '{}'", plan.next_term.name))
    })?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let current_session_id: Option<i64> = academic_settings::table
            .filter(academic_settings::division.eq(division.code()))
            .select(academic_settings::session_id)
            .first(conn)
            .optional()?;
        let current_session_id: i64 = current_session_id
            .ok_or_else(|| PersistenceError::SettingNotFound(division.code().to_string()))?;

        let session_id: i64 = match &plan.next_session {
            NextSession::Current => current_session_id,
            NextSession::Existing(session) => session.session_id.ok_or_else(|| {
                PersistenceError::MissingIdentifier(format!("session '{}'", session.label()))
            })?,
            NextSession::Create(session) => {
                diesel::insert_into(academic_sessions::table)
                    .values((
                        academic_sessions::division.eq(session.division.code()),
                        academic_sessions::start_year.eq(i32::from(session.start_year)),
                        academic_sessions::end_year.eq(i32::from(session.end_year)),
                        academic_sessions::label_separator.eq(&session.separator),
                        academic_sessions::status.eq(session.status.as_str()),
                    ))
                    .execute(conn)?;
                let created: i64 = conn.get_last_insert_rowid()?;
                info!(
                    session_id = created,
                    label = %session.label(),
                    "Created next academic session"
                );
                created
            }
        };

        diesel::update(academic_settings::table)
            .filter(academic_settings::division.eq(division.code()))
            .set((
                academic_settings::session_id.eq(session_id),
                academic_settings::term_id.eq(Some(term_id)),
            ))
            .execute(conn)?;

        info!(
            division = division.code(),
            session_id,
            term = %plan.next_term.name,
            "Advanced academic setting"
        );

        Ok(session_id)
    })
}
}
