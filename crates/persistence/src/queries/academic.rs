// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Academic calendar and promotion map queries.
//!
//! Covers sessions, terms, the per-division academic setting, classes,
//! sections and promotion maps.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use num_traits::ToPrimitive;
use tracing::debug;

use term_rollover_domain::{
    AcademicSession, AcademicSetting, Division, Placement, PromotionMap, SchoolClass,
    SessionStatus, Term,
};

use crate::data_models::{flag, parse_date};
use crate::diesel_schema::{
    academic_sessions, academic_settings, classes, promotion_maps, sections, terms,
};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = academic_sessions)]
struct AcademicSessionRow {
    session_id: i64,
    division: String,
    start_year: i32,
    end_year: i32,
    label_separator: String,
    status: String,
}

impl TryFrom<AcademicSessionRow> for AcademicSession {
    type Error = PersistenceError;

    fn try_from(row: AcademicSessionRow) -> Result<Self, Self::Error> {
        let start_year: u16 = row.start_year.to_u16().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Session start year {} out of range",
                row.start_year
            ))
        })?;
        let end_year: u16 = row.end_year.to_u16().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Session end year {} out of range",
                row.end_year
            ))
        })?;
        let status: SessionStatus = row.status.parse()?;

        let mut session: Self = Self::new(
            start_year,
            end_year,
            &row.label_separator,
            Division::new(&row.division),
        )
        .with_id(row.session_id);
        session.status = status;
        Ok(session)
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = terms)]
struct TermRow {
    term_id: i64,
    name: String,
    term_order: i32,
    is_promotion_term: i32,
}

impl TryFrom<TermRow> for Term {
    type Error = PersistenceError;

    fn try_from(row: TermRow) -> Result<Self, Self::Error> {
        let order: u32 = row.term_order.to_u32().ok_or_else(|| {
            PersistenceError::ReconstructionError(format!(
                "Term order {} out of range",
                row.term_order
            ))
        })?;
        Ok(Self::new(&row.name, order, flag(row.is_promotion_term)).with_id(row.term_id))
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = academic_settings)]
struct SettingRow {
    division: String,
    session_id: i64,
    term_id: Option<i64>,
    next_resumption_date: Option<String>,
    closing_date: Option<String>,
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = classes)]
struct ClassRow {
    class_id: i64,
    name: String,
    division: String,
}

impl From<ClassRow> for SchoolClass {
    fn from(row: ClassRow) -> Self {
        Self {
            class_id: row.class_id,
            name: row.name,
            division: Division::new(&row.division),
        }
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = promotion_maps)]
struct PromotionMapRow {
    class_id: i64,
    section_id: i64,
    target_class_id: Option<i64>,
    target_section_id: Option<i64>,
    is_graduation_class: i32,
}

impl From<PromotionMapRow> for PromotionMap {
    fn from(row: PromotionMapRow) -> Self {
        Self {
            source: Placement::new(row.class_id, row.section_id),
            target_class_id: row.target_class_id,
            target_section_id: row.target_section_id,
            is_graduation_class: flag(row.is_graduation_class),
        }
    }
}

backend_fn! {
/// Reads the academic setting of a division.
///
/// The current session and term are resolved from their IDs.
///
/// # Errors
///
/// Returns an error if the query fails or a stored value cannot be parsed.
/// Returns `Ok(None)` if the division has no setting.
pub fn get_academic_setting(
    conn: &mut _,
    division: &Division,
) -> Result<Option<AcademicSetting>, PersistenceError> {
    debug!(division = division.code(), "Reading academic setting");

    let Some(setting) = academic_settings::table
        .filter(academic_settings::division.eq(division.code()))
        .select(SettingRow::as_select())
        .first::<SettingRow>(conn)
        .optional()?
    else {
        return Ok(None);
    };

    let session: AcademicSession = academic_sessions::table
        .filter(academic_sessions::session_id.eq(setting.session_id))
        .select(AcademicSessionRow::as_select())
        .first::<AcademicSessionRow>(conn)?
        .try_into()?;

    let term: Option<Term> = match setting.term_id {
        Some(term_id) => Some(
            terms::table
                .filter(terms::term_id.eq(term_id))
                .select(TermRow::as_select())
                .first::<TermRow>(conn)?
                .try_into()?,
        ),
        None => None,
    };

    Ok(Some(AcademicSetting {
        division: Division::new(&setting.division),
        session,
        term,
        next_resumption_date: setting
            .next_resumption_date
            .as_deref()
            .map(parse_date)
            .transpose()?,
        closing_date: setting.closing_date.as_deref().map(parse_date).transpose()?,
    }))
}
}

backend_fn! {
/// Finds the session of a division that starts in `start_year`.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if no such session exists.
pub fn find_academic_session(
    conn: &mut _,
    division: &Division,
    start_year: u16,
) -> Result<Option<AcademicSession>, PersistenceError> {
    debug!(division = division.code(), start_year, "Looking up academic session");

    let row: Option<AcademicSessionRow> = academic_sessions::table
        .filter(academic_sessions::division.eq(division.code()))
        .filter(academic_sessions::start_year.eq(i32::from(start_year)))
        .select(AcademicSessionRow::as_select())
        .first(conn)
        .optional()?;

    row.map(AcademicSession::try_from).transpose()
}
}

backend_fn! {
/// Lists all terms ordered by `order`.
///
/// # Errors
///
/// Returns an error if the query fails or a row is out of range.
pub fn list_terms(conn: &mut _) -> Result<Vec<Term>, PersistenceError> {
    let rows: Vec<TermRow> = terms::table
        .order_by(terms::term_order.asc())
        .select(TermRow::as_select())
        .load(conn)?;

    rows.into_iter().map(Term::try_from).collect()
}
}

backend_fn! {
/// Lists the classes of a division ordered by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_classes(
    conn: &mut _,
    division: &Division,
) -> Result<Vec<SchoolClass>, PersistenceError> {
    let rows: Vec<ClassRow> = classes::table
        .filter(classes::division.eq(division.code()))
        .order_by(classes::class_id.asc())
        .select(ClassRow::as_select())
        .load(conn)?;

    Ok(rows.into_iter().map(SchoolClass::from).collect())
}
}

backend_fn! {
/// Retrieves a class by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_class(conn: &mut _, class_id: i64) -> Result<Option<SchoolClass>, PersistenceError> {
    let row: Option<ClassRow> = classes::table
        .filter(classes::class_id.eq(class_id))
        .select(ClassRow::as_select())
        .first(conn)
        .optional()?;

    Ok(row.map(SchoolClass::from))
}
}

backend_fn! {
/// Checks whether a section exists.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn section_exists(conn: &mut _, section_id: i64) -> Result<bool, PersistenceError> {
    use diesel::dsl::count;

    let found: i64 = sections::table
        .filter(sections::section_id.eq(section_id))
        .select(count(sections::section_id))
        .first(conn)?;

    Ok(found > 0)
}
}

backend_fn! {
/// Lists every promotion map whose source class belongs to the division.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn list_promotion_maps(
    conn: &mut _,
    division: &Division,
) -> Result<Vec<PromotionMap>, PersistenceError> {
    let rows: Vec<PromotionMapRow> = promotion_maps::table
        .inner_join(classes::table)
        .filter(classes::division.eq(division.code()))
        .order_by((promotion_maps::class_id.asc(), promotion_maps::section_id.asc()))
        .select(PromotionMapRow::as_select())
        .load(conn)?;

    debug!(division = division.code(), count = rows.len(), "Loaded promotion maps");

    Ok(rows.into_iter().map(PromotionMap::from).collect())
}
}
