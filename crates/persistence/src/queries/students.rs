// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Student, fee position and academic record queries.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use term_rollover_domain::{
    Division, FeePosition, Student, StudentAcademicRecord, StudentStatus,
};

use crate::diesel_schema::{student_academic_records, student_fee_positions, students};
use crate::error::PersistenceError;

#[derive(Queryable, Selectable)]
#[diesel(table_name = students)]
struct StudentRow {
    student_id: i64,
    registration_number: String,
    full_name: String,
    class_id: Option<i64>,
    section_id: Option<i64>,
    status: String,
    division: String,
}

impl TryFrom<StudentRow> for Student {
    type Error = PersistenceError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: row.student_id,
            registration_number: row.registration_number,
            full_name: row.full_name,
            class_id: row.class_id,
            section_id: row.section_id,
            status: row.status.parse()?,
            division: Division::new(&row.division),
        })
    }
}

#[derive(Queryable, Selectable)]
#[diesel(table_name = student_academic_records)]
struct AcademicRecordRow {
    student_id: i64,
    previous_classes_json: String,
    attendance_record_json: String,
    fee_record_json: String,
    transitioned_from_json: String,
}

impl TryFrom<AcademicRecordRow> for StudentAcademicRecord {
    type Error = PersistenceError;

    fn try_from(row: AcademicRecordRow) -> Result<Self, Self::Error> {
        Ok(Self {
            student_id: row.student_id,
            previous_classes: serde_json::from_str(&row.previous_classes_json)?,
            attendance_record: serde_json::from_str(&row.attendance_record_json)?,
            fee_record: serde_json::from_str(&row.fee_record_json)?,
            transitioned_from: serde_json::from_str(&row.transitioned_from_json)?,
        })
    }
}

backend_fn! {
/// Lists the students of a division whose status is one of `statuses`.
///
/// Students are returned in ID order so batch stages process them deterministically.
///
/// # Errors
///
/// Returns an error if the query fails or a stored status is unknown.
pub fn list_students_with_status(
    conn: &mut _,
    division: &Division,
    statuses: &[StudentStatus],
) -> Result<Vec<Student>, PersistenceError> {
    let status_values: Vec<&str> = statuses.iter().map(StudentStatus::as_str).collect();

    let rows: Vec<StudentRow> = students::table
        .filter(students::division.eq(division.code()))
        .filter(students::status.eq_any(status_values))
        .order_by(students::student_id.asc())
        .select(StudentRow::as_select())
        .load(conn)?;

    debug!(division = division.code(), count = rows.len(), "Loaded students");

    rows.into_iter().map(Student::try_from).collect()
}
}

backend_fn! {
/// Retrieves a student by ID.
///
/// # Errors
///
/// Returns an error if the query fails.
/// Returns `Ok(None)` if the student is not found.
pub fn get_student(conn: &mut _, student_id: i64) -> Result<Option<Student>, PersistenceError> {
    let row: Option<StudentRow> = students::table
        .filter(students::student_id.eq(student_id))
        .select(StudentRow::as_select())
        .first(conn)
        .optional()?;

    row.map(Student::try_from).transpose()
}
}

backend_fn! {
/// Reads a student's fee position.
///
/// A student with no ledger row has a zero position.
///
/// # Errors
///
/// Returns an error if the query fails.
pub fn get_fee_position(conn: &mut _, student_id: i64) -> Result<FeePosition, PersistenceError> {
    let row: Option<(i64, i64)> = student_fee_positions::table
        .filter(student_fee_positions::student_id.eq(student_id))
        .select((
            student_fee_positions::total_due_minor,
            student_fee_positions::total_paid_minor,
        ))
        .first(conn)
        .optional()?;

    Ok(row.map_or_else(FeePosition::default, |(total_due_minor, total_paid_minor)| {
        FeePosition {
            total_due_minor,
            total_paid_minor,
        }
    }))
}
}

backend_fn! {
/// Reads a student's academic record.
///
/// # Errors
///
/// Returns an error if the query fails or a stored map is not valid JSON.
/// Returns `Ok(None)` if the student has no record yet.
pub fn get_academic_record(
    conn: &mut _,
    student_id: i64,
) -> Result<Option<StudentAcademicRecord>, PersistenceError> {
    let row: Option<AcademicRecordRow> = student_academic_records::table
        .filter(student_academic_records::student_id.eq(student_id))
        .select(AcademicRecordRow::as_select())
        .first(conn)
        .optional()?;

    row.map(StudentAcademicRecord::try_from).transpose()
}
}
