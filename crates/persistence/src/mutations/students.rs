// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Student, fee position and academic record mutations.

use diesel::prelude::*;
use diesel::{MysqlConnection, SqliteConnection};
use tracing::debug;

use term_rollover_domain::{FeePosition, Student, StudentAcademicRecord};

use crate::backend::PersistenceBackend;
use crate::diesel_schema::{student_academic_records, student_fee_positions, students};
use crate::error::PersistenceError;

backend_fn! {
/// Inserts a student.
///
/// The `student_id` of `student` is ignored; the database assigns one.
///
/// # Errors
///
/// Returns an error if the insert fails.
pub fn create_student(conn: &mut _, student: &Student) -> Result<i64, PersistenceError> {
    diesel::insert_into(students::table)
        .values((
            students::registration_number.eq(&student.registration_number),
            students::full_name.eq(&student.full_name),
            students::class_id.eq(student.class_id),
            students::section_id.eq(student.section_id),
            students::status.eq(student.status.as_str()),
            students::division.eq(student.division.code()),
        ))
        .execute(conn)?;

    let student_id: i64 = conn.get_last_insert_rowid()?;

    debug!(student_id, registration_number = %student.registration_number, "Created student");

    Ok(student_id)
}
}

backend_fn! {
/// Writes a student's class, section and status.
///
/// # Errors
///
/// Returns an error if the update fails or the student does not exist.
pub fn update_student_placement(conn: &mut _, student: &Student) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(students::table)
        .filter(students::student_id.eq(student.student_id))
        .set((
            students::class_id.eq(student.class_id),
            students::section_id.eq(student.section_id),
            students::status.eq(student.status.as_str()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(PersistenceError::NotFound(format!(
            "Student {}",
            student.student_id
        )));
    }

    debug!(
        student_id = student.student_id,
        status = student.status.as_str(),
        "Updated student placement"
    );

    Ok(())
}
}

backend_fn! {
/// Sets a student's fee position totals.
///
/// # Errors
///
/// Returns an error if the write fails.
pub fn set_fee_position(
    conn: &mut _,
    student_id: i64,
    position: FeePosition,
) -> Result<(), PersistenceError> {
    let updated: usize = diesel::update(student_fee_positions::table)
        .filter(student_fee_positions::student_id.eq(student_id))
        .set((
            student_fee_positions::total_due_minor.eq(position.total_due_minor),
            student_fee_positions::total_paid_minor.eq(position.total_paid_minor),
        ))
        .execute(conn)?;

    if updated == 0 {
        diesel::insert_into(student_fee_positions::table)
            .values((
                student_fee_positions::student_id.eq(student_id),
                student_fee_positions::total_due_minor.eq(position.total_due_minor),
                student_fee_positions::total_paid_minor.eq(position.total_paid_minor),
            ))
            .execute(conn)?;
    }

    Ok(())
}
}

backend_fn! {
/// Stores a student's academic record, creating the row on first use.
///
/// # Errors
///
/// Returns an error if a map cannot be serialized or the write fails.
pub fn save_academic_record(
    conn: &mut _,
    record: &StudentAcademicRecord,
) -> Result<(), PersistenceError> {
    let previous_classes_json: String = serde_json::to_string(&record.previous_classes)?;
    let attendance_record_json: String = serde_json::to_string(&record.attendance_record)?;
    let fee_record_json: String = serde_json::to_string(&record.fee_record)?;
    let transitioned_from_json: String = serde_json::to_string(&record.transitioned_from)?;

    conn.transaction::<_, PersistenceError, _>(|conn| {
        let updated: usize = diesel::update(student_academic_records::table)
            .filter(student_academic_records::student_id.eq(record.student_id))
            .set((
                student_academic_records::previous_classes_json.eq(&previous_classes_json),
                student_academic_records::attendance_record_json.eq(&attendance_record_json),
                student_academic_records::fee_record_json.eq(&fee_record_json),
                student_academic_records::transitioned_from_json.eq(&transitioned_from_json),
            ))
            .execute(conn)?;

        if updated == 0 {
            diesel::insert_into(student_academic_records::table)
                .values((
                    student_academic_records::student_id.eq(record.student_id),
                    student_academic_records::previous_classes_json.eq(&previous_classes_json),
                    student_academic_records::attendance_record_json.eq(&attendance_record_json),
                    student_academic_records::fee_record_json.eq(&fee_record_json),
                    student_academic_records::transitioned_from_json.eq(&transitioned_from_json),
                ))
                .execute(conn)?;
        }

        Ok(())
    })?;

    debug!(student_id = record.student_id, "Saved academic record");

    Ok(())
}
}

/// Moves a student and marks the move on their academic record, atomically.
///
/// # Errors
///
/// Returns an error if either write fails; neither is kept.
pub fn transition_student_sqlite(
    conn: &mut SqliteConnection,
    student: &Student,
    record: &StudentAcademicRecord,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_student_placement_sqlite(conn, student)?;
        save_academic_record_sqlite(conn, record)
    })
}

/// Moves a student and marks the move on their academic record, atomically.
///
/// # Errors
///
/// Returns an error if either write fails; neither is kept.
pub fn transition_student_mysql(
    conn: &mut MysqlConnection,
    student: &Student,
    record: &StudentAcademicRecord,
) -> Result<(), PersistenceError> {
    conn.transaction::<_, PersistenceError, _>(|conn| {
        update_student_placement_mysql(conn, student)?;
        save_academic_record_mysql(conn, record)
    })
}
