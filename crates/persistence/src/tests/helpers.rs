// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use time::{Date, Month};

use term_rollover_audit::{Actor, Cause};
use term_rollover_domain::{AcademicSession, Division, Student, StudentStatus, Term};

use crate::{NewOperator, SqlitePersistence};

/// IDs of the calendar rows created by [`seed_calendar`].
pub struct CalendarFixture {
    pub session_id: i64,
    pub first_term_id: i64,
    pub second_term_id: i64,
    pub third_term_id: i64,
}

pub fn create_test_division() -> Division {
    Division::new("sec")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-1"), String::from("Test operation"))
}

pub fn create_test_actor(operator_id: i64) -> Actor {
    Actor::operator(operator_id, "admin")
}

pub fn resumption_date() -> Date {
    Date::from_calendar_date(2024, Month::September, 9).unwrap()
}

pub fn create_admin(persistence: &mut SqlitePersistence, login_name: &str) -> i64 {
    persistence
        .register_operator(&NewOperator {
            login_name,
            display_name: "Test Admin",
            password: "correct horse",
            role: "Admin",
        })
        .unwrap()
}

/// Creates three terms, the 2023/2024 session and a setting pointing at `current_term`.
///
/// `current_term` is the order (1 to 3) of the term the setting points at;
/// the third term is the promotion term.
pub fn seed_calendar(persistence: &mut SqlitePersistence, current_term: u32) -> CalendarFixture {
    let first_term_id = persistence
        .create_term(&Term::new("First Term", 1, false))
        .unwrap();
    let second_term_id = persistence
        .create_term(&Term::new("Second Term", 2, false))
        .unwrap();
    let third_term_id = persistence
        .create_term(&Term::new("Third Term", 3, true))
        .unwrap();
    let session_id = persistence
        .create_academic_session(&AcademicSession::new(
            2023,
            2024,
            "/",
            create_test_division(),
        ))
        .unwrap();

    let term_id = match current_term {
        1 => first_term_id,
        2 => second_term_id,
        _ => third_term_id,
    };
    persistence
        .save_academic_setting(
            &create_test_division(),
            session_id,
            Some(term_id),
            Some(resumption_date()),
            None,
        )
        .unwrap();

    CalendarFixture {
        session_id,
        first_term_id,
        second_term_id,
        third_term_id,
    }
}

pub fn create_test_student(
    persistence: &mut SqlitePersistence,
    registration_number: &str,
    placement: Option<(i64, i64)>,
    status: StudentStatus,
) -> i64 {
    let student = Student {
        student_id: 0,
        registration_number: registration_number.to_string(),
        full_name: format!("Student {registration_number}"),
        class_id: placement.map(|(c, _)| c),
        section_id: placement.map(|(_, s)| s),
        status,
        division: create_test_division(),
    };
    persistence.create_student(&student).unwrap()
}
