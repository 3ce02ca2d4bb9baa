// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AcademicSession, AcademicSetting, Division, Placement, PromotionMap, SchoolClass, Student,
    StudentStatus, Term,
};

pub fn create_test_division() -> Division {
    Division::new("sec")
}

pub fn create_test_terms() -> Vec<Term> {
    vec![
        Term::new("First Term", 1, false).with_id(1),
        Term::new("Second Term", 2, false).with_id(2),
        Term::new("Third Term", 3, true).with_id(3),
    ]
}

pub fn create_test_session() -> AcademicSession {
    AcademicSession::new(2023, 2024, "/", create_test_division()).with_id(10)
}

pub fn create_test_setting(term: Option<Term>) -> AcademicSetting {
    AcademicSetting {
        division: create_test_division(),
        session: create_test_session(),
        term,
        next_resumption_date: Some(
            time::Date::from_calendar_date(2024, time::Month::September, 9).unwrap(),
        ),
        closing_date: None,
    }
}

pub fn create_test_class(class_id: i64, name: &str) -> SchoolClass {
    SchoolClass {
        class_id,
        name: name.to_string(),
        division: create_test_division(),
    }
}

pub fn create_test_student(student_id: i64, class_id: i64, section_id: i64) -> Student {
    Student {
        student_id,
        registration_number: format!("REG-{student_id:04}"),
        full_name: format!("Student {student_id}"),
        class_id: Some(class_id),
        section_id: Some(section_id),
        status: StudentStatus::Active,
        division: create_test_division(),
    }
}

pub fn create_promotion(
    class_id: i64,
    section_id: i64,
    target: Option<(i64, i64)>,
    is_graduation_class: bool,
) -> PromotionMap {
    PromotionMap {
        source: Placement::new(class_id, section_id),
        target_class_id: target.map(|(c, _)| c),
        target_section_id: target.map(|(_, s)| s),
        is_graduation_class,
    }
}
