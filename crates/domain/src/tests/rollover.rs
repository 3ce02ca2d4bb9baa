// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{
    AcademicSession, DomainError, NextSession, Placement, SkipReason, StudentStatus,
    StudentTransition, TermAdvancePlan, apply_student_transition, check_rollover_readiness,
    plan_student_transition, plan_term_advance,
};

use super::helpers::{
    create_promotion, create_test_class, create_test_division, create_test_setting,
    create_test_student, create_test_terms,
};

// ============================================================================
// Readiness
// ============================================================================

#[test]
fn test_readiness_fails_without_resumption_date() {
    let terms = create_test_terms();
    let mut setting = create_test_setting(Some(terms[0].clone()));
    setting.next_resumption_date = None;

    let result = check_rollover_readiness(&setting, &[], &[], &[]);

    assert!(matches!(
        result,
        Err(DomainError::ResumptionDateNotSet { division }) if division == "sec"
    ));
}

#[test]
fn test_readiness_ignores_missing_maps_outside_promotion_term() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[1].clone()));
    let classes = vec![create_test_class(1, "JS1")];
    let students = vec![create_test_student(100, 1, 7)];

    assert!(check_rollover_readiness(&setting, &classes, &[], &students).is_ok());
}

#[test]
fn test_readiness_names_class_without_any_mapping() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));
    let classes = vec![create_test_class(1, "JS1"), create_test_class(2, "JS2")];
    let maps = vec![create_promotion(1, 7, Some((2, 7)), false)];

    let result = check_rollover_readiness(&setting, &classes, &maps, &[]);

    assert_eq!(
        result,
        Err(DomainError::IncompletePromotionMap {
            class_name: String::from("JS2")
        })
    );
}

#[test]
fn test_readiness_names_class_when_occupied_section_is_unmapped() {
    // JS2 has a mapping for section 7 (Red) but a student sits in section 8 (Blue).
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));
    let classes = vec![create_test_class(1, "JS1"), create_test_class(2, "JS2")];
    let maps = vec![
        create_promotion(1, 7, Some((2, 7)), false),
        create_promotion(2, 7, Some((3, 7)), false),
    ];
    let students = vec![create_test_student(100, 1, 7), create_test_student(101, 2, 8)];

    let result = check_rollover_readiness(&setting, &classes, &maps, &students);

    assert_eq!(
        result,
        Err(DomainError::IncompletePromotionMap {
            class_name: String::from("JS2")
        })
    );
}

#[test]
fn test_readiness_passes_with_complete_maps() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));
    let classes = vec![create_test_class(1, "JS1"), create_test_class(2, "JS2")];
    let maps = vec![
        create_promotion(1, 7, Some((2, 7)), false),
        create_promotion(2, 7, None, true),
    ];
    let students = vec![create_test_student(100, 1, 7), create_test_student(101, 2, 7)];

    assert!(check_rollover_readiness(&setting, &classes, &maps, &students).is_ok());
}

// ============================================================================
// Student transitions
// ============================================================================

#[test]
fn test_transition_promotes_to_mapped_target() {
    let student = create_test_student(100, 1, 7);
    let map = create_promotion(1, 7, Some((2, 8)), false);

    let transition = plan_student_transition(&student, Some(&map));
    assert_eq!(transition, StudentTransition::Promote(Placement::new(2, 8)));

    let updated = apply_student_transition(&student, &transition).unwrap();
    assert_eq!(updated.class_id, Some(2));
    assert_eq!(updated.section_id, Some(8));
    assert_eq!(updated.status, StudentStatus::Active);
}

#[test]
fn test_transition_graduates_and_clears_placement() {
    let student = create_test_student(100, 6, 7);
    let map = create_promotion(6, 7, Some((9, 9)), true);

    let transition = plan_student_transition(&student, Some(&map));
    assert_eq!(transition, StudentTransition::Graduate);

    let updated = apply_student_transition(&student, &transition).unwrap();
    assert_eq!(updated.status, StudentStatus::Graduated);
    assert_eq!(updated.class_id, None);
    assert_eq!(updated.section_id, None);
}

#[test]
fn test_transition_skips_student_without_mapping() {
    let student = create_test_student(100, 1, 7);

    let transition = plan_student_transition(&student, None);

    assert_eq!(
        transition,
        StudentTransition::Skip(SkipReason::NoPromotionMapping)
    );
    assert!(apply_student_transition(&student, &transition).is_none());
}

#[test]
fn test_transition_skips_incomplete_target() {
    let student = create_test_student(100, 1, 7);
    let map = create_promotion(1, 7, None, false);

    assert_eq!(
        plan_student_transition(&student, Some(&map)),
        StudentTransition::Skip(SkipReason::IncompletePromotionTarget)
    );
}

#[test]
fn test_transition_skips_student_without_placement() {
    let mut student = create_test_student(100, 1, 7);
    student.section_id = None;
    let map = create_promotion(1, 7, Some((2, 7)), false);

    assert_eq!(
        plan_student_transition(&student, Some(&map)),
        StudentTransition::Skip(SkipReason::MissingPlacement)
    );
}

// ============================================================================
// Term advance
// ============================================================================

#[test]
fn test_advance_moves_to_next_order_in_same_session() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[0].clone()));

    let plan: TermAdvancePlan = plan_term_advance(&setting, &terms, None).unwrap();

    assert_eq!(plan.next_term.order, 2);
    assert_eq!(plan.next_session, NextSession::Current);
}

#[test]
fn test_advance_promotion_term_creates_successor_session() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));

    let plan = plan_term_advance(&setting, &terms, None).unwrap();

    assert_eq!(plan.next_term.order, 1);
    match plan.next_session {
        NextSession::Create(session) => {
            assert_eq!(session.start_year, 2024);
            assert_eq!(session.end_year, 2025);
            assert_eq!(session.separator, "/");
            assert_eq!(session.division, create_test_division());
            assert_eq!(session.session_id, None);
        }
        other => panic!("expected a new session, got {other:?}"),
    }
}

#[test]
fn test_advance_promotion_term_reuses_existing_session() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));
    let existing = AcademicSession::new(2024, 2025, "/", create_test_division()).with_id(11);

    let plan = plan_term_advance(&setting, &terms, Some(existing.clone())).unwrap();

    assert_eq!(plan.next_session, NextSession::Existing(existing));
}

#[test]
fn test_advance_without_following_term_changes_nothing() {
    // Order 3 is not a promotion term here and nothing has order 4.
    let mut terms = create_test_terms();
    terms[2].is_promotion_term = false;
    let setting = create_test_setting(Some(terms[2].clone()));

    assert!(plan_term_advance(&setting, &terms, None).is_none());
}

#[test]
fn test_advance_without_current_term_changes_nothing() {
    let terms = create_test_terms();
    let setting = create_test_setting(None);

    assert!(plan_term_advance(&setting, &terms, None).is_none());
}

#[test]
fn test_advance_promotion_term_without_first_term_changes_nothing() {
    let terms = create_test_terms();
    let setting = create_test_setting(Some(terms[2].clone()));
    let only_last = vec![terms[2].clone()];

    assert!(plan_term_advance(&setting, &only_last, None).is_none());
}
