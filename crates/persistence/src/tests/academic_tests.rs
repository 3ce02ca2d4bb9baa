// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for academic calendar and promotion map persistence.

use term_rollover_domain::{
    AcademicSession, Division, NextSession, Placement, PromotionMap, Term, TermAdvancePlan,
    plan_term_advance,
};

use crate::{PersistenceError, SqlitePersistence};

use super::helpers::{create_test_division, resumption_date, seed_calendar};

#[test]
fn test_setting_round_trip_resolves_session_and_term() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let fixture = seed_calendar(&mut persistence, 2);

    let setting = persistence
        .get_academic_setting(&create_test_division())
        .unwrap()
        .unwrap();

    assert_eq!(setting.session.session_id, Some(fixture.session_id));
    assert_eq!(setting.session.label(), "2023/2024");
    let term = setting.term.unwrap();
    assert_eq!(term.term_id, Some(fixture.second_term_id));
    assert_eq!(term.name, "Second Term");
    assert_eq!(setting.next_resumption_date, Some(resumption_date()));
    assert_eq!(setting.closing_date, None);
}

#[test]
fn test_missing_setting_is_none() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    assert!(
        persistence
            .get_academic_setting(&Division::new("pri"))
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_save_setting_replaces_existing_row() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let fixture = seed_calendar(&mut persistence, 1);

    persistence
        .save_academic_setting(
            &create_test_division(),
            fixture.session_id,
            Some(fixture.third_term_id),
            None,
            None,
        )
        .unwrap();

    let setting = persistence
        .get_academic_setting(&create_test_division())
        .unwrap()
        .unwrap();
    assert_eq!(setting.term.unwrap().term_id, Some(fixture.third_term_id));
    assert_eq!(setting.next_resumption_date, None);
}

#[test]
fn test_terms_are_listed_by_order() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    persistence
        .create_term(&Term::new("Third Term", 3, true))
        .unwrap();
    persistence
        .create_term(&Term::new("First Term", 1, false))
        .unwrap();

    let names: Vec<String> = persistence
        .list_terms()
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect();
    assert_eq!(names, vec!["First Term", "Third Term"]);
}

#[test]
fn test_advance_within_session_moves_term_only() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let fixture = seed_calendar(&mut persistence, 1);
    let division = create_test_division();

    let setting = persistence.get_academic_setting(&division).unwrap().unwrap();
    let terms = persistence.list_terms().unwrap();
    let plan = plan_term_advance(&setting, &terms, None).unwrap();
    assert_eq!(plan.next_session, NextSession::Current);

    let session_id = persistence.apply_term_advance(&division, &plan).unwrap();
    assert_eq!(session_id, fixture.session_id);

    let advanced = persistence.get_academic_setting(&division).unwrap().unwrap();
    assert_eq!(advanced.term.unwrap().term_id, Some(fixture.second_term_id));
    assert_eq!(advanced.session.session_id, Some(fixture.session_id));
}

#[test]
fn test_advance_across_session_creates_successor() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let fixture = seed_calendar(&mut persistence, 3);
    let division = create_test_division();

    let setting = persistence.get_academic_setting(&division).unwrap().unwrap();
    let terms = persistence.list_terms().unwrap();
    let existing = persistence.find_academic_session(&division, 2024).unwrap();
    assert!(existing.is_none());

    let plan = plan_term_advance(&setting, &terms, existing).unwrap();
    let session_id = persistence.apply_term_advance(&division, &plan).unwrap();
    assert_ne!(session_id, fixture.session_id);

    let advanced = persistence.get_academic_setting(&division).unwrap().unwrap();
    assert_eq!(advanced.session.label(), "2024/2025");
    assert_eq!(advanced.term.unwrap().term_id, Some(fixture.first_term_id));
    assert!(
        persistence
            .find_academic_session(&division, 2024)
            .unwrap()
            .is_some()
    );
}

#[test]
fn test_advance_reuses_existing_next_session() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    seed_calendar(&mut persistence, 3);
    let division = create_test_division();
    let next_id = persistence
        .create_academic_session(&AcademicSession::new(2024, 2025, "/", division.clone()))
        .unwrap();

    let setting = persistence.get_academic_setting(&division).unwrap().unwrap();
    let terms = persistence.list_terms().unwrap();
    let existing = persistence.find_academic_session(&division, 2024).unwrap();
    let plan = plan_term_advance(&setting, &terms, existing).unwrap();
    assert!(matches!(plan.next_session, NextSession::Existing(_)));

    let session_id = persistence.apply_term_advance(&division, &plan).unwrap();
    assert_eq!(session_id, next_id);
}

#[test]
fn test_advance_without_setting_changes_nothing() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let term_id = persistence
        .create_term(&Term::new("First Term", 1, false))
        .unwrap();
    let plan = TermAdvancePlan {
        next_term: Term::new("First Term", 1, false).with_id(term_id),
        next_session: NextSession::Create(AcademicSession::new(
            2024,
            2025,
            "/",
            Division::new("pri"),
        )),
    };

    let result = persistence.apply_term_advance(&Division::new("pri"), &plan);
    assert!(matches!(result, Err(PersistenceError::SettingNotFound(_))));
    assert!(
        persistence
            .find_academic_session(&Division::new("pri"), 2024)
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_promotion_map_upsert_replaces_row_for_same_source() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let division = create_test_division();
    let jss1 = persistence.create_class("JSS1", &division).unwrap();
    let jss2 = persistence.create_class("JSS2", &division).unwrap();
    let section = persistence.create_section("A").unwrap();

    let mut map = PromotionMap {
        source: Placement::new(jss1, section),
        target_class_id: None,
        target_section_id: None,
        is_graduation_class: true,
    };
    persistence.upsert_promotion_map(&map).unwrap();

    map.is_graduation_class = false;
    map.target_class_id = Some(jss2);
    map.target_section_id = Some(section);
    persistence.upsert_promotion_map(&map).unwrap();

    let maps = persistence.list_promotion_maps(&division).unwrap();
    assert_eq!(maps, vec![map]);
}

#[test]
fn test_promotion_maps_are_scoped_to_division() {
    let mut persistence = SqlitePersistence::new_in_memory().unwrap();
    let section = persistence.create_section("A").unwrap();
    let secondary = persistence
        .create_class("JSS1", &create_test_division())
        .unwrap();
    let primary = persistence
        .create_class("Primary 1", &Division::new("pri"))
        .unwrap();

    for class_id in [secondary, primary] {
        persistence
            .upsert_promotion_map(&PromotionMap {
                source: Placement::new(class_id, section),
                target_class_id: None,
                target_section_id: None,
                is_graduation_class: true,
            })
            .unwrap();
    }

    let maps = persistence
        .list_promotion_maps(&create_test_division())
        .unwrap();
    assert_eq!(maps.len(), 1);
    assert_eq!(maps[0].source.class_id, secondary);
    assert_eq!(persistence.list_classes(&Division::new("pri")).unwrap().len(), 1);
    assert!(persistence.section_exists(section).unwrap());
    assert!(!persistence.section_exists(section + 100).unwrap());
}
