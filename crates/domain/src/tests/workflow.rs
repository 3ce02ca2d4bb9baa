// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{RolloverPhase, RolloverStage};

#[test]
fn test_default_phase_is_idle() {
    assert_eq!(RolloverPhase::default(), RolloverPhase::Idle);
}

#[test]
fn test_phase_happy_path() {
    assert!(RolloverPhase::Idle.can_transition_to(RolloverPhase::Verified));
    assert!(RolloverPhase::Verified.can_transition_to(RolloverPhase::Admitted));
    assert!(RolloverPhase::Admitted.can_transition_to(RolloverPhase::Completed));
}

#[test]
fn test_admission_requires_verification() {
    assert!(!RolloverPhase::Idle.can_transition_to(RolloverPhase::Admitted));
    assert!(!RolloverPhase::Completed.can_transition_to(RolloverPhase::Admitted));
}

#[test]
fn test_completion_requires_admission() {
    assert!(!RolloverPhase::Idle.can_transition_to(RolloverPhase::Completed));
    assert!(!RolloverPhase::Verified.can_transition_to(RolloverPhase::Completed));
}

#[test]
fn test_any_phase_may_return_to_idle() {
    for phase in [
        RolloverPhase::Idle,
        RolloverPhase::Verified,
        RolloverPhase::Admitted,
        RolloverPhase::Completed,
    ] {
        assert!(phase.can_transition_to(RolloverPhase::Idle));
    }
}

#[test]
fn test_admitted_cannot_be_reverified() {
    assert!(!RolloverPhase::Admitted.can_transition_to(RolloverPhase::Verified));
}

#[test]
fn test_only_admitted_is_admitted() {
    assert!(RolloverPhase::Admitted.is_admitted());
    assert!(!RolloverPhase::Verified.is_admitted());
    assert!(!RolloverPhase::Completed.is_admitted());
}

#[test]
fn test_phase_parses_stored_value() {
    assert_eq!("Admitted".parse::<RolloverPhase>(), Ok(RolloverPhase::Admitted));
    assert!("admitted".parse::<RolloverPhase>().is_err());
}

#[test]
fn test_stage_round_trips_through_str() {
    for stage in [
        RolloverStage::Precheck,
        RolloverStage::ArchivePlacement,
        RolloverStage::ArchiveFeePosition,
        RolloverStage::ArchiveAttendance,
        RolloverStage::TransitionStudents,
        RolloverStage::AdvanceTerm,
    ] {
        assert_eq!(stage.to_string().parse::<RolloverStage>(), Ok(stage));
    }
}
