// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Tests for the confirmation and admission gate.

use crate::{Command, CoreError, WorkflowState, apply, require_admitted};
use term_rollover_domain::{RolloverPhase, RolloverStage};

use super::helpers::{
    create_admitted_state, create_idle_state, create_test_actor, create_test_cause, drive,
};

#[test]
fn test_request_confirmation_resets_verification() {
    let verified: WorkflowState = drive(&[Command::ConfirmIdentity]);
    assert_eq!(verified.phase, RolloverPhase::Verified);

    let result = apply(
        &verified,
        Command::RequestConfirmation,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.new_state.phase, RolloverPhase::Idle);
}

#[test]
fn test_request_confirmation_rejected_while_admitted() {
    let admitted: WorkflowState = create_admitted_state();

    let result = apply(
        &admitted,
        Command::RequestConfirmation,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(CoreError::RolloverInProgress { division }) if division == "sec"
    ));
}

#[test]
fn test_admit_without_verification_is_unauthorized() {
    let result = apply(
        &create_idle_state(),
        Command::AdmitWorkflow,
        create_test_actor(),
        create_test_cause(),
    );

    assert_eq!(
        result.unwrap_err(),
        CoreError::UnauthorizedTransition {
            current: RolloverPhase::Idle,
            command: String::from("AdmitWorkflow"),
        }
    );
}

#[test]
fn test_admit_after_new_confirmation_request_is_unauthorized() {
    // Verification does not survive a fresh confirmation request.
    let state = drive(&[Command::ConfirmIdentity, Command::RequestConfirmation]);

    let result = apply(
        &state,
        Command::AdmitWorkflow,
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(CoreError::UnauthorizedTransition { .. })
    ));
}

#[test]
fn test_admit_clears_flags() {
    let mut verified = drive(&[Command::ConfirmIdentity]);
    verified.prevent_logging = true;
    verified.last_completed_stage = Some(RolloverStage::AdvanceTerm);

    let result = apply(
        &verified,
        Command::AdmitWorkflow,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap();

    assert_eq!(result.new_state.phase, RolloverPhase::Admitted);
    assert!(!result.new_state.prevent_logging);
    assert_eq!(result.new_state.last_completed_stage, None);
}

#[test]
fn test_require_admitted() {
    assert!(require_admitted(&create_admitted_state()).is_ok());

    let verified = drive(&[Command::ConfirmIdentity]);
    assert_eq!(
        require_admitted(&verified),
        Err(CoreError::WorkflowNotAdmitted {
            phase: RolloverPhase::Verified
        })
    );
}

#[test]
fn test_stage_outside_admitted_workflow_is_rejected() {
    let result = apply(
        &create_idle_state(),
        Command::CompleteStage {
            stage: RolloverStage::ArchivePlacement,
        },
        create_test_actor(),
        create_test_cause(),
    );

    assert!(matches!(
        result,
        Err(CoreError::WorkflowNotAdmitted {
            phase: RolloverPhase::Idle
        })
    ));
}

#[test]
fn test_abandon_returns_to_idle_and_blocks_stages() {
    let admitted = create_admitted_state();

    let abandoned = apply(
        &admitted,
        Command::Abandon,
        create_test_actor(),
        create_test_cause(),
    )
    .unwrap()
    .new_state;

    assert_eq!(abandoned.phase, RolloverPhase::Idle);
    assert!(require_admitted(&abandoned).is_err());
}
