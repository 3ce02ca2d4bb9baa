// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::{Command, WorkflowState, apply};
use term_rollover_audit::{Actor, Cause};
use term_rollover_domain::{Division, RolloverPhase};

pub fn create_test_actor() -> Actor {
    Actor::operator(1, "admin")
}

pub fn create_test_cause() -> Cause {
    Cause::new(String::from("req-456"), String::from("Operator request"))
}

pub fn create_idle_state() -> WorkflowState {
    WorkflowState::new(Division::new("sec"), 1)
}

/// Drives a fresh workflow through the given commands, panicking on rejection.
pub fn drive(commands: &[Command]) -> WorkflowState {
    let mut state: WorkflowState = create_idle_state();
    for command in commands {
        state = apply(&state, *command, create_test_actor(), create_test_cause())
            .unwrap()
            .new_state;
    }
    state
}

pub fn create_admitted_state() -> WorkflowState {
    let state = drive(&[
        Command::RequestConfirmation,
        Command::ConfirmIdentity,
        Command::AdmitWorkflow,
    ]);
    assert_eq!(state.phase, RolloverPhase::Admitted);
    state
}
