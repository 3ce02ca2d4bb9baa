// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{TransitionResult, WorkflowState};
use term_rollover_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use term_rollover_domain::{RolloverPhase, RolloverStage};

/// Applies a command to a workflow, producing the new workflow and its audit event.
///
/// # Arguments
///
/// * `state` - The current workflow (immutable)
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state and audit event
/// * `Err(CoreError)` if the command is not allowed in the current phase
///
/// # Errors
///
/// Returns an error if:
/// - `RequestConfirmation` is issued while the workflow is admitted
/// - `AdmitWorkflow` is issued before identity was confirmed
/// - `CompleteStage` is issued outside an admitted workflow
pub fn apply(
    state: &WorkflowState,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<TransitionResult, CoreError> {
    let mut new_state: WorkflowState = state.clone();

    let details: String = match command {
        Command::RequestConfirmation => {
            if state.phase.is_admitted() {
                return Err(CoreError::RolloverInProgress {
                    division: state.division.code().to_string(),
                });
            }
            new_state.phase = RolloverPhase::Idle;
            new_state.prevent_logging = false;
            String::from("Confirmation requested; verification reset")
        }
        Command::ConfirmIdentity => {
            transition_phase(state, command, RolloverPhase::Verified)?;
            new_state.phase = RolloverPhase::Verified;
            String::from("Operator identity confirmed")
        }
        Command::AdmitWorkflow => {
            transition_phase(state, command, RolloverPhase::Admitted)?;
            new_state.phase = RolloverPhase::Admitted;
            new_state.prevent_logging = false;
            new_state.last_completed_stage = None;
            format!("Rollover admitted for division '{}'", state.division)
        }
        Command::CompleteStage { stage } => {
            crate::require_admitted(state)?;
            new_state.last_completed_stage = Some(stage);
            match stage {
                RolloverStage::Precheck => new_state.prevent_logging = true,
                RolloverStage::AdvanceTerm => {
                    new_state.phase = RolloverPhase::Completed;
                    new_state.prevent_logging = false;
                }
                _ => {}
            }
            format!("Stage {stage} completed")
        }
        Command::Abandon => {
            new_state.phase = RolloverPhase::Idle;
            new_state.prevent_logging = false;
            format!("Rollover abandoned from phase {}", state.phase)
        }
    };

    let before: StateSnapshot = state.to_snapshot();
    let after: StateSnapshot = new_state.to_snapshot();
    let action: Action = Action::new(command.name().to_string(), Some(details));
    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        before,
        after,
        state.division.clone(),
    );

    Ok(TransitionResult {
        new_state,
        audit_event,
    })
}

fn transition_phase(
    state: &WorkflowState,
    command: Command,
    target: RolloverPhase,
) -> Result<(), CoreError> {
    if state.phase.can_transition_to(target) {
        Ok(())
    } else {
        Err(CoreError::UnauthorizedTransition {
            current: state.phase,
            command: command.name().to_string(),
        })
    }
}
