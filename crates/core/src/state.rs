// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use term_rollover_audit::{AuditEvent, StateSnapshot};
use term_rollover_domain::{Division, RolloverPhase, RolloverStage};

/// One operator's rollover workflow for one division.
///
/// This replaces per-login session flags: `is_verified` is
/// `phase == Verified` and `updating_term` is `phase == Admitted`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    /// The division being rolled over.
    pub division: Division,
    /// The operator driving the workflow.
    pub operator_id: i64,
    /// The current phase.
    pub phase: RolloverPhase,
    /// Suppresses per-student audit events while the batch stages run.
    pub prevent_logging: bool,
    /// The last stage that finished, if any.
    pub last_completed_stage: Option<RolloverStage>,
}

impl WorkflowState {
    /// Creates an idle workflow.
    #[must_use]
    pub const fn new(division: Division, operator_id: i64) -> Self {
        Self {
            division,
            operator_id,
            phase: RolloverPhase::Idle,
            prevent_logging: false,
            last_completed_stage: None,
        }
    }

    /// Converts the state to a snapshot for audit purposes.
    #[must_use]
    pub fn to_snapshot(&self) -> StateSnapshot {
        StateSnapshot::new(format!(
            "division={},operator={},phase={},prevent_logging={},last_stage={}",
            self.division,
            self.operator_id,
            self.phase,
            self.prevent_logging,
            self.last_completed_stage
                .map_or("none", |stage| stage.as_str())
        ))
    }
}

/// The result of a successful workflow transition.
///
/// Transitions are atomic: they either succeed completely or fail without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionResult {
    /// The new state after the transition.
    pub new_state: WorkflowState,
    /// The audit event recording this transition.
    pub audit_event: AuditEvent,
}
