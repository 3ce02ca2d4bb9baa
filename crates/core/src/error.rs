// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use term_rollover_domain::{DomainError, RolloverPhase};
use thiserror::Error;

/// Errors that can occur during workflow transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A domain rule was violated.
    #[error("Domain violation: {0}")]
    DomainViolation(#[from] DomainError),
    /// The command is not allowed from the current phase.
    #[error("Cannot {command} while workflow is {current}")]
    UnauthorizedTransition {
        /// The phase the workflow is in.
        current: RolloverPhase,
        /// The rejected command.
        command: String,
    },
    /// A stage was invoked before the workflow was admitted.
    #[error("Workflow is not admitted (phase: {phase})")]
    WorkflowNotAdmitted {
        /// The phase the workflow is in.
        phase: RolloverPhase,
    },
    /// The operator already has an admitted rollover for this division.
    #[error("A rollover is already in progress for division '{division}'")]
    RolloverInProgress {
        /// The division code.
        division: String,
    },
}
