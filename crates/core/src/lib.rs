// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all,
    clippy::suspicious,
    clippy::complexity,
    clippy::perf,
    clippy::unwrap_used,
    clippy::expect_used
)]

mod apply;
mod command;
mod error;
mod state;

#[cfg(test)]
mod tests;

// Re-export public types and functions
pub use apply::apply;
pub use command::Command;
pub use error::CoreError;
pub use state::{TransitionResult, WorkflowState};

use term_rollover_domain::RolloverPhase;

/// Checks that a workflow has been admitted.
///
/// Every stage entry point calls this before touching domain data.
/// This is a read-only check that does not create audit events.
///
/// # Errors
///
/// Returns `WorkflowNotAdmitted` if the workflow is in any other phase.
pub fn require_admitted(state: &WorkflowState) -> Result<(), CoreError> {
    if state.phase != RolloverPhase::Admitted {
        return Err(CoreError::WorkflowNotAdmitted {
            phase: state.phase,
        });
    }
    Ok(())
}
