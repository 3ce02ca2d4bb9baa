// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use term_rollover_domain::RolloverStage;

/// A command represents operator intent as data only.
///
/// Commands are the only way to change a rollover workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Show the confirmation prompt and reset verification.
    RequestConfirmation,
    /// Record that the operator re-authenticated successfully.
    ///
    /// Credential checking happens before this command is built.
    ConfirmIdentity,
    /// Admit the saga so that stages may run.
    AdmitWorkflow,
    /// Record that a stage finished.
    CompleteStage {
        /// The stage that finished.
        stage: RolloverStage,
    },
    /// Drop the workflow back to idle without running further stages.
    Abandon,
}

impl Command {
    /// The audit action name for this command.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::RequestConfirmation => "RequestConfirmation",
            Self::ConfirmIdentity => "ConfirmIdentity",
            Self::AdmitWorkflow => "AdmitWorkflow",
            Self::CompleteStage { stage } => stage.as_str(),
            Self::Abandon => "Abandon",
        }
    }
}
