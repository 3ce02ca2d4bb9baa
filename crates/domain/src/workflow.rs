// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The phase of an operator's rollover workflow for one division.
///
/// `Verified` means the operator re-authenticated; `Admitted` means the
/// destructive stages may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RolloverPhase {
    /// Confirmation requested, identity not yet confirmed.
    #[default]
    Idle,
    /// Identity confirmed, saga not yet admitted.
    Verified,
    /// Saga admitted; stages may run.
    Admitted,
    /// The term pointer stage ran and cleaned up.
    Completed,
}

impl FromStr for RolloverPhase {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Idle" => Ok(Self::Idle),
            "Verified" => Ok(Self::Verified),
            "Admitted" => Ok(Self::Admitted),
            "Completed" => Ok(Self::Completed),
            _ => Err(DomainError::InvalidRolloverPhase(s.to_string())),
        }
    }
}

impl std::fmt::Display for RolloverPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl RolloverPhase {
    /// Converts this phase to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Verified => "Verified",
            Self::Admitted => "Admitted",
            Self::Completed => "Completed",
        }
    }

    /// Checks if a transition from this phase to another is valid.
    ///
    /// Valid transitions are:
    /// - any phase → `Idle` (new confirmation request, or abandon)
    /// - `Idle` | `Verified` | `Completed` → `Verified`
    /// - `Verified` → `Admitted`
    /// - `Admitted` → `Completed`
    #[must_use]
    pub const fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (_, Self::Idle)
                | (Self::Idle | Self::Verified | Self::Completed, Self::Verified)
                | (Self::Verified, Self::Admitted)
                | (Self::Admitted, Self::Completed)
        )
    }

    /// Whether destructive stages may run in this phase.
    #[must_use]
    pub const fn is_admitted(&self) -> bool {
        matches!(self, Self::Admitted)
    }
}

/// A step of the rollover saga after admission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RolloverStage {
    /// Read-only completeness checks.
    Precheck,
    /// Class placement snapshot.
    ArchivePlacement,
    /// Fee position snapshot.
    ArchiveFeePosition,
    /// Attendance snapshot.
    ArchiveAttendance,
    /// Promotion or graduation of students.
    TransitionStudents,
    /// Term and session pointer update, then cleanup.
    AdvanceTerm,
}

impl RolloverStage {
    /// Converts this stage to its string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Precheck => "Precheck",
            Self::ArchivePlacement => "ArchivePlacement",
            Self::ArchiveFeePosition => "ArchiveFeePosition",
            Self::ArchiveAttendance => "ArchiveAttendance",
            Self::TransitionStudents => "TransitionStudents",
            Self::AdvanceTerm => "AdvanceTerm",
        }
    }
}

impl FromStr for RolloverStage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Precheck" => Ok(Self::Precheck),
            "ArchivePlacement" => Ok(Self::ArchivePlacement),
            "ArchiveFeePosition" => Ok(Self::ArchiveFeePosition),
            "ArchiveAttendance" => Ok(Self::ArchiveAttendance),
            "TransitionStudents" => Ok(Self::TransitionStudents),
            "AdvanceTerm" => Ok(Self::AdvanceTerm),
            _ => Err(DomainError::InvalidRolloverStage(s.to_string())),
        }
    }
}

impl std::fmt::Display for RolloverStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
