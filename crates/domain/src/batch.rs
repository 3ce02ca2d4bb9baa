// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Per-record outcome reporting for batch stages.
//!
//! Archive and transition stages never stop on a single student. Each
//! student either counts as processed or lands in `skipped` with a reason,
//! so callers can observe partial failure.

use serde::{Deserialize, Serialize};

/// Why a student was not processed by a batch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// No promotion mapping exists for the student's placement.
    NoPromotionMapping,
    /// The mapping is neither a graduation nor a complete target.
    IncompletePromotionTarget,
    /// The student has no class or section to snapshot or promote.
    MissingPlacement,
    /// The student was already transitioned in the current term.
    AlreadyTransitioned,
    /// Persisting the student's change failed.
    SaveFailed(String),
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoPromotionMapping => write!(f, "no promotion mapping"),
            Self::IncompletePromotionTarget => write!(f, "promotion mapping has no target"),
            Self::MissingPlacement => write!(f, "student has no class or section"),
            Self::AlreadyTransitioned => write!(f, "already transitioned this term"),
            Self::SaveFailed(msg) => write!(f, "save failed: {msg}"),
        }
    }
}

/// A student left unprocessed by a batch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRecord {
    /// The student identifier.
    pub student_id: i64,
    /// Why the student was skipped.
    pub reason: SkipReason,
}

/// The aggregate outcome of one batch stage.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BatchReport {
    /// Students whose change was persisted.
    pub processed: usize,
    /// Students left unchanged, with the reason.
    pub skipped: Vec<SkippedRecord>,
}

impl BatchReport {
    /// Creates an empty report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            processed: 0,
            skipped: Vec::new(),
        }
    }

    /// Counts one processed student.
    pub const fn record_processed(&mut self) {
        self.processed += 1;
    }

    /// Records a skipped student.
    pub fn record_skipped(&mut self, student_id: i64, reason: SkipReason) {
        self.skipped.push(SkippedRecord { student_id, reason });
    }

    /// Number of students examined.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.processed + self.skipped.len()
    }

    /// Whether any student failed to save (as opposed to a planned skip).
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.skipped
            .iter()
            .any(|s| matches!(s.reason, SkipReason::SaveFailed(_)))
    }
}
