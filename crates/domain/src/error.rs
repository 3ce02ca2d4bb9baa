// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use thiserror::Error;

/// Errors that can occur during domain validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Division code is empty or invalid.
    #[error("Invalid division: {0}")]
    InvalidDivision(String),
    /// Session years are out of range or not consecutive.
    #[error("Invalid session: {0}")]
    InvalidSession(String),
    /// Session separator is not one of the accepted symbols.
    #[error("Invalid session separator '{0}'. Must be '/' or '-'")]
    InvalidSeparator(String),
    /// Term definition is invalid.
    #[error("Invalid term: {0}")]
    InvalidTerm(String),
    /// Stored session status could not be parsed.
    #[error("Invalid session status: {0}")]
    InvalidSessionStatus(String),
    /// Stored student status could not be parsed.
    #[error("Invalid student status: {0}")]
    InvalidStudentStatus(String),
    /// Stored rollover phase could not be parsed.
    #[error("Invalid rollover phase: {0}")]
    InvalidRolloverPhase(String),
    /// Stored rollover stage could not be parsed.
    #[error("Invalid rollover stage: {0}")]
    InvalidRolloverStage(String),
    /// A rollover phase transition is not permitted.
    #[error("Invalid rollover phase transition from {current} to {target}")]
    InvalidPhaseTransition {
        /// The current phase.
        current: String,
        /// The requested phase.
        target: String,
    },
    /// The academic setting of a division has no next resumption date.
    #[error("Next term resumption date is not set for division '{division}'")]
    ResumptionDateNotSet {
        /// The division code.
        division: String,
    },
    /// The academic setting of a division has no current term.
    #[error("Current term is not set for division '{division}'")]
    CurrentTermNotSet {
        /// The division code.
        division: String,
    },
    /// A class (or one of its sections) has no promotion mapping.
    #[error("Promotion class not set for {class_name}")]
    IncompletePromotionMap {
        /// The class missing a mapping.
        class_name: String,
    },
    /// A non-graduation promotion mapping lacks a target class or section.
    #[error("Promotion mapping for class {class_id}, section {section_id} has no target")]
    IncompletePromotionTarget {
        /// The source class ID.
        class_id: i64,
        /// The source section ID.
        section_id: i64,
    },
}
