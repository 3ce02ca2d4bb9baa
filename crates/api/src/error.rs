// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Error types for the API layer.

use term_rollover::CoreError;
use term_rollover_domain::DomainError;
use term_rollover_persistence::PersistenceError;
use thiserror::Error;

/// Authentication and authorization errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Authentication failed.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
}

/// API-level errors.
///
/// These are distinct from domain/core errors and represent the API contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Authentication failed, including a rejected rollover credential.
    #[error("Authentication failed: {reason}")]
    AuthenticationFailed {
        /// The reason authentication failed.
        reason: String,
    },
    /// Authorization failed - the actor does not have permission.
    #[error("Unauthorized: '{action}' requires {required_role} role")]
    Unauthorized {
        /// The action that was attempted.
        action: String,
        /// The role required for this action.
        required_role: String,
    },
    /// A workflow command is not allowed in the current phase.
    #[error("Cannot {command} while the rollover workflow is {current}")]
    UnauthorizedTransition {
        /// The current phase.
        current: String,
        /// The rejected command.
        command: String,
    },
    /// A stage was invoked before the workflow was admitted.
    #[error("Rollover workflow is not admitted (phase: {phase})")]
    WorkflowNotAdmitted {
        /// The current phase.
        phase: String,
    },
    /// The operator's own rollover is already admitted.
    #[error("A rollover is already in progress for division '{division}'")]
    RolloverInProgress {
        /// The division code.
        division: String,
    },
    /// Another operator holds the division's rollover lock.
    #[error("Division '{division}' is locked by operator {holder}")]
    RolloverLocked {
        /// The division code.
        division: String,
        /// The operator holding the lock.
        holder: i64,
    },
    /// The academic setting is missing data the rollover needs.
    #[error("Configuration error: {message}")]
    Configuration {
        /// A human-readable description of what is missing.
        message: String,
    },
    /// A class or placement has no promotion mapping.
    #[error("Promotion class not set for {class_name}")]
    IncompletePromotionMap {
        /// The first class found without a mapping.
        class_name: String,
    },
    /// A domain rule was violated.
    #[error("Domain rule violation ({rule}): {message}")]
    DomainRuleViolation {
        /// The rule that was violated.
        rule: String,
        /// A human-readable description of the violation.
        message: String,
    },
    /// Invalid input was provided.
    #[error("Invalid input for field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A human-readable description of the error.
        message: String,
    },
    /// A requested resource was not found.
    #[error("{resource_type} not found: {message}")]
    ResourceNotFound {
        /// The type of resource that was not found.
        resource_type: String,
        /// A human-readable description of what was not found.
        message: String,
    },
    /// An internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// A description of the internal error.
        message: String,
    },
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed { reason } => Self::AuthenticationFailed { reason },
            AuthError::Unauthorized {
                action,
                required_role,
            } => Self::Unauthorized {
                action,
                required_role,
            },
        }
    }
}

/// Translates a domain error into an API error.
///
/// This translation is explicit and ensures domain errors are not leaked directly.
#[must_use]
pub fn translate_domain_error(err: DomainError) -> ApiError {
    match err {
        DomainError::InvalidDivision(msg) => ApiError::InvalidInput {
            field: String::from("division"),
            message: msg,
        },
        DomainError::InvalidSession(msg) => ApiError::InvalidInput {
            field: String::from("session"),
            message: msg,
        },
        DomainError::InvalidSeparator(separator) => ApiError::InvalidInput {
            field: String::from("separator"),
            message: format!("'{separator}' is not '/' or '-'"),
        },
        DomainError::InvalidTerm(msg) => ApiError::InvalidInput {
            field: String::from("term"),
            message: msg,
        },
        err @ (DomainError::InvalidSessionStatus(_)
        | DomainError::InvalidStudentStatus(_)
        | DomainError::InvalidRolloverPhase(_)
        | DomainError::InvalidRolloverStage(_)) => ApiError::Internal {
            message: err.to_string(),
        },
        DomainError::InvalidPhaseTransition { current, target } => {
            ApiError::UnauthorizedTransition {
                current,
                command: format!("move to {target}"),
            }
        }
        err @ (DomainError::ResumptionDateNotSet { .. }
        | DomainError::CurrentTermNotSet { .. }) => ApiError::Configuration {
            message: err.to_string(),
        },
        DomainError::IncompletePromotionMap { class_name } => {
            ApiError::IncompletePromotionMap { class_name }
        }
        err @ DomainError::IncompletePromotionTarget { .. } => ApiError::DomainRuleViolation {
            rule: String::from("complete_promotion_target"),
            message: err.to_string(),
        },
    }
}

/// Translates a core error into an API error.
///
/// This translation is explicit and ensures core errors are not leaked directly.
#[must_use]
pub fn translate_core_error(err: CoreError) -> ApiError {
    match err {
        CoreError::DomainViolation(domain_err) => translate_domain_error(domain_err),
        CoreError::UnauthorizedTransition { current, command } => {
            ApiError::UnauthorizedTransition {
                current: current.to_string(),
                command,
            }
        }
        CoreError::WorkflowNotAdmitted { phase } => ApiError::WorkflowNotAdmitted {
            phase: phase.to_string(),
        },
        CoreError::RolloverInProgress { division } => ApiError::RolloverInProgress { division },
    }
}

/// Translates a persistence error into an API error.
#[must_use]
pub fn translate_persistence_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Record"),
            message,
        },
        PersistenceError::SettingNotFound(division) => ApiError::Configuration {
            message: format!("Academic setting not found for division '{division}'"),
        },
        PersistenceError::OperatorNotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Operator"),
            message,
        },
        other => ApiError::Internal {
            message: other.to_string(),
        },
    }
}
