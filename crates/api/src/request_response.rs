// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API request and response data transfer objects.

use serde::{Deserialize, Serialize};
use term_rollover_domain::{BatchReport, RolloverStage};

/// Login request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    /// The operator login name.
    pub login_name: String,
    /// The operator password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    /// The bearer token for subsequent requests.
    pub session_token: String,
    /// The normalized login name.
    pub login_name: String,
    /// The display name.
    pub display_name: String,
    /// The operator role.
    pub role: String,
    /// When the session expires (ISO 8601).
    pub expires_at: String,
}

/// The confirmation prompt shown before a rollover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationPromptResponse {
    /// The division being rolled over.
    pub division: String,
    /// Text to show the operator before they re-enter a credential.
    pub prompt: String,
    /// Label of the current session, e.g. `2023/2024`.
    pub session_label: String,
    /// Name of the term being closed, if one is set.
    pub term_name: Option<String>,
    /// Whether closing this term promotes students.
    pub is_promotion_term: bool,
    /// The workflow phase after the request.
    pub phase: String,
}

/// Identity confirmation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmIdentityRequest {
    /// An active administrator's password.
    pub credential: String,
}

/// A workflow after a gate transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowResponse {
    /// The division.
    pub division: String,
    /// The workflow phase.
    pub phase: String,
    /// Whether per-student audit logging is suppressed.
    pub prevent_logging: bool,
    /// The most recent stage that finished, if any.
    pub last_completed_stage: Option<String>,
    /// A success message.
    pub message: String,
}

/// Read-only view of an operator's rollover for a division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowStatusResponse {
    /// The division.
    pub division: String,
    /// The workflow phase; `Idle` if the operator never started one.
    pub phase: String,
    /// Whether per-student audit logging is suppressed.
    pub prevent_logging: bool,
    /// The most recent stage that finished, if any.
    pub last_completed_stage: Option<String>,
    /// The operator holding the division's rollover lock, if any.
    pub lock_holder: Option<i64>,
    /// Whether the requesting operator holds the lock.
    pub holds_lock: bool,
}

/// Result of a successful precheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrecheckResponse {
    /// The division.
    pub division: String,
    /// Label of the session being closed.
    pub session_label: String,
    /// Name of the term being closed, if one is set.
    pub term_name: Option<String>,
    /// Whether promotion mappings were checked.
    pub is_promotion_term: bool,
    /// A success message.
    pub message: String,
}

/// A student a batch stage did not process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedStudentInfo {
    /// The student.
    pub student_id: i64,
    /// Why the student was skipped.
    pub reason: String,
}

/// Outcome of a per-student batch stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStageResponse {
    /// The division.
    pub division: String,
    /// The stage that ran.
    pub stage: String,
    /// Students changed or archived.
    pub processed: usize,
    /// Students left unchanged, with reasons.
    pub skipped: Vec<SkippedStudentInfo>,
    /// All students the stage selected.
    pub total: usize,
    /// A summary message.
    pub message: String,
}

impl BatchStageResponse {
    /// Builds a response from a stage's report.
    #[must_use]
    pub fn from_report(division: &str, stage: RolloverStage, report: &BatchReport) -> Self {
        let skipped: Vec<SkippedStudentInfo> = report
            .skipped
            .iter()
            .map(|s| SkippedStudentInfo {
                student_id: s.student_id,
                reason: s.reason.to_string(),
            })
            .collect();
        let message: String = format!(
            "{stage}: {} of {} students processed",
            report.processed,
            report.total()
        );
        Self {
            division: division.to_string(),
            stage: stage.to_string(),
            processed: report.processed,
            skipped,
            total: report.total(),
            message,
        }
    }
}

/// Result of the term advance stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvanceTermResponse {
    /// The division.
    pub division: String,
    /// Whether the term or session pointer moved.
    pub advanced: bool,
    /// Label of the session now current.
    pub session_label: String,
    /// Name of the term now current, if one is set.
    pub term_name: Option<String>,
    /// The workflow phase after cleanup.
    pub phase: String,
    /// A summary message.
    pub message: String,
}

/// One promotion mapping to save.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionEntry {
    /// Source class.
    pub class_id: i64,
    /// Source section.
    pub section_id: i64,
    /// Destination class; required unless graduating.
    pub target_class_id: Option<i64>,
    /// Destination section; required unless graduating.
    pub target_section_id: Option<i64>,
    /// Whether students in the source placement graduate.
    #[serde(default)]
    pub is_graduation_class: bool,
}

/// Request to save promotion mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPromotionClassRequest {
    /// The mappings to save.
    pub entries: Vec<PromotionEntry>,
}

/// A promotion mapping that was not saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedPromotionEntry {
    /// Source class of the entry.
    pub class_id: i64,
    /// Source section of the entry.
    pub section_id: i64,
    /// Why it was rejected.
    pub reason: String,
}

/// Result of saving promotion mappings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPromotionClassResponse {
    /// Entries saved.
    pub saved: usize,
    /// Entries submitted.
    pub total: usize,
    /// Entries rejected, with reasons.
    pub rejected: Vec<RejectedPromotionEntry>,
    /// A summary message.
    pub message: String,
}
