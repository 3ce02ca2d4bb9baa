// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rollover workflow handlers.
//!
//! Each handler is one operator-driven step of a term rollover. The gate
//! handlers (`request_confirmation`, `confirm_identity`, `admit_workflow`)
//! move the operator's persisted workflow towards `Admitted`; every stage
//! handler refuses to run until it gets there. Stages re-read the academic
//! setting on entry and persist each student on its own, so a failure
//! partway through a batch leaves earlier students committed.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use term_rollover::{Command, TransitionResult, WorkflowState, apply, require_admitted};
use term_rollover_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use term_rollover_domain::{
    AcademicSession, AcademicSetting, BatchReport, Division, DomainError, FeePosition, Placement,
    PromotionMap, RolloverStage, SchoolClass, SkipReason, Student, StudentAcademicRecord,
    StudentStatus, StudentTransition, Term, TermAdvancePlan, apply_student_transition,
    check_rollover_readiness, plan_student_transition, plan_term_advance, validate_division,
};
use term_rollover_persistence::{OperatorData, PersistenceError, SqlitePersistence};

use crate::auth::{AuthenticatedActor, AuthenticationService};
use crate::error::{
    ApiError, translate_core_error, translate_domain_error, translate_persistence_error,
};
use crate::request_response::{
    AdvanceTermResponse, BatchStageResponse, ConfirmIdentityRequest, ConfirmationPromptResponse,
    PrecheckResponse, WorkflowResponse, WorkflowStatusResponse,
};

/// Who is running a stage, and whether per-student events are written.
struct StageContext {
    division: Division,
    actor: Actor,
    cause: Cause,
    prevent_logging: bool,
}

impl StageContext {
    /// Writes a per-student audit event unless logging is suppressed.
    ///
    /// A failed write is logged and otherwise ignored; the student change it
    /// describes has already been committed.
    fn record_student_event(
        &self,
        persistence: &mut SqlitePersistence,
        stage: RolloverStage,
        student_id: i64,
        before: String,
        after: String,
    ) {
        if self.prevent_logging {
            return;
        }
        let event: AuditEvent = AuditEvent::new(
            self.actor.clone(),
            self.cause.clone(),
            Action::new(
                stage.as_str().to_string(),
                Some(format!("student {student_id}")),
            ),
            StateSnapshot::new(before),
            StateSnapshot::new(after),
            self.division.clone(),
        );
        if let Err(e) = persistence.persist_audit_event(&event) {
            warn!(student_id, stage = %stage, error = %e, "Failed to record student audit event");
        }
    }
}

/// The snapshot an archive stage writes into each student's record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Snapshot {
    Placement,
    Attendance,
    FeePosition,
}

impl Snapshot {
    const fn stage(self) -> RolloverStage {
        match self {
            Self::Placement => RolloverStage::ArchivePlacement,
            Self::Attendance => RolloverStage::ArchiveAttendance,
            Self::FeePosition => RolloverStage::ArchiveFeePosition,
        }
    }

    /// Fee positions are kept for disabled students too.
    const fn statuses(self) -> &'static [StudentStatus] {
        match self {
            Self::Placement | Self::Attendance => &[StudentStatus::Active],
            Self::FeePosition => &[StudentStatus::Active, StudentStatus::Disabled],
        }
    }
}

/// Parses and validates a division code from a request.
///
/// # Errors
///
/// Returns `InvalidInput` if the code is empty or malformed.
pub fn parse_division(code: &str) -> Result<Division, ApiError> {
    let division: Division = Division::new(code);
    validate_division(&division).map_err(translate_domain_error)?;
    Ok(division)
}

fn load_workflow(
    persistence: &mut SqlitePersistence,
    division: &Division,
    operator: &OperatorData,
) -> Result<WorkflowState, ApiError> {
    let state: Option<WorkflowState> = persistence
        .get_workflow(division, operator.operator_id)
        .map_err(translate_persistence_error)?;
    Ok(state.unwrap_or_else(|| WorkflowState::new(division.clone(), operator.operator_id)))
}

fn load_admitted_workflow(
    persistence: &mut SqlitePersistence,
    division: &Division,
    operator: &OperatorData,
) -> Result<WorkflowState, ApiError> {
    let state: WorkflowState = load_workflow(persistence, division, operator)?;
    require_admitted(&state).map_err(translate_core_error)?;
    Ok(state)
}

fn load_setting(
    persistence: &mut SqlitePersistence,
    division: &Division,
) -> Result<AcademicSetting, ApiError> {
    persistence
        .get_academic_setting(division)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::Configuration {
            message: format!("Academic setting not found for division '{division}'"),
        })
}

fn require_current_term(setting: &AcademicSetting) -> Result<Term, ApiError> {
    setting.term.clone().ok_or_else(|| {
        translate_domain_error(DomainError::CurrentTermNotSet {
            division: setting.division.code().to_string(),
        })
    })
}

/// Applies a command to a workflow and persists the result with its audit event.
fn execute(
    persistence: &mut SqlitePersistence,
    state: &WorkflowState,
    command: Command,
    actor: Actor,
    cause: Cause,
) -> Result<WorkflowState, ApiError> {
    let result: TransitionResult =
        apply(state, command, actor, cause).map_err(translate_core_error)?;
    let event_id: i64 = persistence
        .persist_transition(&result)
        .map_err(translate_persistence_error)?;

    info!(
        division = %result.new_state.division,
        operator_id = result.new_state.operator_id,
        command = command.name(),
        phase = %result.new_state.phase,
        event_id,
        "Rollover workflow updated"
    );

    Ok(result.new_state)
}

fn workflow_response(state: &WorkflowState, message: String) -> WorkflowResponse {
    WorkflowResponse {
        division: state.division.code().to_string(),
        phase: state.phase.to_string(),
        prevent_logging: state.prevent_logging,
        last_completed_stage: state.last_completed_stage.map(|s| s.as_str().to_string()),
        message,
    }
}

/// Starts (or restarts) a rollover by showing the confirmation prompt.
///
/// Resets the operator's workflow to `Idle`, discarding any earlier identity
/// confirmation.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division to roll over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The division has no academic setting
/// - The operator's rollover for this division is already admitted
/// - The database operation fails
pub fn request_confirmation(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<ConfirmationPromptResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let setting: AcademicSetting = load_setting(persistence, &division)?;
    let state: WorkflowState = load_workflow(persistence, &division, operator)?;

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    let new_state: WorkflowState =
        execute(persistence, &state, Command::RequestConfirmation, actor, cause)?;

    let session_label: String = setting.session.label();
    let term_name: Option<String> = setting.term.as_ref().map(|t| t.name.clone());
    let is_promotion_term: bool = setting.term.as_ref().is_some_and(|t| t.is_promotion_term);
    let closing: String = term_name
        .as_deref()
        .map_or_else(|| String::from("the current term"), |name| format!("the {name}"));
    let mut prompt: String = format!(
        "You are about to close {closing} of the {session_label} session for division '{division}'."
    );
    if is_promotion_term {
        prompt.push_str(" Students will be promoted or graduated.");
    }
    prompt.push_str(" Enter an administrator password to continue.");

    Ok(ConfirmationPromptResponse {
        division: division.code().to_string(),
        prompt,
        session_label,
        term_name,
        is_promotion_term,
        phase: new_state.phase.to_string(),
    })
}

/// Confirms the rollover with an administrator's credential.
///
/// The credential is checked against every active admin. On failure the
/// workflow is left unchanged.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `request` - The confirmation request carrying the credential
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The credential matches no active administrator
/// - The workflow cannot move to `Verified` from its current phase
/// - The database operation fails
pub fn confirm_identity(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    request: &ConfirmIdentityRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<WorkflowResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_workflow(persistence, &division, operator)?;

    let confirmed_by: OperatorData =
        AuthenticationService::confirm_admin_credential(persistence, &request.credential)?;
    debug!(
        division = %division,
        confirmed_by = confirmed_by.operator_id,
        "Rollover credential accepted"
    );

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    let new_state: WorkflowState =
        execute(persistence, &state, Command::ConfirmIdentity, actor, cause)?;

    Ok(workflow_response(
        &new_state,
        String::from("Identity confirmed"),
    ))
}

/// Admits a verified rollover so its stages may run.
///
/// Takes the division's rollover lock. The lock is held until the term
/// advance finishes or the workflow is abandoned.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The workflow is not `Verified`
/// - Another operator holds the division's rollover lock
/// - The database operation fails
pub fn admit_workflow(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<WorkflowResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_workflow(persistence, &division, operator)?;

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    let result: TransitionResult =
        apply(&state, Command::AdmitWorkflow, actor, cause).map_err(translate_core_error)?;

    let acquired: bool = persistence
        .try_acquire_rollover_lock(&division, operator.operator_id)
        .map_err(translate_persistence_error)?;
    if !acquired {
        let holder: Option<i64> = persistence
            .get_lock_holder(&division)
            .map_err(translate_persistence_error)?;
        return Err(ApiError::RolloverLocked {
            division: division.code().to_string(),
            holder: holder.unwrap_or_default(),
        });
    }

    if let Err(e) = persistence.persist_transition(&result) {
        if let Err(release_err) = persistence.release_rollover_lock(&division, operator.operator_id)
        {
            warn!(division = %division, error = %release_err, "Failed to release rollover lock");
        }
        return Err(translate_persistence_error(e));
    }

    info!(
        division = %division,
        operator_id = operator.operator_id,
        "Rollover admitted"
    );

    Ok(workflow_response(
        &result.new_state,
        format!("Rollover admitted for division '{division}'"),
    ))
}

/// Checks that the division is ready to roll over.
///
/// Does not change any student or calendar data. On success the workflow
/// records the precheck and suppresses per-student audit events for the
/// batch stages that follow.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The workflow is not admitted
/// - The next resumption date is not set
/// - The current term is a promotion term and a class or occupied
///   placement has no promotion mapping
/// - The database operation fails
pub fn run_precheck(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<PrecheckResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_admitted_workflow(persistence, &division, operator)?;
    let setting: AcademicSetting = load_setting(persistence, &division)?;

    let classes: Vec<SchoolClass> = persistence
        .list_classes(&division)
        .map_err(translate_persistence_error)?;
    let maps: Vec<PromotionMap> = persistence
        .list_promotion_maps(&division)
        .map_err(translate_persistence_error)?;
    let active_students: Vec<Student> = persistence
        .list_students_with_status(&division, &[StudentStatus::Active])
        .map_err(translate_persistence_error)?;

    check_rollover_readiness(&setting, &classes, &maps, &active_students)
        .map_err(translate_domain_error)?;

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    execute(
        persistence,
        &state,
        Command::CompleteStage {
            stage: RolloverStage::Precheck,
        },
        actor,
        cause,
    )?;

    let is_promotion_term: bool = setting.term.as_ref().is_some_and(|t| t.is_promotion_term);
    Ok(PrecheckResponse {
        division: division.code().to_string(),
        session_label: setting.session.label(),
        term_name: setting.term.map(|t| t.name),
        is_promotion_term,
        message: String::from("Division is ready to roll over"),
    })
}

/// Archives each active student's class placement for the closing term.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the workflow is not admitted, the setting has no
/// current term, or the students cannot be listed. Per-student failures are
/// reported in the response instead.
pub fn archive_academic_placement(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<BatchStageResponse, ApiError> {
    run_archive_stage(
        persistence,
        division_code,
        Snapshot::Placement,
        authenticated_actor,
        operator,
        cause,
    )
}

/// Archives the placement each active student's attendance was taken under.
///
/// # Errors
///
/// Returns an error if the workflow is not admitted, the setting has no
/// current term, or the students cannot be listed. Per-student failures are
/// reported in the response instead.
pub fn archive_attendance(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<BatchStageResponse, ApiError> {
    run_archive_stage(
        persistence,
        division_code,
        Snapshot::Attendance,
        authenticated_actor,
        operator,
        cause,
    )
}

/// Archives the fee position of every active or disabled student.
///
/// # Errors
///
/// Returns an error if the workflow is not admitted, the setting has no
/// current term, or the students cannot be listed. Per-student failures are
/// reported in the response instead.
pub fn archive_fee_position(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<BatchStageResponse, ApiError> {
    run_archive_stage(
        persistence,
        division_code,
        Snapshot::FeePosition,
        authenticated_actor,
        operator,
        cause,
    )
}

fn run_archive_stage(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    snapshot: Snapshot,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<BatchStageResponse, ApiError> {
    let stage: RolloverStage = snapshot.stage();
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_admitted_workflow(persistence, &division, operator)?;
    let setting: AcademicSetting = load_setting(persistence, &division)?;
    let term: Term = require_current_term(&setting)?;

    let session_key: String = setting.session.label();
    let term_key: String = term.name;

    let students: Vec<Student> = persistence
        .list_students_with_status(&division, snapshot.statuses())
        .map_err(translate_persistence_error)?;

    let context: StageContext = StageContext {
        division: division.clone(),
        actor: authenticated_actor.to_audit_actor(operator),
        cause,
        prevent_logging: state.prevent_logging,
    };

    let mut report: BatchReport = BatchReport::new();
    for student in &students {
        match archive_student(persistence, student, snapshot, &session_key, &term_key) {
            Ok(None) => {
                report.record_processed();
                context.record_student_event(
                    persistence,
                    stage,
                    student.student_id,
                    format!("student={}", student.student_id),
                    format!(
                        "student={},session={session_key},term={term_key}",
                        student.student_id
                    ),
                );
            }
            Ok(Some(reason)) => report.record_skipped(student.student_id, reason),
            Err(e) => {
                warn!(
                    student_id = student.student_id,
                    stage = %stage,
                    error = %e,
                    "Failed to archive student"
                );
                report.record_skipped(student.student_id, SkipReason::SaveFailed(e.to_string()));
            }
        }
    }

    finish_batch_stage(persistence, &state, stage, context, &report)
}

/// Writes one snapshot into a student's academic record.
///
/// Returns the skip reason if the student has nothing to snapshot.
fn archive_student(
    persistence: &mut SqlitePersistence,
    student: &Student,
    snapshot: Snapshot,
    session_key: &str,
    term_key: &str,
) -> Result<Option<SkipReason>, PersistenceError> {
    let placement: Option<Placement> = student.placement();
    if snapshot != Snapshot::FeePosition && placement.is_none() {
        return Ok(Some(SkipReason::MissingPlacement));
    }

    let mut record: StudentAcademicRecord = persistence
        .get_academic_record(student.student_id)?
        .unwrap_or_else(|| StudentAcademicRecord::new(student.student_id));

    match (snapshot, placement) {
        (Snapshot::Placement, Some(placement)) => {
            record.record_placement(session_key, term_key, placement);
        }
        (Snapshot::Attendance, Some(placement)) => {
            record.record_attendance(session_key, term_key, placement);
        }
        (Snapshot::FeePosition, _) => {
            let position: FeePosition = persistence.get_fee_position(student.student_id)?;
            record.record_fee_position(session_key, term_key, position);
        }
        (_, None) => return Ok(Some(SkipReason::MissingPlacement)),
    }

    persistence.save_academic_record(&record)?;
    Ok(None)
}

/// Records a batch stage as completed and builds its response.
fn finish_batch_stage(
    persistence: &mut SqlitePersistence,
    state: &WorkflowState,
    stage: RolloverStage,
    context: StageContext,
    report: &BatchReport,
) -> Result<BatchStageResponse, ApiError> {
    info!(
        division = %context.division,
        stage = %stage,
        processed = report.processed,
        skipped = report.skipped.len(),
        "Rollover stage finished"
    );
    if report.has_failures() {
        warn!(
            division = %context.division,
            stage = %stage,
            "Rollover stage finished with save failures"
        );
    }

    execute(
        persistence,
        state,
        Command::CompleteStage { stage },
        context.actor,
        context.cause,
    )?;

    Ok(BatchStageResponse::from_report(
        context.division.code(),
        stage,
        report,
    ))
}

/// Promotes or graduates every active student of a promotion term.
///
/// Does nothing to students unless the current term is a promotion term.
/// Each student's move is saved together with a mark on their academic
/// record for the current session and term, so a student already moved in
/// this term is skipped. Running the stage again after a partial failure
/// only moves the students that were left behind.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the workflow is not admitted or the students or
/// promotion maps cannot be read. Per-student failures are reported in the
/// response instead.
pub fn transition_students(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<BatchStageResponse, ApiError> {
    let stage: RolloverStage = RolloverStage::TransitionStudents;
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_admitted_workflow(persistence, &division, operator)?;
    let setting: AcademicSetting = load_setting(persistence, &division)?;

    let context: StageContext = StageContext {
        division: division.clone(),
        actor: authenticated_actor.to_audit_actor(operator),
        cause,
        prevent_logging: state.prevent_logging,
    };

    let mut report: BatchReport = BatchReport::new();
    let Some(term) = setting.term.as_ref().filter(|t| t.is_promotion_term) else {
        debug!(division = %division, "Not a promotion term; no students to transition");
        return finish_batch_stage(persistence, &state, stage, context, &report);
    };
    let session_key: String = setting.session.label();
    let term_key: &str = &term.name;

    let maps: BTreeMap<Placement, PromotionMap> = persistence
        .list_promotion_maps(&division)
        .map_err(translate_persistence_error)?
        .into_iter()
        .map(|m| (m.source, m))
        .collect();
    let students: Vec<Student> = persistence
        .list_students_with_status(&division, &[StudentStatus::Active])
        .map_err(translate_persistence_error)?;

    for student in &students {
        match transition_student(persistence, student, &maps, &session_key, term_key) {
            Ok(Ok(updated)) => {
                report.record_processed();
                context.record_student_event(
                    persistence,
                    stage,
                    student.student_id,
                    describe_student(student),
                    describe_student(&updated),
                );
            }
            Ok(Err(reason)) => report.record_skipped(student.student_id, reason),
            Err(e) => {
                warn!(student_id = student.student_id, error = %e, "Failed to transition student");
                report.record_skipped(student.student_id, SkipReason::SaveFailed(e.to_string()));
            }
        }
    }

    finish_batch_stage(persistence, &state, stage, context, &report)
}

/// Moves one student by the promotion map for their placement.
///
/// Returns the moved student, or the reason they were left alone.
fn transition_student(
    persistence: &mut SqlitePersistence,
    student: &Student,
    maps: &BTreeMap<Placement, PromotionMap>,
    session_key: &str,
    term_key: &str,
) -> Result<Result<Student, SkipReason>, PersistenceError> {
    let mut record: StudentAcademicRecord = persistence
        .get_academic_record(student.student_id)?
        .unwrap_or_else(|| StudentAcademicRecord::new(student.student_id));
    if record.has_transitioned(session_key, term_key) {
        return Ok(Err(SkipReason::AlreadyTransitioned));
    }

    let map: Option<&PromotionMap> = student.placement().and_then(|p| maps.get(&p));
    let transition: StudentTransition = plan_student_transition(student, map);
    let (Some(updated), Some(from)) =
        (apply_student_transition(student, &transition), student.placement())
    else {
        return Ok(Err(match transition {
            StudentTransition::Skip(reason) => reason,
            _ => SkipReason::MissingPlacement,
        }));
    };

    record.record_transition(session_key, term_key, from);
    persistence.transition_student(&updated, &record)?;
    Ok(Ok(updated))
}

fn describe_student(student: &Student) -> String {
    let placement: String = student.placement().map_or_else(
        || String::from("none"),
        |p| format!("{}/{}", p.class_id, p.section_id),
    );
    format!(
        "student={},status={},placement={placement}",
        student.student_id,
        student.status.as_str()
    )
}

/// Moves the division's term and session pointer, then closes the workflow.
///
/// A promotion term wraps to the first term of the next session, creating
/// that session if the division does not have it yet. Any other term moves
/// to the following term. With no current term or no following term the
/// pointer stays put.
///
/// The pointer move, the completed workflow and the lock release are
/// written in one transaction. If the pointer cannot be planned or moved,
/// the workflow is still completed and the lock released, and the pointer
/// error is returned.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division being rolled over
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if the workflow is not admitted, the setting cannot be
/// read, or the pointer update fails.
pub fn advance_term(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<AdvanceTermResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_admitted_workflow(persistence, &division, operator)?;

    let plan: Result<Option<TermAdvancePlan>, ApiError> = load_setting(persistence, &division)
        .and_then(|setting| plan_term_pointer(persistence, &setting));

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    let completion: TransitionResult = apply(
        &state,
        Command::CompleteStage {
            stage: RolloverStage::AdvanceTerm,
        },
        actor,
        cause,
    )
    .map_err(translate_core_error)?;

    let outcome: Result<bool, ApiError> = plan.and_then(|plan| {
        persistence
            .complete_rollover(&completion, plan.as_ref())
            .map(|_| plan.is_some())
            .map_err(translate_persistence_error)
    });
    if let Err(e) = &outcome {
        warn!(division = %division, error = %e, "Term pointer not moved; closing rollover");
        persistence
            .complete_rollover(&completion, None)
            .map_err(translate_persistence_error)?;
    }
    info!(
        division = %division,
        operator_id = operator.operator_id,
        phase = %completion.new_state.phase,
        "Rollover completed; lock released"
    );

    let advanced: bool = outcome?;
    let current: AcademicSetting = load_setting(persistence, &division)?;
    let session_label: String = current.session.label();
    let term_name: Option<String> = current.term.map(|t| t.name);
    let message: String = if advanced {
        format!(
            "Division '{division}' moved to {} of {session_label}",
            term_name.as_deref().unwrap_or("no term")
        )
    } else {
        format!("Division '{division}' has no term to move to; pointer unchanged")
    };

    Ok(AdvanceTermResponse {
        division: division.code().to_string(),
        advanced,
        session_label,
        term_name,
        phase: completion.new_state.phase.to_string(),
        message,
    })
}

/// Works out where the pointer goes next. `None` leaves it where it is.
fn plan_term_pointer(
    persistence: &mut SqlitePersistence,
    setting: &AcademicSetting,
) -> Result<Option<TermAdvancePlan>, ApiError> {
    let terms: Vec<Term> = persistence.list_terms().map_err(translate_persistence_error)?;

    let is_promotion_term: bool = setting.term.as_ref().is_some_and(|t| t.is_promotion_term);
    let next_start: Option<u16> = setting
        .session
        .start_year
        .checked_add(1)
        .filter(|_| is_promotion_term);
    let existing_next_session: Option<AcademicSession> = match next_start {
        Some(start_year) => persistence
            .find_academic_session(&setting.division, start_year)
            .map_err(translate_persistence_error)?,
        None => None,
    };

    let plan: Option<TermAdvancePlan> = plan_term_advance(setting, &terms, existing_next_session);
    match &plan {
        Some(plan) => debug!(
            division = %setting.division,
            term = %plan.next_term.name,
            "Planned term advance"
        ),
        None => info!(division = %setting.division, "No term to advance to"),
    }
    Ok(plan)
}

/// Abandons the operator's rollover for a division.
///
/// The workflow returns to `Idle` and the operator's lock on the division is
/// released. Stages that already ran are not undone; the workflow's last
/// completed stage shows where it stopped.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn abandon_workflow(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<WorkflowResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_workflow(persistence, &division, operator)?;
    let stopped_after: Option<RolloverStage> = state.last_completed_stage;

    let actor: Actor = authenticated_actor.to_audit_actor(operator);
    let new_state: WorkflowState = execute(persistence, &state, Command::Abandon, actor, cause)?;

    let released: bool = persistence
        .release_rollover_lock(&division, operator.operator_id)
        .map_err(translate_persistence_error)?;
    debug!(division = %division, released, "Rollover lock released");

    let message: String = stopped_after.map_or_else(
        || String::from("Rollover abandoned"),
        |stage| format!("Rollover abandoned after {stage}"),
    );
    Ok(workflow_response(&new_state, message))
}

/// Reports the operator's workflow for a division and who holds its lock.
///
/// # Errors
///
/// Returns an error if the division code is invalid or the database
/// operation fails.
pub fn workflow_status(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    operator: &OperatorData,
) -> Result<WorkflowStatusResponse, ApiError> {
    let division: Division = parse_division(division_code)?;
    let state: WorkflowState = load_workflow(persistence, &division, operator)?;
    let lock_holder: Option<i64> = persistence
        .get_lock_holder(&division)
        .map_err(translate_persistence_error)?;

    Ok(WorkflowStatusResponse {
        division: division.code().to_string(),
        phase: state.phase.to_string(),
        prevent_logging: state.prevent_logging,
        last_completed_stage: state.last_completed_stage.map(|s| s.as_str().to_string()),
        lock_holder,
        holds_lock: lock_holder == Some(operator.operator_id),
    })
}
