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

mod batch;
mod error;
mod rollover;
mod types;
mod validation;
mod workflow;

#[cfg(test)]
mod tests;

pub use batch::{BatchReport, SkipReason, SkippedRecord};
pub use error::DomainError;
pub use rollover::{
    NextSession, StudentTransition, TermAdvancePlan, apply_student_transition,
    check_rollover_readiness, first_term, following_term, plan_student_transition,
    plan_term_advance,
};
pub use types::{
    AcademicSession, AcademicSetting, Division, FeePosition, FeeSnapshot, Placement,
    PromotionMap, PromotionOutcome, SchoolClass, Section, SessionStatus, Student,
    StudentAcademicRecord, StudentStatus, Term, TermKeyed,
};
pub use validation::{validate_division, validate_session, validate_term, validate_term_unique};
pub use workflow::{RolloverPhase, RolloverStage};
