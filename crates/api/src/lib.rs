// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! API boundary for the term rollover system.
//!
//! Handlers here authenticate and authorize the caller, load the
//! operator's rollover workflow, run the domain rules, and persist both the
//! resulting data and the audit trail. Domain, core and persistence errors
//! are translated into [`ApiError`] before they leave this crate.

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
#![allow(clippy::multiple_crate_versions)]

mod auth;
mod error;
mod handlers;
mod promotion;
mod request_response;
mod rollover;

#[cfg(test)]
mod tests;

pub use auth::{AuthenticatedActor, AuthenticationService, AuthorizationService, Role};
pub use error::{
    ApiError, AuthError, translate_core_error, translate_domain_error, translate_persistence_error,
};
pub use handlers::{login, logout};
pub use promotion::set_promotion_class;
pub use request_response::{
    AdvanceTermResponse, BatchStageResponse, ConfirmIdentityRequest, ConfirmationPromptResponse,
    LoginRequest, LoginResponse, PrecheckResponse, PromotionEntry, RejectedPromotionEntry,
    SetPromotionClassRequest, SetPromotionClassResponse, SkippedStudentInfo, WorkflowResponse,
    WorkflowStatusResponse,
};
pub use rollover::{
    abandon_workflow, admit_workflow, advance_term, archive_academic_placement,
    archive_attendance, archive_fee_position, confirm_identity, parse_division,
    request_confirmation, run_precheck, transition_students, workflow_status,
};
