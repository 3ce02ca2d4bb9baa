// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Promotion map maintenance.

use tracing::{info, warn};

use term_rollover_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use term_rollover_domain::{Division, Placement, PromotionMap, SchoolClass};
use term_rollover_persistence::{OperatorData, SqlitePersistence};

use crate::auth::{AuthenticatedActor, AuthorizationService};
use crate::error::{ApiError, translate_persistence_error};
use crate::request_response::{
    PromotionEntry, RejectedPromotionEntry, SetPromotionClassRequest, SetPromotionClassResponse,
};
use crate::rollover::parse_division;

/// Saves promotion mappings for a division.
///
/// Each entry is upserted by its source `(class, section)`. An entry whose
/// classes or sections do not exist, or that neither graduates nor names a
/// full target, is reported and skipped; the remaining entries are still
/// saved. Not gated by the rollover workflow.
///
/// # Arguments
///
/// * `persistence` - The persistence layer
/// * `division_code` - The division the source classes belong to
/// * `request` - The mappings to save
/// * `authenticated_actor` - The authenticated actor performing this action
/// * `operator` - The operator data for the authenticated actor
/// * `cause` - The cause or reason for this action
///
/// # Errors
///
/// Returns an error if:
/// - The actor is not an Admin
/// - The request has no entries
/// - A lookup fails
pub fn set_promotion_class(
    persistence: &mut SqlitePersistence,
    division_code: &str,
    request: &SetPromotionClassRequest,
    authenticated_actor: &AuthenticatedActor,
    operator: &OperatorData,
    cause: Cause,
) -> Result<SetPromotionClassResponse, ApiError> {
    AuthorizationService::authorize_set_promotion_class(authenticated_actor)?;
    let division: Division = parse_division(division_code)?;

    if request.entries.is_empty() {
        return Err(ApiError::InvalidInput {
            field: String::from("entries"),
            message: String::from("At least one promotion entry is required"),
        });
    }

    let mut saved: usize = 0;
    let mut rejected: Vec<RejectedPromotionEntry> = Vec::new();

    for entry in &request.entries {
        let outcome: Result<(), String> = match check_entry(persistence, &division, entry)? {
            Some(reason) => Err(reason),
            None => persistence
                .upsert_promotion_map(&to_promotion_map(entry))
                .map_err(|e| {
                    warn!(
                        class_id = entry.class_id,
                        section_id = entry.section_id,
                        error = %e,
                        "Failed to save promotion map"
                    );
                    format!("save failed: {e}")
                }),
        };
        match outcome {
            Ok(()) => saved += 1,
            Err(reason) => rejected.push(RejectedPromotionEntry {
                class_id: entry.class_id,
                section_id: entry.section_id,
                reason,
            }),
        }
    }

    let total: usize = request.entries.len();
    let message: String = format!("Saved {saved} of {total} promotion mappings");

    let event: AuditEvent = AuditEvent::new(
        authenticated_actor.to_audit_actor(operator),
        cause,
        Action::new(String::from("SetPromotionClass"), Some(message.clone())),
        StateSnapshot::new(format!("division={division}")),
        StateSnapshot::new(format!(
            "division={division},saved={saved},rejected={}",
            rejected.len()
        )),
        division.clone(),
    );
    persistence
        .persist_audit_event(&event)
        .map_err(translate_persistence_error)?;

    info!(division = %division, saved, total, "Promotion mappings updated");

    Ok(SetPromotionClassResponse {
        saved,
        total,
        rejected,
        message,
    })
}

/// Returns why an entry cannot be saved, or `None` if it can.
fn check_entry(
    persistence: &mut SqlitePersistence,
    division: &Division,
    entry: &PromotionEntry,
) -> Result<Option<String>, ApiError> {
    let source: Option<SchoolClass> = persistence
        .get_class(entry.class_id)
        .map_err(translate_persistence_error)?;
    if source.is_none_or(|c| c.division != *division) {
        return Ok(Some(format!(
            "class {} does not exist in division '{division}'",
            entry.class_id
        )));
    }
    if !persistence
        .section_exists(entry.section_id)
        .map_err(translate_persistence_error)?
    {
        return Ok(Some(format!("section {} does not exist", entry.section_id)));
    }

    if entry.is_graduation_class {
        return Ok(None);
    }

    let (Some(target_class_id), Some(target_section_id)) =
        (entry.target_class_id, entry.target_section_id)
    else {
        return Ok(Some(String::from(
            "a target class and section are required unless the class graduates",
        )));
    };
    if persistence
        .get_class(target_class_id)
        .map_err(translate_persistence_error)?
        .is_none()
    {
        return Ok(Some(format!("target class {target_class_id} does not exist")));
    }
    if !persistence
        .section_exists(target_section_id)
        .map_err(translate_persistence_error)?
    {
        return Ok(Some(format!(
            "target section {target_section_id} does not exist"
        )));
    }

    Ok(None)
}

const fn to_promotion_map(entry: &PromotionEntry) -> PromotionMap {
    PromotionMap {
        source: Placement::new(entry.class_id, entry.section_id),
        target_class_id: entry.target_class_id,
        target_section_id: entry.target_section_id,
        is_graduation_class: entry.is_graduation_class,
    }
}
