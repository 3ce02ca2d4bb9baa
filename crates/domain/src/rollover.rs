// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Rollover rules.
//!
//! Everything here is a pure function of already-loaded data. Loading and
//! persisting is the caller's job; these functions decide what should change.

use std::collections::BTreeSet;

use crate::batch::SkipReason;
use crate::error::DomainError;
use crate::types::{
    AcademicSession, AcademicSetting, Placement, PromotionMap, PromotionOutcome, SchoolClass,
    Student, Term,
};

/// Checks that a division's setting and promotion maps allow a rollover.
///
/// Fails if the next resumption date is unset. When the current term is a
/// promotion term, every class must have at least one mapping and every
/// placement holding an active student must have its own mapping.
///
/// # Arguments
///
/// * `setting` - The division's academic setting, freshly read
/// * `classes` - Every class of the division, in reporting order
/// * `maps` - Every promotion mapping whose source class is in the division
/// * `active_students` - Active students of the division
///
/// # Errors
///
/// Returns `ResumptionDateNotSet` or `IncompletePromotionMap` naming the
/// first offending class.
pub fn check_rollover_readiness(
    setting: &AcademicSetting,
    classes: &[SchoolClass],
    maps: &[PromotionMap],
    active_students: &[Student],
) -> Result<(), DomainError> {
    if setting.next_resumption_date.is_none() {
        return Err(DomainError::ResumptionDateNotSet {
            division: setting.division.code().to_string(),
        });
    }

    let is_promotion_term: bool = setting.term.as_ref().is_some_and(|t| t.is_promotion_term);
    if !is_promotion_term {
        return Ok(());
    }

    let mapped_classes: BTreeSet<i64> = maps.iter().map(|m| m.source.class_id).collect();
    if let Some(class) = classes
        .iter()
        .find(|c| !mapped_classes.contains(&c.class_id))
    {
        return Err(DomainError::IncompletePromotionMap {
            class_name: class.name.clone(),
        });
    }

    let mapped_placements: BTreeSet<Placement> = maps.iter().map(|m| m.source).collect();
    for placement in active_students.iter().filter_map(Student::placement) {
        if !mapped_placements.contains(&placement) {
            let class_name: String = classes
                .iter()
                .find(|c| c.class_id == placement.class_id)
                .map_or_else(|| format!("class {}", placement.class_id), |c| c.name.clone());
            return Err(DomainError::IncompletePromotionMap { class_name });
        }
    }

    Ok(())
}

/// What the transition stage does to one student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StudentTransition {
    /// Move into a new placement.
    Promote(Placement),
    /// Graduate and clear the placement.
    Graduate,
    /// Leave unchanged.
    Skip(SkipReason),
}

/// Decides the transition for one active student.
///
/// # Arguments
///
/// * `student` - The student
/// * `map` - The mapping for the student's placement, if one exists
#[must_use]
pub fn plan_student_transition(student: &Student, map: Option<&PromotionMap>) -> StudentTransition {
    if student.placement().is_none() {
        return StudentTransition::Skip(SkipReason::MissingPlacement);
    }
    let Some(map) = map else {
        return StudentTransition::Skip(SkipReason::NoPromotionMapping);
    };
    match map.outcome() {
        Ok(PromotionOutcome::Graduate) => StudentTransition::Graduate,
        Ok(PromotionOutcome::Promote(target)) => StudentTransition::Promote(target),
        Err(_) => StudentTransition::Skip(SkipReason::IncompletePromotionTarget),
    }
}

/// Applies a planned transition to a student, returning the updated student.
///
/// Returns `None` for `Skip`.
#[must_use]
pub fn apply_student_transition(
    student: &Student,
    transition: &StudentTransition,
) -> Option<Student> {
    let mut updated: Student = student.clone();
    match transition {
        StudentTransition::Promote(target) => {
            updated.class_id = Some(target.class_id);
            updated.section_id = Some(target.section_id);
        }
        StudentTransition::Graduate => {
            updated.class_id = None;
            updated.section_id = None;
            updated.status = crate::types::StudentStatus::Graduated;
        }
        StudentTransition::Skip(_) => return None,
    }
    Some(updated)
}

/// The session the term stage moves into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextSession {
    /// Stay in the current session.
    Current,
    /// Move into an already persisted session.
    Existing(AcademicSession),
    /// Create this session and move into it.
    Create(AcademicSession),
}

/// The pointer change the term stage makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermAdvancePlan {
    /// The term to open.
    pub next_term: Term,
    /// The session to open.
    pub next_session: NextSession,
}

/// Finds the term that follows `current` in a non-promotion rollover.
#[must_use]
pub fn following_term<'a>(current: &Term, terms: &'a [Term]) -> Option<&'a Term> {
    let next_order: u32 = current.order.checked_add(1)?;
    terms.iter().find(|t| t.order == next_order)
}

/// Finds the first term of a session.
#[must_use]
pub fn first_term(terms: &[Term]) -> Option<&Term> {
    terms.iter().find(|t| t.order == 1)
}

/// Decides the new term and session pointer.
///
/// A promotion term wraps to the term with order 1 and moves into the next
/// session: `existing_next_session` if the division already has one,
/// otherwise the successor of the current session. Any other term moves to
/// the term with exactly `order + 1` in the same session.
///
/// Returns `None` when there is no current term or no term to move to; the
/// pointer then stays where it is.
///
/// # Arguments
///
/// * `setting` - The division's academic setting, freshly read
/// * `terms` - All terms
/// * `existing_next_session` - The division's session starting one year later, if any
#[must_use]
pub fn plan_term_advance(
    setting: &AcademicSetting,
    terms: &[Term],
    existing_next_session: Option<AcademicSession>,
) -> Option<TermAdvancePlan> {
    let current: &Term = setting.term.as_ref()?;

    if current.is_promotion_term {
        let next_term: Term = first_term(terms)?.clone();
        let next_session: NextSession = existing_next_session.map_or_else(
            || NextSession::Create(setting.session.successor()),
            NextSession::Existing,
        );
        return Some(TermAdvancePlan {
            next_term,
            next_session,
        });
    }

    following_term(current, terms).map(|t| TermAdvancePlan {
        next_term: t.clone(),
        next_session: NextSession::Current,
    })
}
