// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use crate::types::{AcademicSession, Division, Term};
use std::collections::HashSet;

/// Accepted separators between the years of a session label.
const SESSION_SEPARATORS: [&str; 2] = ["/", "-"];

/// Validates a division code.
///
/// # Errors
///
/// Returns an error if the code is empty or contains whitespace.
pub fn validate_division(division: &Division) -> Result<(), DomainError> {
    if division.code().is_empty() {
        return Err(DomainError::InvalidDivision(String::from(
            "Division code cannot be empty",
        )));
    }
    if division.code().chars().any(char::is_whitespace) {
        return Err(DomainError::InvalidDivision(format!(
            "Division code '{}' cannot contain whitespace",
            division.code()
        )));
    }
    Ok(())
}

/// Validates that a session spans two consecutive, reasonable years.
///
/// # Arguments
///
/// * `session` - The session to validate
///
/// # Errors
///
/// Returns an error if:
/// - The start year is outside 1900..=2200
/// - The end year is not exactly one after the start year
/// - The separator is not `/` or `-`
pub fn validate_session(session: &AcademicSession) -> Result<(), DomainError> {
    if !(1900..=2200).contains(&session.start_year) {
        return Err(DomainError::InvalidSession(format!(
            "Start year {} must be between 1900 and 2200",
            session.start_year
        )));
    }

    if session.start_year.checked_add(1) != Some(session.end_year) {
        return Err(DomainError::InvalidSession(format!(
            "End year {} must follow start year {}",
            session.end_year, session.start_year
        )));
    }

    if !SESSION_SEPARATORS.contains(&session.separator.as_str()) {
        return Err(DomainError::InvalidSeparator(session.separator.clone()));
    }

    validate_division(&session.division)
}

/// Validates a single term definition.
///
/// # Errors
///
/// Returns an error if the name is empty or the order is zero.
pub fn validate_term(term: &Term) -> Result<(), DomainError> {
    if term.name.trim().is_empty() {
        return Err(DomainError::InvalidTerm(String::from(
            "Term name cannot be empty",
        )));
    }
    if term.order == 0 {
        return Err(DomainError::InvalidTerm(format!(
            "Term '{}' must have an order of at least 1",
            term.name
        )));
    }
    Ok(())
}

/// Validates that a new term does not collide with existing ones.
///
/// Term names and orders are both unique.
///
/// # Errors
///
/// Returns an error if the term is invalid or collides with an existing term.
pub fn validate_term_unique(term: &Term, existing: &[Term]) -> Result<(), DomainError> {
    validate_term(term)?;

    let names: HashSet<&str> = existing.iter().map(|t| t.name.as_str()).collect();
    if names.contains(term.name.as_str()) {
        return Err(DomainError::InvalidTerm(format!(
            "Term name '{}' is already in use",
            term.name
        )));
    }

    if existing.iter().any(|t| t.order == term.order) {
        return Err(DomainError::InvalidTerm(format!(
            "Term order {} is already in use",
            term.order
        )));
    }

    Ok(())
}
