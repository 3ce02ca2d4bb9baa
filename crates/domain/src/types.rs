// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// An independently tracked school division (e.g. primary, secondary).
///
/// Codes are normalized to lowercase so `"SEC"` and `"sec"` name the same division.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Division {
    code: String,
}

impl Division {
    /// Creates a new division with a normalized code.
    ///
    /// # Arguments
    ///
    /// * `code` - The division code
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self {
            code: code.trim().to_lowercase(),
        }
    }

    /// Returns the normalized division code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

/// Status of an academic session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum SessionStatus {
    /// The session currently in progress.
    #[default]
    Active,
    /// A session that has closed.
    Past,
    /// A session prepared ahead of time.
    Next,
}

impl SessionStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Past => "past",
            Self::Next => "next",
        }
    }
}

impl FromStr for SessionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "past" => Ok(Self::Past),
            "next" => Ok(Self::Next),
            _ => Err(DomainError::InvalidSessionStatus(s.to_string())),
        }
    }
}

/// An academic session such as `2023/2024`.
///
/// Identity is `(start_year, end_year, division)`; the persisted ID is ignored for equality.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcademicSession {
    /// Row ID; `None` until stored.
    pub session_id: Option<i64>,
    /// The first calendar year of the session.
    pub start_year: u16,
    /// The last calendar year of the session.
    pub end_year: u16,
    /// The symbol placed between the years in the label.
    pub separator: String,
    /// The session status.
    pub status: SessionStatus,
    /// The division this session belongs to.
    pub division: Division,
}

impl PartialEq for AcademicSession {
    fn eq(&self, other: &Self) -> bool {
        self.start_year == other.start_year
            && self.end_year == other.end_year
            && self.division == other.division
    }
}

impl Eq for AcademicSession {}

impl AcademicSession {
    /// Creates a new, unpersisted active session.
    #[must_use]
    pub fn new(start_year: u16, end_year: u16, separator: &str, division: Division) -> Self {
        Self {
            session_id: None,
            start_year,
            end_year,
            separator: separator.to_string(),
            status: SessionStatus::Active,
            division,
        }
    }

    /// Returns a copy of this session carrying a persisted ID.
    #[must_use]
    pub fn with_id(mut self, session_id: i64) -> Self {
        self.session_id = Some(session_id);
        self
    }

    /// The label used as the first key of academic record maps.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}{}", self.start_year, self.separator, self.end_year)
    }

    /// Builds the session that follows this one.
    ///
    /// Both years advance by one; separator and division carry over and the
    /// new session is active.
    #[must_use]
    pub fn successor(&self) -> Self {
        Self {
            session_id: None,
            start_year: self.start_year.saturating_add(1),
            end_year: self.end_year.saturating_add(1),
            separator: self.separator.clone(),
            status: SessionStatus::Active,
            division: self.division.clone(),
        }
    }
}

impl std::fmt::Display for AcademicSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A term within a session. Terms are static reference data ordered by `order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Term {
    /// Row ID; `None` until stored.
    pub term_id: Option<i64>,
    /// The unique term name (e.g. "First Term").
    pub name: String,
    /// The unique position of this term, starting at 1.
    pub order: u32,
    /// Whether students are promoted after this term closes.
    pub is_promotion_term: bool,
}

impl Term {
    /// Creates a new, unpersisted term.
    #[must_use]
    pub fn new(name: &str, order: u32, is_promotion_term: bool) -> Self {
        Self {
            term_id: None,
            name: name.to_string(),
            order,
            is_promotion_term,
        }
    }

    /// Returns a copy of this term carrying a persisted ID.
    #[must_use]
    pub fn with_id(mut self, term_id: i64) -> Self {
        self.term_id = Some(term_id);
        self
    }
}

/// The academic calendar pointer of a division.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicSetting {
    /// The division this setting belongs to.
    pub division: Division,
    /// The session currently open.
    pub session: AcademicSession,
    /// The term currently open, if any.
    pub term: Option<Term>,
    /// The date the next term resumes.
    pub next_resumption_date: Option<time::Date>,
    /// The date the current term closes.
    pub closing_date: Option<time::Date>,
}

/// A class (grade level) within a division.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolClass {
    /// The class identifier.
    pub class_id: i64,
    /// The display name (e.g. "JS2").
    pub name: String,
    /// The division the class belongs to.
    pub division: Division,
}

/// A section (arm) a class is split into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// The section identifier.
    pub section_id: i64,
    /// The display name (e.g. "Blue").
    pub name: String,
}

/// A `(class, section)` placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Placement {
    /// The class identifier.
    pub class_id: i64,
    /// The section identifier.
    pub section_id: i64,
}

impl Placement {
    /// Creates a new placement.
    #[must_use]
    pub const fn new(class_id: i64, section_id: i64) -> Self {
        Self {
            class_id,
            section_id,
        }
    }
}

/// Where the students of a `(class, section)` go when the promotion term closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionMap {
    /// The source placement.
    pub source: Placement,
    /// The class to promote into.
    pub target_class_id: Option<i64>,
    /// The section to promote into.
    pub target_section_id: Option<i64>,
    /// Whether students of the source placement graduate instead.
    pub is_graduation_class: bool,
}

/// The effect a promotion map has on one student.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionOutcome {
    /// Move the student into the target placement.
    Promote(Placement),
    /// Mark the student graduated and clear their placement.
    Graduate,
}

impl PromotionMap {
    /// Resolves what this mapping does to a student.
    ///
    /// # Errors
    ///
    /// Returns `IncompletePromotionTarget` if the mapping is not a graduation
    /// mapping and lacks a target class or section.
    pub fn outcome(&self) -> Result<PromotionOutcome, DomainError> {
        if self.is_graduation_class {
            return Ok(PromotionOutcome::Graduate);
        }
        match (self.target_class_id, self.target_section_id) {
            (Some(class_id), Some(section_id)) => {
                Ok(PromotionOutcome::Promote(Placement::new(class_id, section_id)))
            }
            _ => Err(DomainError::IncompletePromotionTarget {
                class_id: self.source.class_id,
                section_id: self.source.section_id,
            }),
        }
    }
}

/// Enrollment status of a student.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StudentStatus {
    /// Enrolled and taking part in the current term.
    #[default]
    Active,
    /// Enrolled but suspended or withdrawn.
    Disabled,
    /// Finished the final class.
    Graduated,
}

impl StudentStatus {
    /// Converts this status to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Disabled => "disabled",
            Self::Graduated => "graduated",
        }
    }
}

impl FromStr for StudentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "disabled" => Ok(Self::Disabled),
            "graduated" => Ok(Self::Graduated),
            _ => Err(DomainError::InvalidStudentStatus(s.to_string())),
        }
    }
}

/// A student as seen by the rollover workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// The student identifier.
    pub student_id: i64,
    /// The school-issued registration number.
    pub registration_number: String,
    /// The student's full name.
    pub full_name: String,
    /// The current class, cleared on graduation.
    pub class_id: Option<i64>,
    /// The current section, cleared on graduation.
    pub section_id: Option<i64>,
    /// The enrollment status.
    pub status: StudentStatus,
    /// The division the student belongs to.
    pub division: Division,
}

impl Student {
    /// Returns the student's placement if both class and section are set.
    #[must_use]
    pub const fn placement(&self) -> Option<Placement> {
        match (self.class_id, self.section_id) {
            (Some(class_id), Some(section_id)) => Some(Placement::new(class_id, section_id)),
            _ => None,
        }
    }
}

/// Summary of a student's fee ledger, in minor currency units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeePosition {
    /// Everything billed to the student.
    pub total_due_minor: i64,
    /// Everything the student has paid.
    pub total_paid_minor: i64,
}

impl FeePosition {
    /// The amount still owed. Negative when the student is in credit.
    #[must_use]
    pub const fn outstanding_minor(&self) -> i64 {
        self.total_due_minor.saturating_sub(self.total_paid_minor)
    }
}

/// A closed-term fee snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSnapshot {
    /// Everything billed to the student at close.
    pub total_due_minor: i64,
    /// Everything paid at close.
    pub total_paid_minor: i64,
    /// The balance carried forward.
    pub outstanding_minor: i64,
}

impl From<FeePosition> for FeeSnapshot {
    fn from(position: FeePosition) -> Self {
        Self {
            total_due_minor: position.total_due_minor,
            total_paid_minor: position.total_paid_minor,
            outstanding_minor: position.outstanding_minor(),
        }
    }
}

/// Snapshots keyed by session label, then term name.
pub type TermKeyed<T> = BTreeMap<String, BTreeMap<String, T>>;

/// A student's historical record of closed terms.
///
/// Each map is keyed by session label then term name. Writing a key that
/// already exists replaces its value; no other key is ever touched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentAcademicRecord {
    /// The student this record belongs to.
    pub student_id: i64,
    /// Class placement at the close of each term.
    pub previous_classes: TermKeyed<Placement>,
    /// Placement under which attendance was taken for each term.
    pub attendance_record: TermKeyed<Placement>,
    /// Fee position at the close of each term.
    pub fee_record: TermKeyed<FeeSnapshot>,
    /// Placement the student was moved out of by each term's transition.
    #[serde(default)]
    pub transitioned_from: TermKeyed<Placement>,
}

impl StudentAcademicRecord {
    /// Creates an empty record for a student.
    #[must_use]
    pub fn new(student_id: i64) -> Self {
        Self {
            student_id,
            ..Self::default()
        }
    }

    /// Records the class placement for a `(session, term)`.
    pub fn record_placement(&mut self, session_key: &str, term_key: &str, placement: Placement) {
        write_term_keyed(&mut self.previous_classes, session_key, term_key, placement);
    }

    /// Records the attendance placement for a `(session, term)`.
    pub fn record_attendance(&mut self, session_key: &str, term_key: &str, placement: Placement) {
        write_term_keyed(&mut self.attendance_record, session_key, term_key, placement);
    }

    /// Records the fee position for a `(session, term)`.
    pub fn record_fee_position(
        &mut self,
        session_key: &str,
        term_key: &str,
        position: FeePosition,
    ) {
        write_term_keyed(
            &mut self.fee_record,
            session_key,
            term_key,
            FeeSnapshot::from(position),
        );
    }

    /// Marks the student as transitioned out of `placement` in a
    /// `(session, term)`.
    pub fn record_transition(&mut self, session_key: &str, term_key: &str, placement: Placement) {
        write_term_keyed(&mut self.transitioned_from, session_key, term_key, placement);
    }

    /// Whether the student was already transitioned in a `(session, term)`.
    #[must_use]
    pub fn has_transitioned(&self, session_key: &str, term_key: &str) -> bool {
        self.transitioned_from
            .get(session_key)
            .is_some_and(|terms| terms.contains_key(term_key))
    }
}

fn write_term_keyed<T>(map: &mut TermKeyed<T>, session_key: &str, term_key: &str, value: T) {
    map.entry(session_key.to_string())
        .or_default()
        .insert(term_key.to_string(), value);
}
