// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Audit trail vocabulary for term rollovers.
//!
//! Every workflow transition and every completed rollover stage is
//! recorded as one [`AuditEvent`] scoped to a division. Events are
//! append-only; the stored row ID is the only thing added after creation.

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

use term_rollover_domain::Division;

#[cfg(test)]
mod tests;

/// Who did it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// Operator ID, as text.
    pub id: String,
    /// `admin` or `staff` for operators.
    pub actor_type: String,
}

impl Actor {
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// An operator, named by ID so the trail survives login renames.
    #[must_use]
    pub fn operator(operator_id: i64, actor_type: &str) -> Self {
        Self::new(operator_id.to_string(), actor_type.to_string())
    }
}

/// Why it happened, usually the HTTP request that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    pub id: String,
    pub description: String,
}

impl Cause {
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// What happened: a command name such as `Admit`, or a stage name such as
/// `ArchivePlacement`, with free-form details like batch counts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub details: Option<String>,
}

impl Action {
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// Rendered workflow or record state on one side of an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    pub data: String,
}

impl StateSnapshot {
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// One entry in a division's rollover audit trail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Row ID; `None` until stored.
    pub event_id: Option<i64>,
    pub actor: Actor,
    pub cause: Cause,
    pub action: Action,
    pub before: StateSnapshot,
    pub after: StateSnapshot,
    pub division: Division,
}

impl AuditEvent {
    /// Creates an event that has not been stored yet.
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        division: Division,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            division,
        }
    }

    /// The same event, marked with its stored row ID.
    #[must_use]
    pub fn with_id(mut self, event_id: i64) -> Self {
        self.event_id = Some(event_id);
        self
    }
}
