// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic mutation modules.
//!
//! ## Module Organization
//!
//! - `academic`: Sessions, terms, settings, classes and promotion maps
//! - `audit`: Audit event persistence
//! - `operators`: Operator and session mutations
//! - `students`: Students, fee positions and academic records
//! - `workflow`: Rollover workflow records, locks and transitions
//!
//! Backend-specific helpers (e.g., `get_last_insert_rowid()`) come from the
//! `backend` module. All other code uses Diesel DSL exclusively.

pub mod academic;
pub mod audit;
pub mod operators;
pub mod students;
pub mod workflow;
