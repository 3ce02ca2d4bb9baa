// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-agnostic read queries.
//!
//! Every query is generated for both backends by `backend_fn!` and
//! dispatched from [`crate::Persistence`].

pub mod academic;
pub mod audit;
pub mod operators;
pub mod students;
pub mod workflow;

pub use operators::verify_password;
