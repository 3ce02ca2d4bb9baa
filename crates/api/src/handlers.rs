// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Login and logout.

use term_rollover_persistence::SqlitePersistence;

use crate::auth::AuthenticationService;
use crate::error::ApiError;
use crate::request_response::{LoginRequest, LoginResponse};

/// Logs an operator in.
///
/// The response carries the bearer token and its stored expiry.
///
/// # Errors
///
/// Returns `AuthenticationFailed` if the login is rejected, or `Internal`
/// if the new session cannot be read back.
pub fn login(
    persistence: &mut SqlitePersistence,
    request: &LoginRequest,
) -> Result<LoginResponse, ApiError> {
    let (session_token, actor, operator) =
        AuthenticationService::login(persistence, &request.login_name, &request.password)?;

    let expires_at: String = persistence
        .find_session(&session_token)
        .map_err(|e| ApiError::Internal {
            message: format!("Failed to read new session: {e}"),
        })?
        .map(|session| session.expires_at)
        .ok_or_else(|| ApiError::Internal {
            message: String::from("Session missing right after login"),
        })?;

    Ok(LoginResponse {
        session_token,
        login_name: actor.id,
        display_name: operator.display_name,
        role: String::from(actor.role.as_str()),
        expires_at,
    })
}

/// Ends the caller's session.
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub fn logout(persistence: &mut SqlitePersistence, session_token: &str) -> Result<(), ApiError> {
    Ok(AuthenticationService::logout(persistence, session_token)?)
}
