// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Bearer sessions.
//!
//! Every rollover and promotion-map route takes a [`SessionOperator`], so a
//! request without a live session from `/login` never reaches the api crate.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use term_rollover_api::{AuthenticatedActor, AuthenticationService};
use term_rollover_persistence::OperatorData;

use crate::{AppState, HttpError};

/// The operator behind the request's bearer token.
///
/// Rejects with 401 if the header is missing or malformed, or the session
/// is unknown, expired, or belongs to a disabled operator.
pub struct SessionOperator(pub AuthenticatedActor, pub OperatorData);

impl FromRequestParts<AppState> for SessionOperator {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token: &str = bearer_token(&parts.headers)?;

        let mut persistence = state.persistence.lock().await;
        let (actor, operator) = AuthenticationService::validate_session(&mut persistence, token)
            .map_err(|e| {
                warn!(error = %e, "Rejected session");
                SessionError::Rejected(e.to_string())
            })?;
        drop(persistence);

        debug!(operator_id = operator.operator_id, role = actor.role.as_str(), "Session accepted");
        Ok(Self(actor, operator))
    }
}

/// Reads the token from an `Authorization: Bearer <token>` header.
///
/// # Errors
///
/// Returns an error if the header is absent, not ASCII, or not a bearer
/// credential.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, SessionError> {
    let value: &str = headers
        .get(AUTHORIZATION)
        .ok_or(SessionError::MissingToken)?
        .to_str()
        .map_err(|_| SessionError::MalformedHeader)?;

    value
        .strip_prefix("Bearer ")
        .filter(|token| !token.is_empty())
        .ok_or(SessionError::MalformedHeader)
}

/// Why a request has no usable session.
#[derive(Debug)]
pub enum SessionError {
    MissingToken,
    MalformedHeader,
    /// The token did not resolve to an enabled operator's live session.
    Rejected(String),
}

impl From<SessionError> for HttpError {
    fn from(err: SessionError) -> Self {
        let message: String = match err {
            SessionError::MissingToken => String::from("Missing bearer token"),
            SessionError::MalformedHeader => {
                String::from("Authorization header must be 'Bearer <token>'")
            }
            SessionError::Rejected(reason) => reason,
        };
        Self {
            status: StatusCode::UNAUTHORIZED,
            message,
        }
    }
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        HttpError::from(self).into_response()
    }
}
