// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Operator authentication, rollover credential confirmation and
//! role checks.

use time::format_description::well_known::Iso8601;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use term_rollover_audit::Actor;
use term_rollover_persistence::{
    OperatorData, OperatorLookup, PersistenceError, SessionData, SqlitePersistence,
    verify_password,
};

use crate::error::AuthError;

/// Operator roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Administrator. An active admin's credential is what confirms a
    /// term rollover, and only admins maintain promotion maps.
    Admin,
    /// School staff. May drive a rollover once an admin credential has
    /// confirmed it.
    Staff,
}

impl Role {
    /// Parses a stored role.
    ///
    /// # Errors
    ///
    /// Returns an error if the role is unknown.
    pub fn parse(value: &str) -> Result<Self, AuthError> {
        match value {
            "Admin" => Ok(Self::Admin),
            "Staff" => Ok(Self::Staff),
            _ => Err(AuthError::AuthenticationFailed {
                reason: format!("Invalid role: {value}"),
            }),
        }
    }

    /// The stored form of this role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Staff => "Staff",
        }
    }

    const fn audit_type(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

/// The operator behind a validated login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedActor {
    /// Login name.
    pub id: String,
    pub role: Role,
}

impl AuthenticatedActor {
    #[must_use]
    pub const fn new(id: String, role: Role) -> Self {
        Self { id, role }
    }

    /// The audit actor for this operator.
    #[must_use]
    pub fn to_audit_actor(&self, operator: &OperatorData) -> Actor {
        Actor::operator(operator.operator_id, self.role.audit_type())
    }

    fn for_operator(operator: &OperatorData) -> Result<Self, AuthError> {
        Ok(Self::new(operator.login_name.clone(), Role::parse(&operator.role)?))
    }
}

/// Role checks for actions outside the rollover saga.
pub struct AuthorizationService;

impl AuthorizationService {
    /// Only admins may edit promotion maps.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for any other role.
    pub fn authorize_set_promotion_class(actor: &AuthenticatedActor) -> Result<(), AuthError> {
        if actor.role == Role::Admin {
            return Ok(());
        }
        Err(AuthError::Unauthorized {
            action: String::from("set_promotion_class"),
            required_role: String::from(Role::Admin.as_str()),
        })
    }
}

/// Login sessions and rollover credential checks.
pub struct AuthenticationService;

impl AuthenticationService {
    const SESSION_LIFETIME: Duration = Duration::hours(12);

    /// Checks a login and opens a session.
    ///
    /// # Returns
    ///
    /// A tuple of (`session_token`, `authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the operator is unknown or disabled, or the
    /// password does not match.
    pub fn login(
        persistence: &mut SqlitePersistence,
        login_name: &str,
        password: &str,
    ) -> Result<(String, AuthenticatedActor, OperatorData), AuthError> {
        let operator: OperatorData = persistence
            .find_operator(OperatorLookup::Login(login_name))
            .map_err(Self::storage_failure)?
            .ok_or_else(Self::bad_login)?;
        Self::ensure_enabled(&operator)?;

        if !verify_password(password, &operator.password_hash).map_err(Self::storage_failure)? {
            warn!(login_name = %operator.login_name, "Rejected login");
            return Err(Self::bad_login());
        }

        let actor: AuthenticatedActor = AuthenticatedActor::for_operator(&operator)?;
        let session_token: String = format!(
            "session_{:016x}{:016x}",
            rand::random::<u64>(),
            rand::random::<u64>()
        );
        let expires_at: String = (OffsetDateTime::now_utc() + Self::SESSION_LIFETIME)
            .format(&Iso8601::DEFAULT)
            .map_err(|e| AuthError::AuthenticationFailed {
                reason: format!("Failed to format expiration time: {e}"),
            })?;

        persistence
            .open_session(operator.operator_id, &session_token, &expires_at)
            .map_err(Self::storage_failure)?;

        info!(operator_id = operator.operator_id, role = actor.role.as_str(), "Operator logged in");
        Ok((session_token, actor, operator))
    }

    /// Resolves a bearer token to its operator.
    ///
    /// # Returns
    ///
    /// A tuple of (`authenticated_actor`, `operator_data`)
    ///
    /// # Errors
    ///
    /// Returns an error if the session is unknown or expired, or its
    /// operator is disabled.
    pub fn validate_session(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(AuthenticatedActor, OperatorData), AuthError> {
        let session: SessionData = persistence
            .find_session(session_token)
            .map_err(Self::storage_failure)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            OffsetDateTime::parse(&session.expires_at, &Iso8601::DEFAULT).map_err(|e| {
                AuthError::AuthenticationFailed {
                    reason: format!("Failed to parse session expiration: {e}"),
                }
            })?;
        if OffsetDateTime::now_utc() > expires_at {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Session expired"),
            });
        }

        let operator: OperatorData = persistence
            .find_operator(OperatorLookup::Id(session.operator_id))
            .map_err(Self::storage_failure)?
            .ok_or_else(|| AuthError::AuthenticationFailed {
                reason: String::from("Operator not found"),
            })?;
        Self::ensure_enabled(&operator)?;
        let actor: AuthenticatedActor = AuthenticatedActor::for_operator(&operator)?;

        persistence
            .touch_session(session.session_id)
            .map_err(Self::storage_failure)?;

        Ok((actor, operator))
    }

    /// Ends a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be deleted.
    pub fn logout(
        persistence: &mut SqlitePersistence,
        session_token: &str,
    ) -> Result<(), AuthError> {
        let closed: bool = persistence
            .close_session(session_token)
            .map_err(Self::storage_failure)?;
        debug!(closed, "Logout");
        Ok(())
    }

    /// Checks a rollover confirmation credential.
    ///
    /// The credential is accepted if it matches the password of any
    /// active admin, not necessarily the operator driving the rollover.
    ///
    /// # Returns
    ///
    /// The admin whose credential matched.
    ///
    /// # Errors
    ///
    /// Returns an error if no active admin's password matches.
    pub fn confirm_admin_credential(
        persistence: &mut SqlitePersistence,
        credential: &str,
    ) -> Result<OperatorData, AuthError> {
        let confirmers: Vec<OperatorData> = persistence
            .list_rollover_confirmers()
            .map_err(Self::storage_failure)?;

        for admin in confirmers {
            match verify_password(credential, &admin.password_hash) {
                Ok(true) => return Ok(admin),
                Ok(false) => {}
                Err(e) => {
                    warn!(operator_id = admin.operator_id, error = %e, "Unreadable password hash");
                }
            }
        }

        Err(AuthError::AuthenticationFailed {
            reason: String::from("Credential does not match an active administrator"),
        })
    }

    fn ensure_enabled(operator: &OperatorData) -> Result<(), AuthError> {
        if operator.is_disabled {
            return Err(AuthError::AuthenticationFailed {
                reason: String::from("Operator is disabled"),
            });
        }
        Ok(())
    }

    fn bad_login() -> AuthError {
        AuthError::AuthenticationFailed {
            reason: String::from("Invalid login name or password"),
        }
    }

    fn storage_failure(err: PersistenceError) -> AuthError {
        AuthError::AuthenticationFailed {
            reason: format!("Database error: {err}"),
        }
    }
}
