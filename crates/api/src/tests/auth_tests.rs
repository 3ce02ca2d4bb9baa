// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use term_rollover_persistence::{NewOperator, OperatorLookup};

use super::helpers::{ADMIN_PASSWORD, STAFF_PASSWORD, create_operator, create_persistence};
use crate::{
    ApiError, AuthError, AuthenticationService, AuthorizationService, LoginRequest, Role, login,
    logout,
};

#[test]
fn test_login_returns_session_for_valid_password() {
    let mut persistence = create_persistence();
    let (_actor, operator) = create_operator(&mut persistence, "admin1", Role::Admin);

    let response = login(
        &mut persistence,
        &LoginRequest {
            login_name: String::from("Admin1"),
            password: String::from(ADMIN_PASSWORD),
        },
    )
    .unwrap();

    assert_eq!(response.login_name, "ADMIN1");
    assert_eq!(response.role, "Admin");
    assert!(response.session_token.starts_with("session_"));

    let (actor, validated) =
        AuthenticationService::validate_session(&mut persistence, &response.session_token)
            .unwrap();
    assert_eq!(validated.operator_id, operator.operator_id);
    assert_eq!(actor.role, Role::Admin);

    let refreshed = persistence
        .find_operator(OperatorLookup::Id(operator.operator_id))
        .unwrap()
        .unwrap();
    assert!(refreshed.last_login_at.is_some());
}

#[test]
fn test_login_rejects_wrong_password() {
    let mut persistence = create_persistence();
    create_operator(&mut persistence, "ADMIN1", Role::Admin);

    let result = login(
        &mut persistence,
        &LoginRequest {
            login_name: String::from("ADMIN1"),
            password: String::from("not it"),
        },
    );

    assert!(matches!(result, Err(ApiError::AuthenticationFailed { .. })));
}

#[test]
fn test_login_rejects_disabled_operator() {
    let mut persistence = create_persistence();
    let (_actor, operator) = create_operator(&mut persistence, "STAFF1", Role::Staff);
    persistence.disable_operator(operator.operator_id).unwrap();

    let result = login(
        &mut persistence,
        &LoginRequest {
            login_name: String::from("STAFF1"),
            password: String::from(STAFF_PASSWORD),
        },
    );

    assert!(matches!(
        result,
        Err(ApiError::AuthenticationFailed { ref reason }) if reason.contains("disabled")
    ));
}

#[test]
fn test_logout_invalidates_session() {
    let mut persistence = create_persistence();
    create_operator(&mut persistence, "ADMIN1", Role::Admin);
    let response = login(
        &mut persistence,
        &LoginRequest {
            login_name: String::from("ADMIN1"),
            password: String::from(ADMIN_PASSWORD),
        },
    )
    .unwrap();

    logout(&mut persistence, &response.session_token).unwrap();

    let result = AuthenticationService::validate_session(&mut persistence, &response.session_token);
    assert!(matches!(result, Err(AuthError::AuthenticationFailed { .. })));
}

#[test]
fn test_confirm_admin_credential_matches_any_active_admin() {
    let mut persistence = create_persistence();
    let (_first, _) = create_operator(&mut persistence, "ADMIN1", Role::Admin);
    let (_second, second_operator) = create_operator(&mut persistence, "ADMIN2", Role::Admin);
    persistence
        .register_operator(&NewOperator {
            login_name: "ADMIN3",
            display_name: "Other Admin",
            password: "different secret",
            role: "Admin",
        })
        .unwrap();

    let confirmed =
        AuthenticationService::confirm_admin_credential(&mut persistence, "different secret")
            .unwrap();
    assert_eq!(confirmed.login_name, "ADMIN3");

    let any = AuthenticationService::confirm_admin_credential(&mut persistence, ADMIN_PASSWORD)
        .unwrap();
    assert!(any.operator_id <= second_operator.operator_id);
}

#[test]
fn test_confirm_admin_credential_skips_disabled_admins() {
    let mut persistence = create_persistence();
    let (_admin, operator) = create_operator(&mut persistence, "ADMIN1", Role::Admin);
    persistence.disable_operator(operator.operator_id).unwrap();

    let result = AuthenticationService::confirm_admin_credential(&mut persistence, ADMIN_PASSWORD);

    assert!(matches!(result, Err(AuthError::AuthenticationFailed { .. })));
}

#[test]
fn test_role_parse_rejects_unknown_role() {
    assert_eq!(Role::parse("Admin"), Ok(Role::Admin));
    assert_eq!(Role::parse("Staff"), Ok(Role::Staff));
    assert!(Role::parse("Principal").is_err());
}

#[test]
fn test_only_admin_may_set_promotion_class() {
    let mut persistence = create_persistence();
    let (admin, _) = create_operator(&mut persistence, "ADMIN1", Role::Admin);
    let (staff, _) = create_operator(&mut persistence, "STAFF1", Role::Staff);

    assert!(AuthorizationService::authorize_set_promotion_class(&admin).is_ok());
    assert_eq!(
        AuthorizationService::authorize_set_promotion_class(&staff),
        Err(AuthError::Unauthorized {
            action: String::from("set_promotion_class"),
            required_role: String::from("Admin"),
        })
    );
}
