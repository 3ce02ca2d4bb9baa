// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde::Serialize;
use serde_json::Value;
use time::{Date, Month};
use tokio::sync::Mutex;
use tower::ServiceExt;

use term_rollover_domain::{AcademicSession, Division, Term};
use term_rollover_persistence::{NewOperator, SqlitePersistence};

use crate::{AppState, build_router};

pub const ADMIN_PASSWORD: &str = "correct horse";
pub const STAFF_PASSWORD: &str = "battery staple";

/// Creates app state with an admin, a staff operator and a calendar.
///
/// The `sec` division is in the first of three terms of 2023/2024.
pub fn create_test_app(resumption: bool) -> (AppState, Router) {
    let mut persistence: SqlitePersistence =
        SqlitePersistence::new_in_memory().expect("Failed to create in-memory persistence");
    for (login_name, password, role) in [
        ("ADMIN1", ADMIN_PASSWORD, "Admin"),
        ("STAFF1", STAFF_PASSWORD, "Staff"),
    ] {
        persistence
            .register_operator(&NewOperator {
                login_name,
                display_name: login_name,
                password,
                role,
            })
            .unwrap();
    }

    let division: Division = Division::new("sec");
    let first: i64 = persistence
        .create_term(&Term::new("First Term", 1, false))
        .unwrap();
    persistence
        .create_term(&Term::new("Second Term", 2, false))
        .unwrap();
    persistence
        .create_term(&Term::new("Third Term", 3, true))
        .unwrap();
    let session_id: i64 = persistence
        .create_academic_session(&AcademicSession::new(2023, 2024, "/", division.clone()))
        .unwrap();
    let resumption_date: Option<Date> =
        resumption.then(|| Date::from_calendar_date(2024, Month::January, 8).unwrap());
    persistence
        .save_academic_setting(&division, session_id, Some(first), resumption_date, None)
        .unwrap();

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };
    let app: Router = build_router(app_state.clone());
    (app_state, app)
}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<&impl Serialize>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("Authorization", format!("Bearer {token}"));
    }
    let body: Body = match body {
        Some(body) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(body).unwrap())
        }
        None => Body::empty(),
    };
    app.clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body_bytes).unwrap()
}

pub async fn login_as(app: &Router, login_name: &str, password: &str) -> String {
    let response = send(
        app,
        "POST",
        "/login",
        None,
        Some(&serde_json::json!({ "login_name": login_name, "password": password })),
    )
    .await;
    assert_eq!(response.status(), 200);
    json_body(response).await["session_token"]
        .as_str()
        .unwrap()
        .to_string()
}

/// Takes the operator behind `token` through request, confirm and admit.
pub async fn admit(app: &Router, token: &str) {
    let no_body: Option<&Value> = None;
    let response = send(app, "POST", "/rollover/sec/request", Some(token), no_body).await;
    assert_eq!(response.status(), 200);
    let response = send(
        app,
        "POST",
        "/rollover/sec/confirm",
        Some(token),
        Some(&serde_json::json!({ "credential": ADMIN_PASSWORD })),
    )
    .await;
    assert_eq!(response.status(), 200);
    let response = send(app, "POST", "/rollover/sec/admit", Some(token), no_body).await;
    assert_eq!(response.status(), 200);
}
