// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

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
#![allow(clippy::multiple_crate_versions)]

mod session;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    Json, Router,
    extract::{Path, State as AxumState},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{error, info};

use term_rollover_api::{
    AdvanceTermResponse, ApiError, AuthenticatedActor, BatchStageResponse, ConfirmIdentityRequest,
    ConfirmationPromptResponse, LoginRequest, LoginResponse, PrecheckResponse,
    SetPromotionClassRequest, SetPromotionClassResponse, WorkflowResponse, WorkflowStatusResponse,
    abandon_workflow, admit_workflow, advance_term, archive_academic_placement,
    archive_attendance, archive_fee_position, confirm_identity, login, logout,
    request_confirmation, run_precheck, set_promotion_class, transition_students,
    workflow_status,
};
use term_rollover_audit::Cause;
use term_rollover_persistence::{OperatorData, SqlitePersistence};

use crate::session::{SessionOperator, bearer_token};

/// Term Rollover Server - HTTP server for closing school terms
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// `MySQL` connection URL. Takes precedence over `--database`.
    #[arg(long)]
    mysql_url: Option<String>,

    /// Address to bind the server to
    #[arg(short, long, default_value = "127.0.0.1")]
    bind: String,

    /// Port to bind the server to
    #[arg(short, long, default_value_t = 3000)]
    port: u16,
}

/// Application state shared across handlers.
#[derive(Clone)]
struct AppState {
    /// The persistence layer. Every request runs under this lock.
    persistence: Arc<Mutex<SqlitePersistence>>,
}

/// Error response type.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ErrorResponse {
    /// Error indicator.
    error: bool,
    /// Error message.
    message: String,
}

/// Response for write operations without a richer body.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WriteResponse {
    /// Whether the operation succeeded.
    success: bool,
    /// Optional message.
    message: Option<String>,
}

/// HTTP error wrapper that implements `IntoResponse`.
#[derive(Debug)]
struct HttpError {
    /// The HTTP status code.
    status: StatusCode,
    /// The error message.
    message: String,
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let body: Json<ErrorResponse> = Json(ErrorResponse {
            error: true,
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<ApiError> for HttpError {
    fn from(err: ApiError) -> Self {
        let status: StatusCode = match &err {
            ApiError::AuthenticationFailed { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Unauthorized { .. } => StatusCode::FORBIDDEN,
            ApiError::UnauthorizedTransition { .. }
            | ApiError::WorkflowNotAdmitted { .. }
            | ApiError::RolloverInProgress { .. }
            | ApiError::RolloverLocked { .. } => StatusCode::CONFLICT,
            ApiError::Configuration { .. }
            | ApiError::IncompletePromotionMap { .. }
            | ApiError::DomainRuleViolation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            ApiError::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Internal { .. } => {
                error!(error = %err, "Internal error");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self {
            status,
            message: err.to_string(),
        }
    }
}

/// The signature every division-scoped rollover handler shares.
type RolloverStep<T> = fn(
    &mut SqlitePersistence,
    &str,
    &AuthenticatedActor,
    &OperatorData,
    Cause,
) -> Result<T, ApiError>;

/// Builds the audit cause for an HTTP request.
fn request_cause(action: &str, operator: &OperatorData) -> Cause {
    let nanos: u128 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_nanos());
    Cause::new(
        format!("http-{action}-{nanos}"),
        format!("{action} requested by {}", operator.login_name),
    )
}

/// Runs a division-scoped rollover handler under the persistence lock.
async fn run_rollover_step<T>(
    app_state: &AppState,
    division: &str,
    actor: &AuthenticatedActor,
    operator: &OperatorData,
    action: &str,
    step: RolloverStep<T>,
) -> Result<Json<T>, HttpError> {
    info!(
        division,
        action,
        login_name = %operator.login_name,
        "Handling rollover request"
    );

    let cause: Cause = request_cause(action, operator);
    let mut persistence = app_state.persistence.lock().await;
    let response: T = step(&mut persistence, division, actor, operator, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/login`.
async fn handle_login(
    AxumState(app_state): AxumState<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, HttpError> {
    info!(login_name = %req.login_name, "Handling login request");

    let mut persistence = app_state.persistence.lock().await;
    let response: LoginResponse = login(&mut persistence, &req)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/logout`.
async fn handle_logout(
    AxumState(app_state): AxumState<AppState>,
    headers: HeaderMap,
) -> Result<Json<WriteResponse>, HttpError> {
    let token: &str = bearer_token(&headers)?;

    let mut persistence = app_state.persistence.lock().await;
    logout(&mut persistence, token)?;
    drop(persistence);

    Ok(Json(WriteResponse {
        success: true,
        message: Some(String::from("Logged out")),
    }))
}

/// Handler for POST `/rollover/{division}/request`.
///
/// Shows the confirmation prompt and resets identity confirmation.
async fn handle_request_confirmation(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<ConfirmationPromptResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "request_confirmation",
        request_confirmation,
    )
    .await
}

/// Handler for POST `/rollover/{division}/confirm`.
async fn handle_confirm_identity(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
    Json(req): Json<ConfirmIdentityRequest>,
) -> Result<Json<WorkflowResponse>, HttpError> {
    info!(
        division = %division,
        login_name = %operator.login_name,
        "Handling identity confirmation"
    );

    let cause: Cause = request_cause("confirm_identity", &operator);
    let mut persistence = app_state.persistence.lock().await;
    let response: WorkflowResponse =
        confirm_identity(&mut persistence, &division, &req, &actor, &operator, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for POST `/rollover/{division}/admit`.
async fn handle_admit_workflow(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<WorkflowResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "admit_workflow",
        admit_workflow,
    )
    .await
}

/// Handler for POST `/rollover/{division}/precheck`.
async fn handle_precheck(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<PrecheckResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "run_precheck",
        run_precheck,
    )
    .await
}

/// Handler for POST `/rollover/{division}/archive/placement`.
async fn handle_archive_placement(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<BatchStageResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "archive_academic_placement",
        archive_academic_placement,
    )
    .await
}

/// Handler for POST `/rollover/{division}/archive/attendance`.
async fn handle_archive_attendance(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<BatchStageResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "archive_attendance",
        archive_attendance,
    )
    .await
}

/// Handler for POST `/rollover/{division}/archive/fees`.
async fn handle_archive_fees(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<BatchStageResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "archive_fee_position",
        archive_fee_position,
    )
    .await
}

/// Handler for POST `/rollover/{division}/transition`.
async fn handle_transition_students(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<BatchStageResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "transition_students",
        transition_students,
    )
    .await
}

/// Handler for POST `/rollover/{division}/advance`.
async fn handle_advance_term(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<AdvanceTermResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "advance_term",
        advance_term,
    )
    .await
}

/// Handler for POST `/rollover/{division}/abandon`.
async fn handle_abandon_workflow(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
) -> Result<Json<WorkflowResponse>, HttpError> {
    run_rollover_step(
        &app_state,
        &division,
        &actor,
        &operator,
        "abandon_workflow",
        abandon_workflow,
    )
    .await
}

/// Handler for GET `/rollover/{division}/status`.
async fn handle_workflow_status(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(_actor, operator): SessionOperator,
) -> Result<Json<WorkflowStatusResponse>, HttpError> {
    let mut persistence = app_state.persistence.lock().await;
    let response: WorkflowStatusResponse = workflow_status(&mut persistence, &division, &operator)?;
    drop(persistence);

    Ok(Json(response))
}

/// Handler for PUT `/promotion_maps/{division}`.
async fn handle_set_promotion_class(
    AxumState(app_state): AxumState<AppState>,
    Path(division): Path<String>,
    SessionOperator(actor, operator): SessionOperator,
    Json(req): Json<SetPromotionClassRequest>,
) -> Result<Json<SetPromotionClassResponse>, HttpError> {
    info!(
        division = %division,
        entries = req.entries.len(),
        login_name = %operator.login_name,
        "Handling promotion map update"
    );

    let cause: Cause = request_cause("set_promotion_class", &operator);
    let mut persistence = app_state.persistence.lock().await;
    let response: SetPromotionClassResponse =
        set_promotion_class(&mut persistence, &division, &req, &actor, &operator, cause)?;
    drop(persistence);

    Ok(Json(response))
}

/// Builds the application router with all endpoints.
fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/login", post(handle_login))
        .route("/logout", post(handle_logout))
        .route("/rollover/{division}/request", post(handle_request_confirmation))
        .route("/rollover/{division}/confirm", post(handle_confirm_identity))
        .route("/rollover/{division}/admit", post(handle_admit_workflow))
        .route("/rollover/{division}/precheck", post(handle_precheck))
        .route(
            "/rollover/{division}/archive/placement",
            post(handle_archive_placement),
        )
        .route(
            "/rollover/{division}/archive/attendance",
            post(handle_archive_attendance),
        )
        .route("/rollover/{division}/archive/fees", post(handle_archive_fees))
        .route(
            "/rollover/{division}/transition",
            post(handle_transition_students),
        )
        .route("/rollover/{division}/advance", post(handle_advance_term))
        .route("/rollover/{division}/abandon", post(handle_abandon_workflow))
        .route("/rollover/{division}/status", get(handle_workflow_status))
        .route("/promotion_maps/{division}", put(handle_set_promotion_class))
        .with_state(app_state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Initializing Term Rollover Server");

    let persistence: SqlitePersistence = if let Some(url) = &args.mysql_url {
        info!("Using MySQL database");
        SqlitePersistence::new_with_mysql(url)?
    } else if let Some(db_path) = &args.database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    };

    let app_state: AppState = AppState {
        persistence: Arc::new(Mutex::new(persistence)),
    };

    let app: Router = build_router(app_state);

    let addr: std::net::SocketAddr = format!("{}:{}", args.bind, args.port).parse()?;
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[cfg(test)]
mod tests;
