//! MedHire session gateway
//! -----------------------
//! Small axum service fronting the role-protected areas of the platform.
//!
//! Responsibilities:
//! - `POST /login` / `POST /logout`: translate an already-verified login
//!   (token, role, email — credential checks happen against the external
//!   identity backend before this endpoint is called) into the auth cookie
//!   triple, and expire it again on logout.
//! - Role-protected demo routes behind the guard middleware.
//! - Security response headers on every route via the same middleware.

use std::net::SocketAddr;

use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};

use crate::auth::{Role, AUTH_TOKEN_COOKIE, USER_EMAIL_COOKIE, USER_ROLE_COOKIE};
use crate::config::SessionConfig;
use crate::guard;
use crate::jar::{self, CookieAttributes};

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: SessionConfig,
}

#[derive(Debug, Deserialize)]
struct LoginPayload {
    token: String,
    role: String,
    email: String,
}

fn append_cookie(headers: &mut HeaderMap, rendered: &str) {
    match HeaderValue::from_str(rendered) {
        Ok(v) => {
            headers.append("Set-Cookie", v);
        }
        Err(e) => warn!(target: "gateway", "unrepresentable cookie value dropped: {}", e),
    }
}

async fn login(State(state): State<AppState>, Json(payload): Json<LoginPayload>) -> impl IntoResponse {
    let Some(role) = Role::parse(&payload.role) else {
        return (
            StatusCode::BAD_REQUEST,
            HeaderMap::new(),
            Json(json!({"status":"error","error":"unknown role"})),
        );
    };
    let attrs = CookieAttributes::for_config(&state.config);
    let mut headers = HeaderMap::new();
    append_cookie(&mut headers, &jar::render_set_cookie(AUTH_TOKEN_COOKIE, &payload.token, &attrs));
    append_cookie(&mut headers, &jar::render_set_cookie(USER_ROLE_COOKIE, role.as_str(), &attrs));
    append_cookie(&mut headers, &jar::render_set_cookie(USER_EMAIL_COOKIE, &payload.email, &attrs));
    info!(target: "gateway", "login recorded: email={} role={}", payload.email, role);
    (StatusCode::OK, headers, Json(json!({"status":"ok"})))
}

async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    for name in [AUTH_TOKEN_COOKIE, USER_ROLE_COOKIE, USER_EMAIL_COOKIE] {
        append_cookie(&mut headers, &jar::render_expired_cookie(name, &state.config.cookie_path));
    }
    (StatusCode::OK, headers, Json(json!({"status":"ok"})))
}

async fn employer_dashboard() -> impl IntoResponse {
    Json(json!({"status":"ok","area":"employer_dashboard"}))
}

async fn applicants() -> impl IntoResponse {
    Json(json!({"status":"ok","area":"applicants"}))
}

async fn nurse_profile() -> impl IntoResponse {
    Json(json!({"status":"ok","area":"nurse_profile"}))
}

async fn job_list() -> impl IntoResponse {
    Json(json!({"status":"ok","area":"joblist"}))
}

/// Build the gateway router; split out so tests can mount it on an
/// ephemeral port.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "medhire gateway ok" }))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/EmployerDashboard", get(employer_dashboard))
        .route("/Applicants", get(applicants))
        .route("/nurseProfile", get(nurse_profile))
        .route("/joblist", get(job_list))
        .layer(axum::middleware::from_fn(guard::guard_layer))
        .with_state(state)
}

pub async fn run_with_port(port: u16) -> anyhow::Result<()> {
    let state = AppState { config: SessionConfig::from_env() };
    let addr: SocketAddr = format!("0.0.0.0:{}", port).parse()?;
    info!("Starting gateway on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app(state)).await?;
    Ok(())
}

/// Convenience entry point using `MEDHIRE_HTTP_PORT` (default 8080).
pub async fn run() -> anyhow::Result<()> {
    let port = std::env::var("MEDHIRE_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(8080);
    run_with_port(port).await
}
