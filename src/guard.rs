//! Role-scoped route protection for the gateway.
//! The decision logic is plain functions over (path, cookies) so it can be
//! exercised without a server; the axum layer parses the `Cookie` header,
//! applies the decision and stamps the security response headers.

use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use tracing::info;

use crate::auth::{Role, AUTH_TOKEN_COOKIE, USER_ROLE_COOKIE};
use crate::jar::parse_cookie_header;

pub const EMPLOYER_LOGIN_PATH: &str = "/EmployerLogin";
pub const NURSE_LOGIN_PATH: &str = "/nurseLogin";

/// A protected path prefix and the role allowed through it.
#[derive(Debug, Clone, Copy)]
pub struct RouteRule {
    pub prefix: &'static str,
    pub required_role: Role,
    pub login_path: &'static str,
}

pub const PROTECTED_ROUTES: &[RouteRule] = &[
    RouteRule { prefix: "/EmployerDashboard", required_role: Role::Employer, login_path: EMPLOYER_LOGIN_PATH },
    RouteRule { prefix: "/Applicants", required_role: Role::Employer, login_path: EMPLOYER_LOGIN_PATH },
    RouteRule { prefix: "/nurseProfile", required_role: Role::Nurse, login_path: NURSE_LOGIN_PATH },
    RouteRule { prefix: "/joblist", required_role: Role::Nurse, login_path: NURSE_LOGIN_PATH },
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    Allow,
    /// Send the request to the matched rule's login page, carrying the
    /// original path in a `redirect` query parameter.
    RedirectToLogin { login_path: &'static str, redirect: String },
}

impl RouteDecision {
    /// Target location for the redirect variants.
    pub fn location(&self) -> Option<String> {
        match self {
            RouteDecision::Allow => None,
            RouteDecision::RedirectToLogin { login_path, redirect } => {
                Some(format!("{}?redirect={}", login_path, urlencoding::encode(redirect)))
            }
        }
    }
}

/// Gate a path on the presented token and (validated) role. Requests that
/// are unauthenticated, carry an unreadable role, or carry the wrong role
/// are all sent to the matched rule's login page.
pub fn evaluate(path: &str, token: Option<&str>, role: Option<Role>) -> RouteDecision {
    let Some(rule) = PROTECTED_ROUTES.iter().find(|r| path.starts_with(r.prefix)) else {
        return RouteDecision::Allow;
    };
    if token.is_some() && role == Some(rule.required_role) {
        return RouteDecision::Allow;
    }
    RouteDecision::RedirectToLogin { login_path: rule.login_path, redirect: path.to_string() }
}

/// Standard security headers stamped on every matched response.
pub fn apply_security_headers(headers: &mut HeaderMap) {
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert("x-content-type-options", HeaderValue::from_static("nosniff"));
    headers.insert("x-xss-protection", HeaderValue::from_static("1; mode=block"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
}

/// Axum middleware wrapping [`evaluate`] + [`apply_security_headers`].
pub async fn guard_layer(req: Request, next: Next) -> Response {
    let path = req.uri().path().to_string();
    let cookie_raw = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let token = parse_cookie_header(&cookie_raw, AUTH_TOKEN_COOKIE);
    let role = parse_cookie_header(&cookie_raw, USER_ROLE_COOKIE).and_then(|raw| Role::parse(&raw));

    let decision = evaluate(&path, token.as_deref(), role);
    let mut response = match decision.location() {
        None => next.run(req).await,
        Some(location) => {
            info!(target: "guard", "redirecting {} -> {}", path, location);
            Redirect::temporary(&location).into_response()
        }
    };
    apply_security_headers(response.headers_mut());
    response
}
