//! Typed access to the auth cookie triple.
//! The authenticated account is the cookie triple (token, role, email) with
//! one shared expiry. Partial state reads as "not authenticated" downstream;
//! role values that are not one of the two known literals read as absent.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SessionConfig;
use crate::error::StorageResult;
use crate::jar::{CookieAttributes, CookieJar};
use crate::store::StoreHandle;

pub const AUTH_TOKEN_COOKIE: &str = "authToken";
pub const USER_ROLE_COOKIE: &str = "userRole";
pub const USER_EMAIL_COOKIE: &str = "userEmail";

/// Keys of the retired shared-store credential scheme. Read once at startup
/// for migration, deleted on every logout for cleanup.
pub const LEGACY_TOKEN_KEY: &str = "token";
pub const LEGACY_EMAIL_KEY: &str = "email";
pub const LEGACY_AUTH_TOKEN_KEY: &str = "authToken";

/// Account kind. Decides which protected routes a session may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Nurse,
    Employer,
}

impl Role {
    /// Fail-closed parse: anything but the two known literals is `None`.
    pub fn parse(raw: &str) -> Option<Role> {
        match raw {
            "Nurse" => Some(Role::Nurse),
            "Employer" => Some(Role::Employer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Nurse => "Nurse",
            Role::Employer => "Employer",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw cookie read-out; each field independently nullable. The role is the
/// unvalidated cookie value, use [`AuthCookies::user_role`] for the checked
/// variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthData {
    pub token: Option<String>,
    pub role: Option<String>,
    pub email: Option<String>,
}

/// Accessor over the auth cookie triple and the legacy shared-store keys.
#[derive(Clone)]
pub struct AuthCookies {
    jar: CookieJar,
    store: StoreHandle,
    config: SessionConfig,
}

impl AuthCookies {
    pub fn new(jar: &CookieJar, store: &StoreHandle, config: &SessionConfig) -> Self {
        Self { jar: jar.clone(), store: store.clone(), config: config.clone() }
    }

    pub fn set_auth_cookies(&self, token: &str, role: Role, email: &str) -> StorageResult<()> {
        let attrs = CookieAttributes::for_config(&self.config);
        self.jar.set(AUTH_TOKEN_COOKIE, token, &attrs)?;
        self.jar.set(USER_ROLE_COOKIE, role.as_str(), &attrs)?;
        self.jar.set(USER_EMAIL_COOKIE, email, &attrs)?;
        Ok(())
    }

    // Fail-open single read: a jar failure reads as an absent cookie.
    fn read_cookie(&self, name: &str) -> Option<String> {
        match self.jar.get(name) {
            Ok(v) => v,
            Err(e) => {
                warn!(target: "auth", "cookie read failed for '{}': {}", name, e);
                None
            }
        }
    }

    pub fn auth_data(&self) -> AuthData {
        AuthData {
            token: self.read_cookie(AUTH_TOKEN_COOKIE),
            role: self.read_cookie(USER_ROLE_COOKIE),
            email: self.read_cookie(USER_EMAIL_COOKIE),
        }
    }

    /// Remove the auth triple and purge the legacy keys. Idempotent.
    pub fn clear_auth_cookies(&self) {
        for name in [AUTH_TOKEN_COOKIE, USER_ROLE_COOKIE, USER_EMAIL_COOKIE] {
            if let Err(e) = self.jar.remove(name, &self.config.cookie_path) {
                warn!(target: "auth", "cookie remove failed for '{}': {}", name, e);
            }
        }
        for key in [LEGACY_TOKEN_KEY, LEGACY_EMAIL_KEY, LEGACY_AUTH_TOKEN_KEY] {
            self.store.remove(key);
        }
    }

    /// True iff the token cookie is present. Role and email are not
    /// re-validated here: a session can report authenticated while
    /// [`Self::user_role`] returns `None`. Consumers that gate on role must
    /// check the role themselves.
    pub fn is_authenticated(&self) -> bool {
        self.read_cookie(AUTH_TOKEN_COOKIE).is_some()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.read_cookie(USER_ROLE_COOKIE).and_then(|raw| Role::parse(&raw))
    }

    /// One-time shim for sessions created under the retired shared-store
    /// scheme: if legacy credentials exist and no auth cookie is set yet,
    /// infer the role from the current location and write cookies. Existing
    /// cookies are never overwritten.
    pub fn migrate_from_legacy_store(&self, current_path: &str) {
        if self.is_authenticated() {
            return;
        }
        let token = self.store.get(LEGACY_TOKEN_KEY).or_else(|| self.store.get(LEGACY_AUTH_TOKEN_KEY));
        let email = self.store.get(LEGACY_EMAIL_KEY);
        let (Some(token), Some(email)) = (token, email) else { return };
        let role = if current_path.contains("EmployerDashboard") { Role::Employer } else { Role::Nurse };
        info!(target: "auth", "migrating legacy credentials to cookies: email={} role={}", email, role);
        if let Err(e) = self.set_auth_cookies(&token, role, &email) {
            warn!(target: "auth", "legacy migration failed: {}", e);
        }
    }
}
