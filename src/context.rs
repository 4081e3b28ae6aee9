//! Application-wide auth state and the transitions over it.
//! `AuthContext` is the composition root: it owns the cookie accessor, the
//! session registry and the monitor subscription, and exposes a snapshot of
//! the current auth state to the rest of the application.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::auth::{AuthCookies, Role};
use crate::config::SessionConfig;
use crate::error::StorageResult;
use crate::jar::CookieJar;
use crate::session::{enforce_session_sync, ForeignLogin, SessionRegistry, TabIdentity};
use crate::store::{StoreHandle, Subscription};

/// Notice raised when another account signs in from a different tab.
pub const EVICTION_NOTICE: &str =
    "You have been logged out because another account was logged in from a different tab";

/// Surface the core raises UI effects on: a user-visible notice and a
/// full-page navigation. Frontends bridge this to their toolkit; the default
/// implementation only logs.
pub trait Shell: Send + Sync {
    fn notify(&self, message: &str);
    fn navigate(&self, path: &str);
}

pub struct TracingShell;

impl Shell for TracingShell {
    fn notify(&self, message: &str) {
        info!(target: "shell", "notice: {}", message);
    }
    fn navigate(&self, path: &str) {
        info!(target: "shell", "navigate: {}", path);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// Reactive auth snapshot. `is_authenticated` tracks token presence only;
/// `user` is populated when the whole triple reads back cleanly, so a token
/// with a corrupted role cookie yields `is_authenticated == true` with
/// `user == None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<AuthUser>,
}

pub struct AuthContext {
    auth: AuthCookies,
    registry: SessionRegistry,
    state: Arc<RwLock<AuthState>>,
    shell: Arc<dyn Shell>,
    monitor: Option<Subscription>,
}

impl AuthContext {
    /// Bring the context up for one tab: run the legacy-credential
    /// migration, load cookie state, then start watching for foreign logins.
    /// The monitor lives as long as the context (or until [`Self::unmount`]).
    pub fn mount(
        jar: &CookieJar,
        store: &StoreHandle,
        identity: &TabIdentity,
        config: &SessionConfig,
        shell: Arc<dyn Shell>,
        current_path: &str,
    ) -> Self {
        let auth = AuthCookies::new(jar, store, config);
        let registry = SessionRegistry::new(store.clone(), identity.clone());
        auth.migrate_from_legacy_store(current_path);

        let state = Arc::new(RwLock::new(AuthState::default()));
        let mut ctx = Self {
            auth: auth.clone(),
            registry: registry.clone(),
            state: state.clone(),
            shell: shell.clone(),
            monitor: None,
        };
        ctx.refresh_auth();

        // Forced logout: reset state synchronously, then notice + home.
        let handler_shell = shell.clone();
        let on_forced_logout: Box<dyn Fn(&ForeignLogin) + Send + Sync> =
            Box::new(move |_foreign: &ForeignLogin| {
                *state.write() = AuthState::default();
                handler_shell.notify(EVICTION_NOTICE);
                handler_shell.navigate("/");
            });
        ctx.monitor = Some(enforce_session_sync(auth, registry, shell, Some(on_forced_logout)));
        ctx
    }

    /// Record a verified login. Callers have already checked the credentials
    /// against the identity backend; no network I/O happens here.
    pub fn login(&self, token: &str, role: Role, email: &str) -> StorageResult<()> {
        self.auth.set_auth_cookies(token, role, email)?;
        self.registry.register_session(role, email);
        *self.state.write() = AuthState {
            is_authenticated: true,
            user: Some(AuthUser { email: email.to_string(), role, token: token.to_string() }),
        };
        info!(target: "auth", "login: email={} role={}", email, role);
        Ok(())
    }

    pub fn logout(&self) {
        self.auth.clear_auth_cookies();
        self.registry.clear_session();
        *self.state.write() = AuthState::default();
        info!(target: "auth", "logout");
        self.shell.navigate("/");
    }

    /// Idempotent cookie-to-state reconciliation.
    pub fn refresh_auth(&self) {
        let data = self.auth.auth_data();
        let user = match (data.token, self.auth.user_role(), data.email) {
            (Some(token), Some(role), Some(email)) => Some(AuthUser { email, role, token }),
            _ => None,
        };
        *self.state.write() = AuthState { is_authenticated: self.auth.is_authenticated(), user };
    }

    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn user_role(&self) -> Option<Role> {
        self.auth.user_role()
    }

    /// Stop reacting to foreign logins. Also happens when the context drops.
    pub fn unmount(&mut self) {
        if let Some(sub) = self.monitor.take() {
            sub.cancel();
        }
    }
}
