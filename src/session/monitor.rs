use std::sync::Arc;

use tracing::{debug, warn};

use crate::auth::AuthCookies;
use crate::context::{Shell, EVICTION_NOTICE};
use crate::store::{StoreHandle, Subscription};

use super::descriptor::TabSessionDescriptor;
use super::identity::TabIdentity;
use super::registry::{SessionRegistry, ACTIVE_SESSION_KEY};

/// A login observed from a different tab.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignLogin {
    pub role: crate::auth::Role,
    pub email: String,
}

/// Watches the shared store for logins performed by other tabs.
pub struct SessionMonitor {
    handle: StoreHandle,
    identity: TabIdentity,
}

impl SessionMonitor {
    pub fn new(handle: StoreHandle, identity: TabIdentity) -> Self {
        Self { handle, identity }
    }

    /// Invoke `on_foreign_login` whenever another tab publishes a descriptor
    /// that does not carry this tab's id. Descriptor deletions (logout
    /// cleanup) and unreadable descriptors never trigger. The returned
    /// subscription must be kept alive for the monitor to run and dropped on
    /// teardown.
    pub fn watch<F>(&self, on_foreign_login: F) -> Subscription
    where
        F: Fn(ForeignLogin) + Send + Sync + 'static,
    {
        let own_id = self.identity.id().to_string();
        self.handle.watch(move |ev| {
            if ev.key != ACTIVE_SESSION_KEY {
                return;
            }
            let Some(raw) = ev.value.as_deref() else { return };
            let desc = match serde_json::from_str::<TabSessionDescriptor>(raw) {
                Ok(d) => d,
                Err(e) => {
                    debug!(target: "session", "ignoring unreadable descriptor: {}", e);
                    return;
                }
            };
            if desc.session_id == own_id {
                return;
            }
            on_foreign_login(ForeignLogin { role: desc.role, email: desc.email });
        })
    }
}

/// Monitor plus eviction policy: when another tab logs in under a
/// *different* account, clear this tab's cookies and session claim, then run
/// `on_forced_logout` if provided, else raise the standard notice and send
/// the tab home. A foreign login under the same email (the same account
/// refreshed elsewhere) is left alone, so one account may live in many tabs;
/// the policy is single active *account* per origin, most recent login wins.
pub fn enforce_session_sync(
    auth: AuthCookies,
    registry: SessionRegistry,
    shell: Arc<dyn Shell>,
    on_forced_logout: Option<Box<dyn Fn(&ForeignLogin) + Send + Sync>>,
) -> Subscription {
    let monitor = SessionMonitor::new(registry.handle().clone(), registry.identity().clone());
    monitor.watch(move |foreign| {
        let data = auth.auth_data();
        if data.token.is_none() {
            return;
        }
        if data.email.as_deref() == Some(foreign.email.as_str()) {
            return;
        }
        warn!(
            target: "session",
            "foreign login detected (email={} role={}), evicting this tab's session",
            foreign.email, foreign.role
        );
        auth.clear_auth_cookies();
        registry.clear_session();
        match &on_forced_logout {
            Some(cb) => cb(&foreign),
            None => {
                shell.notify(EVICTION_NOTICE);
                shell.navigate("/");
            }
        }
    })
}
