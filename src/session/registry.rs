use chrono::Utc;
use tracing::{debug, info, warn};

use crate::auth::Role;
use crate::store::StoreHandle;

use super::descriptor::TabSessionDescriptor;
use super::identity::TabIdentity;

/// Well-known shared-store key holding the current session descriptor.
pub const ACTIVE_SESSION_KEY: &str = "activeUserSession";

/// Publishes and inspects this tab's claim on the active session.
#[derive(Clone)]
pub struct SessionRegistry {
    handle: StoreHandle,
    identity: TabIdentity,
}

impl SessionRegistry {
    pub fn new(handle: StoreHandle, identity: TabIdentity) -> Self {
        Self { handle, identity }
    }

    pub fn handle(&self) -> &StoreHandle {
        &self.handle
    }

    pub fn identity(&self) -> &TabIdentity {
        &self.identity
    }

    /// Publish a descriptor for this tab, unconditionally overwriting any
    /// prior value. Last writer wins across tabs.
    pub fn register_session(&self, role: Role, email: &str) {
        let desc = TabSessionDescriptor {
            session_id: self.identity.id().to_string(),
            role,
            email: email.to_string(),
            timestamp: Utc::now().timestamp_millis(),
        };
        match serde_json::to_string(&desc) {
            Ok(raw) => {
                self.handle.set(ACTIVE_SESSION_KEY, &raw);
                info!(target: "session", "session registered: tab={} role={} email={}", desc.session_id, role, email);
            }
            Err(e) => warn!(target: "session", "descriptor encode failed: {}", e),
        }
    }

    /// Whether this tab still owns the stored descriptor. No descriptor at
    /// all counts as active (nothing has taken over); an unreadable
    /// descriptor does not.
    pub fn is_active_session(&self) -> bool {
        let Some(raw) = self.handle.get(ACTIVE_SESSION_KEY) else { return true };
        match serde_json::from_str::<TabSessionDescriptor>(&raw) {
            Ok(desc) => desc.session_id == self.identity.id(),
            Err(e) => {
                debug!(target: "session", "descriptor parse failed: {}", e);
                false
            }
        }
    }

    /// Delete the shared descriptor.
    pub fn clear_session(&self) {
        self.handle.remove(ACTIVE_SESSION_KEY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SharedStore;

    fn registry_for(store: &SharedStore, tab: &str) -> SessionRegistry {
        SessionRegistry::new(store.handle(tab), TabIdentity::from_id(tab))
    }

    #[test]
    fn no_descriptor_counts_as_active() {
        let store = SharedStore::new();
        assert!(registry_for(&store, "tab_a").is_active_session());
    }

    #[test]
    fn registration_claims_the_session() {
        let store = SharedStore::new();
        let a = registry_for(&store, "tab_a");
        let b = registry_for(&store, "tab_b");

        a.register_session(Role::Nurse, "a@x.com");
        assert!(a.is_active_session());
        assert!(!b.is_active_session());

        // last writer wins
        b.register_session(Role::Employer, "b@x.com");
        assert!(!a.is_active_session());
        assert!(b.is_active_session());
    }

    #[test]
    fn unreadable_descriptor_is_not_ours() {
        let store = SharedStore::new();
        let a = registry_for(&store, "tab_a");
        store.handle("tab_b").set(ACTIVE_SESSION_KEY, "{not json");
        assert!(!a.is_active_session());
    }

    #[test]
    fn clear_removes_the_descriptor() {
        let store = SharedStore::new();
        let a = registry_for(&store, "tab_a");
        a.register_session(Role::Nurse, "a@x.com");
        a.clear_session();
        assert_eq!(store.handle("tab_b").get(ACTIVE_SESSION_KEY), None);
        assert!(a.is_active_session());
    }
}
