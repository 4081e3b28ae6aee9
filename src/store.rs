//! Origin-scoped shared store with cross-tab change notification.
//! This is the coordination channel between tabs: one value per key, last
//! write wins, no history. Writes go through a per-tab `StoreHandle`;
//! watchers registered by the writing tab are not notified (same-tab writes
//! do not self-notify), all others receive the change synchronously.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

/// Change notification delivered to watchers in other tabs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: String,
    /// New value for the key; `None` means the key was removed.
    pub value: Option<String>,
}

type WatchFn = Arc<dyn Fn(&StoreEvent) + Send + Sync>;

struct Watcher {
    id: Uuid,
    owner_tab: String,
    callback: WatchFn,
}

#[derive(Default)]
struct StoreInner {
    entries: HashMap<String, String>,
    watchers: Vec<Watcher>,
}

/// The store shared by every tab of the origin.
#[derive(Clone, Default)]
pub struct SharedStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open this store as a specific tab. The handle's tab id decides which
    /// watchers are skipped when the handle writes.
    pub fn handle(&self, tab_id: &str) -> StoreHandle {
        StoreHandle { store: self.clone(), tab_id: tab_id.to_string() }
    }

    fn notify(&self, writer_tab: &str, event: StoreEvent) {
        // Collect matching callbacks under the lock, invoke outside it:
        // a callback is allowed to write back into the store.
        let callbacks: Vec<WatchFn> = {
            let inner = self.inner.read();
            inner
                .watchers
                .iter()
                .filter(|w| w.owner_tab != writer_tab)
                .map(|w| w.callback.clone())
                .collect()
        };
        for cb in callbacks {
            cb(&event);
        }
    }
}

/// A tab's connection to the shared store.
#[derive(Clone)]
pub struct StoreHandle {
    store: SharedStore,
    tab_id: String,
}

impl StoreHandle {
    pub fn tab_id(&self) -> &str {
        &self.tab_id
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.store.inner.read().entries.get(key).cloned()
    }

    /// Write a key, unconditionally overwriting, and notify the other tabs.
    pub fn set(&self, key: &str, value: &str) {
        self.store.inner.write().entries.insert(key.to_string(), value.to_string());
        self.store.notify(
            &self.tab_id,
            StoreEvent { key: key.to_string(), value: Some(value.to_string()) },
        );
    }

    /// Delete a key. Other tabs observe the removal as a `None` value.
    pub fn remove(&self, key: &str) {
        let existed = self.store.inner.write().entries.remove(key).is_some();
        if existed {
            self.store.notify(&self.tab_id, StoreEvent { key: key.to_string(), value: None });
        }
    }

    /// Register a change watcher owned by this tab. The watcher never sees
    /// this tab's own writes. Dropping (or cancelling) the returned
    /// `Subscription` detaches it.
    pub fn watch<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&StoreEvent) + Send + Sync + 'static,
    {
        let id = Uuid::new_v4();
        self.store.inner.write().watchers.push(Watcher {
            id,
            owner_tab: self.tab_id.clone(),
            callback: Arc::new(callback),
        });
        debug!(target: "session", "watch registered: tab={} id={}", self.tab_id, id);
        Subscription { inner: Arc::downgrade(&self.store.inner), id, active: true }
    }
}

/// Detaches its watcher when cancelled or dropped.
pub struct Subscription {
    inner: Weak<RwLock<StoreInner>>,
    id: Uuid,
    active: bool,
}

impl Subscription {
    pub fn cancel(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(inner) = self.inner.upgrade() {
            inner.write().watchers.retain(|w| w.id != self.id);
            debug!(target: "session", "watch detached: id={}", self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}
