//! Cross-tab session tracking for the single-active-account policy.
//! One descriptor in the shared store names the most recent login; every
//! other tab compares against its own identity and evicts itself when a
//! different account takes over. Keep the public surface thin and split
//! implementation across sub-modules.

mod descriptor;
mod identity;
mod monitor;
mod registry;

pub use descriptor::TabSessionDescriptor;
pub use identity::TabIdentity;
pub use monitor::{enforce_session_sync, ForeignLogin, SessionMonitor};
pub use registry::{SessionRegistry, ACTIVE_SESSION_KEY};
