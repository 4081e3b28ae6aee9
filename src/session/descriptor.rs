use serde::{Deserialize, Serialize};

use crate::auth::Role;

/// Record published to the shared store naming which (tab, account) most
/// recently logged in. Overwritten whole on every login, cleared on logout;
/// the store holds at most one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabSessionDescriptor {
    pub session_id: String,
    pub role: Role,
    pub email: String,
    /// Publish time in epoch milliseconds. Non-decreasing per tab, not
    /// ordered across tabs.
    pub timestamp: i64,
}
