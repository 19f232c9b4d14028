//! # Snapshot Transitions

use chrono::{DateTime, Utc};
use shared_types::HubIdentity;

/// Membership change between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionChange {
    /// Both snapshots agree on the connection state and deed.
    Unchanged,
    /// The hub became connected.
    Connected,
    /// The hub is no longer connected.
    Disconnected,
    /// Still connected, but under another deed.
    DeedChanged,
}

impl ConnectionChange {
    /// Compare `previous` and `next` at `now`. `None` is "not connected".
    pub fn between(
        previous: Option<&HubIdentity>,
        next: Option<&HubIdentity>,
        now: DateTime<Utc>,
    ) -> Self {
        let was = previous.filter(|hub| hub.is_connected_at(now));
        let is = next.filter(|hub| hub.is_connected_at(now));
        match (was, is) {
            (None, None) => Self::Unchanged,
            (None, Some(_)) => Self::Connected,
            (Some(_), None) => Self::Disconnected,
            (Some(old), Some(new)) if old.deed_id != new.deed_id => Self::DeedChanged,
            (Some(_), Some(_)) => Self::Unchanged,
        }
    }
}
