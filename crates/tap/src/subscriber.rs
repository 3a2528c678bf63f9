//! Subscribers and the group registry
//!
//! Each WebSocket connection gets one `Subscriber`: a unique id and the
//! sending half of that connection's outbound frame queue. The
//! `SubscriberRegistry` maps ids to subscribers and groups to member ids.
//!
//! All registry operations take the lock for the duration of a single map
//! update, so join/leave from connection tasks and `members_of` from the
//! broadcaster interleave freely without ever seeing a partial update.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::error::{Result, TapError};

/// Counter for generating unique subscriber IDs
static SUBSCRIBER_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// One connected consumer
#[derive(Debug)]
pub struct Subscriber {
    /// Unique identifier, stable for the connection's lifetime
    id: u64,
    /// Outbound frame queue drained by the connection task
    outbound: mpsc::Sender<Arc<str>>,
}

impl Subscriber {
    /// Create a subscriber around an existing outbound sender
    pub fn new(outbound: mpsc::Sender<Arc<str>>) -> Self {
        Self {
            id: SUBSCRIBER_ID_COUNTER.fetch_add(1, Ordering::Relaxed),
            outbound,
        }
    }

    /// Create a subscriber with a fresh outbound queue of `capacity` frames
    pub fn channel(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Arc::new(Self::new(tx)), rx)
    }

    /// Get the subscriber ID
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Queue a frame for delivery without waiting
    ///
    /// A full queue fails this delivery only; the subscriber stays joined.
    pub fn emit(&self, frame: Arc<str>) -> Result<()> {
        self.outbound.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => TapError::Lagging { id: self.id },
            TrySendError::Closed(_) => TapError::ChannelClosed { id: self.id },
        })
    }
}

#[derive(Debug, Default)]
struct Inner {
    connections: HashMap<u64, Arc<Subscriber>>,
    groups: HashMap<String, HashSet<u64>>,
}

/// Registry of connected subscribers and their group memberships
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    inner: RwLock<Inner>,
}

impl SubscriberRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subscriber to a group
    ///
    /// Registers the subscriber if it is not known yet. Returns `false` if it
    /// was already a member of the group.
    pub fn join(&self, subscriber: &Arc<Subscriber>, group: &str) -> bool {
        let id = subscriber.id();
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        inner
            .connections
            .entry(id)
            .or_insert_with(|| Arc::clone(subscriber));
        inner.groups.entry(group.to_owned()).or_default().insert(id)
    }

    /// Remove a subscriber from every group and forget it
    ///
    /// Returns `false` if the subscriber was not registered.
    pub fn leave(&self, id: u64) -> bool {
        let mut inner = self.inner.write();
        let removed = inner.connections.remove(&id).is_some();

        inner.groups.retain(|_, members| {
            members.remove(&id);
            !members.is_empty()
        });

        removed
    }

    /// Remove a subscriber from one group, keeping it registered
    pub fn leave_group(&self, id: u64, group: &str) -> bool {
        let mut guard = self.inner.write();
        let inner = &mut *guard;

        let Some(members) = inner.groups.get_mut(group) else {
            return false;
        };
        let removed = members.remove(&id);
        if members.is_empty() {
            inner.groups.remove(group);
        }
        removed
    }

    /// Snapshot of a group's members for one broadcast pass
    pub fn members_of(&self, group: &str) -> Vec<Arc<Subscriber>> {
        let inner = self.inner.read();

        inner
            .groups
            .get(group)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| inner.connections.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Groups a subscriber currently belongs to
    pub fn groups_of(&self, id: u64) -> Vec<String> {
        let inner = self.inner.read();

        let mut groups: Vec<String> = inner
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&id))
            .map(|(name, _)| name.clone())
            .collect();
        groups.sort();
        groups
    }

    /// Check if a subscriber is registered
    pub fn contains(&self, id: u64) -> bool {
        self.inner.read().connections.contains_key(&id)
    }

    /// Number of registered subscribers
    pub fn count(&self) -> usize {
        self.inner.read().connections.len()
    }

    /// Number of members in a group
    pub fn group_size(&self, group: &str) -> usize {
        self.inner.read().groups.get(group).map_or(0, HashSet::len)
    }

    /// Check if there are any subscribers
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.read().connections.is_empty()
    }
}

#[cfg(test)]
#[path = "subscriber_test.rs"]
mod tests;
