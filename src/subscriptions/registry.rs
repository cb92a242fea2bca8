//! Thread-safe subscription registry.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{CallbackError, Result};
use crate::spec::OracleSpec;
use crate::types::{OracleData, SpecId, SubscriptionId, UnixTs};

/// Callback invoked with each packet matching a subscribed spec.
pub type OnMatchedData =
    Arc<dyn Fn(&OracleData) -> std::result::Result<(), CallbackError> + Send + Sync>;

/// One live subscription.
struct Subscription {
    id: SubscriptionId,
    callback: OnMatchedData,
}

/// One spec together with its subscribers, in subscription order.
struct SpecEntry {
    spec: Arc<OracleSpec>,
    /// When this entry gained its first subscriber.
    activated_at: UnixTs,
    subscribers: Vec<Subscription>,
}

/// The registry's single lock-guarded aggregate: entries in registration
/// order, the reverse index, and the id allocator.
#[derive(Default)]
struct RegistryInner {
    entries: Vec<SpecEntry>,
    by_subscription: HashMap<SubscriptionId, SpecId>,
    next_id: u64,
}

/// Snapshot of a registry mutation, for the engine to build events from.
pub struct SubscriptionUpdate {
    pub subscription_id: SubscriptionId,
    pub spec: Arc<OracleSpec>,
    pub activated_at: UnixTs,
}

/// Maps specs to their live subscribers.
///
/// Structurally-equal specs share one entry (keyed by content id).
/// Subscription ids are process-unique and never reused. Lock scope never
/// extends across invocation of a returned callback: callers clone the
/// callbacks out and invoke them after the guard is released.
pub struct SubscriptionRegistry {
    inner: RwLock<RegistryInner>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RegistryInner::default()),
        }
    }

    /// Register a subscriber for a spec.
    ///
    /// Creates the entry (recording `now` as activation time) if this spec
    /// has no live subscribers yet. Returns whether this was the entry's
    /// first-ever subscriber.
    pub fn add_subscriber(
        &self,
        spec: OracleSpec,
        callback: OnMatchedData,
        now: UnixTs,
    ) -> (SubscriptionUpdate, bool) {
        let mut inner = self.inner.write();
        let spec_id = spec.id();

        let existing = inner.entries.iter().position(|e| e.spec.id() == spec_id);
        let (pos, first) = match existing {
            Some(pos) => (pos, false),
            None => {
                inner.entries.push(SpecEntry {
                    spec: Arc::new(spec),
                    activated_at: now,
                    subscribers: Vec::new(),
                });
                (inner.entries.len() - 1, true)
            }
        };

        inner.next_id += 1;
        let id = SubscriptionId(inner.next_id);

        let entry = &mut inner.entries[pos];
        entry.subscribers.push(Subscription { id, callback });
        let update = SubscriptionUpdate {
            subscription_id: id,
            spec: Arc::clone(&entry.spec),
            activated_at: entry.activated_at,
        };

        inner.by_subscription.insert(id, spec_id);
        (update, first)
    }

    /// Remove a subscriber, dropping the owning entry when it was the last.
    ///
    /// Panics if the id is unknown: unsubscribing a foreign or stale id is
    /// a contract violation by the caller, not a recoverable condition.
    pub fn remove_subscriber(&self, id: SubscriptionId) -> (SubscriptionUpdate, bool) {
        let mut inner = self.inner.write();

        let spec_id = match inner.by_subscription.remove(&id) {
            Some(spec_id) => spec_id,
            None => panic!("unknown subscription: {}", id),
        };

        let pos = inner
            .entries
            .iter()
            .position(|e| e.spec.id() == spec_id)
            .expect("reverse index points at a live entry");

        let entry = &mut inner.entries[pos];
        let sub_pos = entry
            .subscribers
            .iter()
            .position(|s| s.id == id)
            .expect("reverse index points at a live subscription");
        entry.subscribers.remove(sub_pos);

        let last = entry.subscribers.is_empty();
        let update = SubscriptionUpdate {
            subscription_id: id,
            spec: Arc::clone(&entry.spec),
            activated_at: entry.activated_at,
        };

        if last {
            inner.entries.remove(pos);
        }
        (update, last)
    }

    /// Evaluate a predicate against every live entry in registration order,
    /// collecting matched spec ids and their subscribers' callbacks in
    /// subscription order.
    ///
    /// Returns on the first predicate error with no partial results.
    pub fn filter_subscribers<F>(&self, predicate: F) -> Result<(Vec<SpecId>, Vec<OnMatchedData>)>
    where
        F: Fn(&OracleSpec) -> Result<bool>,
    {
        let inner = self.inner.read();
        let mut matched_specs = Vec::new();
        let mut callbacks = Vec::new();

        for entry in &inner.entries {
            if !predicate(&entry.spec)? {
                continue;
            }
            matched_specs.push(entry.spec.id());
            callbacks.extend(entry.subscribers.iter().map(|s| Arc::clone(&s.callback)));
        }

        Ok((matched_specs, callbacks))
    }

    /// Fast existence check: does any live entry satisfy the predicate?
    pub fn has_any_subscribers<F>(&self, predicate: F) -> bool
    where
        F: Fn(&OracleSpec) -> bool,
    {
        let inner = self.inner.read();
        inner.entries.iter().any(|e| predicate(&e.spec))
    }

    /// Number of live subscriptions across all entries.
    pub fn subscription_count(&self) -> usize {
        self.inner.read().by_subscription.len()
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
