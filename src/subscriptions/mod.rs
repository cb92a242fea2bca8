//! Subscription bookkeeping.
//!
//! The registry is the engine's only shared mutable state: it maps each
//! live spec to its subscribers, allocates subscription ids, and keeps a
//! reverse index from subscription id to spec. All access goes through a
//! single reader/writer lock; callbacks are cloned out of the lock scope
//! before anyone invokes them, so a callback may re-enter the engine
//! (unsubscribe itself, subscribe a new spec) without deadlocking.

mod registry;

pub use registry::{OnMatchedData, SubscriptionRegistry, SubscriptionUpdate};
