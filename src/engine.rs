//! Engine orchestration: subscribe, unsubscribe, broadcast.

use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error};

use crate::broker::EventSink;
use crate::error::{CallbackError, EngineError, Result};
use crate::events::{OracleEvent, SpecStatus};
use crate::spec::OracleSpec;
use crate::subscriptions::{OnMatchedData, SubscriptionRegistry, SubscriptionUpdate};
use crate::time::TimeSource;
use crate::types::{OracleData, Property, SubscriptionId};

/// Closure that removes the subscription it was created for.
///
/// Calling it after the engine is gone is a no-op.
pub type Unsubscriber = Box<dyn FnOnce() + Send>;

/// External capability notified at spec lifecycle transitions.
///
/// Listeners fire only when a spec's registry entry gains its first
/// subscriber or loses its last one, never on intermediate adds and
/// removes.
pub trait SpecActivationListener: Send + Sync {
    /// Called when a spec gains its first subscriber. Returning an error
    /// aborts the subscribe call; no subscription stays registered.
    fn on_spec_activated(&self, spec: &OracleSpec) -> std::result::Result<(), CallbackError>;

    /// Called when a spec loses its last subscriber.
    fn on_spec_deactivated(&self, spec: &OracleSpec);
}

/// The subscription and matching engine.
///
/// Consumers subscribe validated [`OracleSpec`]s with a callback;
/// producers broadcast [`OracleData`] packets. On a match the engine
/// invokes the callbacks of every matching spec and emits one aggregated
/// match event to the sink. Registry mutations never hold the lock across
/// a callback or listener invocation, so callbacks may re-enter the
/// engine freely.
pub struct Engine {
    registry: SubscriptionRegistry,
    listeners: RwLock<Vec<Arc<dyn SpecActivationListener>>>,
    broker: Arc<dyn EventSink>,
    clock: Arc<dyn TimeSource>,
}

impl Engine {
    /// Create an engine over an event sink and a time source.
    pub fn new(broker: Arc<dyn EventSink>, clock: Arc<dyn TimeSource>) -> Self {
        Self {
            registry: SubscriptionRegistry::new(),
            listeners: RwLock::new(Vec::new()),
            broker,
            clock,
        }
    }

    /// Subscribe a spec with a callback invoked on every matching packet.
    ///
    /// On the spec's first subscriber, every registered activation
    /// listener is notified before the activation event goes out; if any
    /// listener fails, the registration is rolled back and the error
    /// returned. Every subscribe (first or not) emits one lifecycle event
    /// carrying the entry's activation timestamp.
    ///
    /// Returns the subscription id and a closure that unsubscribes it.
    pub fn subscribe(
        self: &Arc<Self>,
        spec: OracleSpec,
        callback: OnMatchedData,
    ) -> Result<(SubscriptionId, Unsubscriber)> {
        let now = self.clock.now();
        let (update, first) = self.registry.add_subscriber(spec, callback, now);

        if first {
            for listener in self.listeners() {
                if let Err(e) = listener.on_spec_activated(&update.spec) {
                    // Activation never completed: roll the registration
                    // back without a deactivation event or notification.
                    self.registry.remove_subscriber(update.subscription_id);
                    return Err(EngineError::SpecActivationFailed(e.to_string()));
                }
            }
        }

        self.broker
            .send(Self::lifecycle_event(&update, SpecStatus::Active));
        debug!(
            spec = %update.spec.id(),
            subscription = %update.subscription_id,
            first,
            "Subscription added"
        );

        let id = update.subscription_id;
        let engine = Arc::downgrade(self);
        let unsubscriber: Unsubscriber = Box::new(move || {
            if let Some(engine) = engine.upgrade() {
                engine.unsubscribe(id);
            }
        });
        Ok((id, unsubscriber))
    }

    /// Remove a subscription.
    ///
    /// On the spec's last subscriber, emits a deactivation event and then
    /// notifies every activation listener. Panics if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) {
        let (update, last) = self.registry.remove_subscriber(id);

        if last {
            self.broker
                .send(Self::lifecycle_event(&update, SpecStatus::Deactivated));
            for listener in self.listeners() {
                listener.on_spec_deactivated(&update.spec);
            }
        }
        debug!(spec = %update.spec.id(), subscription = %id, last, "Subscription removed");
    }

    /// Broadcast a packet to every matching spec's subscribers.
    ///
    /// Evaluation is all-or-nothing: a conversion error against any live
    /// spec fails the whole call with zero deliveries. Callback errors are
    /// logged and do not stop delivery to remaining subscribers. Exactly
    /// one match event is emitted when at least one spec matched; none
    /// otherwise.
    pub fn broadcast_data(&self, data: OracleData) -> Result<()> {
        let (matched, callbacks) = self
            .registry
            .filter_subscribers(|spec| spec.match_data(&data))?;

        if matched.is_empty() {
            debug!(
                properties = data.properties.len(),
                signers = data.signers.len(),
                "No spec matched broadcast data"
            );
            return Ok(());
        }

        for callback in &callbacks {
            if let Err(e) = callback(&data) {
                error!(error = %e, "Matched data callback failed");
            }
        }

        let matched_count = matched.len();
        let subscriber_count = callbacks.len();

        let OracleData {
            signers,
            properties,
            metadata,
        } = data;
        let properties = properties
            .into_iter()
            .map(|(name, value)| Property { name, value })
            .collect();

        self.broker.send(OracleEvent::DataMatch {
            matched_specs: matched,
            properties,
            metadata,
            signers,
            broadcast_at: self.clock.now(),
        });
        debug!(
            specs = matched_count,
            subscribers = subscriber_count,
            "Broadcast matched"
        );
        Ok(())
    }

    /// True iff at least one live spec's signer set authorizes the packet.
    ///
    /// Cheap pre-check for producers deciding whether to build and
    /// broadcast a packet at all; no filter evaluation happens.
    pub fn listens_to_signers(&self, data: &OracleData) -> bool {
        self.registry
            .has_any_subscribers(|spec| spec.match_signers(data))
    }

    /// Evaluate the full match predicate without invoking callbacks or
    /// emitting events.
    pub fn has_match(&self, data: &OracleData) -> Result<bool> {
        let (matched, _) = self
            .registry
            .filter_subscribers(|spec| spec.match_data(data))?;
        Ok(!matched.is_empty())
    }

    /// Register an activation listener. Notification order is
    /// registration order.
    pub fn add_spec_activation_listener(&self, listener: Arc<dyn SpecActivationListener>) {
        self.listeners.write().push(listener);
    }

    /// Number of live subscriptions.
    pub fn subscription_count(&self) -> usize {
        self.registry.subscription_count()
    }

    fn listeners(&self) -> Vec<Arc<dyn SpecActivationListener>> {
        self.listeners.read().clone()
    }

    fn lifecycle_event(update: &SubscriptionUpdate, status: SpecStatus) -> OracleEvent {
        OracleEvent::SpecSubscription {
            spec_id: update.spec.id(),
            definition: update.spec.definition().clone(),
            status,
            activated_at: update.activated_at,
        }
    }
}
