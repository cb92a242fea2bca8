//! # Oraclebus
//!
//! A subscription and matching engine for signed oracle data feeds:
//! producers push key/value data packets vouched for by signer identities,
//! consumers subscribe typed filter specs and get a callback for every
//! packet that satisfies them.
//!
//! ## Core Concepts
//!
//! - **Specs**: Immutable, content-identified descriptions of wanted data
//!   (required signers + typed property filters)
//! - **Subscriptions**: Per-spec callback registrations with process-unique
//!   ids; structurally-equal specs share one registry entry
//! - **Broadcast**: Packets are matched against every live spec; matching
//!   callbacks fire and one aggregated match event goes to the sink
//! - **Lifecycle**: Specs activate on their first subscriber and deactivate
//!   on their last unsubscribe, with events and listener notifications
//!
//! ## Example
//!
//! ```ignore
//! use oraclebus::{
//!     ChannelBroker, Engine, Filter, OracleData, OracleSpec, Operator,
//!     PropertyType, SpecDefinition, SystemClock, DEFAULT_EVENT_CAPACITY,
//! };
//! use std::sync::Arc;
//!
//! let (broker, events) = ChannelBroker::new(DEFAULT_EVENT_CAPACITY);
//! let engine = Arc::new(Engine::new(Arc::new(broker), Arc::new(SystemClock)));
//!
//! // Subscribe to ETH prices above 42, signed by a known oracle.
//! let spec = OracleSpec::new(
//!     SpecDefinition::new(vec![
//!         Filter::new("prices.ETH.value", PropertyType::Integer)
//!             .with_condition(Operator::GreaterThan, "42"),
//!     ])
//!     .with_signer("0xCAFED00D"),
//! )?;
//! let (id, unsubscribe) = engine.subscribe(spec, Arc::new(|data| {
//!     println!("matched: {:?}", data.properties);
//!     Ok(())
//! }))?;
//!
//! // Broadcast a signed packet.
//! engine.broadcast_data(
//!     OracleData::new()
//!         .with_signer("0xCAFED00D")
//!         .with_property("prices.ETH.value", "1500"),
//! )?;
//!
//! unsubscribe();
//! ```

pub mod broker;
pub mod builtin;
pub mod engine;
pub mod error;
pub mod events;
pub mod spec;
pub mod subscriptions;
pub mod time;
pub mod types;

// Re-exports
pub use broker::{BrokerHandle, ChannelBroker, EventSink, DEFAULT_EVENT_CAPACITY};
pub use builtin::{timestamp_data, timestamp_filter, BUILTIN_PREFIX, TIMESTAMP_KEY};
pub use engine::{Engine, SpecActivationListener, Unsubscriber};
pub use error::{CallbackError, EngineError, Result};
pub use events::{OracleEvent, SpecStatus};
pub use spec::{
    Condition, Filter, FilterSet, Operator, OracleSpec, PropertyKey, PropertyType, SpecDefinition,
};
pub use subscriptions::{OnMatchedData, SubscriptionRegistry, SubscriptionUpdate};
pub use time::{SystemClock, TimeSource};
pub use types::*;
