//! Events emitted to the external event sink.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::spec::SpecDefinition;
use crate::types::{Property, Signer, SpecId, UnixTs};

/// Lifecycle status of a spec's registry entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpecStatus {
    Active,
    Deactivated,
}

/// Events emitted by the engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OracleEvent {
    /// A subscription was added or a spec's last subscription removed.
    ///
    /// Emitted on every subscribe (status `ACTIVE`, including non-first
    /// subscribers) and on the last unsubscribe (status `DEACTIVATED`),
    /// always carrying the entry's activation timestamp.
    SpecSubscription {
        spec_id: SpecId,
        /// The raw definition, re-serialized for the sink.
        definition: SpecDefinition,
        status: SpecStatus,
        activated_at: UnixTs,
    },

    /// A broadcast packet matched at least one live spec.
    ///
    /// One event per broadcast, aggregating every matched spec.
    DataMatch {
        matched_specs: Vec<SpecId>,
        /// Packet properties, sorted by name.
        properties: Vec<Property>,
        metadata: BTreeMap<String, String>,
        signers: Vec<Signer>,
        broadcast_at: UnixTs,
    },
}
