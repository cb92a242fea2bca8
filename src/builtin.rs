//! Reserved vocabulary for internally generated data.
//!
//! The engine reserves a property-key namespace for data it produces
//! itself, currently the periodic timestamp tick. Packets whose every
//! property key lives in this namespace bypass signer authorization, and
//! definitions filtering on it are self-authorizing.

use crate::spec::{Filter, Operator, PropertyType};
use crate::types::{OracleData, UnixTs};

/// Property-key prefix reserved for internally generated data.
pub const BUILTIN_PREFIX: &str = "oraclebus.builtin";

/// Property key carrying the timestamp tick.
pub const TIMESTAMP_KEY: &str = "oraclebus.builtin.timestamp";

/// Build the packet for one timestamp tick.
pub fn timestamp_data(now: UnixTs) -> OracleData {
    OracleData::new().with_property(TIMESTAMP_KEY, now.0.to_string())
}

/// Build a time-trigger filter on the timestamp tick.
pub fn timestamp_filter(operator: Operator, value: impl Into<String>) -> Filter {
    Filter::new(TIMESTAMP_KEY, PropertyType::Timestamp).with_condition(operator, value)
}
