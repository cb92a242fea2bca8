//! Error types for the oracle engine.

use crate::spec::{Operator, PropertyType};
use thiserror::Error;

/// Main error type for engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("a property key is required")]
    EmptyPropertyKey,

    #[error("multiple same key in filter list")]
    DuplicatePropertyKey,

    #[error("invalid time condition")]
    InvalidTimeCondition,

    #[error("operator {operator} not supported for type {kind}")]
    UnsupportedOperator {
        operator: Operator,
        kind: PropertyType,
    },

    #[error("value {value:?} is not a valid {expected}")]
    InvalidPropertyValue {
        value: String,
        expected: PropertyType,
    },

    #[error("bound property {0:?} not filtered by oracle spec")]
    PropertyNotFiltered(String),

    #[error("bound type \"{bound}\" doesn't match filtered property type \"{filtered}\"")]
    PropertyTypeMismatch {
        bound: PropertyType,
        filtered: PropertyType,
    },

    #[error("spec activation failed: {0}")]
    SpecActivationFailed(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(e: serde_json::Error) -> Self {
        EngineError::Serialization(e.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error type returned by subscriber callbacks and activation listeners.
///
/// Callback failures are foreign to the engine; it records them without
/// inspecting their shape.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;
