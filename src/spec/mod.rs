//! Oracle spec construction and matching.
//!
//! A spec travels through three shapes:
//! - [`SpecDefinition`]: the raw filters and signers a consumer declares
//! - [`FilterSet`]: those filters validated and compiled for evaluation
//! - [`OracleSpec`]: the immutable, content-identified result handed to
//!   the engine
//!
//! Validation happens exactly once, at [`OracleSpec::new`]; everything
//! downstream works with data that is known well-formed.

mod definition;
mod filters;
mod oracle_spec;

pub use definition::{Condition, Filter, Operator, PropertyKey, PropertyType, SpecDefinition};
pub use filters::FilterSet;
pub use oracle_spec::OracleSpec;
