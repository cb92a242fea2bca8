//! Raw oracle spec definitions: the vocabulary consumers use to describe
//! what data they want, before validation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::builtin::BUILTIN_PREFIX;
use crate::error::Result;
use crate::types::{Signer, SpecId};

/// Declared type of a filtered property.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PropertyType {
    Integer,
    Decimal,
    Boolean,
    String,
    Timestamp,
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PropertyType::Integer => "INTEGER",
            PropertyType::Decimal => "DECIMAL",
            PropertyType::Boolean => "BOOLEAN",
            PropertyType::String => "STRING",
            PropertyType::Timestamp => "TIMESTAMP",
        };
        f.write_str(name)
    }
}

/// Comparison operator in a filter condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    Equals,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl Operator {
    /// True for any operator other than equality.
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Operator::Equals)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Operator::Equals => "EQUALS",
            Operator::GreaterThan => "GREATER_THAN",
            Operator::GreaterThanOrEqual => "GREATER_THAN_OR_EQUAL",
            Operator::LessThan => "LESS_THAN",
            Operator::LessThanOrEqual => "LESS_THAN_OR_EQUAL",
        };
        f.write_str(name)
    }
}

/// A property name together with its declared type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyKey {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyType,
}

impl PropertyKey {
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A single (operator, literal) pair within a filter.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub operator: Operator,
    pub value: String,
}

/// One typed property filter: a key plus zero or more ANDed conditions.
///
/// An empty condition list means "the property must be present and
/// convertible to the declared type".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub key: PropertyKey,
    pub conditions: Vec<Condition>,
}

impl Filter {
    /// Presence-only filter on a property.
    pub fn new(name: impl Into<String>, kind: PropertyType) -> Self {
        Self {
            key: PropertyKey::new(name, kind),
            conditions: Vec::new(),
        }
    }

    /// Add a condition.
    pub fn with_condition(mut self, operator: Operator, value: impl Into<String>) -> Self {
        self.conditions.push(Condition {
            operator,
            value: value.into(),
        });
        self
    }
}

/// Raw spec definition: required signers plus property filters.
///
/// Retained verbatim inside a validated [`OracleSpec`](crate::OracleSpec)
/// for re-serialization to the event sink; the content id is computed
/// over a canonical form so that reordered-but-equal definitions share
/// one id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDefinition {
    pub signers: Vec<Signer>,
    pub filters: Vec<Filter>,
}

impl SpecDefinition {
    /// Definition with no signer restriction.
    pub fn new(filters: Vec<Filter>) -> Self {
        Self {
            signers: Vec::new(),
            filters,
        }
    }

    /// Add a required signer.
    pub fn with_signer(mut self, signer: impl Into<String>) -> Self {
        self.signers.push(Signer::new(signer));
        self
    }

    /// True if any filter key carries the builtin prefix, marking this
    /// definition as an internally-generated data source.
    pub fn is_internal(&self) -> bool {
        self.filters
            .iter()
            .any(|f| f.key.name.starts_with(BUILTIN_PREFIX))
    }

    /// Deterministic canonical encoding: signers sorted and deduplicated,
    /// filters sorted by property name, serialized as JSON.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.canonical())?)
    }

    /// Content id over the canonical encoding.
    pub fn content_id(&self) -> Result<SpecId> {
        Ok(SpecId::from_bytes(&self.canonical_bytes()?))
    }

    fn canonical(&self) -> SpecDefinition {
        let mut signers = self.signers.clone();
        signers.sort();
        signers.dedup();
        let mut filters = self.filters.clone();
        filters.sort_by(|a, b| a.key.name.cmp(&b.key.name));
        SpecDefinition { signers, filters }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::TIMESTAMP_KEY;

    fn make_definition() -> SpecDefinition {
        SpecDefinition::new(vec![
            Filter::new("prices.ETH.value", PropertyType::Integer)
                .with_condition(Operator::GreaterThan, "42"),
            Filter::new("prices.BTC.value", PropertyType::Decimal),
        ])
        .with_signer("0xCAFED00D")
        .with_signer("0xDEADBEEF")
    }

    #[test]
    fn test_wire_names() {
        let op = serde_json::to_string(&Operator::LessThanOrEqual).unwrap();
        assert_eq!(op, "\"LESS_THAN_OR_EQUAL\"");

        let kind = serde_json::to_string(&PropertyType::Integer).unwrap();
        assert_eq!(kind, "\"INTEGER\"");

        let key = serde_json::to_string(&PropertyKey::new("x", PropertyType::Boolean)).unwrap();
        assert_eq!(key, r#"{"name":"x","type":"BOOLEAN"}"#);
    }

    #[test]
    fn test_display_matches_wire_names() {
        assert_eq!(Operator::GreaterThanOrEqual.to_string(), "GREATER_THAN_OR_EQUAL");
        assert_eq!(PropertyType::Timestamp.to_string(), "TIMESTAMP");
    }

    #[test]
    fn test_content_id_ignores_declaration_order() {
        let definition = make_definition();

        let mut reordered = definition.clone();
        reordered.filters.reverse();
        reordered.signers.reverse();

        assert_eq!(
            definition.content_id().unwrap(),
            reordered.content_id().unwrap()
        );
    }

    #[test]
    fn test_content_id_changes_with_content() {
        let definition = make_definition();

        let mut changed = definition.clone();
        changed.filters[0].conditions[0].value = "43".to_string();

        assert_ne!(
            definition.content_id().unwrap(),
            changed.content_id().unwrap()
        );
    }

    #[test]
    fn test_duplicate_signers_share_id() {
        let once = SpecDefinition::new(vec![Filter::new("k", PropertyType::String)])
            .with_signer("0xCAFED00D");
        let twice = SpecDefinition::new(vec![Filter::new("k", PropertyType::String)])
            .with_signer("0xCAFED00D")
            .with_signer("0xCAFED00D");

        assert_eq!(once.content_id().unwrap(), twice.content_id().unwrap());
    }

    #[test]
    fn test_internal_definition_detection() {
        let internal = SpecDefinition::new(vec![Filter::new(TIMESTAMP_KEY, PropertyType::Timestamp)
            .with_condition(Operator::GreaterThanOrEqual, "100")]);
        assert!(internal.is_internal());

        assert!(!make_definition().is_internal());
    }
}
