//! Typed filter validation and evaluation.
//!
//! A [`FilterSet`] is built once from raw filters, rejecting malformed
//! definitions up front: literals are converted to their declared type at
//! construction so match-time work is limited to converting packet values
//! and comparing.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::error::{EngineError, Result};
use crate::spec::definition::{Condition, Filter, Operator, PropertyKey, PropertyType};
use crate::types::OracleData;

/// A validated set of typed property filters, ANDed at match time.
#[derive(Clone, Debug)]
pub struct FilterSet {
    filters: Vec<TypedFilter>,
}

#[derive(Clone, Debug)]
struct TypedFilter {
    key: PropertyKey,
    conditions: Vec<TypedCondition>,
}

#[derive(Clone, Debug)]
struct TypedCondition {
    operator: Operator,
    value: TypedValue,
}

/// A condition literal or packet value converted to its declared type.
#[derive(Clone, Debug, PartialEq)]
enum TypedValue {
    Integer(i128),
    Decimal(Decimal),
    Boolean(bool),
    String(String),
    Timestamp(i64),
}

impl FilterSet {
    /// Validate raw filters into an evaluatable set.
    ///
    /// Rejects empty property keys, duplicate property keys, `LESS_THAN`/
    /// `LESS_THAN_OR_EQUAL` on timestamp keys, ordering operators on
    /// boolean or string keys, and literals that do not convert to their
    /// key's declared type.
    pub fn new(filters: &[Filter]) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut typed = Vec::with_capacity(filters.len());

        for filter in filters {
            if filter.key.name.is_empty() {
                return Err(EngineError::EmptyPropertyKey);
            }
            if !seen.insert(filter.key.name.clone()) {
                return Err(EngineError::DuplicatePropertyKey);
            }

            let mut conditions = Vec::with_capacity(filter.conditions.len());
            for condition in &filter.conditions {
                conditions.push(TypedCondition::compile(&filter.key, condition)?);
            }

            typed.push(TypedFilter {
                key: filter.key.clone(),
                conditions,
            });
        }

        Ok(Self { filters: typed })
    }

    /// Evaluate every filter against a packet (logical AND, short-circuit).
    ///
    /// An absent property fails the filter without error; a present value
    /// that does not convert to the declared type is an error.
    pub fn match_data(&self, data: &OracleData) -> Result<bool> {
        for filter in &self.filters {
            let raw = match data.properties.get(&filter.key.name) {
                Some(value) => value,
                None => return Ok(false),
            };

            let value = TypedValue::parse(filter.key.kind, raw)?;
            for condition in &filter.conditions {
                if !condition.eval(&value) {
                    return Ok(false);
                }
            }
        }
        Ok(true)
    }

    /// Check that some filter declares exactly this property name and type.
    pub fn ensure_boundable(&self, name: &str, kind: PropertyType) -> Result<()> {
        match self.filters.iter().find(|f| f.key.name == name) {
            None => Err(EngineError::PropertyNotFiltered(name.to_string())),
            Some(filter) if filter.key.kind != kind => Err(EngineError::PropertyTypeMismatch {
                bound: kind,
                filtered: filter.key.kind,
            }),
            Some(_) => Ok(()),
        }
    }
}

impl TypedCondition {
    fn compile(key: &PropertyKey, condition: &Condition) -> Result<Self> {
        match key.kind {
            PropertyType::Timestamp
                if matches!(
                    condition.operator,
                    Operator::LessThan | Operator::LessThanOrEqual
                ) =>
            {
                return Err(EngineError::InvalidTimeCondition);
            }
            PropertyType::Boolean | PropertyType::String if condition.operator.is_ordering() => {
                return Err(EngineError::UnsupportedOperator {
                    operator: condition.operator,
                    kind: key.kind,
                });
            }
            _ => {}
        }

        let value = TypedValue::parse(key.kind, &condition.value)?;
        Ok(Self {
            operator: condition.operator,
            value,
        })
    }

    fn eval(&self, value: &TypedValue) -> bool {
        let ordering = match (value, &self.value) {
            (TypedValue::Integer(a), TypedValue::Integer(b)) => a.cmp(b),
            (TypedValue::Decimal(a), TypedValue::Decimal(b)) => a.cmp(b),
            (TypedValue::Timestamp(a), TypedValue::Timestamp(b)) => a.cmp(b),
            (TypedValue::Boolean(a), TypedValue::Boolean(b)) => {
                return self.operator == Operator::Equals && a == b;
            }
            (TypedValue::String(a), TypedValue::String(b)) => {
                return self.operator == Operator::Equals && a == b;
            }
            // Packet value and literal always parse under the same declared type.
            _ => return false,
        };

        match self.operator {
            Operator::Equals => ordering == Ordering::Equal,
            Operator::GreaterThan => ordering == Ordering::Greater,
            Operator::GreaterThanOrEqual => ordering != Ordering::Less,
            Operator::LessThan => ordering == Ordering::Less,
            Operator::LessThanOrEqual => ordering != Ordering::Greater,
        }
    }
}

impl TypedValue {
    fn parse(kind: PropertyType, raw: &str) -> Result<TypedValue> {
        let invalid = || EngineError::InvalidPropertyValue {
            value: raw.to_string(),
            expected: kind,
        };

        match kind {
            PropertyType::Integer => raw
                .parse::<i128>()
                .map(TypedValue::Integer)
                .map_err(|_| invalid()),
            PropertyType::Decimal => raw
                .parse::<Decimal>()
                .map(TypedValue::Decimal)
                .map_err(|_| invalid()),
            PropertyType::Boolean => raw
                .parse::<bool>()
                .map(TypedValue::Boolean)
                .map_err(|_| invalid()),
            PropertyType::String => Ok(TypedValue::String(raw.to_string())),
            PropertyType::Timestamp => match raw.parse::<i64>() {
                Ok(ts) if ts >= 0 => Ok(TypedValue::Timestamp(ts)),
                _ => Err(invalid()),
            },
        }
    }
}
