//! Validated oracle specs.

use std::collections::HashSet;

use crate::error::Result;
use crate::spec::definition::{PropertyType, SpecDefinition};
use crate::spec::filters::FilterSet;
use crate::types::{OracleData, Signer, SpecId};

/// An immutable, content-identified description of what a consumer wants:
/// a required-signer set plus a validated filter set.
///
/// Built once from a raw [`SpecDefinition`]; structurally-equal definitions
/// produce the same id and so share one registry entry.
#[derive(Clone, Debug)]
pub struct OracleSpec {
    id: SpecId,
    signers: HashSet<Signer>,
    filters: FilterSet,
    definition: SpecDefinition,
}

impl OracleSpec {
    /// Validate a raw definition into a spec.
    ///
    /// Definitions recognized as internally generated (any filter key with
    /// the builtin prefix) are self-authorizing: the required-signer set is
    /// forced empty regardless of any signers supplied.
    pub fn new(definition: SpecDefinition) -> Result<Self> {
        let filters = FilterSet::new(&definition.filters)?;
        let id = definition.content_id()?;

        let signers = if definition.is_internal() {
            HashSet::new()
        } else {
            definition.signers.iter().cloned().collect()
        };

        Ok(Self {
            id,
            signers,
            filters,
            definition,
        })
    }

    /// Content id of the canonical definition.
    pub fn id(&self) -> SpecId {
        self.id
    }

    /// The raw definition this spec was built from.
    pub fn definition(&self) -> &SpecDefinition {
        &self.definition
    }

    /// True iff every signer attached to the packet is authorized.
    ///
    /// Vacuously true when the packet carries no signers; always true when
    /// the spec has no signer restriction or the packet is internal data.
    pub fn match_signers(&self, data: &OracleData) -> bool {
        if data.is_internal() || self.signers.is_empty() {
            return true;
        }
        data.signers.iter().all(|s| self.signers.contains(s))
    }

    /// Full match predicate: signer authorization, then filter evaluation.
    pub fn match_data(&self, data: &OracleData) -> Result<bool> {
        if !self.match_signers(data) {
            return Ok(false);
        }
        self.filters.match_data(data)
    }

    /// Check that this spec filters exactly the given property name and
    /// type. Consumers call this before subscribing so a misconfigured
    /// binding fails fast instead of silently never matching.
    pub fn ensure_boundable_property(&self, name: &str, kind: PropertyType) -> Result<()> {
        self.filters.ensure_boundable(name, kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{timestamp_data, timestamp_filter, TIMESTAMP_KEY};
    use crate::spec::definition::{Filter, Operator};
    use crate::types::UnixTs;

    fn make_spec(definition: SpecDefinition) -> OracleSpec {
        OracleSpec::new(definition).unwrap()
    }

    fn price_definition() -> SpecDefinition {
        SpecDefinition::new(vec![Filter::new("prices.ETH.value", PropertyType::Integer)
            .with_condition(Operator::GreaterThan, "42")])
        .with_signer("0xCAFED00D")
    }

    #[test]
    fn test_equal_definitions_share_id() {
        let a = make_spec(price_definition());
        let b = make_spec(price_definition());
        assert_eq!(a.id(), b.id());
    }

    #[test]
    fn test_match_signers_subset_rule() {
        let spec = make_spec(price_definition().with_signer("0xDEADBEEF"));
        let signed = |signers: &[&str]| {
            let mut data = OracleData::new().with_property("prices.ETH.value", "1500");
            for signer in signers {
                data = data.with_signer(*signer);
            }
            data
        };

        assert!(spec.match_signers(&signed(&["0xCAFED00D"])));
        assert!(spec.match_signers(&signed(&["0xCAFED00D", "0xDEADBEEF"])));

        // One authorized, one not: the packet is broader than authorized.
        assert!(!spec.match_signers(&signed(&["0xCAFED00D", "0xBADDCAFE"])));
        assert!(!spec.match_signers(&signed(&["0xBADDCAFE"])));
    }

    #[test]
    fn test_match_signers_vacuous_cases() {
        let external = OracleData::new().with_property("prices.ETH.value", "1500");

        // Unsigned packet passes any signer requirement.
        let spec = make_spec(price_definition());
        assert!(spec.match_signers(&external));

        // Spec without signers accepts any signer.
        let open = make_spec(SpecDefinition::new(vec![Filter::new(
            "prices.ETH.value",
            PropertyType::Integer,
        )]));
        assert!(open.match_signers(&external.clone().with_signer("0xBADDCAFE")));
    }

    #[test]
    fn test_builtin_packet_bypasses_signer_check() {
        let spec = make_spec(
            SpecDefinition::new(vec![timestamp_filter(Operator::GreaterThanOrEqual, "100")])
                .with_signer("0xCAFED00D"),
        );

        // Internal tick with no signers at all.
        let tick = timestamp_data(UnixTs(150));
        assert!(spec.match_signers(&tick));
        assert!(spec.match_data(&tick).unwrap());
    }

    #[test]
    fn test_internal_packet_with_foreign_signer_bypasses_check() {
        // No builtin filter keys, so the required signer survives
        // construction and the bypass must come from the packet side.
        let spec = make_spec(SpecDefinition::new(vec![]).with_signer("0xCAFED00D"));

        let tick = timestamp_data(UnixTs(150)).with_signer("0xBADDCAFE");
        assert!(spec.match_signers(&tick));
        assert!(spec.match_data(&tick).unwrap());

        // One external property key puts the packet back under authorization.
        let external = tick.with_property("prices.ETH.value", "1500");
        assert!(!spec.match_signers(&external));
        assert!(!spec.match_data(&external).unwrap());
    }

    #[test]
    fn test_internal_definition_forces_signers_empty() {
        // Signers supplied on an internal definition are discarded.
        let spec = make_spec(
            SpecDefinition::new(vec![Filter::new(TIMESTAMP_KEY, PropertyType::Timestamp)])
                .with_signer("0xCAFED00D"),
        );

        // Any signer passes because the requirement was dropped.
        let signed = OracleData::new()
            .with_signer("0xBADDCAFE")
            .with_property("external.key", "1");
        assert!(spec.match_signers(&signed));
    }

    #[test]
    fn test_match_data_combines_signers_and_filters() {
        let spec = make_spec(price_definition());

        let matching = OracleData::new()
            .with_signer("0xCAFED00D")
            .with_property("prices.ETH.value", "1500");
        assert!(spec.match_data(&matching).unwrap());

        let wrong_signer = OracleData::new()
            .with_signer("0xBADDCAFE")
            .with_property("prices.ETH.value", "1500");
        assert!(!spec.match_data(&wrong_signer).unwrap());

        let too_low = OracleData::new()
            .with_signer("0xCAFED00D")
            .with_property("prices.ETH.value", "42");
        assert!(!spec.match_data(&too_low).unwrap());
    }

    #[test]
    fn test_ensure_boundable_property_delegates() {
        let spec = make_spec(price_definition());
        assert!(spec
            .ensure_boundable_property("prices.ETH.value", PropertyType::Integer)
            .is_ok());
        assert!(spec
            .ensure_boundable_property("prices.BTC.value", PropertyType::Integer)
            .is_err());
    }
}
