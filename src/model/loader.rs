//! Input document loading — the JSON shape the driver consumes.
//!
//! A document bundles the network description, the formula text and the
//! initial-state constraints:
//!
//! ```json
//! {
//!   "network": { "variables": {...}, "regulations": [...] },
//!   "formula": "AG (B <= 1)",
//!   "init_states": [ { "A": [0], "B": [0, 1] } ]
//! }
//! ```
//!
//! `init_states` is a list of regions; each region constrains some genes to
//! a list of admissible levels (unconstrained genes range over their whole
//! domain). The initial set is the union of the regions' Cartesian products.
//! An absent or empty list means every state of the full space is initial.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::network::{Network, NetworkSpec};
use super::state::{Level, State};
use crate::{Error, Result};

/// The top-level input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub network: NetworkSpec,
    #[serde(default)]
    pub formula: Option<String>,
    #[serde(default)]
    pub init_states: Vec<Region>,
}

/// One initial-state region: gene name → admissible levels.
pub type Region = BTreeMap<String, Vec<Level>>;

impl Document {
    /// Parse a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the network description.
    pub fn network(&self) -> Result<Network> {
        Network::from_spec(&self.network)
    }

    /// Expand `init_states` against a validated network.
    pub fn initial_states(&self, network: &Network) -> Result<Vec<State>> {
        initial_states(network, &self.init_states)
    }
}

/// Expand initial-state regions into concrete states.
///
/// Duplicates across overlapping regions are collapsed; the result keeps a
/// deterministic (lexicographic) order.
pub fn initial_states(network: &Network, regions: &[Region]) -> Result<Vec<State>> {
    if regions.is_empty() {
        return Ok(network.enumerate_states());
    }

    let mut seen = hashbrown::HashSet::new();
    let mut states = Vec::new();
    for region in regions {
        validate_region(network, region)?;

        // Per-gene admissible levels, constrained or full domain.
        let domains: Vec<Vec<Level>> = network
            .genes()
            .iter()
            .map(|gene| match region.get(&gene.name) {
                Some(levels) => levels.clone(),
                None => (0..=gene.max_level).collect(),
            })
            .collect();

        expand_product(&domains, &mut |levels| {
            let state = State::new(levels.iter().copied());
            if seen.insert(state.clone()) {
                states.push(state);
            }
        });
    }

    states.sort_by(|a, b| a.levels().cmp(b.levels()));
    Ok(states)
}

fn validate_region(network: &Network, region: &Region) -> Result<()> {
    for (name, levels) in region {
        let Some(id) = network.gene_id(name) else {
            return Err(Error::MalformedModel(format!(
                "initial-state constraint names unknown gene '{name}'"
            )));
        };
        let max_level = network.gene(id).max_level;
        if let Some(&level) = levels.iter().find(|&&v| v > max_level) {
            return Err(Error::MalformedModel(format!(
                "initial level {level} for gene '{name}' is out of bounds: \
                 allowed range is [0, {max_level}]"
            )));
        }
        if levels.is_empty() {
            return Err(Error::MalformedModel(format!(
                "initial-state constraint for gene '{name}' admits no levels"
            )));
        }
    }
    Ok(())
}

/// Call `emit` with every combination of one level per domain.
fn expand_product(domains: &[Vec<Level>], emit: &mut impl FnMut(&[Level])) {
    let mut cursor = vec![0usize; domains.len()];
    let mut levels = vec![0 as Level; domains.len()];
    loop {
        for (i, domain) in domains.iter().enumerate() {
            levels[i] = domain[cursor[i]];
        }
        emit(&levels);

        let mut i = domains.len();
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            cursor[i] += 1;
            if cursor[i] < domains[i].len() {
                break;
            }
            cursor[i] = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{
        "network": {
            "variables": {"A": 1, "B": 2},
            "regulations": []
        },
        "formula": "EX (A >= 1)",
        "init_states": [{"A": [0], "B": [0, 2]}]
    }"#;

    #[test]
    fn test_document_round_trip() {
        let doc = Document::from_json(DOC).unwrap();
        assert_eq!(doc.formula.as_deref(), Some("EX (A >= 1)"));
        assert_eq!(doc.init_states.len(), 1);
    }

    #[test]
    fn test_region_expansion() {
        let doc = Document::from_json(DOC).unwrap();
        let network = doc.network().unwrap();
        let initial = doc.initial_states(&network).unwrap();
        assert_eq!(initial, vec![State::from([0, 0]), State::from([0, 2])]);
    }

    #[test]
    fn test_empty_regions_mean_full_space() {
        let mut doc = Document::from_json(DOC).unwrap();
        doc.init_states.clear();
        let network = doc.network().unwrap();
        assert_eq!(doc.initial_states(&network).unwrap().len(), 6);
    }

    #[test]
    fn test_overlapping_regions_deduplicate() {
        let mut doc = Document::from_json(DOC).unwrap();
        doc.init_states.push(doc.init_states[0].clone());
        let network = doc.network().unwrap();
        assert_eq!(doc.initial_states(&network).unwrap().len(), 2);
    }

    #[test]
    fn test_unknown_gene_in_region() {
        let mut doc = Document::from_json(DOC).unwrap();
        doc.init_states[0].insert("C".into(), vec![0]);
        let network = doc.network().unwrap();
        assert!(doc.initial_states(&network).is_err());
    }

    #[test]
    fn test_out_of_bound_level_in_region() {
        let mut doc = Document::from_json(DOC).unwrap();
        doc.init_states[0].insert("B".into(), vec![3]);
        let network = doc.network().unwrap();
        assert!(doc.initial_states(&network).is_err());
    }
}
