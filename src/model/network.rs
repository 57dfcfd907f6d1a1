//! The multivalued gene regulatory network — genes, bounds, update rules.
//!
//! A network declares a set of genes, each with a maximum activity level,
//! and at most one regulation per gene. A regulation lists the regulators
//! (each with an ascending threshold ladder that cuts the regulator's domain
//! into activity intervals) and a list of contexts; the first context whose
//! interval pattern matches the current state determines the gene's target
//! level. The asynchronous update rule then moves the gene one step toward
//! that target.
//!
//! All structural validation happens here, at construction: a built
//! `Network` cannot reference undeclared genes or produce out-of-bound
//! levels.

use std::collections::BTreeMap;
use std::fmt;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use super::state::{Level, State};
use crate::{Error, Result};

// ============================================================================
// Identifiers and metadata
// ============================================================================

/// Dense index of a gene in the network's canonical (name-sorted) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeneId(pub u16);

impl GeneId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for GeneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A declared gene: name and inclusive maximum activity level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Gene {
    pub name: String,
    pub max_level: Level,
}

// ============================================================================
// Input description (the JSON shape of a network)
// ============================================================================

/// Raw network description as found in the input document. Unvalidated —
/// `Network::from_spec` turns it into a checked `Network`.
///
/// Genes are keyed by name; a `BTreeMap` fixes the canonical state-vector
/// order (sorted by name) independently of JSON key order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkSpec {
    pub variables: BTreeMap<String, Level>,
    #[serde(default)]
    pub regulations: Vec<RegulationSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulationSpec {
    pub target: String,
    pub regulators: Vec<RegulatorSpec>,
    pub contexts: Vec<ContextSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegulatorSpec {
    pub variable: String,
    pub thresholds: Vec<Level>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextSpec {
    pub intervals: Vec<Interval>,
    pub target_value: Level,
}

/// One slot of a context pattern: a 1-based activity-interval index, or the
/// `"*"` wildcard matching any interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Interval {
    Index(u8),
    Wildcard(String),
}

impl Interval {
    fn as_index(&self) -> Result<Option<u8>> {
        match self {
            Interval::Index(i) => Ok(Some(*i)),
            Interval::Wildcard(s) if s == "*" => Ok(None),
            Interval::Wildcard(s) => Err(Error::MalformedModel(format!(
                "interval '{s}' is neither an integer nor '*'"
            ))),
        }
    }
}

// ============================================================================
// Validated network
// ============================================================================

#[derive(Debug, Clone)]
struct Regulator {
    gene: GeneId,
    /// Strictly ascending, each within [1, max_level of `gene`].
    thresholds: Vec<Level>,
}

#[derive(Debug, Clone)]
struct Context {
    /// One entry per regulator; `None` is the wildcard.
    intervals: Vec<Option<u8>>,
    target_value: Level,
}

#[derive(Debug, Clone)]
struct Regulation {
    regulators: Vec<Regulator>,
    contexts: Vec<Context>,
}

/// A validated multivalued GRN. Immutable once built.
#[derive(Debug, Clone)]
pub struct Network {
    genes: Vec<Gene>,
    by_name: HashMap<String, GeneId>,
    /// Indexed by target gene; `None` means the gene is a static input.
    regulations: Vec<Option<Regulation>>,
}

impl Network {
    /// Validate a raw description into a usable network.
    pub fn from_spec(spec: &NetworkSpec) -> Result<Self> {
        if spec.variables.is_empty() {
            return Err(Error::MalformedModel(
                "network declares no variables".into(),
            ));
        }

        let mut genes = Vec::with_capacity(spec.variables.len());
        let mut by_name = HashMap::with_capacity(spec.variables.len());
        for (name, &max_level) in &spec.variables {
            if max_level == 0 {
                return Err(Error::MalformedModel(format!(
                    "invalid max activity value for '{name}': must be an integer > 0"
                )));
            }
            let id = GeneId(genes.len() as u16);
            genes.push(Gene { name: name.clone(), max_level });
            by_name.insert(name.clone(), id);
        }

        let mut network = Network {
            regulations: vec![None; genes.len()],
            genes,
            by_name,
        };
        for regulation in &spec.regulations {
            network.add_regulation(regulation)?;
        }
        Ok(network)
    }

    fn add_regulation(&mut self, spec: &RegulationSpec) -> Result<()> {
        let target = self.require_gene(&spec.target)?;
        if self.regulations[target.index()].is_some() {
            return Err(Error::MalformedModel(format!(
                "gene '{}' has more than one regulation",
                spec.target
            )));
        }

        let regulators = spec
            .regulators
            .iter()
            .map(|r| self.validate_regulator(r))
            .collect::<Result<Vec<_>>>()?;

        let target_max = self.genes[target.index()].max_level;
        let contexts = spec
            .contexts
            .iter()
            .map(|c| validate_context(c, &spec.target, target_max, &regulators))
            .collect::<Result<Vec<_>>>()?;

        self.regulations[target.index()] = Some(Regulation { regulators, contexts });
        Ok(())
    }

    fn validate_regulator(&self, spec: &RegulatorSpec) -> Result<Regulator> {
        let gene = self.require_gene(&spec.variable)?;
        let max_level = self.genes[gene.index()].max_level;

        if spec.thresholds.iter().any(|&t| t == 0 || t > max_level) {
            return Err(Error::MalformedModel(format!(
                "invalid thresholds {:?} for '{}': must be within [1, {max_level}]",
                spec.thresholds, spec.variable
            )));
        }
        if !spec.thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err(Error::MalformedModel(format!(
                "invalid thresholds {:?} for '{}': thresholds must be ascending",
                spec.thresholds, spec.variable
            )));
        }

        Ok(Regulator { gene, thresholds: spec.thresholds.clone() })
    }

    fn require_gene(&self, name: &str) -> Result<GeneId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| Error::MalformedModel(format!(
                "gene '{name}' is not declared in 'variables'"
            )))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    pub fn gene_count(&self) -> usize {
        self.genes.len()
    }

    pub fn genes(&self) -> &[Gene] {
        &self.genes
    }

    pub fn gene(&self, id: GeneId) -> &Gene {
        &self.genes[id.index()]
    }

    pub fn gene_id(&self, name: &str) -> Option<GeneId> {
        self.by_name.get(name).copied()
    }

    /// Size of the full state space (product of all per-gene domain sizes).
    pub fn state_space_size(&self) -> usize {
        self.genes
            .iter()
            .map(|g| g.max_level as usize + 1)
            .product()
    }

    /// Every state of the full space, in lexicographic order.
    pub fn enumerate_states(&self) -> Vec<State> {
        let mut states = Vec::with_capacity(self.state_space_size());
        let mut levels = vec![0 as Level; self.genes.len()];
        loop {
            states.push(State::new(levels.iter().copied()));
            // Odometer increment over the per-gene domains.
            let mut gene = self.genes.len();
            loop {
                if gene == 0 {
                    return states;
                }
                gene -= 1;
                if levels[gene] < self.genes[gene].max_level {
                    levels[gene] += 1;
                    break;
                }
                levels[gene] = 0;
            }
        }
    }

    // ========================================================================
    // Update rule
    // ========================================================================

    /// The level the update rule pulls `gene` toward in `state`. Unregulated
    /// genes (and genes with no matching context) hold their current level.
    pub fn target_level(&self, gene: GeneId, state: &State) -> Level {
        let Some(regulation) = &self.regulations[gene.index()] else {
            return state.level(gene.index());
        };
        for context in &regulation.contexts {
            if context.matches(&regulation.regulators, state) {
                return context.target_value;
            }
        }
        state.level(gene.index())
    }
}

impl Context {
    fn matches(&self, regulators: &[Regulator], state: &State) -> bool {
        self.intervals
            .iter()
            .zip(regulators)
            .all(|(interval, regulator)| match interval {
                None => true,
                Some(expected) => {
                    let level = state.level(regulator.gene.index());
                    interval_index(&regulator.thresholds, level) == *expected
                }
            })
    }
}

fn validate_context(
    spec: &ContextSpec,
    target: &str,
    target_max: Level,
    regulators: &[Regulator],
) -> Result<Context> {
    if spec.target_value > target_max {
        return Err(Error::MalformedModel(format!(
            "target value '{}' for '{target}' must be in range [0, {target_max}]",
            spec.target_value
        )));
    }
    if spec.intervals.len() != regulators.len() {
        return Err(Error::MalformedModel(format!(
            "length of 'intervals' does not match number of regulators of '{target}'"
        )));
    }

    let mut intervals = Vec::with_capacity(spec.intervals.len());
    for (position, (interval, regulator)) in
        spec.intervals.iter().zip(regulators).enumerate()
    {
        let index = interval.as_index()?;
        if let Some(index) = index {
            let interval_count = regulator.thresholds.len() as u8 + 1;
            if index == 0 || index > interval_count {
                return Err(Error::MalformedModel(format!(
                    "context value '{index}' at position {position} is invalid: \
                     must be within [1, {interval_count}]"
                )));
            }
        }
        intervals.push(index);
    }

    Ok(Context { intervals, target_value: spec.target_value })
}

/// 1-based index of the activity interval `level` falls into, given the
/// ascending threshold ladder. With thresholds `[t1, .., tk]` the intervals
/// are `[0, t1)`, `[t1, t2)`, .., `[tk, max]`.
pub(crate) fn interval_index(thresholds: &[Level], level: Level) -> u8 {
    thresholds.partition_point(|&t| t <= level) as u8 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_gene_spec() -> NetworkSpec {
        serde_json::from_str(
            r#"{
                "variables": {"A": 1, "B": 1},
                "regulations": [
                    {
                        "target": "B",
                        "regulators": [{"variable": "A", "thresholds": [1]}],
                        "contexts": [
                            {"intervals": [2], "target_value": 1},
                            {"intervals": ["*"], "target_value": 0}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_interval_index() {
        assert_eq!(interval_index(&[1], 0), 1);
        assert_eq!(interval_index(&[1], 1), 2);
        assert_eq!(interval_index(&[1, 3], 2), 2);
        assert_eq!(interval_index(&[1, 3], 3), 3);
        assert_eq!(interval_index(&[], 5), 1);
    }

    #[test]
    fn test_target_level_follows_first_matching_context() {
        let network = Network::from_spec(&two_gene_spec()).unwrap();
        let b = network.gene_id("B").unwrap();
        assert_eq!(network.target_level(b, &State::from([1, 0])), 1);
        assert_eq!(network.target_level(b, &State::from([0, 1])), 0);
    }

    #[test]
    fn test_unregulated_gene_holds_level() {
        let network = Network::from_spec(&two_gene_spec()).unwrap();
        let a = network.gene_id("A").unwrap();
        assert_eq!(network.target_level(a, &State::from([1, 0])), 1);
        assert_eq!(network.target_level(a, &State::from([0, 0])), 0);
    }

    #[test]
    fn test_rejects_undeclared_target() {
        let mut spec = two_gene_spec();
        spec.regulations[0].target = "C".into();
        let err = Network::from_spec(&spec).unwrap_err();
        assert!(err.to_string().contains("'C'"));
    }

    #[test]
    fn test_rejects_zero_max_level() {
        let mut spec = two_gene_spec();
        spec.variables.insert("C".into(), 0);
        assert!(Network::from_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_descending_thresholds() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "variables": {"X": 3},
                "regulations": [{
                    "target": "X",
                    "regulators": [{"variable": "X", "thresholds": [2, 1]}],
                    "contexts": []
                }]
            }"#,
        )
        .unwrap();
        assert!(Network::from_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_context_value() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "variables": {"X": 1},
                "regulations": [{
                    "target": "X",
                    "regulators": [{"variable": "X", "thresholds": [1]}],
                    "contexts": [{"intervals": [3], "target_value": 0}]
                }]
            }"#,
        )
        .unwrap();
        assert!(Network::from_spec(&spec).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_target_value() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "variables": {"X": 1},
                "regulations": [{
                    "target": "X",
                    "regulators": [],
                    "contexts": [{"intervals": [], "target_value": 2}]
                }]
            }"#,
        )
        .unwrap();
        assert!(Network::from_spec(&spec).is_err());
    }

    #[test]
    fn test_enumerate_states_covers_product() {
        let network = Network::from_spec(&two_gene_spec()).unwrap();
        let states = network.enumerate_states();
        assert_eq!(states.len(), 4);
        assert_eq!(network.state_space_size(), 4);
        assert!(states.contains(&State::from([1, 1])));
    }
}
