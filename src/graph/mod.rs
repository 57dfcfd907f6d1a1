//! # State Graph
//!
//! The finite Kripke structure the checker evaluates against: all states
//! reachable from the initial configuration under the asynchronous update
//! rule, with forward AND backward adjacency (backward propagation drives
//! the temporal fixpoints).
//!
//! Built once by breadth-first exploration, immutable thereafter. Every
//! state has at least one outgoing transition — terminal states get an
//! explicit self-loop — so path-quantified operators are always defined.

use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::debug;

use crate::ctl::Comparison;
use crate::degree::Degree;
use crate::model::{GeneId, Network, State, StateId};
use crate::{Error, Result};

type AdjacencyRow = SmallVec<[StateId; 4]>;

/// The reachable state space with its transition relation.
#[derive(Debug, Clone)]
pub struct StateGraph {
    network: Network,
    states: Vec<State>,
    index: HashMap<State, StateId>,
    successors: Vec<AdjacencyRow>,
    predecessors: Vec<AdjacencyRow>,
    initial: Vec<StateId>,
}

impl StateGraph {
    /// Explore forward from the initial states and materialize the graph.
    ///
    /// Fails with `EmptyStateSpace` when no initial state is given and with
    /// `MalformedModel` when an initial vector does not fit the network.
    pub fn build(network: Network, initial: &[State]) -> Result<Self> {
        if initial.is_empty() {
            return Err(Error::EmptyStateSpace);
        }

        let mut graph = StateGraph {
            states: Vec::new(),
            index: HashMap::new(),
            successors: Vec::new(),
            predecessors: Vec::new(),
            initial: Vec::new(),
            network,
        };

        let mut worklist = std::collections::VecDeque::new();
        for state in initial {
            graph.check_vector(state)?;
            let (id, fresh) = graph.intern(state.clone());
            if fresh {
                worklist.push_back(id);
            }
            if !graph.initial.contains(&id) {
                graph.initial.push(id);
            }
        }

        while let Some(id) = worklist.pop_front() {
            let state = graph.states[id.index()].clone();
            let mut row = AdjacencyRow::new();

            for gene_index in 0..graph.network.gene_count() {
                let gene = GeneId(gene_index as u16);
                let current = state.level(gene_index);
                let target = graph.network.target_level(gene, &state);
                if target == current {
                    continue;
                }
                // One asynchronous step toward the rule's target.
                let next_level = if target > current { current + 1 } else { current - 1 };
                let successor = state.with_level(gene_index, next_level);
                let (succ_id, fresh) = graph.intern(successor);
                if fresh {
                    worklist.push_back(succ_id);
                }
                row.push(succ_id);
            }

            if row.is_empty() {
                row.push(id); // stable state: keep the relation total
            }
            graph.successors[id.index()] = row;
        }

        for source in 0..graph.states.len() {
            for target in graph.successors[source].clone() {
                graph.predecessors[target.index()].push(StateId(source as u32));
            }
        }

        debug!(
            states = graph.states.len(),
            transitions = graph.successors.iter().map(|r| r.len()).sum::<usize>(),
            initial = graph.initial.len(),
            "state graph built"
        );
        Ok(graph)
    }

    fn intern(&mut self, state: State) -> (StateId, bool) {
        if let Some(&id) = self.index.get(&state) {
            return (id, false);
        }
        let id = StateId(self.states.len() as u32);
        self.index.insert(state.clone(), id);
        self.states.push(state);
        self.successors.push(AdjacencyRow::new());
        self.predecessors.push(AdjacencyRow::new());
        (id, true)
    }

    fn check_vector(&self, state: &State) -> Result<()> {
        if state.arity() != self.network.gene_count() {
            return Err(Error::MalformedModel(format!(
                "initial state {state} has {} levels, the network declares {} genes",
                state.arity(),
                self.network.gene_count()
            )));
        }
        for (index, gene) in self.network.genes().iter().enumerate() {
            if state.level(index) > gene.max_level {
                return Err(Error::MalformedModel(format!(
                    "initial level {} for gene '{}' is out of bounds: \
                     allowed range is [0, {}]",
                    state.level(index),
                    gene.name,
                    gene.max_level
                )));
            }
        }
        Ok(())
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Number of reachable states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.index()]
    }

    pub fn state_id(&self, state: &State) -> Option<StateId> {
        self.index.get(state).copied()
    }

    pub fn state_ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.states.len() as u32).map(StateId)
    }

    pub fn initial_states(&self) -> &[StateId] {
        &self.initial
    }

    pub fn successors(&self, id: StateId) -> &[StateId] {
        &self.successors[id.index()]
    }

    pub fn predecessors(&self, id: StateId) -> &[StateId] {
        &self.predecessors[id.index()]
    }

    // ========================================================================
    // Atomic propositions
    // ========================================================================

    /// Signed, normalized satisfaction distance of `gene cmp threshold` in
    /// `state`.
    ///
    /// The comparison carves an interval of admissible levels out of the
    /// gene's domain `[0, max]`. Satisfied states score the number of
    /// one-level steps needed to leave that interval, violated states the
    /// negated number of steps needed to enter it; both are scaled by
    /// `1/max` so degrees are comparable across genes. A comparison no
    /// state can violate is `TOP` everywhere, one no state can satisfy is
    /// `BOTTOM` everywhere.
    pub fn atomic_degree(
        &self,
        gene: GeneId,
        cmp: Comparison,
        threshold: i64,
        state: &State,
    ) -> Degree {
        let max = self.network.gene(gene).max_level as i64;
        let level = state.level(gene.index()) as i64;

        let (lo, hi) = match cmp {
            Comparison::Ge => (threshold.max(0), max),
            Comparison::Le => (0, threshold.min(max)),
            Comparison::Eq => (threshold, threshold),
        };

        if lo > hi || hi < 0 || lo > max {
            return Degree::BOTTOM;
        }
        if lo == 0 && hi == max {
            return Degree::TOP;
        }

        let scale = max as f64;
        if level >= lo && level <= hi {
            let to_lower = if lo > 0 { level - lo + 1 } else { i64::MAX };
            let to_upper = if hi < max { hi - level + 1 } else { i64::MAX };
            Degree::new(to_lower.min(to_upper) as f64 / scale)
        } else {
            let steps = if level < lo { lo - level } else { level - hi };
            Degree::new(-(steps as f64) / scale)
        }
    }

    // ========================================================================
    // Attractors
    // ========================================================================

    /// Bottom strongly-connected components of the transition relation —
    /// the long-term behaviors of the network (stable states and cycles the
    /// dynamics cannot leave).
    pub fn attractors(&self) -> Vec<Vec<StateId>> {
        let scc_of = self.tarjan_scc();
        let scc_count = scc_of.iter().map(|&c| c + 1).max().unwrap_or(0);

        // A component is an attractor iff no edge leaves it.
        let mut escapes = vec![false; scc_count];
        for source in self.state_ids() {
            for &target in self.successors(source) {
                if scc_of[source.index()] != scc_of[target.index()] {
                    escapes[scc_of[source.index()]] = true;
                }
            }
        }

        let mut attractors: Vec<Vec<StateId>> = vec![Vec::new(); scc_count];
        for id in self.state_ids() {
            attractors[scc_of[id.index()]].push(id);
        }
        let mut result: Vec<Vec<StateId>> = attractors
            .into_iter()
            .enumerate()
            .filter(|(component, _)| !escapes[*component])
            .map(|(_, members)| members)
            .collect();
        for members in &mut result {
            members.sort_by_key(|id| id.0);
        }
        result.sort_by_key(|members| members[0].0);
        result
    }

    /// Iterative Tarjan: component index per state.
    fn tarjan_scc(&self) -> Vec<usize> {
        const UNVISITED: u32 = u32::MAX;

        let n = self.states.len();
        let mut order = vec![UNVISITED; n];
        let mut low = vec![0u32; n];
        let mut on_stack = vec![false; n];
        let mut stack: Vec<usize> = Vec::new();
        let mut scc_of = vec![usize::MAX; n];
        let mut next_order = 0u32;
        let mut next_scc = 0usize;

        for root in 0..n {
            if order[root] != UNVISITED {
                continue;
            }
            let mut frames: Vec<(usize, usize)> = vec![(root, 0)];
            while let Some(&mut (v, ref mut cursor)) = frames.last_mut() {
                if order[v] == UNVISITED {
                    order[v] = next_order;
                    low[v] = next_order;
                    next_order += 1;
                    stack.push(v);
                    on_stack[v] = true;
                }

                if *cursor < self.successors[v].len() {
                    let w = self.successors[v][*cursor].index();
                    *cursor += 1;
                    if order[w] == UNVISITED {
                        frames.push((w, 0));
                    } else if on_stack[w] {
                        low[v] = low[v].min(order[w]);
                    }
                } else {
                    frames.pop();
                    if let Some(&mut (parent, _)) = frames.last_mut() {
                        low[parent] = low[parent].min(low[v]);
                    }
                    if low[v] == order[v] {
                        loop {
                            let w = stack.pop().expect("tarjan stack underflow");
                            on_stack[w] = false;
                            scc_of[w] = next_scc;
                            if w == v {
                                break;
                            }
                        }
                        next_scc += 1;
                    }
                }
            }
        }

        scc_of
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NetworkSpec;

    /// B follows A with a one-step delay; A is a static input.
    fn follower() -> Network {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "variables": {"A": 1, "B": 1},
                "regulations": [
                    {
                        "target": "B",
                        "regulators": [{"variable": "A", "thresholds": [1]}],
                        "contexts": [
                            {"intervals": [2], "target_value": 1},
                            {"intervals": [1], "target_value": 0}
                        ]
                    }
                ]
            }"#,
        )
        .unwrap();
        Network::from_spec(&spec).unwrap()
    }

    /// A drives itself up to its maximum, one level at a time.
    fn self_activator() -> Network {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{
                "variables": {"A": 2},
                "regulations": [
                    {
                        "target": "A",
                        "regulators": [],
                        "contexts": [{"intervals": [], "target_value": 2}]
                    }
                ]
            }"#,
        )
        .unwrap();
        Network::from_spec(&spec).unwrap()
    }

    #[test]
    fn test_terminal_state_gets_self_loop() {
        let graph = StateGraph::build(follower(), &[State::from([0, 0])]).unwrap();
        let id = graph.state_id(&State::from([0, 0])).unwrap();
        assert_eq!(graph.successors(id), &[id]);
    }

    #[test]
    fn test_reachability_is_forward_only() {
        // From (0,0) nothing moves: A is stuck at 0, B tracks it.
        let graph = StateGraph::build(follower(), &[State::from([0, 0])]).unwrap();
        assert_eq!(graph.len(), 1);

        // From (1,0), B rises: two states total.
        let graph = StateGraph::build(follower(), &[State::from([1, 0])]).unwrap();
        assert_eq!(graph.len(), 2);
        assert!(graph.state_id(&State::from([1, 1])).is_some());
    }

    #[test]
    fn test_predecessors_mirror_successors() {
        let graph = StateGraph::build(self_activator(), &[State::from([0])]).unwrap();
        let s0 = graph.state_id(&State::from([0])).unwrap();
        let s1 = graph.state_id(&State::from([1])).unwrap();
        assert_eq!(graph.successors(s0), &[s1]);
        assert_eq!(graph.predecessors(s1), &[s0]);
    }

    #[test]
    fn test_empty_initial_set() {
        assert!(matches!(
            StateGraph::build(follower(), &[]),
            Err(Error::EmptyStateSpace)
        ));
    }

    #[test]
    fn test_rejects_out_of_bound_initial_vector() {
        assert!(StateGraph::build(follower(), &[State::from([2, 0])]).is_err());
        assert!(StateGraph::build(follower(), &[State::from([0])]).is_err());
    }

    #[test]
    fn test_atomic_degree_signs_and_margins() {
        let graph = StateGraph::build(self_activator(), &[State::from([0])]).unwrap();
        let a = graph.network().gene_id("A").unwrap();

        // A >= 1 over domain [0,2]: level 2 is two steps from violation.
        let d = |level: u8, cmp, t| {
            graph.atomic_degree(a, cmp, t, &State::from([level])).value()
        };
        assert_eq!(d(2, Comparison::Ge, 1), 1.0);
        assert_eq!(d(1, Comparison::Ge, 1), 0.5);
        assert_eq!(d(0, Comparison::Ge, 1), -0.5);
        assert_eq!(d(0, Comparison::Ge, 2), -1.0);

        // Unviolable and unsatisfiable comparisons clamp.
        assert_eq!(d(1, Comparison::Le, 2), 1.0);
        assert_eq!(d(1, Comparison::Ge, 3), -1.0);
        assert_eq!(d(1, Comparison::Le, -1), -1.0);
    }

    #[test]
    fn test_attractor_is_the_stable_top_state() {
        let graph = StateGraph::build(self_activator(), &[State::from([0])]).unwrap();
        let attractors = graph.attractors();
        assert_eq!(attractors.len(), 1);
        let top = graph.state_id(&State::from([2])).unwrap();
        assert_eq!(attractors[0], vec![top]);
    }
}
