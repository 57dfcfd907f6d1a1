//! # Degree Evaluation
//!
//! Computes the signed satisfaction degree of every formula node at every
//! reachable state. Nodes are evaluated in index order — children before
//! parents, shared subtrees once — each producing one [`DegreeMap`].
//!
//! The temporal operators are fixpoints over the state graph:
//! - `Globally` is a greatest fixpoint: degrees start at the child map and
//!   only decrease, so the queue extracts the most-constrained state first
//!   and pushes its constraint backward through the predecessors;
//! - `Until` is a least fixpoint: degrees start at the right operand and
//!   only increase as better witnessing paths are discovered, best witness
//!   first.
//!
//! Both loops are worklist iterations: a state is re-queued only when one
//! of its successors actually changed, and every change is strictly
//! monotone over a finite value set, so termination needs no round bound.

pub mod queue;

use std::ops::Index;

use tracing::{debug, trace};

use crate::ctl::{Formula, FormulaNode, Quantifier};
use crate::degree::Degree;
use crate::graph::StateGraph;
use crate::model::{State, StateId};
use crate::{Error, Result};

use queue::{DegreeQueue, Direction};

// ============================================================================
// Degree maps
// ============================================================================

/// Degrees of one formula node over all states, indexed by `StateId`.
#[derive(Debug, Clone, PartialEq)]
pub struct DegreeMap {
    values: Vec<Degree>,
}

impl DegreeMap {
    fn filled(len: usize, value: Degree) -> Self {
        DegreeMap { values: vec![value; len] }
    }

    fn from_fn(len: usize, f: impl FnMut(StateId) -> Degree) -> Self {
        DegreeMap {
            values: (0..len as u32).map(StateId).map(f).collect(),
        }
    }

    pub fn get(&self, id: StateId) -> Degree {
        self.values[id.index()]
    }

    fn set(&mut self, id: StateId, value: Degree) {
        self.values[id.index()] = value;
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, Degree)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(i, &d)| (StateId(i as u32), d))
    }
}

impl Index<StateId> for DegreeMap {
    type Output = Degree;

    fn index(&self, id: StateId) -> &Degree {
        &self.values[id.index()]
    }
}

// ============================================================================
// Evaluation result
// ============================================================================

/// The outcome of evaluating one formula against one state graph.
#[derive(Debug, Clone)]
pub struct Evaluation {
    root: DegreeMap,
    initial: Vec<(State, Degree)>,
}

impl Evaluation {
    /// Degrees of the root formula at every reachable state (diagnostics).
    pub fn degrees(&self) -> &DegreeMap {
        &self.root
    }

    /// Degrees at the initial states — the answer of the check.
    pub fn initial_degrees(&self) -> &[(State, Degree)] {
        &self.initial
    }

    /// Worst/best/average over the initial states; `None` when the
    /// evaluation has no initial states to summarize.
    pub fn summary(&self) -> Option<Summary> {
        let (first_state, first_degree) = self.initial.first()?;
        let mut summary = Summary {
            worst: (first_state.clone(), *first_degree),
            best: (first_state.clone(), *first_degree),
            average: 0.0,
        };
        let mut total = 0.0;
        for (state, degree) in &self.initial {
            if *degree < summary.worst.1 {
                summary.worst = (state.clone(), *degree);
            }
            if *degree > summary.best.1 {
                summary.best = (state.clone(), *degree);
            }
            total += degree.value();
        }
        summary.average = total / self.initial.len() as f64;
        Some(summary)
    }
}

/// Aggregate view over the initial states.
#[derive(Debug, Clone)]
pub struct Summary {
    pub worst: (State, Degree),
    pub best: (State, Degree),
    pub average: f64,
}

// ============================================================================
// Evaluator
// ============================================================================

/// Evaluate a formula of the checked fragment against a state graph.
pub fn evaluate(formula: &Formula, graph: &StateGraph) -> Result<Evaluation> {
    if graph.is_empty() {
        return Err(Error::EmptyStateSpace);
    }
    let states = graph.len();
    debug!(nodes = formula.len(), states, "evaluating formula");

    let mut maps: Vec<DegreeMap> = Vec::with_capacity(formula.len());
    for (index, node) in formula.nodes().iter().enumerate() {
        let map = match node {
            FormulaNode::Prop { gene, cmp, threshold } => {
                let id = graph
                    .network()
                    .gene_id(gene)
                    .ok_or_else(|| Error::UnknownGene(gene.clone()))?;
                DegreeMap::from_fn(states, |s| {
                    graph.atomic_degree(id, *cmp, *threshold, graph.state(s))
                })
            }
            FormulaNode::Const(value) => {
                DegreeMap::filled(states, if *value { Degree::TOP } else { Degree::BOTTOM })
            }
            FormulaNode::Not(child) => DegreeMap {
                values: maps[child.index()]
                    .values
                    .iter()
                    .map(|d| d.negate())
                    .collect(),
            },
            FormulaNode::And(left, right) => {
                pointwise(&maps[left.index()], &maps[right.index()], Degree::meet)
            }
            FormulaNode::Or(left, right) => {
                pointwise(&maps[left.index()], &maps[right.index()], Degree::join)
            }
            FormulaNode::Next(quantifier, child) => {
                next_step(graph, &maps[child.index()], *quantifier)
            }
            FormulaNode::Globally(quantifier, child) => {
                globally(graph, &maps[child.index()], *quantifier)
            }
            FormulaNode::Until(quantifier, left, right) => until(
                graph,
                &maps[left.index()],
                &maps[right.index()],
                *quantifier,
            ),
        };
        trace!(index, "node evaluated");
        maps.push(map);
    }

    let root = maps.swap_remove(formula.root().index());
    let initial = graph
        .initial_states()
        .iter()
        .map(|&id| (graph.state(id).clone(), root.get(id)))
        .collect();
    Ok(Evaluation { root, initial })
}

fn pointwise(
    left: &DegreeMap,
    right: &DegreeMap,
    op: fn(Degree, Degree) -> Degree,
) -> DegreeMap {
    DegreeMap {
        values: left
            .values
            .iter()
            .zip(&right.values)
            .map(|(&l, &r)| op(l, r))
            .collect(),
    }
}

fn combine(quantifier: Quantifier, a: Degree, b: Degree) -> Degree {
    match quantifier {
        Quantifier::Exists => a.join(b),
        Quantifier::Forall => a.meet(b),
    }
}

/// Join (Exists) or meet (Forall) of `map` over the successors of `state`.
/// The transition relation is total, so there is always a first successor.
fn successor_aggregate(
    graph: &StateGraph,
    state: StateId,
    map: &DegreeMap,
    quantifier: Quantifier,
) -> Degree {
    let mut successors = graph.successors(state).iter();
    let first = successors
        .next()
        .map(|&s| map.get(s))
        .unwrap_or(Degree::BOTTOM);
    successors.fold(first, |acc, &s| combine(quantifier, acc, map.get(s)))
}

/// `EX` / `AX`: the one-step aggregate of the child map.
fn next_step(graph: &StateGraph, child: &DegreeMap, quantifier: Quantifier) -> DegreeMap {
    DegreeMap::from_fn(child.len(), |s| {
        successor_aggregate(graph, s, child, quantifier)
    })
}

/// `EG` / `AG`: greatest fixpoint of
/// `deg[s] = meet(child[s], aggregate over successors of deg)`.
fn globally(graph: &StateGraph, child: &DegreeMap, quantifier: Quantifier) -> DegreeMap {
    let mut degrees = child.clone();
    let mut queue = DegreeQueue::new(Direction::Min, degrees.len());
    for s in graph.state_ids() {
        queue.insert(s, degrees.get(s));
    }

    let mut visits = 0u64;
    while let Some((state, _)) = queue.pop() {
        visits += 1;
        let aggregate = successor_aggregate(graph, state, &degrees, quantifier);
        let refined = child.get(state).meet(aggregate);
        if refined < degrees.get(state) {
            degrees.set(state, refined);
            // Only the states aggregating over `state` can be affected.
            for &p in graph.predecessors(state) {
                queue.update(p, degrees.get(p));
            }
        }
    }
    trace!(visits, "globally fixpoint converged");
    degrees
}

/// `EU` / `AU`: least fixpoint of
/// `deg[s] = join(psi[s], meet(phi[s], aggregate over successors of deg))`.
fn until(
    graph: &StateGraph,
    phi: &DegreeMap,
    psi: &DegreeMap,
    quantifier: Quantifier,
) -> DegreeMap {
    let mut degrees = psi.clone();
    let mut queue = DegreeQueue::new(Direction::Max, degrees.len());
    for s in graph.state_ids() {
        queue.insert(s, degrees.get(s));
    }

    let mut visits = 0u64;
    while let Some((state, _)) = queue.pop() {
        visits += 1;
        let aggregate = successor_aggregate(graph, state, &degrees, quantifier);
        let extended = phi.get(state).meet(aggregate);
        if extended > degrees.get(state) {
            degrees.set(state, extended);
            for &p in graph.predecessors(state) {
                queue.update(p, degrees.get(p));
            }
        }
    }
    trace!(visits, "until fixpoint converged");
    degrees
}
