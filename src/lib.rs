//! # mvctl — Quantitative CTL Checking for Multivalued GRNs
//!
//! Instead of a yes/no answer, `mvctl` computes a signed *satisfaction
//! degree* for a CTL property over the state space of a multivalued gene
//! regulatory network: positive means satisfied with that much margin,
//! negative means violated by that much, zero is the exact boundary.
//!
//! ## Design Principles
//!
//! 1. **Validate once**: a built [`Network`] cannot reference undeclared
//!    genes or step outside its level bounds
//! 2. **Parser owns nothing**: CTL text → AST is a pure function; the
//!    checked fragment is enforced by a separate translation step
//! 3. **Graph built once**: the reachable state space is explored up front
//!    and immutable afterwards, forward and backward adjacency included
//! 4. **Explicit memoization**: formulas are hash-consed index trees, so a
//!    shared subexpression is evaluated exactly once
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mvctl::{Checker, Document};
//!
//! # fn example() -> mvctl::Result<()> {
//! let doc = Document::from_json(std::fs::read_to_string("model.json")?.as_str())?;
//! let checker = Checker::from_document(&doc)?;
//!
//! let evaluation = checker.check("AG (B <= 1)")?;
//! for (state, degree) in evaluation.initial_degrees() {
//!     println!("{state}: {degree}");
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod ctl;
pub mod degree;
pub mod eval;
pub mod export;
pub mod graph;
pub mod model;

// ============================================================================
// Re-exports: Model
// ============================================================================

pub use model::{Document, Gene, GeneId, Level, Network, NetworkSpec, Region, State, StateId};

// ============================================================================
// Re-exports: Lattice, formulas, graph, evaluation
// ============================================================================

pub use ctl::{Comparison, Formula, Quantifier};
pub use degree::Degree;
pub use eval::{DegreeMap, Evaluation, Summary};
pub use graph::StateGraph;

// ============================================================================
// Top-level Checker handle
// ============================================================================

/// The primary entry point. A `Checker` wraps a built state graph and
/// evaluates formulas against it.
pub struct Checker {
    graph: StateGraph,
}

impl Checker {
    /// Wrap an already-built state graph.
    pub fn new(graph: StateGraph) -> Self {
        Self { graph }
    }

    /// Build from an input document: validate the network, expand the
    /// initial-state regions, explore the reachable state space.
    pub fn from_document(doc: &Document) -> Result<Self> {
        let network = doc.network()?;
        let initial = doc.initial_states(&network)?;
        Ok(Self::new(StateGraph::build(network, &initial)?))
    }

    /// Check a CTL formula given as text.
    pub fn check(&self, formula: &str) -> Result<Evaluation> {
        // Phase 1: Parse
        let ast = ctl::parse(formula)?;

        // Phase 2: Translate into the checked fragment
        let formula = ctl::translate(&ast)?;

        // Phase 3: Evaluate
        eval::evaluate(&formula, &self.graph)
    }

    /// Check an already-translated formula.
    pub fn check_formula(&self, formula: &Formula) -> Result<Evaluation> {
        eval::evaluate(formula, &self.graph)
    }

    /// Access the underlying state graph (for export and diagnostics).
    pub fn graph(&self) -> &StateGraph {
        &self.graph
    }
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("syntax error at position {position}: {message}")]
    Syntax { position: usize, message: String },

    #[error("operator '{operator}' is outside the checked fragment")]
    UnsupportedFormula { operator: String },

    #[error("malformed model: {0}")]
    MalformedModel(String),

    #[error("formula names gene '{0}', which the network does not declare")]
    UnknownGene(String),

    #[error("no states are reachable from the initial configuration")]
    EmptyStateSpace,

    #[error("invalid input document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
