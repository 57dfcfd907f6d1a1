//! States of the network — immutable vectors of gene activity levels.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

/// A discrete activity level of one gene.
pub type Level = u8;

/// Dense index of a state inside a built `StateGraph`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateId(pub u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A state: one activity level per gene, in the network's canonical gene
/// order. Equal level vectors are the same state — equality and hashing
/// cover the full vector, which makes `State` usable as a map key.
///
/// Most networks have a handful of genes, so levels are stored inline.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct State(SmallVec<[Level; 8]>);

impl State {
    pub fn new(levels: impl IntoIterator<Item = Level>) -> Self {
        State(levels.into_iter().collect())
    }

    /// Number of genes.
    pub fn arity(&self) -> usize {
        self.0.len()
    }

    pub fn level(&self, gene: usize) -> Level {
        self.0[gene]
    }

    pub fn levels(&self) -> &[Level] {
        &self.0
    }

    /// Copy of this state with one gene set to a new level.
    pub fn with_level(&self, gene: usize, level: Level) -> Self {
        let mut next = self.clone();
        next.0[gene] = level;
        next
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, level) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{level}")?;
        }
        write!(f, ")")
    }
}

impl From<&[Level]> for State {
    fn from(levels: &[Level]) -> Self {
        State(levels.iter().copied().collect())
    }
}

impl<const N: usize> From<[Level; N]> for State {
    fn from(levels: [Level; N]) -> Self {
        State(levels.into_iter().collect())
    }
}
