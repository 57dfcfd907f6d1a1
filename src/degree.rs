//! Signed satisfaction degrees and their lattice operations.
//!
//! A `Degree` is the quantitative answer of the checker: positive means the
//! property holds with that much margin, negative means it is violated by
//! that much, zero is the exact satisfaction boundary. Degrees are normalized
//! to `[-1, +1]`; `TOP` and `BOTTOM` are the clamp points.
//!
//! The three operations mirror the boolean connectives:
//!
//! | boolean | quantitative |
//! |---------|--------------|
//! | NOT     | `negate` (sign flip) |
//! | AND     | `meet` (minimum — the worse margin dominates) |
//! | OR      | `join` (maximum — the better margin dominates) |
//!
//! Ordering uses `f64::total_cmp`, which IEEE-754 reverses exactly under
//! negation, so `negate(meet(a, b)) == join(negate(a), negate(b))` holds
//! bit-for-bit. Fixpoint loops rely on that: convergence is detected with
//! exact equality, never with an epsilon.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// A signed satisfaction degree.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Degree(f64);

impl Degree {
    /// Maximal satisfaction margin.
    pub const TOP: Degree = Degree(1.0);
    /// Maximal violation margin.
    pub const BOTTOM: Degree = Degree(-1.0);

    /// Wrap a raw value. Degrees must be finite; NaN would poison the
    /// total order the fixpoint loops depend on.
    pub fn new(value: f64) -> Self {
        debug_assert!(value.is_finite(), "degree must be finite, got {value}");
        Degree(value)
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// True when the degree is on or above the satisfaction boundary.
    pub fn is_satisfied(self) -> bool {
        self.0 >= 0.0
    }

    /// Quantitative NOT.
    pub fn negate(self) -> Self {
        Degree(-self.0)
    }

    /// Quantitative AND: the weaker margin dominates.
    pub fn meet(self, other: Self) -> Self {
        std::cmp::min(self, other)
    }

    /// Quantitative OR: the stronger margin dominates.
    pub fn join(self, other: Self) -> Self {
        std::cmp::max(self, other)
    }
}

// Equality follows the same total order as the comparisons, so fixpoint
// convergence checks and heap ordering can never disagree (total_cmp keeps
// -0.0 and +0.0 distinct, unlike the primitive `==`).
impl PartialEq for Degree {
    fn eq(&self, other: &Self) -> bool {
        self.0.total_cmp(&other.0) == Ordering::Equal
    }
}

impl Eq for Degree {}

impl Ord for Degree {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Degree {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Degree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Degree> for f64 {
    fn from(d: Degree) -> f64 {
        d.0
    }
}
