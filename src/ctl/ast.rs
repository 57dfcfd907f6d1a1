//! CTL surface AST (the parser's output).
//!
//! These types represent parsed formulas. They are pure data — no evaluation
//! logic, no network references. The surface AST deliberately covers MORE
//! than the checked fragment (Finally and WeakUntil parse fine); the
//! translation step decides what is actually supported.

use std::fmt;

/// Path quantifier of a temporal operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    /// `E` — along some path.
    Exists,
    /// `A` — along every path.
    Forall,
}

impl Quantifier {
    pub fn letter(self) -> char {
        match self {
            Quantifier::Exists => 'E',
            Quantifier::Forall => 'A',
        }
    }
}

/// Comparison operator of an atomic proposition, as written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cmp {
    Le,
    Ge,
    Eq,
    Lt,
    Gt,
    Ne,
}

impl fmt::Display for Cmp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Cmp::Le => "<=",
            Cmp::Ge => ">=",
            Cmp::Eq => "==",
            Cmp::Lt => "<",
            Cmp::Gt => ">",
            Cmp::Ne => "!=",
        };
        write!(f, "{s}")
    }
}

/// A parsed state formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// `gene op level`
    Prop { gene: String, cmp: Cmp, level: i64 },
    /// `true` / `false`
    Const(bool),
    /// `! φ`
    Not(Box<Expr>),
    /// `φ & ψ`
    And(Box<Expr>, Box<Expr>),
    /// `φ | ψ`
    Or(Box<Expr>, Box<Expr>),
    /// `EX φ` / `AX φ`
    Next(Quantifier, Box<Expr>),
    /// `EF φ` / `AF φ` — parses, but lies outside the checked fragment.
    Finally(Quantifier, Box<Expr>),
    /// `EG φ` / `AG φ`
    Globally(Quantifier, Box<Expr>),
    /// `E (φ) U (ψ)` / `A (φ) U (ψ)`
    Until(Quantifier, Box<Expr>, Box<Expr>),
    /// `E (φ) W (ψ)` / `A (φ) W (ψ)` — parses, but lies outside the fragment.
    WeakUntil(Quantifier, Box<Expr>, Box<Expr>),
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Prop { gene, cmp, level } => write!(f, "{gene} {cmp} {level}"),
            Expr::Const(b) => write!(f, "{b}"),
            Expr::Not(e) => write!(f, "!({e})"),
            Expr::And(l, r) => write!(f, "({l} & {r})"),
            Expr::Or(l, r) => write!(f, "({l} | {r})"),
            Expr::Next(q, e) => write!(f, "{}X ({e})", q.letter()),
            Expr::Finally(q, e) => write!(f, "{}F ({e})", q.letter()),
            Expr::Globally(q, e) => write!(f, "{}G ({e})", q.letter()),
            Expr::Until(q, l, r) => write!(f, "{} ({l}) U ({r})", q.letter()),
            Expr::WeakUntil(q, l, r) => write!(f, "{} ({l}) W ({r})", q.letter()),
        }
    }
}
