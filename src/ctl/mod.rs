//! # CTL Formulas
//!
//! Lexer, parser and typed representation of the checked CTL fragment.
//! Pure functions — no I/O, no state, no network dependency.
//!
//! Two layers, on purpose:
//! - the surface [`ast::Expr`] covers the full operator set the grammar
//!   knows (including `EF`/`AF`/`EW`/`AW`);
//! - the checked [`Formula`] covers only the quantitatively evaluable
//!   fragment; [`translate`] is the gate between the two.

pub mod ast;
pub mod formula;
pub mod lexer;
pub mod parser;
pub mod translate;

use crate::Result;
use ast::Expr;

pub use ast::{Cmp, Quantifier};
pub use formula::{Comparison, Formula, FormulaNode, NodeIdx};
pub use translate::translate;

/// Parse a CTL formula string into the surface AST.
pub fn parse(input: &str) -> Result<Expr> {
    let tokens = lexer::tokenize(input)?;
    parser::parse_formula(&tokens)
}

/// Parse and translate in one step.
pub fn compile(input: &str) -> Result<Formula> {
    translate(&parse(input)?)
}
