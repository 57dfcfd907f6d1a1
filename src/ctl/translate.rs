//! Translation from the surface AST into the checked fragment.
//!
//! This is the gate of the fragment: Finally (`EF`/`AF`) and WeakUntil
//! (`EW`/`AW`) parse fine but are rejected here with the offending operator
//! named. Surface comparisons `<`, `>` and `!=` are desugared into the
//! canonical `<=`, `>=`, `==`.

use super::ast::{Cmp, Expr};
use super::formula::{Comparison, Formula, FormulaBuilder, FormulaNode, NodeIdx};
use crate::{Error, Result};

/// Translate a parsed formula into the checked fragment.
pub fn translate(expr: &Expr) -> Result<Formula> {
    let mut builder = FormulaBuilder::new();
    let root = lower(expr, &mut builder)?;
    Ok(builder.finish(root))
}

fn lower(expr: &Expr, b: &mut FormulaBuilder) -> Result<NodeIdx> {
    let node = match expr {
        Expr::Prop { gene, cmp, level } => lower_prop(gene, *cmp, *level, b)?,

        Expr::Const(v) => b.intern(FormulaNode::Const(*v)),

        Expr::Not(inner) => {
            let child = lower(inner, b)?;
            b.intern(FormulaNode::Not(child))
        }
        Expr::And(l, r) => {
            let left = lower(l, b)?;
            let right = lower(r, b)?;
            b.intern(FormulaNode::And(left, right))
        }
        Expr::Or(l, r) => {
            let left = lower(l, b)?;
            let right = lower(r, b)?;
            b.intern(FormulaNode::Or(left, right))
        }
        Expr::Next(q, inner) => {
            let child = lower(inner, b)?;
            b.intern(FormulaNode::Next(*q, child))
        }
        Expr::Globally(q, inner) => {
            let child = lower(inner, b)?;
            b.intern(FormulaNode::Globally(*q, child))
        }
        Expr::Until(q, l, r) => {
            let left = lower(l, b)?;
            let right = lower(r, b)?;
            b.intern(FormulaNode::Until(*q, left, right))
        }

        Expr::Finally(q, _) => {
            return Err(Error::UnsupportedFormula {
                operator: format!("{}F", q.letter()),
            });
        }
        Expr::WeakUntil(q, _, _) => {
            return Err(Error::UnsupportedFormula {
                operator: format!("{}W", q.letter()),
            });
        }
    };
    Ok(node)
}

fn lower_prop(gene: &str, cmp: Cmp, level: i64, b: &mut FormulaBuilder) -> Result<NodeIdx> {
    let prop = |cmp: Comparison, threshold: i64| FormulaNode::Prop {
        gene: gene.to_string(),
        cmp,
        threshold,
    };

    let node = match cmp {
        Cmp::Le => prop(Comparison::Le, level),
        Cmp::Ge => prop(Comparison::Ge, level),
        Cmp::Eq => prop(Comparison::Eq, level),
        // Strict comparisons over integer levels shift the threshold.
        Cmp::Lt => prop(Comparison::Le, level - 1),
        Cmp::Gt => prop(Comparison::Ge, level + 1),
        Cmp::Ne => {
            let eq = b.intern(prop(Comparison::Eq, level));
            return Ok(b.intern(FormulaNode::Not(eq)));
        }
    };
    Ok(b.intern(node))
}

#[cfg(test)]
mod tests {
    use super::super::parse;
    use super::*;

    fn try_translate(input: &str) -> Result<Formula> {
        translate(&parse(input)?)
    }

    #[test]
    fn test_fragment_accepts_supported_operators() {
        for f in [
            "EX (x >= 1)",
            "AX (x >= 1)",
            "EG (x >= 1)",
            "AG (x >= 1)",
            "E (x >= 1) U (y >= 1)",
            "A (x >= 1) U (y >= 1)",
            "!(x >= 1) & (y <= 2 | true)",
        ] {
            assert!(try_translate(f).is_ok(), "rejected: {f}");
        }
    }

    #[test]
    fn test_fragment_rejects_finally() {
        for (f, op) in [("EF (x >= 1)", "EF"), ("AF (x >= 1)", "AF")] {
            match try_translate(f) {
                Err(Error::UnsupportedFormula { operator }) => assert_eq!(operator, op),
                other => panic!("expected rejection of {f}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_fragment_rejects_weak_until() {
        for (f, op) in [
            ("E (x >= 1) W (y >= 1)", "EW"),
            ("A (x >= 1) W (y >= 1)", "AW"),
        ] {
            match try_translate(f) {
                Err(Error::UnsupportedFormula { operator }) => assert_eq!(operator, op),
                other => panic!("expected rejection of {f}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_rejection_under_nesting() {
        assert!(matches!(
            try_translate("AG (EF (x >= 1))"),
            Err(Error::UnsupportedFormula { .. })
        ));
    }

    #[test]
    fn test_strict_comparisons_desugar() {
        let f = try_translate("x > 2").unwrap();
        assert_eq!(
            f.node(f.root()),
            &FormulaNode::Prop {
                gene: "x".into(),
                cmp: Comparison::Ge,
                threshold: 3
            }
        );

        let f = try_translate("x < 0").unwrap();
        assert_eq!(
            f.node(f.root()),
            &FormulaNode::Prop {
                gene: "x".into(),
                cmp: Comparison::Le,
                threshold: -1
            }
        );
    }

    #[test]
    fn test_not_equal_desugars_to_negation() {
        let f = try_translate("x != 1").unwrap();
        assert!(matches!(f.node(f.root()), FormulaNode::Not(_)));
    }

    #[test]
    fn test_shared_subformula_single_node() {
        let f = try_translate("EX (x >= 1) | EX (x >= 1)").unwrap();
        // prop + EX + Or: the duplicated EX subtree collapses.
        assert_eq!(f.len(), 3);
    }
}
