//! CTL recursive descent parser.
//!
//! Parses token streams into the surface AST. Precedence, loosest first:
//! `|`, `&`, then unary/temporal operators. Until and WeakUntil use the
//! spelled-out form `A (φ) U (ψ)` / `E (φ) W (ψ)`.
//!
//! Temporal keywords are resolved contextually: an identifier followed by a
//! comparison operator is always an atomic proposition, so genes named `A`,
//! `E`, `U` or even `AG` remain usable.

use super::ast::{Cmp, Expr, Quantifier};
use super::lexer::{Token, TokenKind};
use crate::{Error, Result};

/// Parser state — wraps a token slice with cursor.
struct Parser<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_kind(&self) -> TokenKind {
        self.peek().kind
    }

    /// Kind of the token after the current one.
    fn peek_next_kind(&self) -> TokenKind {
        self.tokens[(self.pos + 1).min(self.tokens.len() - 1)].kind
    }

    fn advance(&mut self) -> &Token {
        let tok = &self.tokens[self.pos.min(self.tokens.len() - 1)];
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&Token> {
        let tok = self.peek();
        if tok.kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(format!("expected {:?}, got {:?} '{}'", kind, tok.kind, tok.text)))
        }
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek_kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, msg: String) -> Error {
        Error::Syntax {
            position: self.peek().span.start,
            message: msg,
        }
    }
}

/// Parse a complete formula from tokens.
pub fn parse_formula(tokens: &[Token]) -> Result<Expr> {
    let mut p = Parser::new(tokens);
    let expr = parse_disjunction(&mut p)?;
    if !p.at(TokenKind::Eof) {
        return Err(p.error(format!(
            "unexpected token after formula: '{}'",
            p.peek().text
        )));
    }
    Ok(expr)
}

fn parse_disjunction(p: &mut Parser) -> Result<Expr> {
    let mut left = parse_conjunction(p)?;
    while p.eat(TokenKind::Pipe) {
        let right = parse_conjunction(p)?;
        left = Expr::Or(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_conjunction(p: &mut Parser) -> Result<Expr> {
    let mut left = parse_unary(p)?;
    while p.eat(TokenKind::Amp) {
        let right = parse_unary(p)?;
        left = Expr::And(Box::new(left), Box::new(right));
    }
    Ok(left)
}

fn parse_unary(p: &mut Parser) -> Result<Expr> {
    match p.peek_kind() {
        TokenKind::Bang => {
            p.advance();
            Ok(Expr::Not(Box::new(parse_unary(p)?)))
        }
        TokenKind::LParen => {
            p.advance();
            let inner = parse_disjunction(p)?;
            p.expect(TokenKind::RParen)?;
            Ok(inner)
        }
        TokenKind::True => {
            p.advance();
            Ok(Expr::Const(true))
        }
        TokenKind::False => {
            p.advance();
            Ok(Expr::Const(false))
        }
        TokenKind::Ident => {
            // An identifier followed by a comparison is always a proposition,
            // whatever it is named.
            if is_comparison(p.peek_next_kind()) {
                return parse_proposition(p);
            }
            let text = p.peek().text.clone();
            match text.as_str() {
                "AX" => parse_temporal_unary(p, Quantifier::Forall, Expr::Next),
                "EX" => parse_temporal_unary(p, Quantifier::Exists, Expr::Next),
                "AF" => parse_temporal_unary(p, Quantifier::Forall, Expr::Finally),
                "EF" => parse_temporal_unary(p, Quantifier::Exists, Expr::Finally),
                "AG" => parse_temporal_unary(p, Quantifier::Forall, Expr::Globally),
                "EG" => parse_temporal_unary(p, Quantifier::Exists, Expr::Globally),
                "A" => parse_temporal_binary(p, Quantifier::Forall),
                "E" => parse_temporal_binary(p, Quantifier::Exists),
                _ => Err(p.error(format!(
                    "expected a comparison after gene name '{text}'"
                ))),
            }
        }
        kind => Err(p.error(format!("unexpected token {kind:?} '{}'", p.peek().text))),
    }
}

fn parse_temporal_unary(
    p: &mut Parser,
    quantifier: Quantifier,
    build: fn(Quantifier, Box<Expr>) -> Expr,
) -> Result<Expr> {
    p.advance(); // operator keyword
    let operand = parse_unary(p)?;
    Ok(build(quantifier, Box::new(operand)))
}

fn parse_temporal_binary(p: &mut Parser, quantifier: Quantifier) -> Result<Expr> {
    p.advance(); // 'A' | 'E'
    let left = parse_unary(p)?;

    let connective = p.peek();
    let weak = match (connective.kind, connective.text.as_str()) {
        (TokenKind::Ident, "U") => false,
        (TokenKind::Ident, "W") => true,
        _ => {
            return Err(p.error(format!(
                "expected 'U' or 'W', got '{}'",
                connective.text
            )));
        }
    };
    p.advance();

    let right = parse_unary(p)?;
    Ok(if weak {
        Expr::WeakUntil(quantifier, Box::new(left), Box::new(right))
    } else {
        Expr::Until(quantifier, Box::new(left), Box::new(right))
    })
}

fn parse_proposition(p: &mut Parser) -> Result<Expr> {
    let gene = p.expect(TokenKind::Ident)?.text.clone();

    let cmp = match p.peek_kind() {
        TokenKind::Le => Cmp::Le,
        TokenKind::Ge => Cmp::Ge,
        TokenKind::EqEq => Cmp::Eq,
        TokenKind::Lt => Cmp::Lt,
        TokenKind::Gt => Cmp::Gt,
        TokenKind::Neq => Cmp::Ne,
        _ => return Err(p.error("expected a comparison operator".into())),
    };
    p.advance();

    let level_tok = p.expect(TokenKind::Integer)?;
    let level: i64 = level_tok.text.parse().map_err(|_| Error::Syntax {
        position: level_tok.span.start,
        message: format!("integer literal '{}' is out of range", level_tok.text),
    })?;

    Ok(Expr::Prop { gene, cmp, level })
}

fn is_comparison(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Le
            | TokenKind::Ge
            | TokenKind::EqEq
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Neq
    )
}

#[cfg(test)]
mod tests {
    use super::super::lexer::tokenize;
    use super::*;

    fn parse(input: &str) -> Expr {
        parse_formula(&tokenize(input).unwrap()).unwrap()
    }

    #[test]
    fn test_precedence_or_below_and() {
        // a & b | c & d  ==  (a & b) | (c & d)
        let expr = parse("a >= 1 & b >= 1 | c >= 1 & d >= 1");
        assert!(matches!(expr, Expr::Or(ref l, ref r)
            if matches!(**l, Expr::And(..)) && matches!(**r, Expr::And(..))));
    }

    #[test]
    fn test_left_grouping() {
        let expr = parse("a >= 1 | b >= 1 | c >= 1");
        assert!(matches!(expr, Expr::Or(ref l, _) if matches!(**l, Expr::Or(..))));
    }

    #[test]
    fn test_temporal_unary() {
        let expr = parse("AG (x1 >= 3)");
        assert!(matches!(expr, Expr::Globally(Quantifier::Forall, _)));
    }

    #[test]
    fn test_until() {
        let expr = parse("A (x1 >= 2) U (EG (x2 >= 1))");
        let Expr::Until(Quantifier::Forall, _, right) = expr else {
            panic!("expected AU");
        };
        assert!(matches!(*right, Expr::Globally(Quantifier::Exists, _)));
    }

    #[test]
    fn test_weak_until() {
        let expr = parse("E (AG (x3 <= 5)) W (EF (x4 >= 8))");
        assert!(matches!(expr, Expr::WeakUntil(Quantifier::Exists, _, _)));
    }

    #[test]
    fn test_gene_named_like_quantifier() {
        // 'A' before a comparison is a gene, not a quantifier.
        let expr = parse("EX (A == 1)");
        let Expr::Next(Quantifier::Exists, inner) = expr else {
            panic!("expected EX");
        };
        assert_eq!(
            *inner,
            Expr::Prop { gene: "A".into(), cmp: Cmp::Eq, level: 1 }
        );
    }

    #[test]
    fn test_nested_negation() {
        let expr = parse("!(x1 <= 3 & x2 >= 7)");
        assert!(matches!(expr, Expr::Not(ref inner) if matches!(**inner, Expr::And(..))));
    }

    #[test]
    fn test_booleans() {
        assert_eq!(parse("true"), Expr::Const(true));
        assert!(matches!(parse("A (true) U (x >= 1)"), Expr::Until(..)));
    }

    #[test]
    fn test_trailing_garbage_rejected() {
        let tokens = tokenize("x >= 1 y").unwrap();
        assert!(parse_formula(&tokens).is_err());
    }

    #[test]
    fn test_missing_until_connective() {
        let tokens = tokenize("A (x >= 1) (y >= 1)").unwrap();
        assert!(parse_formula(&tokens).is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let text = "A (x1 >= 2) U (EG (x2 >= 1))";
        let expr = parse(text);
        assert_eq!(parse(&expr.to_string()), expr);
    }
}
