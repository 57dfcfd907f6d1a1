//! CTL lexer — tokenizes a formula string.

use crate::{Error, Result};

/// A token from the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub text: String,
}

/// Source span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Token kinds.
///
/// Temporal keywords (`AG`, `EX`, `A`, `U`, ..) are NOT distinguished here:
/// they come out as `Ident` and the parser resolves them contextually, so a
/// gene named `A` or `U` still works as a proposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Integer,
    True,
    False,

    // Punctuation
    LParen,
    RParen,
    Bang,
    Amp,
    Pipe,

    // Comparison operators
    Le,
    Ge,
    EqEq,
    Lt,
    Gt,
    Neq,

    Eof,
}

/// Tokenize a CTL formula string.
pub fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            }

            '(' => push_single(&mut tokens, &mut chars, TokenKind::LParen),
            ')' => push_single(&mut tokens, &mut chars, TokenKind::RParen),
            '&' => {
                chars.next();
                // Tolerate the doubled form '&&'.
                if matches!(chars.peek(), Some(&(_, '&'))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::Amp, "&&");
                } else {
                    push_at(&mut tokens, pos, pos + 1, TokenKind::Amp, "&");
                }
            }
            '|' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '|'))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::Pipe, "||");
                } else {
                    push_at(&mut tokens, pos, pos + 1, TokenKind::Pipe, "|");
                }
            }
            '<' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::Le, "<=");
                } else {
                    push_at(&mut tokens, pos, pos + 1, TokenKind::Lt, "<");
                }
            }
            '>' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::Ge, ">=");
                } else {
                    push_at(&mut tokens, pos, pos + 1, TokenKind::Gt, ">");
                }
            }
            '=' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::EqEq, "==");
                } else {
                    return Err(Error::Syntax {
                        position: pos,
                        message: "expected '==' (single '=' is not a comparison)".into(),
                    });
                }
            }
            '!' => {
                chars.next();
                if matches!(chars.peek(), Some(&(_, '='))) {
                    chars.next();
                    push_at(&mut tokens, pos, pos + 2, TokenKind::Neq, "!=");
                } else {
                    push_at(&mut tokens, pos, pos + 1, TokenKind::Bang, "!");
                }
            }

            c if c.is_ascii_digit() => {
                let start = pos;
                let mut end = pos;
                let mut text = String::new();
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_digit() {
                        text.push(c);
                        end = p + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                push_at(&mut tokens, start, end, TokenKind::Integer, &text);
            }

            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                let mut end = pos;
                let mut text = String::new();
                while let Some(&(p, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        text.push(c);
                        end = p + 1;
                        chars.next();
                    } else {
                        break;
                    }
                }
                let kind = match text.as_str() {
                    "true" => TokenKind::True,
                    "false" => TokenKind::False,
                    _ => TokenKind::Ident,
                };
                push_at(&mut tokens, start, end, kind, &text);
            }

            c => {
                return Err(Error::Syntax {
                    position: pos,
                    message: format!("unexpected character '{c}'"),
                });
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        span: Span { start: input.len(), end: input.len() },
        text: String::new(),
    });
    Ok(tokens)
}

fn push_single(
    tokens: &mut Vec<Token>,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    kind: TokenKind,
) {
    let (pos, ch) = chars.next().expect("caller peeked");
    push_at(tokens, pos, pos + ch.len_utf8(), kind, &ch.to_string());
}

fn push_at(tokens: &mut Vec<Token>, start: usize, end: usize, kind: TokenKind, text: &str) {
    tokens.push(Token {
        kind,
        span: Span { start, end },
        text: text.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_proposition() {
        assert_eq!(
            kinds("x1 >= 3"),
            vec![TokenKind::Ident, TokenKind::Ge, TokenKind::Integer, TokenKind::Eof]
        );
    }

    #[test]
    fn test_temporal_keywords_are_plain_idents() {
        let toks = tokenize("AG (A == 1)").unwrap();
        assert_eq!(toks[0].kind, TokenKind::Ident);
        assert_eq!(toks[0].text, "AG");
        assert_eq!(toks[2].text, "A");
    }

    #[test]
    fn test_doubled_connectives() {
        assert_eq!(kinds("a >= 1 && b <= 2"), kinds("a >= 1 & b <= 2"));
    }

    #[test]
    fn test_bang_vs_neq() {
        assert_eq!(
            kinds("!(x != 1)"),
            vec![
                TokenKind::Bang,
                TokenKind::LParen,
                TokenKind::Ident,
                TokenKind::Neq,
                TokenKind::Integer,
                TokenKind::RParen,
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn test_rejects_stray_character() {
        assert!(tokenize("x >= $1").is_err());
        assert!(tokenize("x = 1").is_err());
    }
}
