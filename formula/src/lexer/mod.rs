//! Lexer implementation using logos

mod token;

pub use token::{CastTarget, Token};

use crate::error::{EvalError, Result};
use crate::span::Span;
use logos::Logos;
use serde::Serialize;
use std::fmt;

/// A token together with the exact text it matched
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Lexeme {
    #[serde(serialize_with = "serialize_token")]
    pub token: Token,
    pub text: String,
    pub span: Span,
}

fn serialize_token<S: serde::Serializer>(token: &Token, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_str(&format_args!("{token:?}"))
}

impl Lexeme {
    pub fn new(token: Token, text: impl Into<String>, span: Span) -> Self {
        Self {
            token,
            text: text.into(),
            span,
        }
    }
}

impl fmt::Display for Lexeme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {:?}", self.token, self.text)
    }
}

/// Ordered token sequence covering a formula
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Tokens(Vec<Lexeme>);

impl Tokens {
    pub fn new(lexemes: Vec<Lexeme>) -> Self {
        Self(lexemes)
    }

    /// Drop whitespace tokens before parsing.
    pub fn without_whitespace(self) -> Tokens {
        Tokens(self.0.into_iter().filter(|l| l.token != Token::Whitespace).collect())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Lexeme> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn kinds(&self) -> Vec<Token> {
        self.0.iter().map(|l| l.token).collect()
    }
}

impl<'a> IntoIterator for &'a Tokens {
    type Item = &'a Lexeme;
    type IntoIter = std::slice::Iter<'a, Lexeme>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Tokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, lexeme) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{lexeme}")?;
        }
        write!(f, "]")
    }
}

/// Tokenize formula text, whitespace included.
///
/// Fails on the first offset no token matches.
pub fn tokenize(source: &str) -> Result<Tokens> {
    let mut raw = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(result) = lexer.next() {
        let span = Span::new(lexer.span().start, lexer.span().end);
        match result {
            Ok(token) => raw.push(Lexeme::new(token, lexer.slice(), span)),
            Err(_) => {
                return Err(EvalError::lex(
                    format!("unexpected character: {:?}", lexer.slice()),
                    span,
                ));
            }
        }
    }

    let mut lexemes = merge_signs(raw);
    classify_methods(&mut lexemes);
    Ok(Tokens(lexemes))
}

/// Fold a `-` into the number right after it when the `-` is in prefix position.
fn merge_signs(raw: Vec<Lexeme>) -> Vec<Lexeme> {
    let mut out: Vec<Lexeme> = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();

    while let Some(lexeme) = iter.next() {
        if lexeme.token == Token::Minus {
            let prefix_position = out
                .iter()
                .rev()
                .find(|l| l.token != Token::Whitespace)
                .is_none_or(|prev| prev.token.admits_sign());
            if let Some(number) = iter.next_if(|next| {
                prefix_position
                    && matches!(next.token, Token::IntLit | Token::DoubleLit)
                    && lexeme.span.touches(next.span)
            }) {
                out.push(Lexeme::new(
                    number.token,
                    format!("-{}", number.text),
                    lexeme.span.merge(number.span),
                ));
                continue;
            }
        }
        out.push(lexeme);
    }

    out
}

/// A symbol followed (ignoring whitespace) by `(` names an intrinsic method.
fn classify_methods(lexemes: &mut [Lexeme]) {
    for i in 0..lexemes.len() {
        if lexemes[i].token != Token::Symbol {
            continue;
        }
        let next = lexemes[i + 1..].iter().find(|l| l.token != Token::Whitespace);
        if next.is_some_and(|l| l.token == Token::LParen) {
            lexemes[i].token = Token::Method;
        }
    }
}
