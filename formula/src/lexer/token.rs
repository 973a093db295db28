//! Token definitions

use crate::value::ValueKind;
use logos::Logos;

/// Formula token
///
/// `Symbol` names become `Method` in a post-pass when a `(` follows them,
/// and signed numbers are assembled from `Minus` + number in another.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    // Type casts win over `<`
    #[regex(
        r"<(b|bool|s|string|i|int|int32|d|double|c|char|h|datetime)>",
        |lex| CastTarget::from_code(&lex.slice()[1..lex.slice().len() - 1]),
        ignore(ascii_case)
    )]
    Cast(CastTarget),

    // Logical
    #[token("&&")]
    AndAnd,
    #[token("&")]
    And,
    #[token("||")]
    OrOr,
    #[token("|")]
    Or,
    #[token("!")]
    Not,

    // Arithmetic
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("#")]
    Hash,
    #[token("^")]
    Caret,

    // Relational
    #[token("=")]
    Eq,
    #[token("<>")]
    NotEq,
    #[token(">")]
    Gt,
    #[token("<")]
    Lt,
    #[token(">=")]
    GtEq,
    #[token("<=")]
    LtEq,

    // Brackets
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,

    // Separators
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token("?")]
    Question,

    #[token("true", ignore(ascii_case))]
    #[token("false", ignore(ascii_case))]
    BoolLit,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*(\.[A-Za-z_][A-Za-z0-9_]*)*")]
    Symbol,
    Method,

    #[regex(r"[0-9]+\.[0-9]+")]
    DoubleLit,
    #[regex(r"[0-9]+")]
    IntLit,
    #[regex(r#""([^"\\]|\\.)*""#)]
    StringLit,
    #[regex(r"'([^'\\]|\\.)'")]
    CharLit,

    #[regex(r"\s+")]
    Whitespace,
}

/// Target of a `<Code>` type cast
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastTarget {
    Bool,
    String,
    Int,
    Double,
    Char,
    DateTime,
}

impl CastTarget {
    /// Parse a cast code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "b" | "bool" => Some(CastTarget::Bool),
            "s" | "string" => Some(CastTarget::String),
            "i" | "int" | "int32" => Some(CastTarget::Int),
            "d" | "double" => Some(CastTarget::Double),
            "c" | "char" => Some(CastTarget::Char),
            "h" | "datetime" => Some(CastTarget::DateTime),
            _ => None,
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            CastTarget::Bool => ValueKind::Bool,
            CastTarget::String => ValueKind::String,
            CastTarget::Int => ValueKind::Int,
            CastTarget::Double => ValueKind::Double,
            CastTarget::Char => ValueKind::Char,
            CastTarget::DateTime => ValueKind::DateTime,
        }
    }
}

impl Token {
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Token::BoolLit | Token::IntLit | Token::DoubleLit | Token::StringLit | Token::CharLit
        )
    }

    pub fn is_open_bracket(self) -> bool {
        matches!(self, Token::LParen | Token::LBracket | Token::LBrace)
    }

    pub fn is_close_bracket(self) -> bool {
        matches!(self, Token::RParen | Token::RBracket | Token::RBrace)
    }

    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Token::Plus | Token::Minus | Token::Star | Token::Slash | Token::Hash | Token::Caret
        )
    }

    pub fn is_relational(self) -> bool {
        matches!(
            self,
            Token::Eq | Token::NotEq | Token::Gt | Token::Lt | Token::GtEq | Token::LtEq
        )
    }

    pub fn is_logical(self) -> bool {
        matches!(self, Token::AndAnd | Token::And | Token::OrOr | Token::Or | Token::Not)
    }

    pub fn is_operator(self) -> bool {
        self.is_arithmetic() || self.is_relational() || self.is_logical()
    }

    /// Whether a `-` directly before a number is a sign when this token precedes it.
    pub fn admits_sign(self) -> bool {
        self.is_operator()
            || self.is_open_bracket()
            || matches!(self, Token::Comma | Token::Colon | Token::Question)
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Cast(target) => write!(f, "cast<{target:?}>"),
            Token::AndAnd => write!(f, "&&"),
            Token::And => write!(f, "&"),
            Token::OrOr => write!(f, "||"),
            Token::Or => write!(f, "|"),
            Token::Not => write!(f, "!"),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Hash => write!(f, "#"),
            Token::Caret => write!(f, "^"),
            Token::Eq => write!(f, "="),
            Token::NotEq => write!(f, "<>"),
            Token::Gt => write!(f, ">"),
            Token::Lt => write!(f, "<"),
            Token::GtEq => write!(f, ">="),
            Token::LtEq => write!(f, "<="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Colon => write!(f, ":"),
            Token::Question => write!(f, "?"),
            Token::BoolLit => write!(f, "bool literal"),
            Token::Symbol => write!(f, "symbol"),
            Token::Method => write!(f, "method"),
            Token::DoubleLit => write!(f, "double literal"),
            Token::IntLit => write!(f, "int literal"),
            Token::StringLit => write!(f, "string literal"),
            Token::CharLit => write!(f, "char literal"),
            Token::Whitespace => write!(f, "whitespace"),
        }
    }
}
