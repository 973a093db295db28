//! Error types and reporting

use crate::span::Span;
use crate::util::format_suggestion_hint;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, EvalError>;

/// Every failure a formula can produce, from lexing through intrinsic dispatch
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("Lexer error at {span}: {message}")]
    Lex { message: String, span: Span },

    #[error("Parse error at {span}: {message}")]
    Parse { message: String, span: Span },

    #[error("Unbalanced brackets at {span}: {message}")]
    UnbalancedBrackets { message: String, span: Span },

    #[error("unknown symbol `{name}`{}", format_suggestion_hint(.hint.as_deref()))]
    UnknownSymbol { name: String, hint: Option<String> },

    #[error("unknown intrinsic method `{name}`{}", format_suggestion_hint(.hint.as_deref()))]
    UnknownMethod { name: String, hint: Option<String> },

    #[error("type mismatch: {message}")]
    TypeMismatch { message: String },

    #[error("invalid operands: {message}")]
    InvalidOperands { message: String },

    #[error("{kind} values cannot be indexed")]
    NotIndexable { kind: String },

    #[error("no overload of {method} matches the arguments; tried {}", .signatures.join(" | "))]
    NoMatchingOverload {
        method: String,
        signatures: Vec<String>,
    },

    #[error("cannot convert {from} `{value}` to {to}")]
    Conversion {
        from: String,
        to: String,
        value: String,
    },

    #[error("index {index} is out of range for length {len}")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("malformed expression: {message}")]
    MalformedExpression { message: String },

    #[error("expression nesting exceeds the limit of {limit}")]
    MaxDepthExceeded { limit: usize },

    #[error("{method} failed: {message}")]
    IntrinsicFailed { method: String, message: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

impl EvalError {
    pub fn lex(message: impl Into<String>, span: Span) -> Self {
        Self::Lex {
            message: message.into(),
            span,
        }
    }

    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        Self::Parse {
            message: message.into(),
            span,
        }
    }

    pub fn unbalanced(message: impl Into<String>, span: Span) -> Self {
        Self::UnbalancedBrackets {
            message: message.into(),
            span,
        }
    }

    pub fn unknown_symbol(name: impl Into<String>, hint: Option<&str>) -> Self {
        Self::UnknownSymbol {
            name: name.into(),
            hint: hint.map(str::to_string),
        }
    }

    pub fn unknown_method(name: impl Into<String>, hint: Option<&str>) -> Self {
        Self::UnknownMethod {
            name: name.into(),
            hint: hint.map(str::to_string),
        }
    }

    pub fn type_mismatch(message: impl Into<String>) -> Self {
        Self::TypeMismatch {
            message: message.into(),
        }
    }

    /// Shorthand for the common "expected X, got Y" mismatch.
    pub fn expected(expected: &str, got: &str) -> Self {
        Self::type_mismatch(format!("expected {expected}, got {got}"))
    }

    pub fn invalid_operands(message: impl Into<String>) -> Self {
        Self::InvalidOperands {
            message: message.into(),
        }
    }

    pub fn not_indexable(kind: impl Into<String>) -> Self {
        Self::NotIndexable { kind: kind.into() }
    }

    pub fn no_matching_overload(method: impl Into<String>, signatures: Vec<String>) -> Self {
        Self::NoMatchingOverload {
            method: method.into(),
            signatures,
        }
    }

    pub fn conversion(from: impl Into<String>, to: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Conversion {
            from: from.into(),
            to: to.into(),
            value: value.into(),
        }
    }

    pub fn index_out_of_range(index: i64, len: usize) -> Self {
        Self::IndexOutOfRange { index, len }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedExpression {
            message: message.into(),
        }
    }

    pub fn max_depth(limit: usize) -> Self {
        Self::MaxDepthExceeded { limit }
    }

    pub fn intrinsic(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::IntrinsicFailed {
            method: method.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn io_error(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn span(&self) -> Option<Span> {
        match self {
            Self::Lex { span, .. } | Self::Parse { span, .. } | Self::UnbalancedBrackets { span, .. } => {
                Some(*span)
            }
            _ => None,
        }
    }

    /// Short category label used in diagnostics and the CLI.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Lex { .. } => "Lexer",
            Self::Parse { .. } => "Parse",
            Self::UnbalancedBrackets { .. } => "Bracket",
            Self::UnknownSymbol { .. } => "UnknownSymbol",
            Self::UnknownMethod { .. } => "UnknownMethod",
            Self::TypeMismatch { .. } => "TypeMismatch",
            Self::InvalidOperands { .. } => "InvalidOperands",
            Self::NotIndexable { .. } => "NotIndexable",
            Self::NoMatchingOverload { .. } => "NoMatchingOverload",
            Self::Conversion { .. } => "Conversion",
            Self::IndexOutOfRange { .. } => "IndexOutOfRange",
            Self::MalformedExpression { .. } => "MalformedExpression",
            Self::MaxDepthExceeded { .. } => "MaxDepthExceeded",
            Self::IntrinsicFailed { .. } => "Intrinsic",
            Self::Config { .. } => "Config",
            Self::Io { .. } => "IO",
        }
    }

    /// Label text for span-bearing errors, without the location prefix.
    fn label(&self) -> String {
        match self {
            Self::Lex { message, .. } | Self::Parse { message, .. } | Self::UnbalancedBrackets { message, .. } => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

impl From<std::io::Error> for EvalError {
    fn from(err: std::io::Error) -> Self {
        Self::io_error(err.to_string())
    }
}

/// Report error with ariadne
pub fn report_error(name: &str, source: &str, error: &EvalError) {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let kind = error.kind_name();
    let printed = if let Some(span) = error.span() {
        Report::build(ReportKind::Error, (name, span.start..span.end))
            .with_message(format!("{kind} error"))
            .with_label(
                Label::new((name, span.start..span.end))
                    .with_message(error.label())
                    .with_color(Color::Red),
            )
            .finish()
            .eprint((name, Source::from(source)))
    } else {
        Report::build(ReportKind::Error, (name, 0..0))
            .with_message(format!("{kind} error: {error}"))
            .finish()
            .eprint((name, Source::from(source)))
    };

    if printed.is_err() {
        eprintln!("{kind} error: {error}");
    }
}
