//! Dynamic values produced by literals, symbols, operators and intrinsics

mod convert;

pub use convert::homogenize;

use chrono::NaiveDate;
use std::fmt;

/// Text format used for DateTime literals, conversions and display.
pub const DATE_FORMAT: &str = "%m/%d/%Y";

/// Runtime value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Double(f64),
    Char(char),
    String(String),
    /// Calendar date; the language has no time-of-day component
    DateTime(NaiveDate),
    /// Inclusive index range built by `from:to`
    IntRange { from: i64, to: i64 },
    /// Homogeneous list; the element type is the type of the first element
    List(Vec<Value>),
    /// Comma-separated operands, always kept flat
    CommaList(Vec<Value>),
    /// `cond : (onTrue, onFalse)`, resolved by `?`
    Conditional {
        cond: bool,
        on_true: Box<Value>,
        on_false: Box<Value>,
    },
}

/// Variant tag of a [`Value`], used for casts, homogenizing and signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Bool,
    Int,
    Double,
    Char,
    String,
    DateTime,
    IntRange,
    List,
    CommaList,
    Conditional,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::Bool => "Bool",
            ValueKind::Int => "Int",
            ValueKind::Double => "Double",
            ValueKind::Char => "Char",
            ValueKind::String => "String",
            ValueKind::DateTime => "DateTime",
            ValueKind::IntRange => "IntRange",
            ValueKind::List => "List",
            ValueKind::CommaList => "CommaList",
            ValueKind::Conditional => "ConditionalValue",
        }
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ValueKind::Int | ValueKind::Double)
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::Char(_) => ValueKind::Char,
            Value::String(_) => ValueKind::String,
            Value::DateTime(_) => ValueKind::DateTime,
            Value::IntRange { .. } => ValueKind::IntRange,
            Value::List(_) => ValueKind::List,
            Value::CommaList(_) => ValueKind::CommaList,
            Value::Conditional { .. } => ValueKind::Conditional,
        }
    }

    /// Get type name for error messages and result display.
    ///
    /// Lists are named after their first element (`Int[]`), `Unknown[]` when empty.
    pub fn type_name(&self) -> String {
        match self {
            Value::List(items) => match items.first() {
                Some(first) => format!("{}[]", first.type_name()),
                None => "Unknown[]".to_string(),
            },
            other => other.kind().name().to_string(),
        }
    }

    /// Element kind of a list, `None` for an empty list or a non-list.
    pub fn element_kind(&self) -> Option<ValueKind> {
        match self {
            Value::List(items) => items.first().map(Value::kind),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind().is_numeric()
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric view of Int and Double values
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(x) => Some(*x),
            Value::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Char(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Join two operands of `,`, keeping the result flat.
    pub fn comma(left: Value, right: Value) -> Value {
        let mut items = match left {
            Value::CommaList(items) => items,
            other => vec![other],
        };
        match right {
            Value::CommaList(rest) => items.extend(rest),
            other => items.push(other),
        }
        Value::CommaList(items)
    }

    /// Turn a comma group into a list; any other value is returned unchanged.
    pub fn flatten(self) -> Value {
        match self {
            Value::CommaList(items) => Value::List(items),
            other => other,
        }
    }

    /// Arguments of an intrinsic call: a comma group spreads, anything else is one argument.
    pub fn into_args(self) -> Vec<Value> {
        match self {
            Value::CommaList(items) => items,
            other => vec![other],
        }
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    write!(f, "[")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Double(x) => write!(f, "{x}"),
            Value::Char(c) => write!(f, "{c}"),
            Value::String(s) => f.write_str(s),
            Value::DateTime(d) => write!(f, "{}", d.format(DATE_FORMAT)),
            Value::IntRange { from, to } => write!(f, "{from}-{to}"),
            Value::List(items) | Value::CommaList(items) => write_items(f, items),
            Value::Conditional { on_true, on_false, .. } => write!(f, "{on_true} || {on_false}"),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Double(x)
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Char(c)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::DateTime(d)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}
