//! Conversions between value variants

use super::{DATE_FORMAT, Value, ValueKind};
use crate::error::{EvalError, Result};
use chrono::NaiveDate;

impl Value {
    /// Convert a scalar to `target`.
    ///
    /// Lists have no scalar conversion; use [`Value::cast`] for element-wise casts.
    pub fn convert_to(&self, target: ValueKind) -> Result<Value> {
        if self.kind() == target {
            return Ok(self.clone());
        }
        let converted = match (self, target) {
            (Value::Int(n), ValueKind::Bool) => Some(Value::Bool(*n != 0)),
            (Value::Double(x), ValueKind::Bool) => Some(Value::Bool(*x != 0.0)),
            (Value::String(s), ValueKind::Bool) => parse_bool(s).map(Value::Bool),

            (Value::Bool(b), ValueKind::Int) => Some(Value::Int(i64::from(*b))),
            (Value::Double(x), ValueKind::Int) => truncate(*x).map(Value::Int),
            (Value::Char(c), ValueKind::Int) => Some(Value::Int(i64::from(u32::from(*c)))),
            (Value::String(s), ValueKind::Int) => s.parse::<i64>().ok().map(Value::Int),

            (Value::Bool(b), ValueKind::Double) => Some(Value::Double(if *b { 1.0 } else { 0.0 })),
            (Value::Int(n), ValueKind::Double) => Some(Value::Double(*n as f64)),
            (Value::String(s), ValueKind::Double) => s.parse::<f64>().ok().map(Value::Double),

            (Value::Int(n), ValueKind::Char) => u32::try_from(*n).ok().and_then(char::from_u32).map(Value::Char),
            (Value::String(s), ValueKind::Char) => s.chars().next().map(Value::Char),

            (Value::String(s), ValueKind::DateTime) => NaiveDate::parse_from_str(s, DATE_FORMAT).ok().map(Value::DateTime),

            (_, ValueKind::String) => self.to_text().map(Value::String),
            _ => None,
        };
        converted.ok_or_else(|| self.conversion_error(target))
    }

    /// String form used by `<S>` casts, `ToString` and string upgrades.
    ///
    /// Differs from `Display` for Bool (`True`) and Double (six decimals).
    fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(true) => Some("True".to_string()),
            Value::Bool(false) => Some("False".to_string()),
            Value::Int(n) => Some(n.to_string()),
            Value::Double(x) => Some(format!("{x:.6}")),
            Value::Char(c) => Some(c.to_string()),
            Value::String(s) => Some(s.clone()),
            Value::DateTime(d) => Some(d.format(DATE_FORMAT).to_string()),
            Value::IntRange { from, to } => Some(format!("{from}-{to}")),
            Value::Conditional { on_true, on_false, .. } => {
                Some(format!("{} || {}", on_true.to_text()?, on_false.to_text()?))
            }
            Value::List(_) | Value::CommaList(_) => None,
        }
    }

    /// Type-cast semantics: element-wise on lists, a comma group is cast as a list.
    pub fn cast(self, target: ValueKind) -> Result<Value> {
        match self {
            Value::List(items) | Value::CommaList(items) => items
                .iter()
                .map(|item| item.convert_to(target))
                .collect::<Result<Vec<_>>>()
                .map(Value::List),
            scalar => scalar.convert_to(target),
        }
    }

    fn conversion_error(&self, target: ValueKind) -> EvalError {
        EvalError::conversion(self.type_name(), target.name(), self.to_string())
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

fn truncate(x: f64) -> Option<i64> {
    let t = x.trunc();
    if t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64 {
        Some(t as i64)
    } else {
        None
    }
}

/// Convert every element to the type of the first element.
pub fn homogenize(items: Vec<Value>) -> Result<Vec<Value>> {
    let Some(kind) = items.first().map(Value::kind) else {
        return Ok(items);
    };
    items
        .into_iter()
        .map(|item| if item.kind() == kind { Ok(item) } else { item.convert_to(kind) })
        .collect()
}
