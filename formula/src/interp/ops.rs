//! Operator semantics and the index operator

use crate::error::{EvalError, Result};
use crate::parser::Operator;
use crate::value::Value;
use chrono::{Days, NaiveDate};
use std::cmp::Ordering;

/// Apply a binary arithmetic, relational or set operator.
///
/// Operands arrive flattened: comma groups have already become lists.
pub fn binary(op: Operator, left: Value, right: Value) -> Result<Value> {
    match (&left, &right) {
        (Value::List(_), _) | (_, Value::List(_)) => list_op(op, left, right),
        (Value::DateTime(date), _) => date_op(op, *date, &right),
        (Value::String(a), Value::String(b)) => string_op(op, a, b),
        (a, b) if a.is_numeric() && b.is_numeric() => {
            let (a, b) = (a.as_double().unwrap_or(f64::NAN), b.as_double().unwrap_or(f64::NAN));
            numeric_op(op, a, b)
        }
        _ => Err(unsupported(op, &left, &right)),
    }
}

/// `&&`, `||` and their single-character forms. Both sides are always evaluated.
pub fn logical(op: Operator, left: &Value, right: &Value) -> Result<Value> {
    let (Value::Bool(a), Value::Bool(b)) = (left, right) else {
        return Err(unsupported(op, left, right));
    };
    match op {
        Operator::And => Ok(Value::Bool(*a && *b)),
        Operator::Or => Ok(Value::Bool(*a || *b)),
        _ => Err(unsupported(op, left, right)),
    }
}

pub fn not(operand: &Value) -> Result<Value> {
    match operand {
        Value::Bool(b) => Ok(Value::Bool(!b)),
        other => Err(EvalError::expected("Bool operand for `!`", &other.type_name())),
    }
}

fn unsupported(op: Operator, left: &Value, right: &Value) -> EvalError {
    EvalError::type_mismatch(format!(
        "operator `{}` cannot be applied to {} and {}",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

fn numeric_op(op: Operator, a: f64, b: f64) -> Result<Value> {
    let value = match op {
        Operator::Add => Value::Double(a + b),
        Operator::Sub => Value::Double(a - b),
        Operator::Mul => Value::Double(a * b),
        Operator::Div => Value::Double(a / b),
        Operator::Mod => Value::Double(a % b),
        Operator::Eq => Value::Bool(a == b),
        Operator::NotEq => Value::Bool(a != b),
        Operator::Gt => Value::Bool(a > b),
        Operator::Lt => Value::Bool(a < b),
        Operator::GtEq => Value::Bool(a >= b),
        Operator::LtEq => Value::Bool(a <= b),
        _ => return Err(unsupported(op, &Value::Double(a), &Value::Double(b))),
    };
    Ok(value)
}

fn string_op(op: Operator, a: &str, b: &str) -> Result<Value> {
    let order = a.cmp(b);
    let value = match op {
        Operator::Add => Value::String(format!("{a}{b}")),
        Operator::Eq => Value::Bool(order == Ordering::Equal),
        Operator::NotEq => Value::Bool(order != Ordering::Equal),
        Operator::Gt => Value::Bool(order == Ordering::Greater),
        Operator::Lt => Value::Bool(order == Ordering::Less),
        Operator::GtEq => Value::Bool(order != Ordering::Less),
        Operator::LtEq => Value::Bool(order != Ordering::Greater),
        _ => return Err(unsupported(op, &Value::from(a), &Value::from(b))),
    };
    Ok(value)
}

fn date_op(op: Operator, date: NaiveDate, right: &Value) -> Result<Value> {
    let shifted = |days: i64, forward: bool| {
        let step = Days::new(days.unsigned_abs());
        let moved = if forward == (days >= 0) {
            date.checked_add_days(step)
        } else {
            date.checked_sub_days(step)
        };
        moved
            .map(Value::DateTime)
            .ok_or_else(|| EvalError::invalid_operands(format!("date {date} shifted by {days} days is out of range")))
    };
    match (op, right) {
        (Operator::Add, Value::Int(days)) => shifted(*days, true),
        (Operator::Sub, Value::Int(days)) => shifted(*days, false),
        (Operator::Sub, Value::DateTime(other)) => Ok(Value::Int(date.signed_duration_since(*other).num_days())),
        _ => Err(unsupported(op, &Value::DateTime(date), right)),
    }
}

fn list_op(op: Operator, left: Value, right: Value) -> Result<Value> {
    let (left, right) = match (op, left, right) {
        (Operator::Add, Value::List(l), Value::List(r)) => (l, r),
        (Operator::Add, Value::List(l), other) => (l, vec![other]),
        (Operator::Add, other, Value::List(r)) => (vec![other], r),
        (Operator::Sub, Value::List(l), Value::List(r)) => (l, r),
        (Operator::Sub, Value::List(l), other) => (l, vec![other]),
        (_, Value::List(l), Value::List(r)) => (l, r),
        (_, l, r) => return Err(unsupported(op, &l, &r)),
    };
    check_element_types(op, &left, &right)?;

    let value = match op {
        Operator::Add => Value::List(left.into_iter().chain(right).collect()),
        Operator::Sub => Value::List(left.into_iter().filter(|item| !right.contains(item)).collect()),
        Operator::Intersect => Value::List(left.into_iter().filter(|item| right.contains(item)).collect()),
        Operator::Eq => Value::Bool(left == right),
        Operator::NotEq => Value::Bool(left != right),
        _ => return Err(unsupported(op, &Value::List(left), &Value::List(right))),
    };
    Ok(value)
}

/// Lists combine only when their element types agree; an empty list fits any type.
fn check_element_types(op: Operator, left: &[Value], right: &[Value]) -> Result<()> {
    match (left.first(), right.first()) {
        (Some(a), Some(b)) if a.kind() != b.kind() => Err(EvalError::type_mismatch(format!(
            "operator `{}` needs lists of one element type, got {}[] and {}[]",
            op.symbol(),
            a.type_name(),
            b.type_name()
        ))),
        _ => Ok(()),
    }
}

/// `collection{index}` and `collection{from:to}`.
///
/// Negative positions count from the end. A range whose end falls before its
/// start selects nothing.
pub fn index(collection: Value, index: Value) -> Result<Value> {
    match collection {
        Value::List(items) => match index {
            Value::Int(i) => Ok(items[position(i, items.len())?].clone()),
            Value::IntRange { from, to } => Ok(Value::List(items[span(from, to, items.len())?].to_vec())),
            other => Err(bad_index(&other)),
        },
        Value::String(text) => {
            let chars: Vec<char> = text.chars().collect();
            match index {
                Value::Int(i) => Ok(Value::Char(chars[position(i, chars.len())?])),
                Value::IntRange { from, to } => Ok(Value::String(chars[span(from, to, chars.len())?].iter().collect())),
                other => Err(bad_index(&other)),
            }
        }
        other => Err(EvalError::not_indexable(other.type_name())),
    }
}

fn bad_index(index: &Value) -> EvalError {
    EvalError::expected("Int or IntRange index", &index.type_name())
}

fn position(index: i64, len: usize) -> Result<usize> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let adjusted = if index < 0 { index + signed_len } else { index };
    if adjusted < 0 || adjusted >= signed_len {
        return Err(EvalError::index_out_of_range(index, len));
    }
    usize::try_from(adjusted).map_err(|_| EvalError::index_out_of_range(index, len))
}

fn span(from: i64, to: i64, len: usize) -> Result<std::ops::Range<usize>> {
    let (start, end) = (position(from, len)?, position(to, len)?);
    Ok(if end < start { start..start } else { start..end + 1 })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(values: &[i64]) -> Value {
        Value::from(values.to_vec())
    }

    #[test]
    fn test_numeric_ops_yield_double() {
        assert_eq!(binary(Operator::Add, Value::Int(2), Value::Int(3)).unwrap(), Value::Double(5.0));
        assert_eq!(binary(Operator::Sub, Value::Int(3), Value::Int(5)).unwrap(), Value::Double(-2.0));
        assert_eq!(binary(Operator::Mod, Value::Int(7), Value::Double(4.0)).unwrap(), Value::Double(3.0));
        assert_eq!(binary(Operator::Gt, Value::Int(2), Value::Double(1.5)).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_division_by_zero_is_ieee() {
        let v = binary(Operator::Div, Value::Int(1), Value::Int(0)).unwrap();
        assert_eq!(v, Value::Double(f64::INFINITY));
    }

    #[test]
    fn test_string_ops() {
        assert_eq!(binary(Operator::Add, Value::from("ab"), Value::from("cd")).unwrap(), Value::from("abcd"));
        assert_eq!(binary(Operator::Lt, Value::from("abc"), Value::from("abd")).unwrap(), Value::Bool(true));
        assert!(matches!(
            binary(Operator::Sub, Value::from("a"), Value::from("b")),
            Err(EvalError::TypeMismatch { .. })
        ));
        assert!(matches!(
            binary(Operator::Add, Value::from("a"), Value::Int(1)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_list_set_ops() {
        assert_eq!(binary(Operator::Add, ints(&[1, 2]), ints(&[2])).unwrap(), ints(&[1, 2, 2]));
        assert_eq!(binary(Operator::Add, ints(&[1]), Value::Int(9)).unwrap(), ints(&[1, 9]));
        assert_eq!(binary(Operator::Sub, ints(&[1, 2, 3, 2]), ints(&[2])).unwrap(), ints(&[1, 3]));
        assert_eq!(binary(Operator::Intersect, ints(&[1, 2, 3]), ints(&[3, 1])).unwrap(), ints(&[1, 3]));
        assert_eq!(binary(Operator::Eq, ints(&[1, 2]), ints(&[1, 2])).unwrap(), Value::Bool(true));
        assert_eq!(binary(Operator::NotEq, ints(&[1]), Value::List(vec![])).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_list_element_types_must_agree() {
        let err = binary(Operator::Add, ints(&[1]), Value::from(vec!["a"])).unwrap_err();
        assert!(matches!(err, EvalError::TypeMismatch { .. }));
        assert_eq!(binary(Operator::Add, Value::List(vec![]), Value::from(vec!["a"])).unwrap(), Value::from(vec!["a"]));
        assert!(binary(Operator::Intersect, ints(&[1]), Value::Int(1)).is_err());
        assert!(binary(Operator::Sub, Value::Int(1), ints(&[1])).is_err());
    }

    #[test]
    fn test_date_arithmetic() {
        let d = |y, m, day| Value::DateTime(NaiveDate::from_ymd_opt(y, m, day).unwrap());
        assert_eq!(binary(Operator::Add, d(2024, 2, 28), Value::Int(2)).unwrap(), d(2024, 3, 1));
        assert_eq!(binary(Operator::Sub, d(2024, 3, 1), Value::Int(1)).unwrap(), d(2024, 2, 29));
        assert_eq!(binary(Operator::Add, d(2024, 3, 1), Value::Int(-1)).unwrap(), d(2024, 2, 29));
        assert_eq!(binary(Operator::Sub, d(2024, 3, 1), d(2024, 2, 1)).unwrap(), Value::Int(29));
        assert!(binary(Operator::Gt, d(2024, 3, 1), d(2024, 2, 1)).is_err());
    }

    #[test]
    fn test_bools_only_combine_logically() {
        assert!(binary(Operator::Eq, Value::Bool(true), Value::Bool(true)).is_err());
        assert_eq!(logical(Operator::Or, &Value::Bool(false), &Value::Bool(true)).unwrap(), Value::Bool(true));
        assert!(logical(Operator::And, &Value::Int(1), &Value::Bool(true)).is_err());
        assert_eq!(not(&Value::Bool(true)).unwrap(), Value::Bool(false));
        assert!(not(&Value::Int(0)).is_err());
    }

    #[test]
    fn test_index_bounds() {
        let list = ints(&[10, 20, 30]);
        assert_eq!(index(list.clone(), Value::Int(-1)).unwrap(), Value::Int(30));
        assert_eq!(index(list.clone(), Value::Int(0)).unwrap(), Value::Int(10));
        assert_eq!(
            index(list.clone(), Value::Int(3)).unwrap_err(),
            EvalError::IndexOutOfRange { index: 3, len: 3 }
        );
        assert!(index(list, Value::Int(-4)).is_err());
    }

    #[test]
    fn test_index_ranges() {
        let list = ints(&[1, 2, 3, 4]);
        assert_eq!(index(list.clone(), Value::IntRange { from: 1, to: 2 }).unwrap(), ints(&[2, 3]));
        assert_eq!(index(list.clone(), Value::IntRange { from: -2, to: -1 }).unwrap(), ints(&[3, 4]));
        assert_eq!(index(list, Value::IntRange { from: 3, to: 1 }).unwrap(), Value::List(vec![]));
        assert_eq!(
            index(Value::from("héllo"), Value::IntRange { from: 1, to: 3 }).unwrap(),
            Value::from("éll")
        );
        assert_eq!(index(Value::from("héllo"), Value::Int(1)).unwrap(), Value::Char('é'));
    }

    #[test]
    fn test_index_rejects_scalars() {
        assert_eq!(index(Value::Int(5), Value::Int(0)).unwrap_err(), EvalError::not_indexable("Int"));
        assert!(index(ints(&[1]), Value::from("0")).is_err());
    }
}
