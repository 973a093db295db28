//! List intrinsics: membership, ordering and aggregates

use super::{IntrinsicRegistry, bool_arg, list_arg, num_items};
use crate::error::{EvalError, Result};
use crate::value::{Value, ValueKind};

pub(super) fn register(reg: &mut IntrinsicRegistry) -> Result<()> {
    reg.register("Contains", "L,L,BF,BF", |args| {
        // every/any needle (second list) found in the haystack (first list)
        members(list_arg(args, 1)?, list_arg(args, 0)?, bool_arg(args, 2)?, bool_arg(args, 3)?)
    })?;
    reg.register("In", "L,L,BF,BF", |args| {
        members(list_arg(args, 0)?, list_arg(args, 1)?, bool_arg(args, 2)?, bool_arg(args, 3)?)
    })?;
    reg.register("Distinct", "L", builtin_distinct)?;
    reg.register("Length", "L", |args| Ok(Value::Int(list_arg(args, 0)?.len() as i64)))?;
    reg.register("Sort", "L", builtin_sort)?;
    reg.register("Avg", "LN", |args| {
        let values = non_empty("Avg", num_items(list_arg(args, 0)?)?)?;
        Ok(Value::Double(values.iter().sum::<f64>() / values.len() as f64))
    })?;
    reg.register("Min", "LN", |args| {
        let values = non_empty("Min", num_items(list_arg(args, 0)?)?)?;
        Ok(Value::Double(values.into_iter().fold(f64::INFINITY, f64::min)))
    })?;
    reg.register("Max", "LN", |args| {
        let values = non_empty("Max", num_items(list_arg(args, 0)?)?)?;
        Ok(Value::Double(values.into_iter().fold(f64::NEG_INFINITY, f64::max)))
    })?;
    reg.register("Med", "LN", builtin_median)?;
    Ok(())
}

fn non_empty(method: &str, values: Vec<f64>) -> Result<Vec<f64>> {
    if values.is_empty() {
        Err(EvalError::intrinsic(method, "list is empty"))
    } else {
        Ok(values)
    }
}

fn fold_case(value: &Value, ignore_case: bool) -> Value {
    match value {
        Value::String(s) if ignore_case => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}

/// Whether any (or, with `match_all`, every) candidate occurs in `pool`.
fn members(candidates: &[Value], pool: &[Value], ignore_case: bool, match_all: bool) -> Result<Value> {
    let pool: Vec<Value> = pool.iter().map(|v| fold_case(v, ignore_case)).collect();
    let mut found = candidates.iter().map(|c| pool.contains(&fold_case(c, ignore_case)));
    let result = if match_all { found.all(|f| f) } else { found.any(|f| f) };
    Ok(Value::Bool(result))
}

fn builtin_distinct(args: &[Value]) -> Result<Value> {
    let mut seen: Vec<Value> = Vec::new();
    for item in list_arg(args, 0)? {
        if !seen.contains(item) {
            seen.push(item.clone());
        }
    }
    Ok(Value::List(seen))
}

fn builtin_sort(args: &[Value]) -> Result<Value> {
    let items = list_arg(args, 0)?;
    let Some(kind) = items.first().map(Value::kind) else {
        return Ok(Value::List(Vec::new()));
    };
    if let Some(odd) = items.iter().find(|item| item.kind() != kind) {
        return Err(EvalError::type_mismatch(format!(
            "Sort needs a homogeneous list, found {} among {}",
            odd.type_name(),
            kind
        )));
    }

    let mut sorted = items.to_vec();
    match kind {
        ValueKind::String => sorted.sort_by(|a, b| a.as_str().cmp(&b.as_str())),
        ValueKind::Char => sorted.sort_by_key(|v| v.as_char()),
        ValueKind::Int => sorted.sort_by_key(|v| v.as_int()),
        ValueKind::Double => sorted.sort_by(|a, b| {
            let (a, b) = (a.as_double().unwrap_or(f64::NAN), b.as_double().unwrap_or(f64::NAN));
            a.total_cmp(&b)
        }),
        other => {
            return Err(EvalError::type_mismatch(format!("cannot sort {other} values")));
        }
    }
    Ok(Value::List(sorted))
}

fn builtin_median(args: &[Value]) -> Result<Value> {
    let mut values = non_empty("Med", num_items(list_arg(args, 0)?)?)?;
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    let median = if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    };
    Ok(Value::Double(median))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: Vec<Value>) -> Result<Value> {
        let mut reg = IntrinsicRegistry::new();
        register(&mut reg).unwrap();
        reg.call(name, args)
    }

    fn ints(values: &[i64]) -> Value {
        Value::from(values.to_vec())
    }

    #[test]
    fn test_sort_each_kind() {
        assert_eq!(call("Sort", vec![ints(&[3, 1, 2])]).unwrap(), ints(&[1, 2, 3]));
        assert_eq!(
            call("Sort", vec![Value::from(vec!["b", "a", "C"])]).unwrap(),
            Value::from(vec!["C", "a", "b"])
        );
        assert_eq!(
            call("Sort", vec![Value::from(vec!['z', 'a'])]).unwrap(),
            Value::from(vec!['a', 'z'])
        );
        assert_eq!(
            call("Sort", vec![Value::from(vec![2.5, -1.0])]).unwrap(),
            Value::from(vec![-1.0, 2.5])
        );
    }

    #[test]
    fn test_sort_is_idempotent() {
        let once = call("Sort", vec![ints(&[5, 3, 9, 3])]).unwrap();
        let twice = call("Sort", vec![once.clone()]).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_rejects_mixed_and_unsortable() {
        let mixed = Value::List(vec![Value::Int(1), Value::from("a")]);
        assert!(matches!(call("Sort", vec![mixed]), Err(EvalError::TypeMismatch { .. })));
        let bools = Value::from(vec![true, false]);
        assert!(matches!(call("Sort", vec![bools]), Err(EvalError::TypeMismatch { .. })));
        assert_eq!(call("Sort", vec![Value::List(vec![])]).unwrap(), Value::List(vec![]));
    }

    #[test]
    fn test_distinct_keeps_first_seen_order() {
        assert_eq!(call("Distinct", vec![ints(&[3, 1, 3, 2, 1])]).unwrap(), ints(&[3, 1, 2]));
    }

    #[test]
    fn test_list_membership() {
        let pool = Value::from(vec!["a", "b", "c"]);
        let needles = Value::from(vec!["a", "z"]);
        assert_eq!(call("Contains", vec![pool.clone(), needles.clone()]).unwrap(), Value::Bool(true));
        assert_eq!(
            call("Contains", vec![pool.clone(), needles.clone(), Value::Bool(false), Value::Bool(true)]).unwrap(),
            Value::Bool(false)
        );
        assert_eq!(
            call("In", vec![Value::from(vec!["A"]), pool, Value::Bool(true)]).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            call("In", vec![ints(&[1, 2]), ints(&[2, 3]), Value::Bool(false), Value::Bool(true)]).unwrap(),
            Value::Bool(false)
        );
    }

    #[test]
    fn test_aggregates() {
        let values = Value::List(vec![Value::Int(4), Value::Double(1.0), Value::Int(7), Value::Int(2)]);
        assert_eq!(call("Avg", vec![values.clone()]).unwrap(), Value::Double(3.5));
        assert_eq!(call("Min", vec![values.clone()]).unwrap(), Value::Double(1.0));
        assert_eq!(call("Max", vec![values.clone()]).unwrap(), Value::Double(7.0));
        assert_eq!(call("Med", vec![values]).unwrap(), Value::Double(3.0));
        assert_eq!(call("Med", vec![ints(&[5, 1, 3])]).unwrap(), Value::Double(3.0));
    }

    #[test]
    fn test_aggregates_reject_empty_and_strings() {
        assert!(matches!(
            call("Avg", vec![Value::List(vec![])]),
            Err(EvalError::IntrinsicFailed { .. })
        ));
        assert!(matches!(
            call("Max", vec![Value::from(vec!["a"])]),
            Err(EvalError::NoMatchingOverload { .. })
        ));
    }

    #[test]
    fn test_length_of_list() {
        assert_eq!(call("Length", vec![ints(&[1, 2, 3])]).unwrap(), Value::Int(3));
    }
}
