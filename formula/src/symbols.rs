//! Host-supplied symbol lookup

use crate::error::{EvalError, Result};
use crate::value::{Value, homogenize};
use chrono::Local;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::path::Path;

/// Name to value resolution consulted by the evaluator.
///
/// Names are matched exactly and case-sensitively, dots included (`Math.PI`).
pub trait SymbolLookup {
    fn lookup(&self, name: &str) -> Option<Value>;

    /// Known names, used for "did you mean" hints. Empty when not enumerable.
    fn names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl SymbolLookup for HashMap<String, Value> {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.keys().cloned().collect()
    }
}

/// Adapter turning a closure into a [`SymbolLookup`]
pub struct LookupFn<F>(pub F);

impl<F> SymbolLookup for LookupFn<F>
where
    F: Fn(&str) -> Option<Value>,
{
    fn lookup(&self, name: &str) -> Option<Value> {
        (self.0)(name)
    }
}

/// Owned symbol table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SymbolTable {
    values: HashMap<String, Value>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table with `DateTime.Today`, `Math.PI` and `Math.E`
    pub fn with_clock_defaults() -> Self {
        let mut table = Self::new();
        table.insert("DateTime.Today", Value::DateTime(Local::now().date_naive()));
        table.insert("Math.PI", Value::Double(std::f64::consts::PI));
        table.insert("Math.E", Value::Double(std::f64::consts::E));
        table
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add every entry of `other`, replacing existing names
    pub fn extend(&mut self, other: SymbolTable) {
        self.values.extend(other.values);
    }

    /// Entries sorted by name
    pub fn entries(&self) -> Vec<(&str, &Value)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (k.as_str(), v)).collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    /// Build a table from a JSON object, flattening nested objects into dotted names.
    pub fn from_json(text: &str) -> Result<Self> {
        let root: Json = serde_json::from_str(text).map_err(|e| EvalError::config(format!("invalid symbol file: {e}")))?;
        let Json::Object(fields) = root else {
            return Err(EvalError::config("symbol file must hold a JSON object"));
        };
        let mut table = Self::new();
        for (key, value) in fields {
            table.add_json(key, value)?;
        }
        Ok(table)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| EvalError::io_error(format!("cannot read {}: {e}", path.display())))?;
        Self::from_json(&text)
    }

    fn add_json(&mut self, name: String, value: Json) -> Result<()> {
        match value {
            Json::Object(fields) => {
                for (key, nested) in fields {
                    self.add_json(format!("{name}.{key}"), nested)?;
                }
            }
            other => {
                let value = json_to_value(&name, other)?;
                self.values.insert(name, value);
            }
        }
        Ok(())
    }
}

fn json_to_value(name: &str, json: Json) -> Result<Value> {
    match json {
        Json::Bool(b) => Ok(Value::Bool(b)),
        Json::Number(n) => Ok(match n.as_i64() {
            Some(i) => Value::Int(i),
            None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
        }),
        Json::String(s) => Ok(Value::String(s)),
        Json::Array(items) => {
            let items = items
                .into_iter()
                .map(|item| json_to_value(name, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(Value::List(homogenize(items)?))
        }
        Json::Null => Err(EvalError::config(format!("symbol `{name}` is null"))),
        Json::Object(_) => Err(EvalError::config(format!("symbol `{name}` holds an object inside a list"))),
    }
}

impl SymbolLookup for SymbolTable {
    fn lookup(&self, name: &str) -> Option<Value> {
        self.values.get(name).cloned()
    }

    fn names(&self) -> Vec<String> {
        self.values.keys().cloned().collect()
    }
}
