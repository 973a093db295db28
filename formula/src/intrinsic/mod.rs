//! Intrinsic method registry and overload dispatch
//!
//! Each method name maps to an ordered list of overloads. A call tries the
//! overloads in declaration order and runs the first whose signature accepts
//! the arguments (after filling omitted trailing defaults).

mod json;
mod list;
mod math;
pub mod signature;
mod text;
mod web;

pub use signature::{Signature, TypeCode};
pub use web::{HttpFetcher, PageFetcher};

use crate::config::EvalConfig;
use crate::error::{EvalError, Result};
use crate::util::find_similar_name;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Native implementation of one overload
pub type IntrinsicFn = Box<dyn Fn(&[Value]) -> Result<Value> + Send + Sync>;

struct Overload {
    signature: Signature,
    call: IntrinsicFn,
}

/// Name to overload-set table, immutable once built
#[derive(Default)]
pub struct IntrinsicRegistry {
    methods: HashMap<String, Vec<Overload>>,
}

impl IntrinsicRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the full built-in library, fetching web pages over HTTP
    pub fn with_builtins() -> Result<Self> {
        Self::with_fetcher(Arc::new(HttpFetcher::default()))
    }

    /// Registry with the built-in library, HTTP fetches configured by `config`
    pub fn from_config(config: &EvalConfig) -> Result<Self> {
        Self::with_fetcher(Arc::new(HttpFetcher::from_config(config)))
    }

    /// Registry with the built-in library and a caller-supplied page fetcher
    pub fn with_fetcher(fetcher: Arc<dyn PageFetcher>) -> Result<Self> {
        let mut registry = Self::new();
        text::register(&mut registry)?;
        list::register(&mut registry)?;
        math::register(&mut registry)?;
        json::register(&mut registry)?;
        web::register(&mut registry, fetcher)?;
        Ok(registry)
    }

    /// Append an overload to `name`. The signature is validated here.
    pub fn register<F>(&mut self, name: &str, signature: &str, call: F) -> Result<()>
    where
        F: Fn(&[Value]) -> Result<Value> + Send + Sync + 'static,
    {
        let signature = Signature::parse(signature)?;
        self.methods.entry(name.to_string()).or_default().push(Overload {
            signature,
            call: Box::new(call),
        });
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Sorted method names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Signatures of `name` in dispatch order
    pub fn signatures(&self, name: &str) -> Option<Vec<&str>> {
        self.methods
            .get(name)
            .map(|overloads| overloads.iter().map(|o| o.signature.as_str()).collect())
    }

    /// Dispatch `name` to the first overload accepting `args`.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Result<Value> {
        let Some(overloads) = self.methods.get(name) else {
            let hint = find_similar_name(name, self.methods.keys().map(String::as_str), 2);
            return Err(EvalError::unknown_method(name, hint));
        };

        for overload in overloads {
            tracing::trace!(method = name, signature = %overload.signature, "trying overload");
            if let Some(bound) = overload.signature.bind(&args) {
                return (overload.call)(&bound);
            }
        }

        Err(EvalError::no_matching_overload(
            name,
            overloads.iter().map(|o| o.signature.to_string()).collect(),
        ))
    }
}

impl std::fmt::Debug for IntrinsicRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntrinsicRegistry").field("methods", &self.names()).finish()
    }
}

// Argument accessors. Dispatch has already checked the types, so a mismatch
// here means an overload was registered with the wrong signature.

fn arg(args: &[Value], index: usize) -> Result<&Value> {
    args.get(index)
        .ok_or_else(|| EvalError::malformed(format!("missing argument {}", index + 1)))
}

pub(crate) fn str_arg(args: &[Value], index: usize) -> Result<&str> {
    let value = arg(args, index)?;
    value.as_str().ok_or_else(|| EvalError::expected("String", &value.type_name()))
}

pub(crate) fn num_arg(args: &[Value], index: usize) -> Result<f64> {
    let value = arg(args, index)?;
    value.as_double().ok_or_else(|| EvalError::expected("number", &value.type_name()))
}

pub(crate) fn int_arg(args: &[Value], index: usize) -> Result<i64> {
    let value = arg(args, index)?;
    value.as_int().ok_or_else(|| EvalError::expected("Int", &value.type_name()))
}

pub(crate) fn bool_arg(args: &[Value], index: usize) -> Result<bool> {
    let value = arg(args, index)?;
    value.as_bool().ok_or_else(|| EvalError::expected("Bool", &value.type_name()))
}

pub(crate) fn char_arg(args: &[Value], index: usize) -> Result<char> {
    let value = arg(args, index)?;
    value.as_char().ok_or_else(|| EvalError::expected("Char", &value.type_name()))
}

pub(crate) fn list_arg(args: &[Value], index: usize) -> Result<&[Value]> {
    let value = arg(args, index)?;
    value.as_list().ok_or_else(|| EvalError::expected("List", &value.type_name()))
}

/// Elements of a list already checked to hold only strings
pub(crate) fn str_items(items: &[Value]) -> Result<Vec<&str>> {
    items
        .iter()
        .map(|item| item.as_str().ok_or_else(|| EvalError::expected("String", &item.type_name())))
        .collect()
}

/// Elements of a list already checked to hold only numbers
pub(crate) fn num_items(items: &[Value]) -> Result<Vec<f64>> {
    items
        .iter()
        .map(|item| item.as_double().ok_or_else(|| EvalError::expected("number", &item.type_name())))
        .collect()
}
