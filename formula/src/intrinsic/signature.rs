//! Parameter signatures for intrinsic overloads
//!
//! A signature is a comma-separated list of type codes:
//!
//! | Code | Accepts |
//! |------|---------|
//! | `S`  | String |
//! | `N`  | Int or Double |
//! | `I`, `I0`, `I1` | Int (`I0`/`I1` default to 0/1 when omitted) |
//! | `D`  | Double |
//! | `C`  | Char |
//! | `B`, `BT`, `BF` | Bool (`BT`/`BF` default to true/false when omitted) |
//! | `L`  | any List |
//! | `LS` | List whose elements are all String |
//! | `LN` | List whose elements are all Int or Double |
//! | `A`  | any single value |

use crate::error::{EvalError, Result};
use crate::value::Value;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    String,
    Number,
    Int,
    Double,
    Char,
    Bool,
    List,
    StringList,
    NumberList,
    Any,
}

impl TypeCode {
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            TypeCode::String => matches!(value, Value::String(_)),
            TypeCode::Number => value.is_numeric(),
            TypeCode::Int => matches!(value, Value::Int(_)),
            TypeCode::Double => matches!(value, Value::Double(_)),
            TypeCode::Char => matches!(value, Value::Char(_)),
            TypeCode::Bool => matches!(value, Value::Bool(_)),
            TypeCode::List => matches!(value, Value::List(_)),
            TypeCode::StringList => {
                matches!(value, Value::List(items) if items.iter().all(|i| matches!(i, Value::String(_))))
            }
            TypeCode::NumberList => {
                matches!(value, Value::List(items) if items.iter().all(Value::is_numeric))
            }
            TypeCode::Any => !matches!(value, Value::CommaList(_)),
        }
    }
}

/// One positional parameter, optionally with a default
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub code: TypeCode,
    pub default: Option<Value>,
}

impl Param {
    fn parse(code: &str) -> Option<Param> {
        let (code, default) = match code {
            "S" => (TypeCode::String, None),
            "N" => (TypeCode::Number, None),
            "I" => (TypeCode::Int, None),
            "I0" => (TypeCode::Int, Some(Value::Int(0))),
            "I1" => (TypeCode::Int, Some(Value::Int(1))),
            "D" => (TypeCode::Double, None),
            "C" => (TypeCode::Char, None),
            "B" => (TypeCode::Bool, None),
            "BT" => (TypeCode::Bool, Some(Value::Bool(true))),
            "BF" => (TypeCode::Bool, Some(Value::Bool(false))),
            "L" => (TypeCode::List, None),
            "LS" => (TypeCode::StringList, None),
            "LN" => (TypeCode::NumberList, None),
            "A" => (TypeCode::Any, None),
            _ => return None,
        };
        Some(Param { code, default })
    }
}

/// Parsed overload signature
#[derive(Debug, Clone, PartialEq)]
pub struct Signature {
    text: String,
    params: Vec<Param>,
}

impl Signature {
    /// Parse and validate a signature string such as `S,LS,I0,BF`.
    ///
    /// Unknown codes and required parameters after a defaulted one are rejected.
    pub fn parse(text: &str) -> Result<Signature> {
        let mut params = Vec::new();
        for code in text.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            let param = Param::parse(code)
                .ok_or_else(|| EvalError::config(format!("unknown type code `{code}` in signature `{text}`")))?;
            let after_default = params.last().is_some_and(|p: &Param| p.default.is_some());
            if after_default && param.default.is_none() {
                return Err(EvalError::config(format!(
                    "required parameter `{code}` follows a defaulted one in signature `{text}`"
                )));
            }
            params.push(param);
        }
        Ok(Signature {
            text: text.to_string(),
            params,
        })
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Check `args` against this signature and fill omitted trailing defaults.
    ///
    /// Returns `None` when a supplied argument has the wrong type or the arity
    /// cannot be met.
    pub fn bind(&self, args: &[Value]) -> Option<Vec<Value>> {
        if args.len() > self.params.len() {
            return None;
        }
        let mut bound = Vec::with_capacity(self.params.len());
        for (i, param) in self.params.iter().enumerate() {
            match args.get(i) {
                Some(arg) if param.code.accepts(arg) => bound.push(arg.clone()),
                Some(_) => return None,
                None => bound.push(param.default.clone()?),
            }
        }
        Some(bound)
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
