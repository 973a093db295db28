//! `JsonSelect`: pick a sub-node out of a JSON document

use super::{IntrinsicRegistry, str_arg};
use crate::error::{EvalError, Result};
use crate::value::Value;
use serde_json::Value as Json;

pub(super) fn register(reg: &mut IntrinsicRegistry) -> Result<()> {
    reg.register("JsonSelect", "S,S", |args| {
        select(str_arg(args, 0)?, str_arg(args, 1)?).map(Value::String)
    })
}

fn failed(message: impl Into<String>) -> EvalError {
    EvalError::intrinsic("JsonSelect", message)
}

/// Walk `path` (`a.b[2].c`) through `document` and re-serialize the node found.
///
/// A missing object key yields `null`; indexing into the wrong node kind fails.
fn select(document: &str, path: &str) -> Result<String> {
    let root: Json = serde_json::from_str(document).map_err(|e| failed(format!("invalid JSON: {e}")))?;
    let mut node = &root;

    let normalized = path.replace('[', ".[");
    for step in normalized.split('.').filter(|s| !s.is_empty()) {
        node = match step.strip_prefix('[') {
            Some(rest) => {
                let text = rest.trim_end_matches(']');
                let index: usize = text
                    .parse()
                    .map_err(|_| failed(format!("`{text}` is not a valid array index")))?;
                let Json::Array(items) = node else {
                    return Err(failed(format!("array index [{index}] applied to a non-array node")));
                };
                items
                    .get(index)
                    .ok_or_else(|| failed(format!("array index {index} out of range for length {}", items.len())))?
            }
            None => {
                let Json::Object(fields) = node else {
                    return Err(failed(format!("key `{step}` applied to a non-object node")));
                };
                fields.get(step).unwrap_or(&Json::Null)
            }
        };
    }

    serde_json::to_string(node).map_err(|e| failed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"{"user":{"name":"Ada","tags":["x","y"],"meta":{"z":1,"a":2}},"list":[{"id":7}]}"#;

    #[test]
    fn test_select_nested_key() {
        assert_eq!(select(DOC, "user.name").unwrap(), r#""Ada""#);
    }

    #[test]
    fn test_select_array_steps() {
        assert_eq!(select(DOC, "user.tags[1]").unwrap(), r#""y""#);
        assert_eq!(select(DOC, "list[0].id").unwrap(), "7");
    }

    #[test]
    fn test_subtree_keys_are_sorted() {
        assert_eq!(select(DOC, "user.meta").unwrap(), r#"{"a":2,"z":1}"#);
    }

    #[test]
    fn test_missing_key_is_null() {
        assert_eq!(select(DOC, "user.age").unwrap(), "null");
    }

    #[test]
    fn test_empty_path_returns_document() {
        assert_eq!(select("[1,2]", "").unwrap(), "[1,2]");
    }

    #[test]
    fn test_errors() {
        assert!(matches!(select("{oops", "a"), Err(EvalError::IntrinsicFailed { .. })));
        assert!(matches!(select(DOC, "user[0]"), Err(EvalError::IntrinsicFailed { .. })));
        assert!(matches!(select(DOC, "list[5]"), Err(EvalError::IntrinsicFailed { .. })));
        assert!(matches!(select(DOC, "user.name.first"), Err(EvalError::IntrinsicFailed { .. })));
    }
}
