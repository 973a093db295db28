//! String intrinsics

use super::{IntrinsicRegistry, bool_arg, char_arg, int_arg, list_arg, str_arg, str_items};
use crate::error::{EvalError, Result};
use crate::lexer::tokenize;
use crate::value::{Value, ValueKind};
use regex::Regex;
use std::collections::HashMap;

pub(super) fn register(reg: &mut IntrinsicRegistry) -> Result<()> {
    reg.register("AddQuotes", "S,BF", builtin_add_quotes)?;
    reg.register("Contains", "S,S,BF", builtin_contains)?;
    reg.register("Contains", "S,LS,BF,BF", builtin_contains_any)?;
    reg.register("EndsWith", "S,S,BF", |args| affix(args, |text, part| text.ends_with(part)))?;
    reg.register("EndsWith", "S,LS,BF", |args| affix_any(args, |text, part| text.ends_with(part)))?;
    reg.register("In", "S,LS,BF", builtin_in)?;
    reg.register("IndexOf", "S,S,I0,BF", builtin_index_of)?;
    reg.register("IndexOf", "S,LS,I0,BF", builtin_index_of_any)?;
    reg.register("Length", "S", |args| Ok(Value::Int(str_arg(args, 0)?.chars().count() as i64)))?;
    reg.register("Matches", "S,S", builtin_matches)?;
    reg.register("Piece", "S,S,I0,I0", builtin_piece)?;
    reg.register("Replace", "S,S,S", |args| {
        Ok(Value::String(str_arg(args, 0)?.replace(str_arg(args, 1)?, str_arg(args, 2)?)))
    })?;
    reg.register("ShowTokens", "S", |args| Ok(Value::String(tokenize(str_arg(args, 0)?)?.to_string())))?;
    reg.register("Split", "S,C", builtin_split)?;
    reg.register("StartsWith", "S,S,BF", |args| affix(args, |text, part| text.starts_with(part)))?;
    reg.register("StartsWith", "S,LS,BF", |args| affix_any(args, |text, part| text.starts_with(part)))?;
    reg.register("StripQuotes", "S", builtin_strip_quotes)?;
    reg.register("ToString", "A", builtin_to_string)?;
    reg.register("ToUpper", "S", |args| Ok(Value::String(str_arg(args, 0)?.to_uppercase())))?;
    reg.register("Translate", "S,S,S", builtin_translate)?;
    Ok(())
}

/// Lower-case both sides when the ignore-case flag is set.
fn fold(text: &str, ignore_case: bool) -> String {
    if ignore_case { text.to_lowercase() } else { text.to_string() }
}

fn builtin_add_quotes(args: &[Value]) -> Result<Value> {
    let text = str_arg(args, 0)?;
    let quoted = if bool_arg(args, 1)? {
        format!("'{}'", text.replace('\\', "\\\\").replace('\'', "\\'"))
    } else {
        let mut out = String::with_capacity(text.len() + 2);
        out.push('"');
        for c in text.chars() {
            match c {
                '"' => out.push_str("\\\""),
                '\\' => out.push_str("\\\\"),
                '\n' => out.push_str("\\n"),
                '\r' => out.push_str("\\r"),
                '\t' => out.push_str("\\t"),
                other => out.push(other),
            }
        }
        out.push('"');
        out
    };
    Ok(Value::String(quoted))
}

fn builtin_strip_quotes(args: &[Value]) -> Result<Value> {
    let text = str_arg(args, 0)?;
    let body = ['"', '\'']
        .into_iter()
        .find_map(|q| text.strip_prefix(q).and_then(|t| t.strip_suffix(q)))
        .ok_or_else(|| EvalError::intrinsic("StripQuotes", format!("{text:?} is not a quoted string")))?;

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some(c @ ('"' | '\'' | '\\')) => out.push(c),
            other => {
                return Err(EvalError::intrinsic(
                    "StripQuotes",
                    format!("invalid escape `\\{}`", other.map(String::from).unwrap_or_default()),
                ));
            }
        }
    }
    Ok(Value::String(out))
}

fn builtin_contains(args: &[Value]) -> Result<Value> {
    let ignore_case = bool_arg(args, 2)?;
    let haystack = fold(str_arg(args, 0)?, ignore_case);
    let needle = fold(str_arg(args, 1)?, ignore_case);
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn builtin_contains_any(args: &[Value]) -> Result<Value> {
    let ignore_case = bool_arg(args, 2)?;
    let match_all = bool_arg(args, 3)?;
    let haystack = fold(str_arg(args, 0)?, ignore_case);
    let needles = str_items(list_arg(args, 1)?)?;
    let mut found = needles.iter().map(|n| haystack.contains(&fold(n, ignore_case)));
    let result = if match_all { found.all(|f| f) } else { found.any(|f| f) };
    Ok(Value::Bool(result))
}

fn affix(args: &[Value], test: fn(&str, &str) -> bool) -> Result<Value> {
    let ignore_case = bool_arg(args, 2)?;
    let text = fold(str_arg(args, 0)?, ignore_case);
    let part = fold(str_arg(args, 1)?, ignore_case);
    Ok(Value::Bool(test(&text, &part)))
}

fn affix_any(args: &[Value], test: fn(&str, &str) -> bool) -> Result<Value> {
    let ignore_case = bool_arg(args, 2)?;
    let text = fold(str_arg(args, 0)?, ignore_case);
    let parts = str_items(list_arg(args, 1)?)?;
    Ok(Value::Bool(parts.iter().any(|p| test(&text, &fold(p, ignore_case)))))
}

fn builtin_in(args: &[Value]) -> Result<Value> {
    let ignore_case = bool_arg(args, 2)?;
    let text = fold(str_arg(args, 0)?, ignore_case);
    let items = str_items(list_arg(args, 1)?)?;
    Ok(Value::Bool(items.iter().any(|item| fold(item, ignore_case) == text)))
}

/// Char index of `needle` in `haystack`, searching from char `start`.
fn char_index_of(haystack: &str, needle: &str, start: usize) -> Option<usize> {
    let from = if start == 0 {
        0
    } else {
        haystack
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(haystack.len()))
            .nth(start)?
    };
    let byte = haystack[from..].find(needle)? + from;
    Some(haystack[..byte].chars().count())
}

fn start_arg(args: &[Value], index: usize) -> Result<usize> {
    Ok(usize::try_from(int_arg(args, index)?).unwrap_or(0))
}

fn builtin_index_of(args: &[Value]) -> Result<Value> {
    let ignore_case = bool_arg(args, 3)?;
    let text = fold(str_arg(args, 0)?, ignore_case);
    let part = fold(str_arg(args, 1)?, ignore_case);
    let found = char_index_of(&text, &part, start_arg(args, 2)?);
    Ok(Value::Int(found.map_or(-1, |i| i as i64)))
}

fn builtin_index_of_any(args: &[Value]) -> Result<Value> {
    let ignore_case = bool_arg(args, 3)?;
    let text = fold(str_arg(args, 0)?, ignore_case);
    let start = start_arg(args, 2)?;
    let found = str_items(list_arg(args, 1)?)?
        .iter()
        .filter_map(|part| char_index_of(&text, &fold(part, ignore_case), start))
        .min();
    Ok(Value::Int(found.map_or(-1, |i| i as i64)))
}

/// `Matches(pattern, text)`
fn builtin_matches(args: &[Value]) -> Result<Value> {
    let pattern = str_arg(args, 0)?;
    let regex = Regex::new(pattern).map_err(|e| EvalError::intrinsic("Matches", e.to_string()))?;
    Ok(Value::Bool(regex.is_match(str_arg(args, 1)?)))
}

/// 1-based field range of a delimited string; a zero end means the last field.
fn builtin_piece(args: &[Value]) -> Result<Value> {
    let text = str_arg(args, 0)?;
    let delimiter = str_arg(args, 1)?;
    if delimiter.is_empty() {
        return Err(EvalError::intrinsic("Piece", "delimiter must not be empty"));
    }
    let parts: Vec<&str> = text.split(delimiter).collect();
    let first = usize::try_from(int_arg(args, 2)?).unwrap_or(0).max(1);
    let last = match usize::try_from(int_arg(args, 3)?).unwrap_or(0) {
        0 => parts.len(),
        n => n.min(parts.len()),
    };
    if first > last {
        return Ok(Value::String(String::new()));
    }
    Ok(Value::String(parts[first - 1..last].join(delimiter)))
}

fn builtin_split(args: &[Value]) -> Result<Value> {
    let text = str_arg(args, 0)?;
    let separator = char_arg(args, 1)?;
    Ok(Value::List(text.split(separator).map(Value::from).collect()))
}

fn builtin_to_string(args: &[Value]) -> Result<Value> {
    match args.first() {
        Some(value) => value.convert_to(ValueKind::String),
        None => Err(EvalError::malformed("ToString needs an argument")),
    }
}

fn builtin_translate(args: &[Value]) -> Result<Value> {
    let text = str_arg(args, 0)?;
    let from: Vec<char> = str_arg(args, 1)?.chars().collect();
    let to: Vec<char> = str_arg(args, 2)?.chars().collect();
    if from.len() != to.len() {
        return Err(EvalError::intrinsic(
            "Translate",
            "'from' and 'to' must have the same number of characters",
        ));
    }
    let table: HashMap<char, char> = from.into_iter().zip(to).collect();
    Ok(Value::String(text.chars().map(|c| *table.get(&c).unwrap_or(&c)).collect()))
}
