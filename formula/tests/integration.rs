//! Integration tests for the formula evaluator
//!
//! Exercises the full pipeline: lexing, postfix conversion, evaluation,
//! intrinsic dispatch and error reporting.

use formula::repl::format_result;
use formula::{
    EvalConfig, EvalError, Evaluator, IntrinsicRegistry, LookupFn, PageFetcher, SymbolTable, Value, eval_str,
    tokenize,
};
use std::sync::Arc;

/// Symbol table used by most tests
fn symbols() -> SymbolTable {
    let mut table = SymbolTable::new();
    table.insert("MyInt", 7i64);
    table.insert("MyDouble", 2.5);
    table.insert("MyString", "Hello World");
    table.insert("TestArray", Value::from(vec![1i64, 2, 3]));
    table.insert("Mixed", Value::List(vec![Value::Int(1), Value::from("a")]));
    table
}

/// Helper to evaluate a formula against the default symbols and builtins
fn eval(source: &str) -> formula::Result<Value> {
    let registry = IntrinsicRegistry::with_builtins()?;
    eval_str(source, &symbols(), &registry)
}

/// Helper for formulas that must succeed
fn value(source: &str) -> Value {
    eval(source).unwrap_or_else(|e| panic!("`{source}` failed: {e}"))
}

// ============================================
// Arithmetic and signs
// ============================================

#[test]
fn test_int_arithmetic_matches_native_doubles() {
    for (a, b) in [(3i64, 4i64), (-3, 2), (10, -7), (0, 0), (123456, 789)] {
        assert_eq!(value(&format!("{a}+{b}")), Value::Double(a as f64 + b as f64));
        assert_eq!(value(&format!("{a}-{b}")), Value::Double(a as f64 - b as f64));
        assert_eq!(value(&format!("{a}*{b}")), Value::Double(a as f64 * b as f64));
    }
}

#[test]
fn test_unary_versus_binary_minus() {
    assert_eq!(value("-5"), Value::Int(-5));
    assert_eq!(value("3-5"), Value::Double(-2.0));
    assert_eq!(value("3*-5"), Value::Double(-15.0));
    assert_eq!(value("(2)-1"), Value::Double(1.0));
    assert_eq!(value("MyInt -1"), Value::Double(6.0));
}

#[test]
fn test_precedence() {
    assert_eq!(value("1 + 2 * 3"), Value::Double(7.0));
    assert_eq!(value("(1 + 2) * 3"), Value::Double(9.0));
    assert_eq!(value("10 - 2 - 3"), Value::Double(5.0));
    assert_eq!(value("7 # 4 + 1"), Value::Double(4.0));
    assert_eq!(value("1 + 1 = 2 && 3 > 2"), Value::Bool(true));
}

// ============================================
// Casts
// ============================================

#[test]
fn test_casts() {
    assert_eq!(value("<S>5"), Value::from("5"));
    assert_eq!(value("<I>\"42\""), Value::Int(42));
    assert_eq!(value("<int32>MyDouble"), Value::Int(2));
    assert_eq!(value("<B>\"TRUE\""), Value::Bool(true));
    assert_eq!(value("<S>TestArray"), Value::from(vec!["1", "2", "3"]));
}

#[test]
fn test_failed_cast_is_conversion_error() {
    assert!(matches!(eval("<I>\"abc\""), Err(EvalError::Conversion { .. })));
}

#[test]
fn test_dates() {
    assert_eq!(value("<H>\"03/01/2024\" - <H>\"02/01/2024\""), Value::Int(29));
    assert_eq!(value("<S>(<H>\"12/25/2023\" + 7)"), Value::from("01/01/2024"));
}

// ============================================
// Lists, indexing, ternary
// ============================================

#[test]
fn test_list_operators() {
    assert_eq!(value("[1,2,3]+[4,5]"), Value::from(vec![1i64, 2, 3, 4, 5]));
    assert_eq!(value("[1,2,3]-[2]"), Value::from(vec![1i64, 3]));
    assert_eq!(value("[1,2]^[2,3]"), Value::from(vec![2i64]));
    assert_eq!(value("[1,2] = [1,2]"), Value::Bool(true));
    assert!(matches!(eval("[1] + [\"a\"]"), Err(EvalError::TypeMismatch { .. })));
}

#[test]
fn test_ternary() {
    assert_eq!(value("?(1>0:(\"yes\",\"no\"))"), Value::from("yes"));
    assert_eq!(value("?(MyInt > 10 : (\"big\", \"small\"))"), Value::from("small"));
    assert!(matches!(eval("?(true : [1, 2])"), Err(EvalError::InvalidOperands { .. })));
}

#[test]
fn test_index_boundaries() {
    assert_eq!(value("[1,2,3]{-1}"), Value::Int(3));
    assert_eq!(
        eval("[1,2,3]{3}").unwrap_err(),
        EvalError::IndexOutOfRange { index: 3, len: 3 }
    );
    assert_eq!(
        eval("[1,2,3]{-4}").unwrap_err(),
        EvalError::IndexOutOfRange { index: -4, len: 3 }
    );
    assert_eq!(value("TestArray{0:1}"), Value::from(vec![1i64, 2]));
    assert_eq!(value("MyString{6:-1}"), Value::from("World"));
    assert_eq!(value("MyString{0}"), Value::Char('H'));
    assert!(matches!(eval("5{0}"), Err(EvalError::NotIndexable { .. })));
}

// ============================================
// Intrinsics
// ============================================

#[test]
fn test_list_needle_overload_selected() {
    assert_eq!(
        value("StartsWith(\"Mr. John Smith Jr.\", [\"Miss.\", \"Mrs.\", \"Sir\"])"),
        Value::Bool(false)
    );
    assert_eq!(
        value("StartsWith(\"Mr. John Smith Jr.\", [\"Miss.\", \"Mr.\"])"),
        Value::Bool(true)
    );
}

#[test]
fn test_idempotent_builtins() {
    assert_eq!(value("ToString(ToString(\"abc\"))"), value("ToString(\"abc\")"));
    assert_eq!(value("Sort(Sort([3, 1, 2]))"), value("Sort([3, 1, 2])"));
    assert_eq!(value("Sort([3, 1, 2])"), Value::from(vec![1i64, 2, 3]));
}

#[test]
fn test_sort_mixed_list_is_type_mismatch() {
    assert!(matches!(eval("Sort(Mixed)"), Err(EvalError::TypeMismatch { .. })));
}

#[test]
fn test_unknown_names() {
    assert!(matches!(eval("Nope + 1"), Err(EvalError::UnknownSymbol { .. })));
    assert_eq!(
        eval("Lenght(\"x\")").unwrap_err(),
        EvalError::UnknownMethod {
            name: "Lenght".into(),
            hint: Some("Length".into()),
        }
    );
}

#[test]
fn test_no_matching_overload_lists_signatures() {
    let err = eval("Abs(\"x\")").unwrap_err();
    assert_eq!(err.to_string(), "no overload of Abs matches the arguments; tried N");
}

#[test]
fn test_text_builtins() {
    assert_eq!(value("Contains(MyString, \"WORLD\", true)"), Value::Bool(true));
    assert_eq!(value("Split(\"a,b,c\", ','){1}"), Value::from("b"));
    assert_eq!(value("Length(Split(\"a,b,c\", ','))"), Value::Int(3));
    assert_eq!(value("ToUpper(MyString)"), Value::from("HELLO WORLD"));
    assert_eq!(value("Replace(\"a-b\", \"-\", \"+\")"), Value::from("a+b"));
}

#[test]
fn test_json_select() {
    assert_eq!(
        value(r#"JsonSelect("{\"a\":{\"b\":[1,2]}}", "a.b[1]")"#),
        Value::from("2")
    );
}

#[test]
fn test_aggregates() {
    assert_eq!(value("Avg([1,2,3,4])"), Value::Double(2.5));
    assert_eq!(value("Max(TestArray) + Min(TestArray)"), Value::Double(4.0));
    assert!(matches!(eval("Avg([])"), Err(EvalError::IntrinsicFailed { .. })));
}

struct OfflineFetcher;

impl PageFetcher for OfflineFetcher {
    fn fetch(&self, _url: &str) -> Result<String, String> {
        Err("network disabled".to_string())
    }
}

#[test]
fn test_web_fetch_falls_back() {
    let registry = IntrinsicRegistry::with_fetcher(Arc::new(OfflineFetcher)).unwrap();
    let result = eval_str(
        "GetWebPage(\"http://example.invalid/\", \"unavailable\")",
        &SymbolTable::new(),
        &registry,
    );
    assert_eq!(result.unwrap(), Value::from("unavailable"));
}

#[test]
fn test_host_registered_intrinsic() {
    let mut registry = IntrinsicRegistry::with_builtins().unwrap();
    registry
        .register("Double", "N", |args| Ok(Value::Double(args[0].as_double().unwrap_or(0.0) * 2.0)))
        .unwrap();
    assert_eq!(eval_str("Double(21)", &SymbolTable::new(), &registry).unwrap(), Value::Double(42.0));
}

// ============================================
// Symbols, limits, errors
// ============================================

#[test]
fn test_closure_symbol_lookup() {
    let registry = IntrinsicRegistry::new();
    let lookup = LookupFn(|name: &str| match name {
        "Rate.Base" => Some(Value::Int(4)),
        "Rate.Factor" => Some(Value::Int(5)),
        _ => None,
    });
    assert_eq!(eval_str("Rate.Base * Rate.Factor", &lookup, &registry).unwrap(), Value::Double(20.0));
    assert!(matches!(eval_str("Rate.Other", &lookup, &registry), Err(EvalError::UnknownSymbol { .. })));
}

#[test]
fn test_symbol_file_round_trip() {
    let table = SymbolTable::from_json(r#"{"Order":{"Total":120.5,"Items":["a","b"]}}"#).unwrap();
    let registry = IntrinsicRegistry::with_builtins().unwrap();
    assert_eq!(eval_str("Order.Total > 100", &table, &registry).unwrap(), Value::Bool(true));
    assert_eq!(eval_str("Length(Order.Items)", &table, &registry).unwrap(), Value::Int(2));
}

#[test]
fn test_max_depth_from_config() {
    let config = EvalConfig::from_toml_str("max_depth = 3").unwrap();
    let table = SymbolTable::new();
    let registry = IntrinsicRegistry::new();
    let evaluator = Evaluator::new(&table, &registry).with_config(&config);
    assert!(evaluator.evaluate(&tokenize("((1 + 2) + 3) + 4").unwrap()).is_ok());
    assert_eq!(
        evaluator.evaluate(&tokenize("1 + (2 + (3 + 4))").unwrap()).unwrap_err(),
        EvalError::MaxDepthExceeded { limit: 3 }
    );
}

#[test]
fn test_large_flat_formulas_with_default_config() {
    let config = EvalConfig::default();
    let table = SymbolTable::new();
    let registry = IntrinsicRegistry::with_builtins().unwrap();
    let evaluator = Evaluator::new(&table, &registry).with_config(&config);

    let sum = vec!["1"; 2000].join("+");
    assert_eq!(evaluator.evaluate(&tokenize(&sum).unwrap()).unwrap(), Value::Double(2000.0));

    let items: Vec<String> = (0..2000).map(|i| i.to_string()).collect();
    let list = format!("Length([{}])", items.join(","));
    assert_eq!(evaluator.evaluate(&tokenize(&list).unwrap()).unwrap(), Value::Int(2000));
}

#[test]
fn test_unknown_name_hints_are_stable() {
    for _ in 0..20 {
        assert_eq!(
            eval("Pvx(1)").unwrap_err(),
            EvalError::UnknownMethod {
                name: "Pvx".into(),
                hint: Some("Pv".into()),
            }
        );
    }

    let mut table = SymbolTable::new();
    table.insert("Ac", 1i64);
    table.insert("Ab", 2i64);
    let registry = IntrinsicRegistry::new();
    for _ in 0..20 {
        assert_eq!(
            eval_str("Ax", &table, &registry).unwrap_err(),
            EvalError::UnknownSymbol {
                name: "Ax".into(),
                hint: Some("Ab".into()),
            }
        );
    }
}

#[test]
fn test_syntax_errors() {
    assert!(matches!(eval("(1 + 2"), Err(EvalError::UnbalancedBrackets { .. })));
    assert!(matches!(eval("1 $ 2"), Err(EvalError::Lex { .. })));
    assert!(matches!(eval("1 +"), Err(EvalError::MalformedExpression { .. })));
}

#[test]
fn test_results_snapshot() {
    let rendered: Vec<String> = [
        "<D>\"2.5\" * 2",
        "Distinct([3, 1, 3])",
        "1:3",
        "ToString(2.5)",
        "\"abc\" < \"abd\"",
        "Split(\"x;y\", ';')",
    ]
    .iter()
    .map(|source| format_result(&value(source)))
    .collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    result => <Double> 5
    result => <Int[]> [3, 1]
    result => <IntRange> 1-3
    result => <String> 2.500000
    result => <Bool> true
    result => <String[]> [x, y]
    ");
}
