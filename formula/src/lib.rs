//! Formula: an embeddable evaluator for a small expression language
//!
//! Text is lexed into tokens, converted to a postfix instruction stream by
//! shunting-yard, and evaluated against a host-supplied symbol table and a
//! registry of overloaded intrinsic methods.
//!
//! ```no_run
//! use formula::{IntrinsicRegistry, SymbolTable, Value, eval_str};
//!
//! let mut symbols = SymbolTable::new();
//! symbols.insert("Price", 40i64);
//! let intrinsics = IntrinsicRegistry::with_builtins()?;
//! let total = eval_str("Price * 1.25", &symbols, &intrinsics)?;
//! assert_eq!(total, Value::Double(50.0));
//! # Ok::<(), formula::EvalError>(())
//! ```

pub mod config;
pub mod error;
pub mod interp;
pub mod intrinsic;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod span;
pub mod symbols;
pub mod util;
pub mod value;

pub use config::EvalConfig;
pub use error::{EvalError, Result};
pub use interp::{Evaluator, eval_str, evaluate};
pub use intrinsic::{IntrinsicRegistry, PageFetcher};
pub use lexer::{Tokens, tokenize};
pub use parser::{Postfix, to_postfix};
pub use span::Span;
pub use symbols::{LookupFn, SymbolLookup, SymbolTable};
pub use value::{Value, ValueKind};
