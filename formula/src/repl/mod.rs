//! REPL (Read-Eval-Print Loop) for formulas
//!
//! Besides evaluating formulas, the REPL lets the user grow the symbol
//! table one line at a time with `:let Name = formula`.

use crate::config::EvalConfig;
use crate::error::{EvalError, Result, report_error};
use crate::interp::Evaluator;
use crate::intrinsic::IntrinsicRegistry;
use crate::lexer::{Token, tokenize};
use crate::parser::to_postfix;
use crate::symbols::SymbolTable;
use crate::value::Value;
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::path::PathBuf;

const PROMPT: &str = "> ";
const HISTORY_FILE: &str = ".formula_history";

/// One-line rendering of an evaluation result, shared with the CLI
pub fn format_result(value: &Value) -> String {
    format!("result => <{}> {}", value.type_name(), value)
}

/// What the loop does after a line has been handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// REPL state
pub struct Repl {
    editor: DefaultEditor,
    symbols: SymbolTable,
    intrinsics: IntrinsicRegistry,
    config: EvalConfig,
    show_postfix: bool,
    history_path: Option<PathBuf>,
}

impl Repl {
    pub fn new(symbols: SymbolTable, intrinsics: IntrinsicRegistry, config: EvalConfig) -> RlResult<Self> {
        let mut editor = DefaultEditor::new()?;
        let history_path = config.history_file.clone().or_else(default_history_path);
        if let Some(path) = &history_path {
            let _ = editor.load_history(path);
        }

        Ok(Repl {
            editor,
            symbols,
            intrinsics,
            config,
            show_postfix: false,
            history_path,
        })
    }

    pub fn run(&mut self) -> RlResult<()> {
        println!("formula {}", env!("CARGO_PKG_VERSION"));
        println!("Type :help for help, :quit to exit.\n");

        loop {
            let line = match self.editor.readline(PROMPT) {
                Ok(line) => line,
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => {
                    eprintln!("Error: {err}");
                    break;
                }
            };

            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let _ = self.editor.add_history_entry(line);
            if self.handle_line(line) == Flow::Quit {
                break;
            }
        }

        println!("Goodbye!");
        if let Some(path) = &self.history_path {
            let _ = self.editor.save_history(path);
        }
        Ok(())
    }

    /// Route one trimmed, non-empty line to a command or the evaluator.
    fn handle_line(&mut self, line: &str) -> Flow {
        let Some(command) = line.strip_prefix(':') else {
            self.eval_input(line);
            return Flow::Continue;
        };

        let (name, rest) = command.split_once(char::is_whitespace).unwrap_or((command, ""));
        match (name, rest.trim()) {
            ("quit" | "q" | "exit", _) => return Flow::Quit,
            ("help" | "h" | "?", _) => self.print_help(),
            ("let", definition) => {
                self.define(definition);
            }
            ("symbols", _) => {
                for (name, value) in self.symbols.entries() {
                    println!("  {name} = <{}> {}", value.type_name(), value);
                }
            }
            ("methods", _) => {
                for name in self.intrinsics.names() {
                    let signatures = self.intrinsics.signatures(name).unwrap_or_default();
                    println!("  {name}({})", signatures.join(" | "));
                }
            }
            ("postfix", _) => {
                self.show_postfix = !self.show_postfix;
                println!("postfix listing {}", if self.show_postfix { "on" } else { "off" });
            }
            ("clear", _) => print!("\x1B[2J\x1B[1;1H"),
            _ => println!("Unknown command: {line}\nType :help for help."),
        }
        Flow::Continue
    }

    fn print_help(&self) {
        println!("Commands:");
        println!("  :help, :h, :?        Show this help");
        println!("  :quit, :q            Exit the REPL");
        println!("  :let Name = formula  Evaluate a formula and bind it as a symbol");
        println!("  :symbols             List the symbol table");
        println!("  :methods             List intrinsic methods and their signatures");
        println!("  :postfix             Toggle printing the postfix listing");
        println!("  :clear               Clear the screen");
        println!();
        println!("Examples:");
        println!("  1 + 2 * 3");
        println!("  :let Rate = 4.5");
        println!("  Apy(Rate, 12)");
        println!("  ?(Rate > 4 : (\"high\", \"low\"))");
    }

    fn evaluate(&self, source: &str) -> Result<Value> {
        let tokens = tokenize(source)?;
        let postfix = to_postfix(&tokens)?;
        if self.show_postfix {
            println!("postfix: {postfix}");
        }
        Evaluator::new(&self.symbols, &self.intrinsics)
            .with_config(&self.config)
            .run(postfix)
    }

    /// Evaluate one formula line and print the result or the error.
    fn eval_input(&mut self, input: &str) -> Option<Value> {
        match self.evaluate(input) {
            Ok(value) => {
                println!("{}", format_result(&value));
                Some(value)
            }
            Err(err) => {
                report_error("<repl>", input, &err);
                None
            }
        }
    }

    /// `:let Name = formula` binds the formula's value, replacing any earlier binding.
    fn define(&mut self, definition: &str) -> Option<Value> {
        let bound = parse_definition(definition).and_then(|(name, formula)| Ok((name, self.evaluate(formula)?)));
        match bound {
            Ok((name, value)) => {
                println!("{name} = {}", format_result(&value));
                self.symbols.insert(name, value.clone());
                Some(value)
            }
            Err(err) => {
                report_error("<let>", definition, &err);
                None
            }
        }
    }
}

/// Split `Name = formula`; the name must lex as a single symbol.
fn parse_definition(definition: &str) -> Result<(&str, &str)> {
    let Some((name, formula)) = definition.split_once('=') else {
        return Err(EvalError::malformed("expected `:let Name = formula`"));
    };
    let name = name.trim();
    let lexemes = tokenize(name)?.without_whitespace();
    match lexemes.iter().map(|l| l.token).collect::<Vec<_>>().as_slice() {
        [Token::Symbol] => Ok((name, formula.trim())),
        _ => Err(EvalError::malformed(format!("`{name}` is not a symbol name"))),
    }
}

/// `$HOME/.formula_history` (`%USERPROFILE%` on Windows)
fn default_history_path() -> Option<PathBuf> {
    let home = if cfg!(windows) { "USERPROFILE" } else { "HOME" };
    std::env::var_os(home).map(|dir| PathBuf::from(dir).join(HISTORY_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repl() -> Repl {
        let mut symbols = SymbolTable::new();
        symbols.insert("MyInt", 7i64);
        let intrinsics = IntrinsicRegistry::with_builtins().unwrap();
        let config = EvalConfig {
            history_file: Some(std::env::temp_dir().join("formula-repl-test.history")),
            ..EvalConfig::default()
        };
        Repl::new(symbols, intrinsics, config).unwrap()
    }

    #[test]
    fn test_quit_commands() {
        let mut repl = repl();
        for cmd in [":quit", ":q", ":exit"] {
            assert_eq!(repl.handle_line(cmd), Flow::Quit);
        }
    }

    #[test]
    fn test_informational_commands_continue() {
        let mut repl = repl();
        for cmd in [":help", ":h", ":?", ":symbols", ":methods", ":clear", ":unknown"] {
            assert_eq!(repl.handle_line(cmd), Flow::Continue, "{cmd} should not quit");
        }
    }

    #[test]
    fn test_postfix_toggle() {
        let mut repl = repl();
        assert!(!repl.show_postfix);
        repl.handle_line(":postfix");
        assert!(repl.show_postfix);
    }

    #[test]
    fn test_eval_input_uses_symbols() {
        let mut repl = repl();
        assert_eq!(repl.eval_input("MyInt + 1"), Some(Value::Double(8.0)));
        assert_eq!(repl.eval_input("MyInt +"), None);
    }

    #[test]
    fn test_let_binds_symbol_for_later_lines() {
        let mut repl = repl();
        assert_eq!(repl.handle_line(":let Rate.Base = MyInt * 2"), Flow::Continue);
        assert_eq!(repl.symbols.get("Rate.Base"), Some(&Value::Double(14.0)));
        assert_eq!(repl.eval_input("Rate.Base - 4"), Some(Value::Double(10.0)));

        assert_eq!(repl.define("MyInt = \"seven\""), Some(Value::from("seven")));
        assert_eq!(repl.symbols.get("MyInt"), Some(&Value::from("seven")));
    }

    #[test]
    fn test_let_keeps_everything_after_first_equals() {
        let mut repl = repl();
        assert_eq!(repl.define("Same = MyInt = 7"), Some(Value::Bool(true)));
    }

    #[test]
    fn test_let_rejects_bad_definitions() {
        let mut repl = repl();
        assert_eq!(repl.define("NoEquals"), None);
        assert_eq!(repl.define("1 = 2"), None);
        assert_eq!(repl.define("Two Words = 2"), None);
        assert_eq!(repl.define("Broken = 1 +"), None);
        assert!(repl.symbols.get("Broken").is_none());
    }

    #[test]
    fn test_parse_definition() {
        assert_eq!(parse_definition(" Total = 1 + 2").unwrap(), ("Total", "1 + 2"));
        assert!(matches!(parse_definition("true = 1"), Err(EvalError::MalformedExpression { .. })));
    }

    #[test]
    fn test_history_path_from_config() {
        let repl = repl();
        assert_eq!(repl.history_path, Some(std::env::temp_dir().join("formula-repl-test.history")));
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(&Value::Int(-5)), "result => <Int> -5");
        assert_eq!(format_result(&Value::from(vec!["a"])), "result => <String[]> [a]");
    }
}
