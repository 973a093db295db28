//! Formula CLI

use clap::{Parser, Subcommand};
use formula::error::report_error;
use formula::repl::{Repl, format_result};
use formula::{EvalConfig, Evaluator, IntrinsicRegistry, SymbolTable, to_postfix, tokenize};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[derive(Parser)]
#[command(name = "formula", version, about = "Formula - embeddable expression evaluator")]
struct Cli {
    /// Evaluator settings (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Symbol table (JSON object, nested objects become dotted names)
    #[arg(long, global = true)]
    symbols: Option<PathBuf>,

    /// Log evaluation details to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluate one formula
    Eval {
        /// Formula text
        expr: String,
    },
    /// Evaluate every line of a file
    Run {
        /// Formula file; blank lines and `//` comments are echoed but skipped
        file: PathBuf,
    },
    /// Tokenize and dump tokens (debug)
    Tokens {
        /// Formula text
        expr: String,
        /// Emit JSON instead of one token per line
        #[arg(long)]
        json: bool,
    },
    /// Print the postfix instruction listing (debug)
    Postfix {
        /// Formula text
        expr: String,
    },
    /// Start the interactive REPL
    Repl,
}

/// Everything an evaluation needs, built once at startup
struct Session {
    config: EvalConfig,
    symbols: SymbolTable,
    intrinsics: IntrinsicRegistry,
}

impl Session {
    fn load(config: Option<&Path>, symbols: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = match config {
            Some(path) => EvalConfig::load(path)?,
            None => EvalConfig::default(),
        };
        let mut table = SymbolTable::with_clock_defaults();
        if let Some(path) = symbols {
            table.extend(SymbolTable::load(path)?);
        }
        let intrinsics = IntrinsicRegistry::from_config(&config)?;
        Ok(Session {
            config,
            symbols: table,
            intrinsics,
        })
    }

    fn evaluator(&self) -> Evaluator<'_> {
        Evaluator::new(&self.symbols, &self.intrinsics).with_config(&self.config)
    }

    /// Evaluate and print one formula; false when it failed.
    fn eval_line(&self, name: &str, source: &str) -> bool {
        match tokenize(source).and_then(|tokens| self.evaluator().evaluate(&tokens)) {
            Ok(value) => {
                println!("{}", format_result(&value));
                true
            }
            Err(err) => {
                report_error(name, source, &err);
                false
            }
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match &cli.command {
        Command::Eval { expr } => eval_expr(&cli, expr),
        Command::Run { file } => run_file(&cli, file),
        Command::Tokens { expr, json } => dump_tokens(expr, *json),
        Command::Postfix { expr } => dump_postfix(expr),
        Command::Repl => start_repl(&cli),
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// stderr logging filtered by RUST_LOG; `--verbose` raises the default to debug
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true).with_level(true))
        .with(filter)
        .init();
}

fn eval_expr(cli: &Cli, expr: &str) -> Result<bool, Box<dyn std::error::Error>> {
    let session = Session::load(cli.config.as_deref(), cli.symbols.as_deref())?;
    Ok(session.eval_line("<expr>", expr))
}

fn run_file(cli: &Cli, path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    let session = Session::load(cli.config.as_deref(), cli.symbols.as_deref())?;
    let source = std::fs::read_to_string(path)?;
    let filename = path.display().to_string();

    let mut all_ok = true;
    for (number, line) in source.lines().enumerate() {
        println!("{line}");
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        let name = format!("{filename}:{}", number + 1);
        all_ok &= session.eval_line(&name, line);
    }
    Ok(all_ok)
}

fn dump_tokens(expr: &str, json: bool) -> Result<bool, Box<dyn std::error::Error>> {
    let tokens = match tokenize(expr) {
        Ok(tokens) => tokens,
        Err(err) => {
            report_error("<expr>", expr, &err);
            return Ok(false);
        }
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&tokens)?);
    } else {
        for lexeme in &tokens {
            println!("{lexeme} @ {}", lexeme.span);
        }
    }
    Ok(true)
}

fn dump_postfix(expr: &str) -> Result<bool, Box<dyn std::error::Error>> {
    match tokenize(expr).and_then(|tokens| to_postfix(&tokens)) {
        Ok(postfix) => {
            println!("{postfix}");
            Ok(true)
        }
        Err(err) => {
            report_error("<expr>", expr, &err);
            Ok(false)
        }
    }
}

fn start_repl(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let session = Session::load(cli.config.as_deref(), cli.symbols.as_deref())?;
    let mut repl = Repl::new(session.symbols, session.intrinsics, session.config)?;
    repl.run()?;
    Ok(true)
}
