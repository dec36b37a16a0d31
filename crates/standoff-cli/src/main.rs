use clap::{ArgAction, Parser, Subcommand};
use standoff_nesting::NestingTable;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "standoff")]
#[command(about = "Scan and check stand-off annotation files")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream of an .ann file
    Lex {
        /// Input .ann file
        path: PathBuf,
    },

    /// Parse an .ann file and check span nesting against a table
    Check {
        /// Input .ann file
        path: PathBuf,

        /// Nesting table (TOML); without it no nesting is permitted
        #[arg(long)]
        nesting: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Lex { path } => cmd_lex(&path),
        Command::Check { path, nesting } => cmd_check(&path, nesting.as_deref()),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_source(path: &Path) -> String {
    if !path.exists() {
        eprintln!("Error: file not found: {}", path.display());
        std::process::exit(1);
    }
    match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            std::process::exit(1);
        }
    }
}

fn cmd_lex(path: &Path) {
    let source = read_source(path);

    let tokens = match standoff_lexer::Scanner::tokenize(&source) {
        Ok(tokens) => tokens,
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            std::process::exit(1);
        }
    };

    for token in tokens {
        println!(
            "{}:{}-{} {} {:?}",
            token.span.line,
            token.span.start_column,
            token.span.end_column,
            token.kind.name(),
            token.text
        );
    }
}

fn cmd_check(path: &Path, nesting: Option<&Path>) {
    let source = read_source(path);

    let table = match nesting {
        Some(table_path) => match NestingTable::from_path(table_path) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            tracing::debug!("no nesting table given, using an empty one");
            NestingTable::default()
        }
    };

    let violations = match standoff_parser::check(&source, &table) {
        Ok(violations) => violations,
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            std::process::exit(1);
        }
    };

    if violations.is_empty() {
        eprintln!("OK: {}", path.display());
        return;
    }

    for violation in &violations {
        println!("{}: {violation}", path.display());
    }
    eprintln!("{} nesting violation(s) in {}", violations.len(), path.display());
    std::process::exit(1);
}
