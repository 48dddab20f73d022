use std::{
    fs,
    path::{Path, PathBuf},
    process,
    sync::Once,
};

use clap::{Parser, Subcommand};

use clover::{CloverError, Diagnostic, DiagnosticKind, Interpreter, Repl, Value, ValueKind};

#[derive(Parser)]
#[command(author, version, about = "Clover language interpreter")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run a Clover script file and print its result
    Run { script: PathBuf },
    /// Start an interactive REPL session
    Repl,
    /// Evaluate a snippet of Clover code and print its result
    Eval { source: String },
}

static TRACING_INIT: Once = Once::new();

// Parser tracing is opt-in via RUST_LOG, e.g. RUST_LOG=clover=trace.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            use tracing_subscriber::{fmt, prelude::*, EnvFilter};
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let args = Args::parse();
    let result = match args.command.unwrap_or(Command::Repl) {
        Command::Run { script } => run_script(script),
        Command::Repl => {
            let mut repl = Repl::new();
            repl.run()
        }
        Command::Eval { source } => eval_snippet(&source),
    };
    if let Err(err) = result {
        eprintln!("{err}");
        process::exit(1);
    }
}

fn eval_snippet(source: &str) -> Result<(), CloverError> {
    let mut interpreter = Interpreter::new();
    let value = interpreter.eval_source(source)?;
    print_result(value, None)
}

fn run_script(path: PathBuf) -> Result<(), CloverError> {
    let source = fs::read_to_string(&path)?;
    let mut interpreter = Interpreter::new();
    let value = interpreter.eval_source(&source)?;
    print_result(value, Some(&path))
}

fn print_result(value: Value, script: Option<&Path>) -> Result<(), CloverError> {
    if let ValueKind::Error(message) = &*value.0 {
        let mut diagnostic = Diagnostic::new(DiagnosticKind::Runtime, message.clone());
        if let Some(path) = script {
            diagnostic = diagnostic.with_note(format!("while running {}", path.display()));
        }
        return Err(CloverError::from(diagnostic));
    }
    println!("{value}");
    Ok(())
}
