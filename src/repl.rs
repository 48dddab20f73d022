use rustyline::{DefaultEditor, error::ReadlineError};

use crate::{
    diagnostics::{CloverError, Result},
    runtime::Interpreter,
    value::ValueKind,
};

/// Interactive session. Bindings persist across lines because every line is
/// evaluated against the same `Interpreter`.
pub struct Repl {
    interpreter: Interpreter,
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        println!(
            "Clover {} (type :quit to exit)",
            env!("CARGO_PKG_VERSION")
        );
        let mut editor = DefaultEditor::new().map_err(|err| {
            CloverError::from(std::io::Error::new(std::io::ErrorKind::Other, err))
        })?;
        loop {
            match editor.readline(">> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    match self.interpreter.eval_source(trimmed) {
                        Ok(value) => match &*value.0 {
                            ValueKind::Error(message) => eprintln!("runtime error: {message}"),
                            _ => println!("{value}"),
                        },
                        Err(CloverError::Diagnostic(diag)) => eprintln!("{diag}"),
                        Err(other) => eprintln!("error: {other}"),
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(err) => {
                    return Err(CloverError::from(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        err,
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}
