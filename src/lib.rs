//! Core library for the Clover language: lexing, parsing, tree-walking
//! evaluation, and REPL utilities.
//!
//! The pipeline is `lexer` -> `parser` -> `runtime`. Runtime failures are
//! values of the language (`ValueKind::Error`), not Rust errors; only bad
//! syntax and I/O produce a [`CloverError`].

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runtime;
pub mod value;

pub use diagnostics::{CloverError, Diagnostic, DiagnosticKind, SourceSpan};
pub use repl::Repl;
pub use runtime::{Evaluator, Interpreter};
pub use value::{Value, ValueKind};
