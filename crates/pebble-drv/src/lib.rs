//! pebble-drv - Driver
//!
//! ============================================================================
//! DRIVER OVERVIEW
//! ============================================================================
//!
//! The driver is the thinnest crate in the pipeline: it has exactly one
//! job, reading a single source file and running it start to finish.
//!
//! ```text
//! pebble main.pebble
//!        │
//!        ▼
//!   [Read File] ──▶ source text
//!        │
//!        ▼
//!   [pebble-lex]  ──▶ Token stream  (Lexer Error: ...)
//!        │
//!        ▼
//!   [pebble-par]  ──▶ Program AST   (Parse Error: ...)
//!        │
//!        ▼
//!   [pebble-eval] ──▶ side effects  (Runtime Error: ...)
//! ```
//!
//! There is no separate compilation phase, no intermediate representation
//! to emit, and no flags to parse beyond the one required argument — the
//! language has no module system and no linker to invoke (see the
//! evaluator's Non-goals). [`Session::run`] is the entire pipeline;
//! [`main`] in `src/main.rs` just wires it to `std::env::args` and an
//! exit code.
//!
//! Diagnostics are reported with exactly one of three prefixes —
//! `Lexer Error:`, `Parse Error:`, `Runtime Error:` — chosen by which
//! stage raised the fatal error. The error taxonomy lives in
//! `pebble-util` so every stage, and this driver, agree on the wording.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use pebble_eval::Evaluator;
use pebble_lex::Lexer;
use pebble_par::Parser;
use pebble_util::{Interner, PebbleError};

/// A single run of the interpreter over one source file.
pub struct Session {
    path: PathBuf,
}

impl Session {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Reads, lexes, parses, and evaluates the session's source file.
    ///
    /// On success the program has already produced whatever output it
    /// was going to produce (via `print`/`read_*`); there is nothing
    /// further to report. On failure, returns the single diagnostic the
    /// caller should print before exiting non-zero.
    pub fn run(&self) -> Result<(), DriverError> {
        let source = std::fs::read_to_string(&self.path).map_err(|e| DriverError::FileNotFound {
            path: self.path.clone(),
            source: e,
        })?;

        let mut interner = Interner::new();
        let lexer = Lexer::new(&source, &mut interner);
        let program = Parser::new(lexer)?.parse_program()?;
        Evaluator::run(&program, &interner)?;
        Ok(())
    }
}

/// Everything that can end a run early, already carrying the exact
/// diagnostic line the CLI prints.
#[derive(Debug)]
pub enum DriverError {
    FileNotFound { path: PathBuf, source: io::Error },
    Pipeline(PebbleError),
}

impl From<PebbleError> for DriverError {
    fn from(err: PebbleError) -> Self {
        DriverError::Pipeline(err)
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::FileNotFound { path, .. } => write!(f, "Error: File '{}' not found.", path.display()),
            DriverError::Pipeline(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for DriverError {}

/// Parses `std::env::args`, runs the session, and returns the process
/// exit code the caller (`src/main.rs`) should use.
pub fn main_inner(args: &[String]) -> i32 {
    if args.len() != 1 {
        eprintln!("Usage: pebble <file.pebble>");
        return 1;
    }

    match Session::new(Path::new(&args[0])).run() {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{e}");
            1
        }
    }
}
