//! Error taxonomy for the Pebble pipeline.
//!
//! The reference implementation has exactly three fatal error classes —
//! lexical, syntactic, and runtime — and never recovers from any of
//! them: the first error reported ends the run. [`PebbleError`] is the
//! union the driver matches on to choose an exit message; each variant's
//! `Display` impl produces the single diagnostic line the CLI prints,
//! already carrying the `Lexer Error:` / `Parse Error:` / `Runtime
//! Error:` prefix from §6.2 of the language contract.

use thiserror::Error;

use crate::span::Span;

/// A lexical error: an unexpected character or an unterminated string.
///
/// Lex errors are the only class that must carry position information
/// unconditionally — there is no partially-built token to blame, so the
/// cursor's own line/column is the only anchor a user gets.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Lexer Error: {message} at {span}")]
pub struct LexError {
    pub message: String,
    pub span: Span,
}

impl LexError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        Self {
            message: message.into(),
            span,
        }
    }
}

/// A syntax error: an unexpected token, missing delimiter, invalid
/// assignment target, malformed array declaration, or missing function
/// body.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Parse Error: {message}")]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A runtime error raised by the evaluator: unbound name, arity
/// mismatch, division by zero, an out-of-bounds array index, indexing a
/// non-array, a missing `main`, or end-of-input during a `read_*` call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Runtime Error: {message}")]
pub struct RuntimeError {
    pub message: String,
}

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The union of every fatal error the pipeline can raise.
///
/// The driver is the only consumer that needs all three variants in one
/// type (to print the right prefix and exit non-zero); the lexer,
/// parser, and evaluator each only ever produce their own variant.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PebbleError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

pub type PebbleResult<T> = std::result::Result<T, PebbleError>;
