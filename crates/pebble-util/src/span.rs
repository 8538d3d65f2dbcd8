//! Source location tracking.
//!
//! Pebble programs are small enough that a single in-memory source buffer
//! is sufficient; there is no multi-file source map. A [`Span`] therefore
//! only needs to carry the 1-based line and column of the first character
//! of whatever it tags (a token, or the node built from it).

/// A single point in the source text: a 1-based line and column.
///
/// Pebble never reports *ranges* of source (unlike larger compilers that
/// underline a whole expression); every diagnostic in the reference
/// implementation points at one line/column pair, so that is all this
/// type stores.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    /// A span with no meaningful position, used for synthetic nodes that
    /// never reach a diagnostic (e.g. default-valued declarations).
    pub const DUMMY: Span = Span { line: 0, column: 0 };
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}
