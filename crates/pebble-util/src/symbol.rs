//! String interning for identifier and keyword text.
//!
//! Pebble programs re-use the same handful of identifiers constantly
//! (`i`, `n`, `result`, the keywords themselves). Interning means every
//! occurrence of `"result"` collapses to the same 4-byte handle, so the
//! environment's name→value maps compare and hash integers instead of
//! walking strings.
//!
//! The language has no concurrency (§ Non-goals), so unlike a
//! multi-threaded compiler's lock-free interner this one is a plain
//! single-owner table: one [`Interner`] per run, created by the driver
//! and threaded through the lexer, parser, and evaluator.

use rustc_hash::FxHashMap;
use std::fmt;

/// An interned identifier or string-literal text.
///
/// Comparison and hashing are O(1) integer operations; the backing text
/// is recovered from the owning [`Interner`] with [`Interner::resolve`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.0)
    }
}

/// Owns the backing storage for every [`Symbol`] produced during a run.
///
/// Strings are leaked to `'static` once, the first time they're interned.
/// This is the same trade-off a one-shot compiler or interpreter process
/// always makes: total unique identifier text in a Pebble source file is
/// bounded and small, so never reclaiming it is simpler than reference
/// counting and costs nothing observable.
pub struct Interner {
    map: FxHashMap<&'static str, Symbol>,
    strings: Vec<&'static str>,
}

impl Interner {
    pub fn new() -> Self {
        Self {
            map: FxHashMap::default(),
            strings: Vec::new(),
        }
    }

    /// Interns `text`, returning the existing symbol if seen before.
    pub fn intern(&mut self, text: &str) -> Symbol {
        if let Some(&sym) = self.map.get(text) {
            return sym;
        }
        let leaked: &'static str = Box::leak(text.to_owned().into_boxed_str());
        let sym = Symbol(self.strings.len() as u32);
        self.strings.push(leaked);
        self.map.insert(leaked, sym);
        sym
    }

    /// Recovers the text behind a symbol produced by this interner.
    ///
    /// # Panics
    ///
    /// Panics if `sym` was not produced by this interner instance.
    pub fn resolve(&self, sym: Symbol) -> &str {
        self.strings[sym.0 as usize]
    }
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_text_interns_to_same_symbol() {
        let mut interner = Interner::new();
        let a = interner.intern("result");
        let b = interner.intern("result");
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_text_interns_to_distinct_symbols() {
        let mut interner = Interner::new();
        let a = interner.intern("left");
        let b = interner.intern("right");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let sym = interner.intern("fibonacci");
        assert_eq!(interner.resolve(sym), "fibonacci");
    }
}
