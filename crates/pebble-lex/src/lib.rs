//! pebble-lex - Lexical Analyzer
//!
//! ============================================================================
//! LEXICAL ANALYSIS OVERVIEW
//! ============================================================================
//!
//! The lexer is the first stage of the Pebble pipeline: it turns the raw
//! source text into a stream of [`Token`]s, discarding whitespace and
//! `//` comments along the way. It is a direct-coded, single-pass,
//! one-character-of-lookahead scanner — no table-driven state machine,
//! no regex engine. Every token kind has its own small lexing function
//! ([`lexer::Lexer::lex_number`], [`lexer::Lexer::lex_string`], …), which
//! keeps error messages concrete: a bad string literal is diagnosed by
//! the code that was reading a string, not by a generic dispatcher.
//!
//! ```text
//! Source: "for (int i = 0; i < 3; i = i + 1)"
//!
//! Tokens: For LParen Int Identifier(i) Assign IntegerLit(0) Semi
//!         Identifier(i) Lt IntegerLit(3) Semi Identifier(i) Assign
//!         Identifier(i) Plus IntegerLit(1) RParen
//! ```
//!
//! # Identifiers vs. keywords
//!
//! Pebble has no separate keyword-lexing pass: [`lexer::Lexer`] always
//! scans the longest run of `[A-Za-z0-9_]` starting at a letter or
//! underscore, then looks the text up in [`token::TokenKind::keyword`].
//! A hit produces the keyword token (and, for `true`/`false`, its
//! boolean value); a miss produces a plain `Identifier` carrying the
//! interned text.
//!
//! # Errors
//!
//! Lexing errors — an unterminated string literal, a stray `&` or `|`
//! not part of `&&`/`||`, or any other unrecognized character — are
//! fatal: [`lexer::Lexer::next_token`] returns `Err` and no token is
//! produced for that position. There is no error-recovery mode; the
//! caller (the parser's token-pump, ultimately the driver) stops at the
//! first one.

mod cursor;
mod lexer;
mod token;

pub use cursor::Cursor;
pub use lexer::Lexer;
pub use token::{Token, TokenKind, TokenValue};

#[cfg(test)]
mod property_tests {
    use super::*;
    use pebble_util::Interner;
    use proptest::prelude::*;

    fn collect_kinds(src: &str) -> Option<Vec<TokenKind>> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, &mut interner);
        let mut kinds = Vec::new();
        loop {
            match lexer.next_token() {
                Ok(tok) => {
                    let done = tok.kind == TokenKind::Eof;
                    kinds.push(tok.kind);
                    if done {
                        return Some(kinds);
                    }
                }
                Err(_) => return None,
            }
        }
    }

    proptest! {
        /// Lexer totality: any token stream that doesn't hit a lex error
        /// terminates with exactly one trailing `Eof`.
        #[test]
        fn totality_ends_in_single_eof(n in 0i64..1_000_000, ident in "[a-zA-Z_][a-zA-Z0-9_]{0,8}") {
            let src = format!("{n} {ident}");
            if let Some(kinds) = collect_kinds(&src) {
                prop_assert_eq!(kinds.last().copied(), Some(TokenKind::Eof));
                prop_assert_eq!(kinds.iter().filter(|k| **k == TokenKind::Eof).count(), 1);
            }
        }

        /// Inserting extra whitespace or a trailing line comment between
        /// two tokens never changes the non-trivia token sequence.
        #[test]
        fn whitespace_insensitive(a in "[a-zA-Z_][a-zA-Z0-9_]{0,6}", b in 1i64..1000) {
            let tight = format!("{a}+{b}");
            let spaced = format!("  {a}   +\t{b}  // trailing\n");
            prop_assert_eq!(collect_kinds(&tight), collect_kinds(&spaced));
        }
    }
}
