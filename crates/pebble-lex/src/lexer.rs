//! Lexical analysis: character stream to token stream.
//!
//! [`Lexer::next_token`] is the sole entry point. It skips whitespace and
//! line comments, then dispatches on the current character to produce
//! exactly one [`Token`]. The lexer buffers nothing across calls beyond
//! the cursor itself — the parser is the one that keeps a token of
//! lookahead.
//!
//! Every multi-character token (`==`, `!=`, `<=`, `>=`, `&&`, `||`) is
//! recognized by a single extra character of lookahead via
//! [`Cursor::peek`]; there is never a need to backtrack.

use pebble_util::{Interner, LexError, Span};

use crate::cursor::Cursor;
use crate::token::{Token, TokenKind, TokenValue};

pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    interner: &'a mut Interner,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, interner: &'a mut Interner) -> Self {
        Self {
            cursor: Cursor::new(source),
            interner,
        }
    }

    /// Produces the next token, or a fatal [`LexError`].
    ///
    /// Once the source is exhausted this returns `Token::Eof` on every
    /// subsequent call — callers that loop `while token.kind != Eof` are
    /// safe even if they call one extra time.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_trivia();

        let start = Span::new(self.cursor.line(), self.cursor.column());

        if self.cursor.is_at_end() {
            return Ok(Token::new(TokenKind::Eof, TokenValue::None, start));
        }

        let c = self.cursor.current();

        if c.is_ascii_digit() {
            return self.lex_number(start);
        }
        if c == '"' {
            return self.lex_string(start);
        }
        if c.is_ascii_alphabetic() || c == '_' {
            return Ok(self.lex_identifier(start));
        }

        self.lex_operator(start)
    }

    /// Skips whitespace runs and `//` line comments.
    fn skip_trivia(&mut self) {
        loop {
            match self.cursor.current() {
                ' ' | '\t' | '\r' | '\n' => {
                    self.cursor.advance();
                }
                '/' if self.cursor.peek() == '/' => {
                    while !self.cursor.is_at_end() && self.cursor.current() != '\n' {
                        self.cursor.advance();
                    }
                }
                _ => break,
            }
        }
    }

    fn lex_number(&mut self, start: Span) -> Result<Token, LexError> {
        let mut value: i64 = 0;
        while self.cursor.current().is_ascii_digit() {
            let digit = self.cursor.advance() as i64 - '0' as i64;
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(digit))
                .ok_or_else(|| LexError::new("integer literal out of range for a 64-bit value", start))?;
        }
        Ok(Token::new(TokenKind::IntegerLit, TokenValue::Int(value), start))
    }

    fn lex_string(&mut self, start: Span) -> Result<Token, LexError> {
        self.cursor.advance(); // opening quote
        let mut text = String::new();
        loop {
            if self.cursor.is_at_end() {
                return Err(LexError::new("unterminated string literal", start));
            }
            if self.cursor.current() == '"' {
                self.cursor.advance();
                break;
            }
            text.push(self.cursor.advance());
        }
        let sym = self.interner.intern(&text);
        Ok(Token::new(TokenKind::StringLit, TokenValue::Text(sym), start))
    }

    fn lex_identifier(&mut self, start: Span) -> Token {
        let mut text = String::new();
        while self.cursor.current().is_ascii_alphanumeric() || self.cursor.current() == '_' {
            text.push(self.cursor.advance());
        }

        if let Some(kind) = TokenKind::keyword(&text) {
            let value = match kind {
                TokenKind::True => TokenValue::Bool(true),
                TokenKind::False => TokenValue::Bool(false),
                _ => TokenValue::None,
            };
            return Token::new(kind, value, start);
        }

        let sym = self.interner.intern(&text);
        Token::new(TokenKind::Identifier, TokenValue::Text(sym), start)
    }

    fn lex_operator(&mut self, start: Span) -> Result<Token, LexError> {
        let c = self.cursor.advance();
        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ';' => TokenKind::Semi,
            ',' => TokenKind::Comma,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Mul,
            '/' => TokenKind::Div,
            '%' => TokenKind::Mod,
            '=' => {
                if self.cursor.eat('=') {
                    TokenKind::Eq
                } else {
                    TokenKind::Assign
                }
            }
            '!' => {
                if self.cursor.eat('=') {
                    TokenKind::Neq
                } else {
                    TokenKind::Not
                }
            }
            '<' => {
                if self.cursor.eat('=') {
                    TokenKind::Lte
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.cursor.eat('=') {
                    TokenKind::Gte
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.cursor.eat('&') {
                    TokenKind::And
                } else {
                    return Err(LexError::new("unexpected character '&'", start));
                }
            }
            '|' => {
                if self.cursor.eat('|') {
                    TokenKind::Or
                } else {
                    return Err(LexError::new("unexpected character '|'", start));
                }
            }
            other => {
                return Err(LexError::new(format!("unexpected character '{other}'"), start));
            }
        };
        Ok(Token::new(kind, TokenValue::None, start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new(src, &mut interner);
        let mut kinds = Vec::new();
        loop {
            let tok = lexer.next_token().expect("lex error");
            let done = tok.kind == TokenKind::Eof;
            kinds.push(tok.kind);
            if done {
                break;
            }
        }
        kinds
    }

    #[test]
    fn greedy_two_char_operators_beat_their_prefix() {
        use TokenKind::*;
        assert_eq!(tokens("== != <= >= && ||"), vec![Eq, Neq, Lte, Gte, And, Or, Eof]);
    }

    #[test]
    fn line_comment_runs_to_newline() {
        use TokenKind::*;
        assert_eq!(tokens("1 // two\n2"), vec![IntegerLit, IntegerLit, Eof]);
    }

    #[test]
    fn keyword_table_recognizes_reserved_words() {
        use TokenKind::*;
        assert_eq!(
            tokens("if else while for return int string bool void true false"),
            vec![If, Else, While, For, Return, Int, StringKw, Bool, Void, True, False, Eof]
        );
    }

    #[test]
    fn identifier_not_in_keyword_table() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("counter", &mut interner);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.kind, TokenKind::Identifier);
    }

    #[test]
    fn unterminated_string_is_fatal() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("\"abc", &mut interner);
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn lone_ampersand_is_fatal() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("&x", &mut interner);
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn lone_pipe_is_fatal() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("|x", &mut interner);
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn leading_minus_is_its_own_token_not_part_of_the_literal() {
        use TokenKind::*;
        assert_eq!(tokens("-5"), vec![Minus, IntegerLit, Eof]);
    }

    #[test]
    fn integer_literal_overflowing_i64_is_a_fatal_lex_error() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("99999999999999999999", &mut interner);
        assert!(lexer.next_token().is_err());
    }

    #[test]
    fn integer_literal_at_i64_max_is_accepted() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("9223372036854775807", &mut interner);
        let tok = lexer.next_token().unwrap();
        assert_eq!(tok.value, TokenValue::Int(i64::MAX));
    }

    #[test]
    fn eof_is_returned_indefinitely() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("", &mut interner);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
        assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
    }

    #[test]
    fn eof_never_regresses_position() {
        let mut interner = Interner::new();
        let mut lexer = Lexer::new("a b", &mut interner);
        let mut last = (0u32, 0u32);
        loop {
            let tok = lexer.next_token().unwrap();
            let here = (tok.span.line, tok.span.column);
            assert!(here >= last);
            last = here;
            if tok.kind == TokenKind::Eof {
                break;
            }
        }
    }
}
