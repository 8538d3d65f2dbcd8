//! Character cursor for traversing source code.
//!
//! The cursor maintains a byte offset, the current line, and the current
//! column, and advances one character at a time. Only one character of
//! lookahead is required anywhere in the lexer, so [`Cursor::peek`]
//! looks no further than the character immediately after the current one.

pub struct Cursor<'a> {
    source: &'a str,
    position: usize,
    line: u32,
    column: u32,
}

impl<'a> Cursor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// The character under the cursor, or `'\0'` at end of input.
    pub fn current(&self) -> char {
        self.source[self.position..].chars().next().unwrap_or('\0')
    }

    /// The character immediately after the current one, or `'\0'`.
    pub fn peek(&self) -> char {
        let mut chars = self.source[self.position..].chars();
        chars.next();
        chars.next().unwrap_or('\0')
    }

    pub fn is_at_end(&self) -> bool {
        self.position >= self.source.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Consumes the current character, updating line/column bookkeeping.
    ///
    /// A newline resets the column to 1 and advances the line; anything
    /// else just advances the column. This is the only place position
    /// state is mutated, so it's the only place that needs to agree with
    /// the 1-based line/column contract every [`pebble_util::Span`] relies on.
    pub fn advance(&mut self) -> char {
        let c = self.current();
        if c != '\0' {
            self.position += c.len_utf8();
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        c
    }

    /// Consumes the current character if it equals `expected`.
    pub fn eat(&mut self, expected: char) -> bool {
        if self.current() == expected {
            self.advance();
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_through_ascii() {
        let mut c = Cursor::new("ab");
        assert_eq!(c.current(), 'a');
        c.advance();
        assert_eq!(c.current(), 'b');
        c.advance();
        assert!(c.is_at_end());
    }

    #[test]
    fn newline_resets_column_and_bumps_line() {
        let mut c = Cursor::new("a\nb");
        c.advance(); // 'a'
        assert_eq!((c.line(), c.column()), (1, 2));
        c.advance(); // '\n'
        assert_eq!((c.line(), c.column()), (2, 1));
    }

    #[test]
    fn peek_does_not_consume() {
        let c = Cursor::new("ab");
        assert_eq!(c.peek(), 'b');
        assert_eq!(c.current(), 'a');
    }
}
