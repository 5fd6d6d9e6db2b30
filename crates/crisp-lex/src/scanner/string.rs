//! String and character literal sub-scanner.
//!
//! Strings use `"`, character literals use `'`. Escape sequences use
//! decimal digit runs rather than octal (`"\12"` is twelve, not ten).
//! Adjacent same-quote strings concatenate across whitespace unless
//! disabled.

use crisp_util::{Error, Result};

use crate::scanner::{ScanFlags, Scanner};
use crate::token::{NumFlags, Token, TokenKind};

impl Scanner {
    /// Scans a quoted string or character literal starting at `quote`.
    pub(super) fn scan_string(&mut self, quote: char) -> Result<Token> {
        let kind = if quote == '"' {
            TokenKind::String
        } else {
            TokenKind::Literal
        };
        self.cursor.advance();

        let mut text = String::new();
        loop {
            if !self.scan_quoted_segment(quote, &mut text)? {
                break;
            }
            if !self.continue_concatenation(quote)? {
                break;
            }
        }

        if kind == TokenKind::Literal {
            let chars = text.chars().count();
            if chars == 0 {
                self.error(Error::Syntax("empty character literal".into()))?;
            } else if chars > 1 && !self.flags.contains(ScanFlags::ALLOW_MULTI_CHAR_LITERALS) {
                self.error(Error::Syntax(
                    "character literal is longer than one character".into(),
                ))?;
            }
        }
        Ok(Token::new(kind, text, NumFlags::empty()))
    }

    /// Reads characters up to the closing quote. Returns `false` when the
    /// segment ended abnormally and concatenation must not be attempted.
    fn scan_quoted_segment(&mut self, quote: char, text: &mut String) -> Result<bool> {
        loop {
            if self.cursor.is_at_end() {
                self.error(Error::Syntax("unterminated string".into()))?;
                return Ok(false);
            }
            let c = self.cursor.current_char();
            if c == quote {
                self.cursor.advance();
                return Ok(true);
            }
            if c == '\n' {
                self.error(Error::Syntax("newline inside string".into()))?;
                return Ok(false);
            }
            if c == '\\' && !self.flags.contains(ScanFlags::NO_STRING_ESCAPES) {
                self.cursor.advance();
                if let Some(escaped) = self.parse_escape()? {
                    text.push(escaped);
                }
            } else {
                text.push(self.take());
            }
        }
    }

    /// After a closing quote, decides whether another segment of the same
    /// quote kind follows and should be concatenated. Leaves the cursor
    /// after the next opening quote when it does, or restored when it
    /// does not.
    fn continue_concatenation(&mut self, quote: char) -> Result<bool> {
        let save_pos = self.cursor.position();
        let save_line = self.cursor.line();
        self.skip_whitespace_and_comments()?;

        if self.flags.contains(ScanFlags::NO_STRING_CONCAT) {
            if self.flags.contains(ScanFlags::ALLOW_BACKSLASH_STRING_CONCAT)
                && self.cursor.current_char() == '\\'
            {
                self.cursor.advance();
                self.skip_whitespace_and_comments()?;
                if self.cursor.current_char() == quote {
                    self.cursor.advance();
                    return Ok(true);
                }
                self.error(Error::Grammar(
                    "expected string continuation after '\\'".into(),
                ))?;
            }
            self.cursor.seek(save_pos, save_line);
            return Ok(false);
        }

        if self.cursor.current_char() == quote {
            self.cursor.advance();
            return Ok(true);
        }
        self.cursor.seek(save_pos, save_line);
        Ok(false)
    }

    /// Parses one escape sequence after the `\` has been consumed.
    ///
    /// Accepts the named escapes, `\xHH..` hex runs, and decimal digit
    /// runs. Values beyond 0xFF warn and saturate.
    fn parse_escape(&mut self) -> Result<Option<char>> {
        if self.cursor.is_at_end() {
            self.error(Error::Syntax("unterminated escape sequence".into()))?;
            return Ok(None);
        }

        let c = self.cursor.current_char();
        if c.is_ascii_digit() {
            let mut value: u32 = 0;
            while self.cursor.current_char().is_ascii_digit() {
                let digit = u32::from(self.take()) - u32::from('0');
                value = (value * 10 + digit).min(0x1000);
            }
            return Ok(Some(self.escape_value(value)));
        }

        self.cursor.advance();
        let escaped = match c {
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            'v' => '\x0B',
            'b' => '\x08',
            'f' => '\x0C',
            'a' => '\x07',
            '\\' => '\\',
            '\'' => '\'',
            '"' => '"',
            '?' => '?',
            'x' => {
                if !self.cursor.current_char().is_ascii_hexdigit() {
                    self.error(Error::Syntax("no digits in hex escape".into()))?;
                    return Ok(None);
                }
                let mut value: u32 = 0;
                while self.cursor.current_char().is_ascii_hexdigit() {
                    let digit = self
                        .take()
                        .to_digit(16)
                        .unwrap_or(0);
                    value = (value * 16 + digit).min(0x1000);
                }
                return Ok(Some(self.escape_value(value)));
            }
            other => {
                self.error(Error::Syntax(format!("unknown escape character '{other}'")))?;
                return Ok(None);
            }
        };
        Ok(Some(escaped))
    }

    /// Clamps an escape value to a byte, warning on truncation.
    fn escape_value(&mut self, value: u32) -> char {
        let value = if value > 0xFF {
            self.warning("escape character value is larger than 0xFF, truncated");
            0xFF
        } else {
            value
        };
        char::from_u32(value).unwrap_or('\0')
    }

    /// `only_strings` mode: a whitespace-delimited run becomes a single
    /// string token; quoted strings still go through the normal path.
    pub(super) fn scan_string_run(&mut self) -> Result<Token> {
        let c = self.cursor.current_char();
        if c == '"' || c == '\'' {
            return self.scan_string(c);
        }
        let mut text = String::new();
        while !self.cursor.is_at_end() && !self.cursor.current_char().is_whitespace() {
            text.push(self.take());
        }
        Ok(Token::new(TokenKind::String, text, NumFlags::empty()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_one(source: &str, flags: ScanFlags) -> Token {
        let mut scanner = Scanner::from_buffer(source, "test", flags, 1);
        scanner.next_token().unwrap().unwrap()
    }

    #[test]
    fn test_simple_string() {
        let tok = scan_one("\"hello\"", ScanFlags::empty());
        assert_eq!(tok.kind(), TokenKind::String);
        assert_eq!(tok.text(), "hello");
    }

    #[test]
    fn test_named_escapes() {
        let tok = scan_one(r#""a\n\t\\\"b""#, ScanFlags::empty());
        assert_eq!(tok.text(), "a\n\t\\\"b");
    }

    #[test]
    fn test_decimal_escape_not_octal() {
        let tok = scan_one(r#""\12""#, ScanFlags::empty());
        assert_eq!(tok.text(), "\u{C}");
    }

    #[test]
    fn test_hex_escape() {
        let tok = scan_one(r#""\x41""#, ScanFlags::empty());
        assert_eq!(tok.text(), "A");
    }

    #[test]
    fn test_hex_escape_saturates() {
        let mut scanner = Scanner::from_buffer(
            r#""foo \x1FF""#,
            "test",
            ScanFlags::NO_WARNINGS,
            1,
        );
        let tok = scanner.next_token().unwrap().unwrap();
        assert_eq!(tok.text(), "foo \u{FF}");
        assert_eq!(scanner.warning_count(), 1);
    }

    #[test]
    fn test_escapes_disabled() {
        let tok = scan_one(r#""a\nb""#, ScanFlags::NO_STRING_ESCAPES);
        assert_eq!(tok.text(), "a\\nb");
    }

    #[test]
    fn test_concatenation() {
        let tok = scan_one("\"a\" \"b\"", ScanFlags::empty());
        assert_eq!(tok.text(), "ab");
    }

    #[test]
    fn test_concatenation_across_lines() {
        let tok = scan_one("\"a\"\n\"b\"", ScanFlags::empty());
        assert_eq!(tok.text(), "ab");
    }

    #[test]
    fn test_no_concat_flag() {
        let mut scanner = Scanner::from_buffer(
            "\"a\" \"b\"",
            "test",
            ScanFlags::NO_STRING_CONCAT,
            1,
        );
        let a = scanner.next_token().unwrap().unwrap();
        let b = scanner.next_token().unwrap().unwrap();
        assert_eq!(a.text(), "a");
        assert_eq!(b.text(), "b");
    }

    #[test]
    fn test_backslash_concat() {
        let tok = scan_one(
            "\"a\" \\\n \"b\"",
            ScanFlags::NO_STRING_CONCAT | ScanFlags::ALLOW_BACKSLASH_STRING_CONCAT,
        );
        assert_eq!(tok.text(), "ab");
    }

    #[test]
    fn test_different_quote_kinds_do_not_concat() {
        let mut scanner = Scanner::from_buffer("\"a\" 'b'", "test", ScanFlags::empty(), 1);
        let a = scanner.next_token().unwrap().unwrap();
        let b = scanner.next_token().unwrap().unwrap();
        assert_eq!(a.kind(), TokenKind::String);
        assert_eq!(b.kind(), TokenKind::Literal);
    }

    #[test]
    fn test_newline_in_string_is_error() {
        let mut scanner = Scanner::from_buffer("\"a\nb\"", "test", ScanFlags::NO_ERRORS, 1);
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let mut scanner = Scanner::from_buffer("\"abc", "test", ScanFlags::NO_ERRORS, 1);
        assert!(scanner.next_token().is_err());
    }

    #[test]
    fn test_char_literal() {
        let tok = scan_one("'x'", ScanFlags::empty());
        assert_eq!(tok.kind(), TokenKind::Literal);
        assert_eq!(tok.text(), "x");
        assert_eq!(tok.as_int(), i64::from(u32::from('x')));
    }

    #[test]
    fn test_multi_char_literal_needs_flag() {
        let mut scanner = Scanner::from_buffer("'ab'", "test", ScanFlags::NO_ERRORS, 1);
        assert!(scanner.next_token().is_err());

        let tok = scan_one("'ab'", ScanFlags::ALLOW_MULTI_CHAR_LITERALS);
        assert_eq!(tok.text(), "ab");
    }
}
