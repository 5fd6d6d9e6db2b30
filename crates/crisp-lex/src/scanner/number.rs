//! Number sub-scanner.
//!
//! Recognizes binary, octal, decimal, and hexadecimal integers, floats
//! with optional exponents and exceptional values (`1.#INF` and friends),
//! and IPv4 addresses with an optional port. Trailing type suffixes set
//! the width and signedness flags without entering the token text.

use crisp_util::{Error, Result};

use crate::scanner::{ScanFlags, Scanner};
use crate::token::{NumFlags, Token, TokenKind};

impl Scanner {
    pub(super) fn scan_number(&mut self) -> Result<Token> {
        let mut text = String::new();
        let mut flags = NumFlags::empty();

        let c = self.cursor.current_char();
        let next = self.cursor.char_at(1);

        if c == '0' && (next == 'x' || next == 'X') {
            text.push(self.take());
            text.push(self.take());
            while self.cursor.current_char().is_ascii_hexdigit() {
                text.push(self.take());
            }
            if text.len() == 2 {
                self.error(Error::Syntax(format!("no digits after '{text}'")))?;
            }
            flags |= NumFlags::HEX | NumFlags::INTEGER;
        } else if c == '0' && (next == 'b' || next == 'B') {
            text.push(self.take());
            text.push(self.take());
            while matches!(self.cursor.current_char(), '0' | '1') {
                text.push(self.take());
            }
            if text.len() == 2 || self.cursor.current_char().is_ascii_digit() {
                self.error(Error::Syntax(format!(
                    "invalid binary number '{text}{}'",
                    self.cursor.current_char()
                )))?;
            }
            flags |= NumFlags::BINARY | NumFlags::INTEGER;
        } else if c == '0' && matches!(next, '0'..='7') {
            text.push(self.take());
            while matches!(self.cursor.current_char(), '0'..='7') {
                text.push(self.take());
            }
            if self.cursor.current_char().is_ascii_digit() {
                self.error(Error::Syntax(format!(
                    "invalid octal digit '{}'",
                    self.cursor.current_char()
                )))?;
                text.push(self.take());
            }
            flags |= NumFlags::OCTAL | NumFlags::INTEGER;
        } else {
            flags |= self.scan_decimal(&mut text)?;
        }

        if flags.contains(NumFlags::FLOAT)
            && !flags.intersects(NumFlags::SINGLE | NumFlags::EXTENDED)
        {
            flags |= NumFlags::DOUBLE;
        }
        if flags.contains(NumFlags::INTEGER) {
            // Up to two of u|U|l|L, in either order.
            for _ in 0..2 {
                match self.cursor.current_char() {
                    'u' | 'U' => {
                        flags |= NumFlags::UNSIGNED;
                        self.cursor.advance();
                    }
                    'l' | 'L' => {
                        self.cursor.advance();
                    }
                    _ => break,
                }
            }
            if !flags.contains(NumFlags::UNSIGNED) {
                flags |= NumFlags::SIGNED;
            }
        }

        // A number may continue into an identifier (`16bit`).
        if self.flags.contains(ScanFlags::ALLOW_NUMBER_NAMES) {
            let c = self.cursor.current_char();
            if c.is_ascii_alphabetic() || c == '_' {
                while self.cursor.current_char().is_ascii_alphanumeric()
                    || self.cursor.current_char() == '_'
                {
                    text.push(self.take());
                }
                return Ok(Token::new(TokenKind::Identifier, text, NumFlags::empty()));
            }
        }

        Ok(Token::new(TokenKind::Number, text, flags))
    }

    /// Scans a decimal integer, float, exceptional float, or IPv4
    /// address into `text` and returns its subtype flags.
    fn scan_decimal(&mut self, text: &mut String) -> Result<NumFlags> {
        let mut flags = NumFlags::DECIMAL;
        let mut dots = 0u32;

        loop {
            let c = self.cursor.current_char();
            if c.is_ascii_digit() {
                text.push(self.take());
            } else if c == '.' {
                if self.cursor.char_at(1) == '#' {
                    text.push(self.take());
                    return self.scan_float_exception(text);
                }
                dots += 1;
                text.push(self.take());
            } else {
                break;
            }
        }

        if dots > 1 {
            if !self.flags.contains(ScanFlags::ALLOW_IP_ADDRESSES) {
                self.error(Error::Syntax(format!(
                    "IP address '{text}' needs allow_ip_addresses"
                )))?;
            }
            if dots != 3 {
                self.error(Error::Syntax(format!("invalid IP address '{text}'")))?;
            }
            flags |= NumFlags::IP_ADDRESS;
            if self.cursor.current_char() == ':' {
                text.push(self.take());
                if !self.cursor.current_char().is_ascii_digit() {
                    self.error(Error::Syntax(format!("no port after '{text}'")))?;
                }
                while self.cursor.current_char().is_ascii_digit() {
                    text.push(self.take());
                }
                flags |= NumFlags::IP_PORT;
            }
            return Ok(flags);
        }

        let c = self.cursor.current_char();
        if dots == 1 || c == 'e' || c == 'E' {
            flags |= NumFlags::FLOAT;
            if c == 'e' || c == 'E' {
                text.push(self.take());
                if self.cursor.current_char() == '+' || self.cursor.current_char() == '-' {
                    text.push(self.take());
                }
                if !self.cursor.current_char().is_ascii_digit() {
                    self.error(Error::Syntax("no digits in float exponent".into()))?;
                }
                while self.cursor.current_char().is_ascii_digit() {
                    text.push(self.take());
                }
            }
            match self.cursor.current_char() {
                'f' | 'F' => {
                    flags |= NumFlags::SINGLE;
                    self.cursor.advance();
                }
                'l' | 'L' => {
                    flags |= NumFlags::EXTENDED;
                    self.cursor.advance();
                }
                _ => {}
            }
        } else {
            flags |= NumFlags::INTEGER;
        }
        Ok(flags)
    }

    /// Scans the `#WORD` tail of an exceptional float such as `1.#INF`.
    fn scan_float_exception(&mut self, text: &mut String) -> Result<NumFlags> {
        text.push(self.take()); // '#'
        let mut word = String::new();
        while self.cursor.current_char().is_ascii_alphanumeric() {
            word.push(self.take());
        }
        text.push_str(&word);

        let mut flags = NumFlags::DECIMAL | NumFlags::FLOAT;
        match word.as_str() {
            "INF" => flags |= NumFlags::INFINITE,
            "IND" => flags |= NumFlags::INDEFINITE,
            "NAN" | "QNAN" | "SNAN" => flags |= NumFlags::NAN,
            _ => {
                self.error(Error::Syntax(format!("unknown float exception '{text}'")))?;
            }
        }
        if !self.flags.contains(ScanFlags::ALLOW_FLOAT_EXCEPTIONS) {
            self.error(Error::Syntax(format!(
                "float exception '{text}' needs allow_float_exceptions"
            )))?;
        }
        Ok(flags)
    }
}
