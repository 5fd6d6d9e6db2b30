//! Scanning helpers layered above the sub-scanners.
//!
//! `peek_*` and `check_*` rewind on a miss through the pushback slot;
//! `expect_*` report a descriptive error on mismatch. Line-oriented and
//! bracket-oriented helpers support the preprocessor's directive parsing.

use crisp_util::{Error, Result};

use crate::punct::Punct;
use crate::scanner::Scanner;
use crate::token::{Token, TokenKind};

impl Scanner {
    /// Pushes back one token so the next [`Scanner::next_token`] returns
    /// it. A second pushback warns and overwrites the first.
    pub fn unread(&mut self, token: Token) {
        if self.pushback.is_some() {
            self.warning("pushback token overwritten");
        }
        self.pushback = Some(token);
    }

    /// Returns the next token without consuming it.
    pub fn peek_token(&mut self) -> Result<Option<Token>> {
        match self.next_token()? {
            Some(token) => {
                self.unread(token.clone());
                Ok(Some(token))
            }
            None => Ok(None),
        }
    }

    /// Consumes the next token if its text equals `text`; rewinds
    /// otherwise.
    pub fn check_token(&mut self, text: &str) -> Result<bool> {
        match self.next_token()? {
            Some(token) if token.text() == text => Ok(true),
            Some(token) => {
                self.unread(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Consumes the next token if it is the punctuation `id`; rewinds
    /// otherwise.
    pub fn check_punct(&mut self, id: Punct) -> Result<bool> {
        match self.next_token()? {
            Some(token) if token.is_punct(id) => Ok(true),
            Some(token) => {
                self.unread(token);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    /// Reads the next token, requiring its text to equal `text`.
    pub fn expect_token(&mut self, text: &str) -> Result<Token> {
        match self.next_token()? {
            Some(token) => {
                if token.text() != text {
                    self.error(Error::Grammar(format!(
                        "expected '{text}', found '{}'",
                        token.text()
                    )))?;
                }
                Ok(token)
            }
            None => Err(self.fail(Error::Grammar(format!(
                "unexpected end of input, expected '{text}'"
            )))),
        }
    }

    /// Reads the next token, requiring the punctuation `id`.
    pub fn expect_punct(&mut self, id: Punct) -> Result<Token> {
        let want = self
            .punct
            .text_of(id)
            .unwrap_or("<punctuation>")
            .to_string();
        match self.next_token()? {
            Some(token) => {
                if !token.is_punct(id) {
                    self.error(Error::Grammar(format!(
                        "expected '{want}', found '{}'",
                        token.text()
                    )))?;
                }
                Ok(token)
            }
            None => Err(self.fail(Error::Grammar(format!(
                "unexpected end of input, expected '{want}'"
            )))),
        }
    }

    /// Reads the next token, requiring an identifier.
    pub fn expect_identifier(&mut self) -> Result<Token> {
        match self.next_token()? {
            Some(token) => {
                if token.kind() != TokenKind::Identifier {
                    self.error(Error::Grammar(format!(
                        "expected an identifier, found '{}'",
                        token.text()
                    )))?;
                }
                Ok(token)
            }
            None => Err(self.fail(Error::Grammar(
                "unexpected end of input, expected an identifier".into(),
            ))),
        }
    }

    /// Reads the next token, requiring a number.
    pub fn expect_number(&mut self) -> Result<Token> {
        match self.next_token()? {
            Some(token) => {
                if token.kind() != TokenKind::Number {
                    self.error(Error::Grammar(format!(
                        "expected a number, found '{}'",
                        token.text()
                    )))?;
                }
                Ok(token)
            }
            None => Err(self.fail(Error::Grammar(
                "unexpected end of input, expected a number".into(),
            ))),
        }
    }

    /// Returns the next token only if it is on the current line; rewinds
    /// and returns `None` when the next token crossed a newline.
    pub fn next_token_on_line(&mut self) -> Result<Option<Token>> {
        match self.next_token()? {
            Some(token) => {
                if token.lines_crossed() == 0 {
                    Ok(Some(token))
                } else {
                    self.unread(token);
                    Ok(None)
                }
            }
            None => Ok(None),
        }
    }

    /// Captures the raw remainder of the current line, trimmed, and
    /// leaves the cursor at the newline.
    pub fn parse_rest_of_line(&mut self) -> Result<String> {
        let mut text = String::new();
        if let Some(token) = self.pushback.take() {
            if token.lines_crossed() > 0 {
                self.pushback = Some(token);
                return Ok(text);
            }
            text.push_str(token.text());
        }
        while !self.cursor.is_at_end() && self.cursor.current_char() != '\n' {
            text.push(self.take());
        }
        Ok(text.trim().to_string())
    }

    /// Discards the remainder of the current line.
    pub fn skip_rest_of_line(&mut self) -> Result<()> {
        self.parse_rest_of_line().map(|_| ())
    }

    /// Skips a `{ }` section, tracking nesting depth.
    ///
    /// With `parse_first_brace`, the opening brace is read (and required)
    /// first; otherwise the scanner is assumed to be inside the section
    /// already.
    pub fn skip_bracketed_section(&mut self, parse_first_brace: bool) -> Result<()> {
        if parse_first_brace {
            self.expect_punct(Punct::OpenBrace)?;
        }
        let mut depth = 1u32;
        while depth > 0 {
            match self.next_token()? {
                Some(token) => match token.punct() {
                    Punct::OpenBrace => depth += 1,
                    Punct::CloseBrace => depth -= 1,
                    _ => {}
                },
                None => {
                    return Err(self.fail(Error::Grammar(
                        "unexpected end of input inside { } section".into(),
                    )))
                }
            }
        }
        Ok(())
    }

    /// Captures a `{ }` section as raw source text, preserving interior
    /// indentation. The returned text excludes the braces.
    pub fn scan_bracketed_section_exact(&mut self) -> Result<String> {
        self.expect_punct(Punct::OpenBrace)?;
        let start = self.cursor.position();
        let mut depth = 1u32;
        while depth > 0 {
            match self.next_token()? {
                Some(token) => match token.punct() {
                    Punct::OpenBrace => depth += 1,
                    Punct::CloseBrace => depth -= 1,
                    _ => {}
                },
                None => {
                    return Err(self.fail(Error::Grammar(
                        "unexpected end of input inside { } section".into(),
                    )))
                }
            }
        }
        // `last_pos` still points before the closing brace's leading
        // whitespace; the slice ends exactly at the section body.
        let end = self.last_pos.max(start);
        Ok(self.cursor.source()[start..end].to_string())
    }

    /// Scans `open v0 [,] v1 .. [,] close` into `out`. A trailing comma
    /// before the close is accepted.
    pub fn scan_matrix1d(
        &mut self,
        x: usize,
        out: &mut [f64],
        open: Punct,
        close: Punct,
        comma_sep: bool,
    ) -> Result<()> {
        if out.len() < x {
            return Err(self.fail(Error::State(format!(
                "matrix output holds {} values, need {x}",
                out.len()
            ))));
        }
        self.expect_punct(open)?;
        for (i, slot) in out.iter_mut().take(x).enumerate() {
            let token = self.expect_number()?;
            *slot = token.as_double();
            if comma_sep && !self.check_punct(Punct::Comma)? && i + 1 < x {
                return Err(self.fail(Error::Grammar("expected ',' between values".into())));
            }
        }
        self.expect_punct(close)?;
        Ok(())
    }

    /// Scans `y` rows of `x` values.
    pub fn scan_matrix2d(
        &mut self,
        y: usize,
        x: usize,
        out: &mut [f64],
        open: Punct,
        close: Punct,
        comma_sep: bool,
    ) -> Result<()> {
        if out.len() < y * x {
            return Err(self.fail(Error::State(format!(
                "matrix output holds {} values, need {}",
                out.len(),
                y * x
            ))));
        }
        self.expect_punct(open)?;
        for row in 0..y {
            self.scan_matrix1d(x, &mut out[row * x..(row + 1) * x], open, close, comma_sep)?;
            if comma_sep && !self.check_punct(Punct::Comma)? && row + 1 < y {
                return Err(self.fail(Error::Grammar("expected ',' between rows".into())));
            }
        }
        self.expect_punct(close)?;
        Ok(())
    }

    /// Scans `z` planes of `y` rows of `x` values.
    pub fn scan_matrix3d(
        &mut self,
        z: usize,
        y: usize,
        x: usize,
        out: &mut [f64],
        open: Punct,
        close: Punct,
        comma_sep: bool,
    ) -> Result<()> {
        if out.len() < z * y * x {
            return Err(self.fail(Error::State(format!(
                "matrix output holds {} values, need {}",
                out.len(),
                z * y * x
            ))));
        }
        self.expect_punct(open)?;
        for plane in 0..z {
            self.scan_matrix2d(
                y,
                x,
                &mut out[plane * y * x..(plane + 1) * y * x],
                open,
                close,
                comma_sep,
            )?;
            if comma_sep && !self.check_punct(Punct::Comma)? && plane + 1 < z {
                return Err(self.fail(Error::Grammar("expected ',' between planes".into())));
            }
        }
        self.expect_punct(close)?;
        Ok(())
    }
}
