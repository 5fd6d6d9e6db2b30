//! Core scanner implementation.
//!
//! This module contains the Scanner struct, its flags, and the token
//! dispatch loop.

use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use bitflags::bitflags;
use crisp_util::{Error, Handler, Result};

use crate::cursor::Cursor;
use crate::punct::{default_table, PunctTable};
use crate::token::Token;

bitflags! {
    /// Behavior switches for a [`Scanner`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ScanFlags: u32 {
        /// Count errors without forwarding them to the report sink.
        const NO_ERRORS = 1 << 0;
        /// Count warnings without forwarding them to the report sink.
        const NO_WARNINGS = 1 << 1;
        /// Downgrade errors to reported-and-continue.
        const NO_FATAL_ERRORS = 1 << 2;
        /// Do not concatenate adjacent same-quote strings.
        const NO_STRING_CONCAT = 1 << 3;
        /// Treat `\` inside strings as an ordinary character.
        const NO_STRING_ESCAPES = 1 << 4;
        /// Let identifiers contain `/`, `\`, `:`, and `.`.
        const ALLOW_PATH_NAMES = 1 << 5;
        /// Let a number continue into an identifier (`16bit`).
        const ALLOW_NUMBER_NAMES = 1 << 6;
        /// Recognize `a.b.c.d[:port]` IPv4 tokens.
        const ALLOW_IP_ADDRESSES = 1 << 7;
        /// Recognize `1.#INF`-style exceptional floats.
        const ALLOW_FLOAT_EXCEPTIONS = 1 << 8;
        /// Permit character literals longer than one character.
        const ALLOW_MULTI_CHAR_LITERALS = 1 << 9;
        /// With [`ScanFlags::NO_STRING_CONCAT`], still concatenate strings
        /// joined by a `\` continuation.
        const ALLOW_BACKSLASH_STRING_CONCAT = 1 << 10;
        /// Treat every whitespace-delimited run as one string token.
        const ONLY_STRINGS = 1 << 11;
    }
}

/// Lexical scanner for C-like source.
///
/// Consumes a character buffer and produces [`Token`]s on demand,
/// skipping comments and whitespace and supporting one token of
/// pushback. The buffer is shared (`Rc<str>`), so a scanner can sit on
/// an include stack without lifetime plumbing.
pub struct Scanner {
    /// Character cursor over the shared source buffer.
    pub(super) cursor: Cursor,

    /// Name used in diagnostics; the path for file-backed scanners.
    name: String,

    /// Behavior switches.
    pub(super) flags: ScanFlags,

    /// Active punctuation table.
    pub(super) punct: Arc<PunctTable>,

    /// Shared diagnostics handler.
    handler: Rc<Handler>,

    /// Single pushback slot.
    pub(super) pushback: Option<Token>,

    /// Position/line snapshot taken before the most recent scan.
    pub(super) last_pos: usize,
    pub(super) last_line: u32,

    /// Span of the whitespace and comments skipped before the most
    /// recent token.
    pub(super) ws_start: usize,
    pub(super) ws_end: usize,

    /// Line the buffer starts on; `reset` rewinds here.
    start_line: u32,
}

impl Scanner {
    /// Opens `path` and scans its contents.
    ///
    /// The whole file is read into memory up front; scanning itself never
    /// touches the filesystem.
    pub fn from_file(path: impl AsRef<Path>, flags: ScanFlags) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_parts(
            Rc::from(contents.as_str()),
            path.display().to_string(),
            flags,
            1,
        ))
    }

    /// Scans an external buffer. The buffer is copied into shared
    /// storage; the caller keeps ownership of `source`.
    pub fn from_buffer(source: &str, name: &str, flags: ScanFlags, start_line: u32) -> Self {
        Self::from_parts(Rc::from(source), name.to_string(), flags, start_line)
    }

    fn from_parts(source: Rc<str>, name: String, flags: ScanFlags, start_line: u32) -> Self {
        let start_line = start_line.max(1);
        Self {
            cursor: Cursor::new(source, start_line),
            name,
            flags,
            punct: default_table(),
            handler: Rc::new(Handler::new()),
            pushback: None,
            last_pos: 0,
            last_line: start_line,
            ws_start: 0,
            ws_end: 0,
            start_line,
        }
    }

    /// Shares `handler` for diagnostics instead of a private one.
    pub fn with_handler(mut self, handler: Rc<Handler>) -> Self {
        self.handler = handler;
        self
    }

    /// Replaces the punctuation table for this scanner only.
    pub fn with_punct_table(mut self, table: Arc<PunctTable>) -> Self {
        self.punct = table;
        self
    }

    /// Returns the next classified token, or `None` at end of input.
    ///
    /// A pending pushback token is returned first. Errors are reported
    /// through the handler and returned; the cursor has advanced past the
    /// offending text, so scanning can resume with another call.
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(token) = self.pushback.take() {
            return Ok(Some(token));
        }

        self.last_pos = self.cursor.position();
        self.last_line = self.cursor.line();

        let line_before = self.cursor.line();
        self.skip_whitespace_and_comments()?;
        if self.cursor.is_at_end() {
            return Ok(None);
        }
        let line = self.cursor.line();
        let crossed = line - line_before;

        let mut token = if self.flags.contains(ScanFlags::ONLY_STRINGS) {
            self.scan_string_run()?
        } else {
            let c = self.cursor.current_char();
            let next = self.cursor.char_at(1);
            if c == '"' || c == '\'' {
                self.scan_string(c)?
            } else if c.is_ascii_digit() || (c == '.' && next.is_ascii_digit()) {
                self.scan_number()?
            } else if c.is_ascii_alphabetic() || c == '_' {
                self.scan_identifier()?
            } else if (c == '/' || c == '\\' || c == '.')
                && self.flags.contains(ScanFlags::ALLOW_PATH_NAMES)
            {
                self.scan_identifier()?
            } else {
                self.scan_punctuation()?
            }
        };

        token.set_position(line, crossed);
        Ok(Some(token))
    }

    /// Rewinds to the buffer origin, dropping any pushback token.
    pub fn reset(&mut self) {
        self.cursor.seek(0, self.start_line);
        self.pushback = None;
        self.last_pos = 0;
        self.last_line = self.start_line;
        self.ws_start = 0;
        self.ws_end = 0;
    }

    /// Releases the buffer; the scanner is empty afterwards.
    pub fn clear(&mut self) {
        self.cursor = Cursor::new(Rc::from(""), 1);
        self.pushback = None;
        self.last_pos = 0;
        self.last_line = 1;
        self.ws_start = 0;
        self.ws_end = 0;
    }

    /// Name used in diagnostics.
    pub fn file_name(&self) -> &str {
        &self.name
    }

    pub fn set_file_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Current line number.
    pub fn line(&self) -> u32 {
        self.cursor.line()
    }

    /// Overrides the current line number (`#line` support).
    pub fn set_line(&mut self, line: u32) {
        self.cursor.set_line(line);
    }

    /// Byte offset from the buffer origin.
    pub fn offset(&self) -> usize {
        self.cursor.position()
    }

    /// Unscanned remainder of the buffer.
    pub fn remaining(&self) -> &str {
        self.cursor.remaining()
    }

    pub fn flags(&self) -> ScanFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: ScanFlags) {
        self.flags = flags;
    }

    /// True when whitespace or a comment preceded the most recent token.
    pub fn had_leading_whitespace(&self) -> bool {
        self.ws_end > self.ws_start
    }

    /// Skips to end of input; the next call to `next_token` returns
    /// `None`.
    pub fn skip_to_end(&mut self) {
        let line = self.cursor.line();
        self.cursor.seek(self.cursor.source().len(), line);
        self.pushback = None;
    }

    /// The shared diagnostics handler.
    pub fn handler(&self) -> Rc<Handler> {
        self.handler.clone()
    }

    /// The active punctuation table.
    pub fn punct_table(&self) -> Arc<PunctTable> {
        self.punct.clone()
    }

    /// Errors counted by the shared handler.
    pub fn error_count(&self) -> usize {
        self.handler.error_count()
    }

    /// Warnings counted by the shared handler.
    pub fn warning_count(&self) -> usize {
        self.handler.warning_count()
    }

    /// Consumes and returns the current character.
    pub(super) fn take(&mut self) -> char {
        let c = self.cursor.current_char();
        self.cursor.advance();
        c
    }

    /// Reports `err` and, unless errors are downgraded, hands it back for
    /// propagation. Callers that can keep scanning use `self.error(..)?`.
    pub(super) fn error(&self, err: Error) -> Result<()> {
        let fatal = !self.flags.contains(ScanFlags::NO_FATAL_ERRORS);
        self.handler.error(
            &format!("{}:{}: {}", self.name, self.cursor.line(), err),
            fatal,
            !self.flags.contains(ScanFlags::NO_ERRORS),
        );
        if fatal {
            Err(err)
        } else {
            Ok(())
        }
    }

    /// Reports `err` and returns it for paths that cannot continue.
    pub(super) fn fail(&self, err: Error) -> Error {
        let fatal = !self.flags.contains(ScanFlags::NO_FATAL_ERRORS);
        self.handler.error(
            &format!("{}:{}: {}", self.name, self.cursor.line(), err),
            fatal,
            !self.flags.contains(ScanFlags::NO_ERRORS),
        );
        err
    }

    /// Reports a warning through the shared handler.
    pub(super) fn warning(&self, message: &str) {
        self.handler.warning(
            &format!("{}:{}: {}", self.name, self.cursor.line(), message),
            !self.flags.contains(ScanFlags::NO_WARNINGS),
        );
    }
}

impl Iterator for Scanner {
    type Item = Result<Token>;

    /// Yields tokens until end of input. Errors are yielded in place; the
    /// iterator stays usable afterwards.
    fn next(&mut self) -> Option<Self::Item> {
        match self.next_token() {
            Ok(Some(token)) => Some(Ok(token)),
            Ok(None) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
