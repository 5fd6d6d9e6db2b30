//! Preprocessor driver.
//!
//! Pulls tokens from a stack of scanners (top of stack = active include),
//! dispatches directives, expands macros into the output, and emits a
//! flattened minified token stream.
//!
//! Module layout:
//! - `directive` - `#`/`$` directive dispatch and the conditional stack
//! - `expand` - Macro expansion, stringize/paste, `__VA_ARGS__`
//! - `output` - Minified emission

mod directive;
mod expand;
mod output;

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use bitflags::bitflags;

use crisp_lex::{default_table, Punct, PunctTable, ScanFlags, Scanner, Token, TokenKind};
use crisp_util::{name_hash, Error, FxHashMap, Handler, Report, Result};

use crate::macros::MacroTable;

pub(crate) use output::EmitClass;

/// Nested includes beyond this depth fail; a self-including file would
/// otherwise recurse until the stack dies.
const MAX_INCLUDE_DEPTH: usize = 32;

bitflags! {
    /// Behavior switches for a [`Preprocessor`].
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct PpFlags: u32 {
        /// Count errors without forwarding them to the report sink.
        const NO_ERRORS = 1 << 0;
        /// Count warnings without forwarding them to the report sink.
        const NO_WARNINGS = 1 << 1;
        /// Downgrade errors to reported-and-continue.
        const NO_FATAL_ERRORS = 1 << 2;
        /// Disable the `$eval`/`$evalint`/`$evalfloat` extensions.
        const NO_DOLLAR_PREPROC = 1 << 3;
        /// Disable `#include <...>` against the configured search paths.
        const NO_BASE_INCLUDES = 1 << 4;
        /// Disable `#include` entirely.
        const NO_INCLUDES = 1 << 5;
        /// Warn when `#define` replaces an existing macro.
        const WARN_MACRO_REDEFINITIONS = 1 << 6;
    }
}

/// One level of the include stack.
pub(crate) struct Include {
    pub(crate) scanner: Scanner,
    /// Conditional stack depth when this source was entered; used to
    /// detect a `#if` left open at end of file.
    cond_depth: usize,
}

/// What the token handler wants the pump loop to do next.
pub(crate) enum Flow {
    Continue,
    /// Suspend the current source and continue from this include.
    Push(Include),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CondKind {
    If,
    Ifdef,
    Ifndef,
    Elif,
    Else,
}

/// One frame of the conditional stack.
#[derive(Clone, Copy, Debug)]
pub(crate) struct CondFrame {
    pub(crate) kind: CondKind,
    /// Tokens in this branch are discarded.
    pub(crate) skip_body: bool,
    /// False once any branch of the group has been taken (or the group
    /// sits inside a skipped region); later branches stay suppressed.
    pub(crate) parent_state: bool,
}

/// Raw varargs of one active variadic expansion, plus their expanded
/// forms.
pub(crate) struct VaFrame {
    pub(crate) raw: Vec<Vec<Token>>,
    pub(crate) expanded: Vec<Vec<Token>>,
}

/// Macro-expanding preprocessor over the crisp scanner.
///
/// # Example
///
/// ```
/// use crisp_pp::{Preprocessor, PpFlags};
///
/// let mut pp = Preprocessor::new(PpFlags::empty());
/// let out = pp.process_buffer("#define TWO 2\nTWO plus TWO", "demo").unwrap();
/// assert_eq!(out, "2 plus 2");
/// ```
pub struct Preprocessor {
    flags: PpFlags,
    /// Extra flags applied to every scanner this preprocessor creates.
    scan_flags: ScanFlags,
    handler: Rc<Handler>,
    punct: Arc<PunctTable>,
    pub(crate) macros: MacroTable,

    pub(crate) cond_stack: Vec<CondFrame>,
    /// Count of frames with `skip_body`; tokens are discarded while
    /// positive.
    pub(crate) skipping: u32,

    stack: Vec<Include>,
    search_paths: Vec<PathBuf>,
    scan_counts: FxHashMap<String, u32>,

    pub(crate) out: String,
    pub(crate) column: usize,
    pub(crate) line_hint: usize,
    pub(crate) last_class: EmitClass,

    /// Hashes of macros currently being expanded; reentry is an error.
    pub(crate) expanding: Vec<u32>,
    pub(crate) va_stack: Vec<VaFrame>,

    active: bool,
}

impl Preprocessor {
    pub fn new(flags: PpFlags) -> Self {
        Self {
            flags,
            scan_flags: ScanFlags::empty(),
            handler: Rc::new(Handler::new()),
            punct: default_table(),
            macros: MacroTable::new(),
            cond_stack: Vec::new(),
            skipping: 0,
            stack: Vec::new(),
            search_paths: Vec::new(),
            scan_counts: FxHashMap::default(),
            out: String::new(),
            column: 0,
            line_hint: 128,
            last_class: EmitClass::Start,
            expanding: Vec::new(),
            va_stack: Vec::new(),
            active: false,
        }
    }

    pub fn flags(&self) -> PpFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: PpFlags) {
        self.flags = flags;
    }

    /// Extra scanner behavior (for example
    /// [`ScanFlags::ALLOW_FLOAT_EXCEPTIONS`]) applied to every source
    /// this preprocessor opens.
    pub fn set_scan_flags(&mut self, flags: ScanFlags) {
        self.scan_flags = flags;
    }

    /// Routes diagnostics into `sink` instead of stderr.
    pub fn set_report(&self, sink: Box<dyn Report>) {
        self.handler.set_sink(sink);
    }

    /// The shared diagnostics handler.
    pub fn handler(&self) -> Rc<Handler> {
        self.handler.clone()
    }

    /// Replaces the punctuation table used for every source this
    /// preprocessor opens.
    pub fn set_punct_table(&mut self, table: Arc<PunctTable>) {
        self.punct = table;
    }

    /// Adds a directory searched by `#include <...>`.
    pub fn add_search_path(&mut self, path: impl Into<PathBuf>) {
        self.search_paths.push(path.into());
    }

    /// Output column hint; a newline is inserted after the first `;`
    /// beyond it. Default 128.
    pub fn set_line_hint(&mut self, hint: usize) {
        self.line_hint = hint;
    }

    /// Defines a macro from a `NAME[(params)][=| ]body` string, the
    /// `-D NAME=VALUE` convention.
    pub fn define(&mut self, source: &str) -> Result<()> {
        let line = match source.split_once('=') {
            Some((head, tail)) => format!("{head} {tail}"),
            None => source.to_string(),
        };
        let mut scanner = self.make_buffer_scanner(&line, "<define>", 1);
        self.parse_define(&mut scanner)
    }

    /// Removes a macro definition. Returns `false` when it did not
    /// exist.
    pub fn undefine(&mut self, name: &str) -> bool {
        self.macros.undefine(name)
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.macros.is_defined(name)
    }

    /// Drops every macro definition and restores the built-ins.
    pub fn undefine_all(&mut self) {
        self.macros.undefine_all();
    }

    /// Errors counted so far. Monotonically non-decreasing.
    pub fn error_count(&self) -> usize {
        self.handler.error_count()
    }

    /// Warnings counted so far. Monotonically non-decreasing.
    pub fn warning_count(&self) -> usize {
        self.handler.warning_count()
    }

    /// Preprocesses a file and returns the minified output.
    pub fn process_file(&mut self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let scanner = match Scanner::from_file(path, self.scanner_flags()) {
            Ok(scanner) => scanner
                .with_handler(self.handler.clone())
                .with_punct_table(self.punct.clone()),
            Err(err) => {
                self.handler.error(
                    &format!("could not open '{}': {err}", path.display()),
                    true,
                    !self.flags.contains(PpFlags::NO_ERRORS),
                );
                return Err(err);
            }
        };
        self.process(scanner)
    }

    /// Preprocesses an in-memory buffer and returns the minified output.
    /// The buffer is copied; the caller keeps ownership.
    pub fn process_buffer(&mut self, source: &str, name: &str) -> Result<String> {
        let scanner = self.make_buffer_scanner(source, name, 1);
        self.process(scanner)
    }

    fn make_buffer_scanner(&self, source: &str, name: &str, start_line: u32) -> Scanner {
        Scanner::from_buffer(source, name, self.scanner_flags(), start_line)
            .with_handler(self.handler.clone())
            .with_punct_table(self.punct.clone())
    }

    /// Maps the preprocessor's error controls onto scanner flags.
    fn scanner_flags(&self) -> ScanFlags {
        let mut flags = self.scan_flags;
        if self.flags.contains(PpFlags::NO_ERRORS) {
            flags |= ScanFlags::NO_ERRORS;
        }
        if self.flags.contains(PpFlags::NO_WARNINGS) {
            flags |= ScanFlags::NO_WARNINGS;
        }
        if self.flags.contains(PpFlags::NO_FATAL_ERRORS) {
            flags |= ScanFlags::NO_FATAL_ERRORS;
        }
        flags
    }

    fn process(&mut self, scanner: Scanner) -> Result<String> {
        if self.active {
            let err = Error::State("a source is already being processed".into());
            self.handler.error(
                &err.to_string(),
                true,
                !self.flags.contains(PpFlags::NO_ERRORS),
            );
            return Err(err);
        }
        self.active = true;

        self.out.clear();
        self.column = 0;
        self.last_class = EmitClass::Start;
        self.cond_stack.clear();
        self.skipping = 0;
        self.expanding.clear();
        self.va_stack.clear();
        self.scan_counts.clear();

        self.note_scan(scanner.file_name());
        self.stack.push(Include {
            scanner,
            cond_depth: 0,
        });

        let result = self.run();
        self.stack.clear();
        self.active = false;
        result?;
        Ok(std::mem::take(&mut self.out))
    }

    fn run(&mut self) -> Result<()> {
        while let Some(entry) = self.stack.pop() {
            self.pump(entry)?;
        }
        Ok(())
    }

    /// Drains one source. Returns when it hits end of input or suspends
    /// for an include.
    fn pump(&mut self, mut entry: Include) -> Result<()> {
        loop {
            let token = match entry.scanner.next_token() {
                Ok(token) => token,
                Err(err) => {
                    if self.flags.contains(PpFlags::NO_FATAL_ERRORS) {
                        continue;
                    }
                    return Err(err);
                }
            };
            let Some(token) = token else {
                if self.cond_stack.len() > entry.cond_depth {
                    self.err_at(
                        &entry.scanner,
                        Error::State(format!(
                            "missing #endif in '{}'",
                            entry.scanner.file_name()
                        )),
                    )?;
                    while self.cond_stack.len() > entry.cond_depth {
                        self.pop_cond();
                    }
                }
                return Ok(());
            };

            match self.handle_token(&mut entry, token)? {
                Flow::Continue => {}
                Flow::Push(include) => {
                    self.stack.push(entry);
                    self.stack.push(include);
                    return Ok(());
                }
            }
        }
    }

    fn handle_token(&mut self, entry: &mut Include, token: Token) -> Result<Flow> {
        if token.is_punct(Punct::Hash) {
            return self.directive(entry);
        }
        if self.skipping > 0 {
            return Ok(Flow::Continue);
        }
        if token.is_punct(Punct::Dollar) && !self.flags.contains(PpFlags::NO_DOLLAR_PREPROC) {
            return self.dollar_directive(entry);
        }
        if token.kind() == TokenKind::Identifier
            && self.macros.find(name_hash(token.text())).is_some()
        {
            self.expand_into_output(entry, token)?;
            return Ok(Flow::Continue);
        }
        self.emit_token(&token);
        Ok(Flow::Continue)
    }

    pub(crate) fn push_cond(&mut self, kind: CondKind, skip_body: bool, parent_state: bool) {
        if skip_body {
            self.skipping += 1;
        }
        self.cond_stack.push(CondFrame {
            kind,
            skip_body,
            parent_state,
        });
    }

    pub(crate) fn pop_cond(&mut self) -> Option<CondFrame> {
        let frame = self.cond_stack.pop()?;
        if frame.skip_body {
            self.skipping -= 1;
        }
        Some(frame)
    }

    /// Opens an include file against the candidate paths, first match
    /// wins.
    pub(crate) fn open_include(&mut self, candidates: &[PathBuf]) -> Option<Include> {
        for candidate in candidates {
            if let Ok(scanner) = Scanner::from_file(candidate, self.scanner_flags()) {
                let scanner = scanner
                    .with_handler(self.handler.clone())
                    .with_punct_table(self.punct.clone());
                self.note_scan(scanner.file_name());
                return Some(Include {
                    scanner,
                    cond_depth: self.cond_stack.len(),
                });
            }
        }
        None
    }

    pub(crate) fn include_depth(&self) -> usize {
        self.stack.len() + 1
    }

    pub(crate) fn max_include_depth(&self) -> usize {
        MAX_INCLUDE_DEPTH
    }

    pub(crate) fn search_paths(&self) -> &[PathBuf] {
        self.search_paths.as_slice()
    }

    fn note_scan(&mut self, name: &str) {
        *self.scan_counts.entry(name.to_string()).or_insert(0) += 1;
    }

    /// How many times `name` has been opened during this run; backs
    /// `#pragma once`.
    pub(crate) fn scan_count(&self, name: &str) -> u32 {
        self.scan_counts.get(name).copied().unwrap_or(0)
    }

    /// Reports an error at the scanner's position and, unless errors are
    /// downgraded, hands it back for propagation.
    pub(crate) fn err_at(&self, scanner: &Scanner, err: Error) -> Result<()> {
        let fatal = !self.flags.contains(PpFlags::NO_FATAL_ERRORS);
        self.handler.error(
            &format!("{}:{}: {}", scanner.file_name(), scanner.line(), err),
            fatal,
            !self.flags.contains(PpFlags::NO_ERRORS),
        );
        if fatal {
            Err(err)
        } else {
            Ok(())
        }
    }

    /// Reports a warning at the scanner's position.
    pub(crate) fn warn_at(&self, scanner: &Scanner, message: &str) {
        self.handler.warning(
            &format!("{}:{}: {}", scanner.file_name(), scanner.line(), message),
            !self.flags.contains(PpFlags::NO_WARNINGS),
        );
    }

    pub(crate) fn warn_redefinitions(&self) -> bool {
        self.flags.contains(PpFlags::WARN_MACRO_REDEFINITIONS)
    }

    pub(crate) fn pp_flags(&self) -> PpFlags {
        self.flags
    }

    pub(crate) fn punct_table(&self) -> Arc<PunctTable> {
        self.punct.clone()
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new(PpFlags::empty())
    }
}
