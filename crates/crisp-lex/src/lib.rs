//! crisp-lex - Lexical scanner for C-like source.
//!
//! The scanner consumes a character buffer and produces classified
//! [`Token`]s: numbers (binary/octal/decimal/hex, floats with exceptional
//! values, IPv4 addresses), strings and character literals with escape
//! sequences and cross-quote concatenation, identifiers (including
//! path-name and number-led variants), and a configurable longest-match
//! punctuation set.
//!
//! Module layout:
//! - `punct` - Punctuation variants and the longest-first lookup table
//! - `token` - Token categories, subtype flags, and lazy numeric values
//! - `cursor` - Character cursor over a shared source buffer
//! - `scanner` - The scanner itself, split into focused sub-scanners

mod cursor;
mod edge_cases;
mod punct;
mod scanner;
mod token;

pub use cursor::Cursor;
pub use punct::{default_table, Punct, PunctTable, DEFAULT_PUNCT};
pub use scanner::{ScanFlags, Scanner};
pub use token::{NumFlags, Token, TokenKind};
