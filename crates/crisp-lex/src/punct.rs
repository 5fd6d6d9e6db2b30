//! Punctuation variants and the longest-match lookup table.
//!
//! The scanner matches punctuation by walking a per-character chain of
//! candidate variants ordered longest-first, so `>>=` always wins over
//! `>>` and `>` when all three could match.

use std::sync::{Arc, OnceLock};

use crisp_util::{Error, Result};

/// Punctuation variant identifiers.
///
/// The numbering matches the default table below; `None` is the sentinel
/// for "not a punctuation".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Punct {
    None = 0,
    ShrAssign,
    ShlAssign,
    Ellipsis,
    LogicAnd,
    LogicOr,
    GreaterEq,
    LessEq,
    EqEq,
    NotEq,
    MulAssign,
    DivAssign,
    ModAssign,
    AddAssign,
    SubAssign,
    Inc,
    Dec,
    AndAssign,
    OrAssign,
    XorAssign,
    Shr,
    Shl,
    Arrow,
    Scope,
    MemberPtr,
    HashHash,
    Mul,
    Div,
    Mod,
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Dot,
    Comma,
    Semicolon,
    Less,
    Greater,
    Assign,
    Add,
    Sub,
    BitAnd,
    BitOr,
    BitXor,
    LogicNot,
    BitNot,
    Question,
    Colon,
    Hash,
    Dollar,
    Backslash,
}

/// The default C/C++ punctuation set (52 entries).
///
/// Definition order breaks length ties within a character bucket; the
/// table build sorts each bucket longest-first regardless of the order
/// here.
pub const DEFAULT_PUNCT: &[(&str, Punct)] = &[
    (">>=", Punct::ShrAssign),
    ("<<=", Punct::ShlAssign),
    ("...", Punct::Ellipsis),
    ("&&", Punct::LogicAnd),
    ("||", Punct::LogicOr),
    (">=", Punct::GreaterEq),
    ("<=", Punct::LessEq),
    ("==", Punct::EqEq),
    ("!=", Punct::NotEq),
    ("*=", Punct::MulAssign),
    ("/=", Punct::DivAssign),
    ("%=", Punct::ModAssign),
    ("+=", Punct::AddAssign),
    ("-=", Punct::SubAssign),
    ("++", Punct::Inc),
    ("--", Punct::Dec),
    ("&=", Punct::AndAssign),
    ("|=", Punct::OrAssign),
    ("^=", Punct::XorAssign),
    (">>", Punct::Shr),
    ("<<", Punct::Shl),
    ("->", Punct::Arrow),
    ("::", Punct::Scope),
    (".*", Punct::MemberPtr),
    ("##", Punct::HashHash),
    ("*", Punct::Mul),
    ("/", Punct::Div),
    ("%", Punct::Mod),
    ("(", Punct::OpenParen),
    (")", Punct::CloseParen),
    ("{", Punct::OpenBrace),
    ("}", Punct::CloseBrace),
    ("[", Punct::OpenBracket),
    ("]", Punct::CloseBracket),
    (".", Punct::Dot),
    (",", Punct::Comma),
    (";", Punct::Semicolon),
    ("<", Punct::Less),
    (">", Punct::Greater),
    ("=", Punct::Assign),
    ("+", Punct::Add),
    ("-", Punct::Sub),
    ("&", Punct::BitAnd),
    ("|", Punct::BitOr),
    ("^", Punct::BitXor),
    ("!", Punct::LogicNot),
    ("~", Punct::BitNot),
    ("?", Punct::Question),
    (":", Punct::Colon),
    ("#", Punct::Hash),
    ("$", Punct::Dollar),
    ("\\", Punct::Backslash),
];

/// Longest-match punctuation lookup table.
///
/// Built from an ordered `(text, variant)` array. For each ASCII first
/// character the table holds the head of a chain of candidate entries in
/// strictly decreasing length order; the scanner takes the first entry
/// whose text is a prefix of the remaining input.
pub struct PunctTable {
    entries: Vec<(Box<str>, Punct)>,
    /// Head-of-chain entry index per first byte, or -1.
    head: [i16; 256],
    /// Next entry in the same chain, or -1. Parallel to `entries`.
    next: Vec<i16>,
}

impl PunctTable {
    /// Builds a lookup table from `(text, variant)` pairs.
    ///
    /// Fails only on malformed input: an empty text for a variant other
    /// than [`Punct::None`].
    pub fn new(set: &[(&str, Punct)]) -> Result<Self> {
        let mut table = Self {
            entries: Vec::with_capacity(set.len()),
            head: [-1; 256],
            next: vec![-1; set.len()],
        };

        for &(text, id) in set {
            if text.is_empty() {
                return Err(Error::State(format!(
                    "empty punctuation text for variant {id:?}"
                )));
            }
            table.entries.push((text.into(), id));
        }

        for index in 0..table.entries.len() {
            table.link(index);
        }
        Ok(table)
    }

    /// Inserts entry `index` into the chain for its first byte, before the
    /// first shorter entry or at the tail.
    fn link(&mut self, index: usize) {
        let first = self.entries[index].0.as_bytes()[0] as usize;
        let len = self.entries[index].0.len();

        let mut prev: i16 = -1;
        let mut cur = self.head[first];
        while cur >= 0 && self.entries[cur as usize].0.len() >= len {
            prev = cur;
            cur = self.next[cur as usize];
        }

        self.next[index] = cur;
        if prev < 0 {
            self.head[first] = index as i16;
        } else {
            self.next[prev as usize] = index as i16;
        }
    }

    /// Iterates the candidate entries whose text starts with `first`, in
    /// decreasing length order.
    pub fn candidates(&self, first: u8) -> Candidates<'_> {
        Candidates {
            table: self,
            cur: self.head[first as usize],
        }
    }

    /// Returns the text of a variant, or `None` if the variant is not in
    /// this table.
    pub fn text_of(&self, id: Punct) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, entry)| *entry == id)
            .map(|(text, _)| text.as_ref())
    }
}

/// Iterator over one first-character chain of a [`PunctTable`].
pub struct Candidates<'a> {
    table: &'a PunctTable,
    cur: i16,
}

impl<'a> Iterator for Candidates<'a> {
    type Item = (&'a str, Punct);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cur < 0 {
            return None;
        }
        let (text, id) = &self.table.entries[self.cur as usize];
        self.cur = self.table.next[self.cur as usize];
        Some((text.as_ref(), *id))
    }
}

/// Returns the shared table for [`DEFAULT_PUNCT`].
///
/// Built once per process; scanners clone the `Arc`, so replacing a
/// scanner's table never affects other instances.
pub fn default_table() -> Arc<PunctTable> {
    static TABLE: OnceLock<Arc<PunctTable>> = OnceLock::new();
    TABLE
        .get_or_init(|| {
            let table = PunctTable::new(DEFAULT_PUNCT)
                .expect("default punctuation set is well-formed");
            Arc::new(table)
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_size() {
        assert_eq!(DEFAULT_PUNCT.len(), 52);
    }

    #[test]
    fn test_chain_is_longest_first() {
        let table = PunctTable::new(DEFAULT_PUNCT).unwrap();
        let lens: Vec<usize> = table.candidates(b'>').map(|(t, _)| t.len()).collect();
        let mut sorted = lens.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(lens, sorted);
        assert_eq!(table.candidates(b'>').next().unwrap().0, ">>=");
    }

    #[test]
    fn test_all_variants_reachable() {
        let table = PunctTable::new(DEFAULT_PUNCT).unwrap();
        for &(text, id) in DEFAULT_PUNCT {
            let found = table
                .candidates(text.as_bytes()[0])
                .any(|(t, entry)| t == text && entry == id);
            assert!(found, "variant {id:?} not reachable from its chain");
        }
    }

    #[test]
    fn test_tie_break_by_definition_order() {
        // Two distinct two-character entries on the same bucket keep
        // their definition order.
        let set = [("<=", Punct::LessEq), ("<<", Punct::Shl), ("<", Punct::Less)];
        let table = PunctTable::new(&set).unwrap();
        let chain: Vec<&str> = table.candidates(b'<').map(|(t, _)| t).collect();
        assert_eq!(chain, vec!["<=", "<<", "<"]);
    }

    #[test]
    fn test_empty_text_rejected() {
        let set = [("", Punct::Dot)];
        assert!(PunctTable::new(&set).is_err());
    }

    #[test]
    fn test_unused_bucket_is_empty() {
        let table = PunctTable::new(DEFAULT_PUNCT).unwrap();
        assert!(table.candidates(b'a').next().is_none());
    }

    #[test]
    fn test_text_of() {
        let table = PunctTable::new(DEFAULT_PUNCT).unwrap();
        assert_eq!(table.text_of(Punct::ShrAssign), Some(">>="));
        assert_eq!(table.text_of(Punct::None), None);
    }
}
