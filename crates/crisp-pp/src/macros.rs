//! Macro records and the append-only token pool.
//!
//! Parameter and body tokens for every macro live in one shared vector;
//! a macro references `[first, count)` slices into it. Indices stay
//! stable because the pool only ever appends. Undefining or redefining a
//! macro tombstones its slices in place; the pool is never compacted.

use std::hash::BuildHasherDefault;

use crisp_lex::Token;
use crisp_util::{name_hash, FxHasher};
use indexmap::IndexMap;

type MacroMap = IndexMap<u32, Macro, BuildHasherDefault<FxHasher>>;

/// Built-in macro identities.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Builtin {
    /// `__FILE__` - quoted current file name.
    File,
    /// `__LINE__` - decimal current line number.
    Line,
    /// `__DATE__` - quoted build date.
    Date,
    /// `__TIME__` - quoted build time.
    Time,
    /// `__VA_ARGS__` - the enclosing variadic expansion's extra
    /// arguments.
    VaArgs,
}

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Builtin::File => "__FILE__",
            Builtin::Line => "__LINE__",
            Builtin::Date => "__DATE__",
            Builtin::Time => "__TIME__",
            Builtin::VaArgs => "__VA_ARGS__",
        }
    }

    const ALL: [Builtin; 5] = [
        Builtin::File,
        Builtin::Line,
        Builtin::Date,
        Builtin::Time,
        Builtin::VaArgs,
    ];
}

/// One macro definition.
#[derive(Clone, Debug)]
pub struct Macro {
    pub name: String,
    pub hash: u32,
    /// `[first, count)` slice of parameter tokens in the pool.
    params: (u32, u32),
    /// `[first, count)` slice of body tokens in the pool.
    body: (u32, u32),
    /// Declared as `NAME()`: function-like with zero parameters.
    pub empty_call: bool,
    /// Parameter list ends in `...`.
    pub variadic: bool,
    /// Set for the built-in macros.
    pub builtin: Option<Builtin>,
}

impl Macro {
    /// Function-like macros require `(...)` at the call site.
    pub fn is_function_like(&self) -> bool {
        self.params.1 > 0 || self.empty_call || self.variadic
    }

    pub fn param_count(&self) -> usize {
        self.params.1 as usize
    }
}

/// Storage for macro definitions, keyed by the published name hash.
pub struct MacroTable {
    defs: MacroMap,
    pool: Vec<Token>,
}

impl MacroTable {
    /// Creates a table seeded with the built-in macros.
    pub fn new() -> Self {
        let mut table = Self {
            defs: MacroMap::default(),
            pool: Vec::new(),
        };
        table.seed_builtins();
        table
    }

    fn seed_builtins(&mut self) {
        for builtin in Builtin::ALL {
            let hash = name_hash(builtin.name());
            self.defs.insert(
                hash,
                Macro {
                    name: builtin.name().to_string(),
                    hash,
                    params: (0, 0),
                    body: (0, 0),
                    empty_call: false,
                    variadic: false,
                    builtin: Some(builtin),
                },
            );
        }
    }

    /// Looks a macro up by precomputed hash.
    pub fn find(&self, hash: u32) -> Option<&Macro> {
        self.defs.get(&hash)
    }

    /// Looks a macro up by name.
    pub fn find_name(&self, name: &str) -> Option<&Macro> {
        self.find(name_hash(name))
    }

    pub fn is_defined(&self, name: &str) -> bool {
        self.defs.contains_key(&name_hash(name))
    }

    /// Number of definitions, built-ins included.
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    /// Defines or replaces a macro. Returns `true` when an earlier
    /// definition was replaced.
    pub fn define(
        &mut self,
        name: &str,
        params: Vec<Token>,
        body: Vec<Token>,
        empty_call: bool,
        variadic: bool,
    ) -> bool {
        let hash = name_hash(name);
        let replaced = match self.defs.shift_remove(&hash) {
            Some(old) => {
                self.tombstone(old.params);
                self.tombstone(old.body);
                true
            }
            None => false,
        };

        let params = self.append(params);
        let body = self.append(body);
        self.defs.insert(
            hash,
            Macro {
                name: name.to_string(),
                hash,
                params,
                body,
                empty_call,
                variadic,
                builtin: None,
            },
        );
        replaced
    }

    /// Removes a macro, tombstoning its pool slices. Returns `false`
    /// when no such macro exists.
    pub fn undefine(&mut self, name: &str) -> bool {
        match self.defs.shift_remove(&name_hash(name)) {
            Some(old) => {
                self.tombstone(old.params);
                self.tombstone(old.body);
                true
            }
            None => false,
        }
    }

    /// Drops every definition and restores the built-ins.
    pub fn undefine_all(&mut self) {
        self.defs.clear();
        self.pool.clear();
        self.seed_builtins();
    }

    /// Parameter tokens of `mac`.
    pub fn params(&self, mac: &Macro) -> &[Token] {
        let (first, count) = mac.params;
        &self.pool[first as usize..(first + count) as usize]
    }

    /// Body tokens of `mac`.
    pub fn body(&self, mac: &Macro) -> &[Token] {
        let (first, count) = mac.body;
        &self.pool[first as usize..(first + count) as usize]
    }

    fn append(&mut self, tokens: Vec<Token>) -> (u32, u32) {
        let first = self.pool.len() as u32;
        let count = tokens.len() as u32;
        self.pool.extend(tokens);
        (first, count)
    }

    fn tombstone(&mut self, (first, count): (u32, u32)) {
        for slot in &mut self.pool[first as usize..(first + count) as usize] {
            *slot = Token::default();
        }
    }
}

impl Default for MacroTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisp_lex::{NumFlags, TokenKind};

    fn body_token(text: &str) -> Token {
        Token::new(
            TokenKind::Number,
            text,
            NumFlags::DECIMAL | NumFlags::INTEGER | NumFlags::SIGNED,
        )
    }

    #[test]
    fn test_builtins_are_seeded() {
        let table = MacroTable::new();
        assert!(table.is_defined("__FILE__"));
        assert!(table.is_defined("__LINE__"));
        assert!(table.is_defined("__DATE__"));
        assert!(table.is_defined("__TIME__"));
        assert!(table.is_defined("__VA_ARGS__"));
    }

    #[test]
    fn test_define_and_find() {
        let mut table = MacroTable::new();
        table.define("ANSWER", Vec::new(), vec![body_token("42")], false, false);

        let mac = table.find_name("ANSWER").unwrap();
        assert_eq!(mac.name, "ANSWER");
        assert!(!mac.is_function_like());
        assert_eq!(table.body(mac)[0].text(), "42");
    }

    #[test]
    fn test_find_by_precomputed_hash() {
        let mut table = MacroTable::new();
        table.define("X", Vec::new(), vec![body_token("1")], false, false);
        assert!(table.find(name_hash("X")).is_some());
    }

    #[test]
    fn test_redefinition_replaces() {
        let mut table = MacroTable::new();
        assert!(!table.define("X", Vec::new(), vec![body_token("1")], false, false));
        assert!(table.define("X", Vec::new(), vec![body_token("2")], false, false));

        let mac = table.find_name("X").unwrap();
        assert_eq!(table.body(mac)[0].text(), "2");
    }

    #[test]
    fn test_undefine_leaves_pool_in_place() {
        let mut table = MacroTable::new();
        table.define("X", Vec::new(), vec![body_token("1")], false, false);
        let pool_len = table.pool.len();

        assert!(table.undefine("X"));
        assert!(!table.is_defined("X"));
        // Tombstoned, not compacted.
        assert_eq!(table.pool.len(), pool_len);
        assert!(!table.undefine("X"));
    }

    #[test]
    fn test_undefining_builtin_removes_it() {
        let mut table = MacroTable::new();
        assert!(table.undefine("__LINE__"));
        assert!(!table.is_defined("__LINE__"));
    }

    #[test]
    fn test_undefine_all_restores_builtins() {
        let mut table = MacroTable::new();
        table.define("X", Vec::new(), vec![body_token("1")], false, false);
        table.undefine("__LINE__");
        table.undefine_all();

        assert!(!table.is_defined("X"));
        assert!(table.is_defined("__LINE__"));
    }

    #[test]
    fn test_function_like_classification() {
        let mut table = MacroTable::new();
        table.define("F", vec![Token::identifier("x")], Vec::new(), false, false);
        table.define("E", Vec::new(), Vec::new(), true, false);
        table.define("V", Vec::new(), Vec::new(), false, true);
        table.define("O", Vec::new(), vec![body_token("1")], false, false);

        assert!(table.find_name("F").unwrap().is_function_like());
        assert!(table.find_name("E").unwrap().is_function_like());
        assert!(table.find_name("V").unwrap().is_function_like());
        assert!(!table.find_name("O").unwrap().is_function_like());
    }

    #[test]
    fn test_slices_stable_under_append() {
        let mut table = MacroTable::new();
        table.define("A", Vec::new(), vec![body_token("1")], false, false);
        for i in 0..100 {
            table.define(
                &format!("M{i}"),
                Vec::new(),
                vec![body_token(&i.to_string())],
                false,
                false,
            );
        }
        let mac = table.find_name("A").unwrap();
        assert_eq!(table.body(mac)[0].text(), "1");
    }
}
