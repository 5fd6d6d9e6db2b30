//! Minified output emission.
//!
//! Top-level tokens join tightly: a single space appears only between
//! two consecutive non-punctuation tokens. Macro expansions are rendered
//! with a looser, readable spacing and then appended as one piece. A
//! newline is inserted after the first `;` past the column hint.

use crisp_lex::{Punct, Token};

use crate::preprocessor::Preprocessor;

/// Classification of the most recently emitted piece.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum EmitClass {
    /// Nothing emitted yet, or just after a newline.
    Start,
    /// Identifier, number, string, literal, or an expansion chunk.
    Value,
    Punct(Punct),
}

impl Preprocessor {
    /// Emits one source token, re-escaping strings and literals.
    pub(crate) fn emit_token(&mut self, token: &Token) {
        let class = match token.punct() {
            Punct::None => EmitClass::Value,
            p => EmitClass::Punct(p),
        };
        let text = token.to_string();
        self.emit_piece(&text, class);

        if token.is_punct(Punct::Semicolon) && self.column > self.line_hint {
            self.out.push('\n');
            self.column = 0;
            self.last_class = EmitClass::Start;
        }
    }

    /// Emits a fully rendered macro expansion as one value-like piece.
    pub(crate) fn emit_expansion(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.emit_piece(text, EmitClass::Value);
    }

    fn emit_piece(&mut self, text: &str, class: EmitClass) {
        if self.last_class == EmitClass::Value && class == EmitClass::Value {
            self.out.push(' ');
            self.column += 1;
        }
        self.out.push_str(text);
        self.column += text.len();
        self.last_class = class;
    }
}

/// Joins tokens with a space only between two non-punctuation tokens.
/// Used for argument text, stringize, and the top-level minifier rule.
pub(crate) fn render_tight(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if !p.is_punctuation() && !token.is_punctuation() {
                out.push(' ');
            }
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}

/// Joins macro-body tokens with readable spacing: no space after an
/// opener, before a closer or separator, or between a callee and its
/// `(`.
pub(crate) fn render_loose(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        if let Some(p) = prev {
            if loose_space(p, token) {
                out.push(' ');
            }
        }
        out.push_str(&token.to_string());
        prev = Some(token);
    }
    out
}

fn loose_space(prev: &Token, next: &Token) -> bool {
    if matches!(
        next.punct(),
        Punct::CloseParen | Punct::CloseBracket | Punct::CloseBrace | Punct::Comma | Punct::Semicolon
    ) {
        return false;
    }
    if matches!(
        prev.punct(),
        Punct::OpenParen | Punct::OpenBracket | Punct::OpenBrace
    ) {
        return false;
    }
    // Call style: `f(` but `* (`.
    if next.is_punct(Punct::OpenParen) && !prev.is_punctuation() {
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crisp_lex::{ScanFlags, Scanner};

    fn tokens(source: &str) -> Vec<Token> {
        let mut scanner = Scanner::from_buffer(source, "render", ScanFlags::empty(), 1);
        let mut out = Vec::new();
        while let Some(token) = scanner.next_token().unwrap() {
            out.push(token);
        }
        out
    }

    #[test]
    fn test_tight_join() {
        assert_eq!(render_tight(&tokens("3 + 1")), "3+1");
        assert_eq!(render_tight(&tokens("a b")), "a b");
        assert_eq!(render_tight(&tokens("f ( x )")), "f(x)");
    }

    #[test]
    fn test_loose_join_keeps_operator_spacing() {
        assert_eq!(render_loose(&tokens("( a ) * ( b )")), "(a) * (b)");
    }

    #[test]
    fn test_loose_join_call_style() {
        assert_eq!(render_loose(&tokens("f ( 1 , 2 )")), "f(1, 2)");
    }

    #[test]
    fn test_loose_join_requotes_strings() {
        assert_eq!(render_loose(&tokens("x \"a b\"")), "x \"a b\"");
    }
}
