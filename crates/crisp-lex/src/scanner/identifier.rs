//! Identifier sub-scanner.

use crisp_util::Result;

use crate::scanner::{ScanFlags, Scanner};
use crate::token::{NumFlags, Token, TokenKind};

impl Scanner {
    /// Scans an identifier.
    ///
    /// Accepts letters, digits, and underscore; with
    /// [`ScanFlags::ALLOW_PATH_NAMES`] also `/`, `\`, `:`, and `.`, and
    /// with [`ScanFlags::ONLY_STRINGS`] also `-`. The `boolean` flag is
    /// set when the text is exactly `true` or `false`.
    pub(super) fn scan_identifier(&mut self) -> Result<Token> {
        let path_names = self.flags.contains(ScanFlags::ALLOW_PATH_NAMES);
        let dashes = self.flags.contains(ScanFlags::ONLY_STRINGS);

        let mut text = String::new();
        loop {
            let c = self.cursor.current_char();
            let accepted = c.is_ascii_alphanumeric()
                || c == '_'
                || (path_names && matches!(c, '/' | '\\' | ':' | '.'))
                || (dashes && c == '-');
            if !accepted {
                break;
            }
            text.push(self.take());
        }

        let flags = if text == "true" || text == "false" {
            NumFlags::BOOLEAN
        } else {
            NumFlags::empty()
        };
        Ok(Token::new(TokenKind::Identifier, text, flags))
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
    fn test_simple_identifier() {
        let tok = scan_one("foo_bar2", ScanFlags::empty());
        assert_eq!(tok.kind(), TokenKind::Identifier);
        assert_eq!(tok.text(), "foo_bar2");
    }

    #[test]
    fn test_underscore_start() {
        let tok = scan_one("_x", ScanFlags::empty());
        assert_eq!(tok.text(), "_x");
    }

    #[test]
    fn test_boolean_flag() {
        let tok = scan_one("true", ScanFlags::empty());
        assert!(tok.flags().contains(NumFlags::BOOLEAN));
        assert_eq!(tok.as_int(), 1);

        let tok = scan_one("falsey", ScanFlags::empty());
        assert!(!tok.flags().contains(NumFlags::BOOLEAN));
    }

    #[test]
    fn test_path_names() {
        let tok = scan_one("base/maps/q3dm7.bsp", ScanFlags::ALLOW_PATH_NAMES);
        assert_eq!(tok.kind(), TokenKind::Identifier);
        assert_eq!(tok.text(), "base/maps/q3dm7.bsp");
    }

    #[test]
    fn test_path_starting_with_slash() {
        let tok = scan_one("/usr/share", ScanFlags::ALLOW_PATH_NAMES);
        assert_eq!(tok.text(), "/usr/share");
    }

    #[test]
    fn test_path_with_drive_colon() {
        let tok = scan_one("c:\\temp\\x.cfg", ScanFlags::ALLOW_PATH_NAMES);
        assert_eq!(tok.text(), "c:\\temp\\x.cfg");
    }
}
