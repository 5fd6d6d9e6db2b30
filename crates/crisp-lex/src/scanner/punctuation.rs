//! Punctuation sub-scanner.

use crisp_util::{Error, Result};

use crate::scanner::Scanner;
use crate::token::{NumFlags, Token, TokenKind};

impl Scanner {
    /// Matches punctuation by walking the table chain for the first
    /// character; the chain is ordered longest-first, so the first prefix
    /// match is the longest one.
    pub(super) fn scan_punctuation(&mut self) -> Result<Token> {
        let c = self.cursor.current_char();

        let matched = if c.is_ascii() {
            self.punct
                .candidates(c as u8)
                .find(|(text, _)| self.cursor.remaining().starts_with(text))
                .map(|(text, id)| (text.len(), id))
        } else {
            None
        };

        match matched {
            Some((len, id)) => {
                let text = self.cursor.remaining()[..len].to_string();
                for _ in 0..len {
                    self.cursor.advance();
                }
                Ok(Token::new(TokenKind::Punctuation(id), text, NumFlags::empty()))
            }
            None => {
                self.error(Error::Syntax(format!(
                    "unknown punctuation character '{c}' (0x{:02X})",
                    u32::from(c)
                )))?;
                // Downgraded error: step past the character so scanning
                // stays meaningful.
                self.cursor.advance();
                Ok(Token::new(TokenKind::None, c.to_string(), NumFlags::empty()))
            }
        }
    }
}
