//! Edge case tests for crisp-lex.

#[cfg(test)]
mod tests {
    use crate::{NumFlags, ScanFlags, Scanner, Token};

    fn scan_all(source: &str, flags: ScanFlags) -> Vec<Token> {
        let mut scanner = Scanner::from_buffer(source, "test", flags, 1);
        let mut tokens = Vec::new();
        while let Some(token) = scanner.next_token().unwrap() {
            tokens.push(token);
        }
        tokens
    }

    // ==================== EDGE CASES ====================

    #[test]
    fn test_edge_empty_source() {
        assert!(scan_all("", ScanFlags::empty()).is_empty());
    }

    #[test]
    fn test_edge_whitespace_only() {
        assert!(scan_all("  \t\r\n  ", ScanFlags::empty()).is_empty());
    }

    #[test]
    fn test_edge_single_char_ident() {
        let tokens = scan_all("x", ScanFlags::empty());
        assert_eq!(tokens[0].text(), "x");
    }

    #[test]
    fn test_edge_long_identifier() {
        let name = "a".repeat(10000);
        let tokens = scan_all(&name, ScanFlags::empty());
        assert_eq!(tokens[0].text(), name);
    }

    #[test]
    fn test_edge_hex_bounds() {
        let tokens = scan_all("0x0 0xFFFFFFFF", ScanFlags::empty());
        assert_eq!(tokens[0].as_int(), 0);
        assert_eq!(tokens[1].as_int(), 0xFFFF_FFFF);
    }

    #[test]
    fn test_edge_zero_is_decimal() {
        let tokens = scan_all("0", ScanFlags::empty());
        assert!(tokens[0].flags().contains(NumFlags::DECIMAL | NumFlags::INTEGER));
    }

    #[test]
    fn test_edge_adjacent_number_and_dot() {
        // "1..2" is neither a float nor an IP without the flag; with the
        // flag it is still malformed (two dots). Either way the counter
        // moves.
        let mut scanner = Scanner::from_buffer(
            "1..2",
            "test",
            ScanFlags::NO_ERRORS | ScanFlags::NO_FATAL_ERRORS,
            1,
        );
        let _ = scanner.next_token();
        assert!(scanner.error_count() >= 1);
    }

    #[test]
    fn test_edge_string_concat_produces_one_token() {
        let tokens = scan_all("\"a\"  \"b\"  \"c\"", ScanFlags::empty());
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text(), "abc");
    }

    #[test]
    fn test_edge_comment_after_identifier() {
        let tokens = scan_all("x a//b", ScanFlags::empty());
        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[1].text(), "a");
    }

    #[test]
    fn test_edge_crlf_line_endings() {
        let tokens = scan_all("a\r\nb", ScanFlags::empty());
        assert_eq!(tokens[1].line(), 2);
        assert_eq!(tokens[1].lines_crossed(), 1);
    }

    #[test]
    fn test_edge_counters_monotonic() {
        let mut scanner = Scanner::from_buffer(
            "@ @ @",
            "test",
            ScanFlags::NO_ERRORS | ScanFlags::NO_FATAL_ERRORS,
            1,
        );
        let mut last = 0;
        while let Ok(Some(_)) | Err(_) = scanner.next_token() {
            let count = scanner.error_count();
            assert!(count >= last);
            last = count;
            if scanner.remaining().is_empty() {
                break;
            }
        }
        assert_eq!(scanner.error_count(), 3);
    }

    // ==================== PROPERTIES ====================

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Scanning any printable-ASCII input terminates without
            /// panicking, whatever the error count ends up being.
            #[test]
            fn scan_never_panics(source in "[ -~]{0,64}") {
                let mut scanner = Scanner::from_buffer(
                    &source,
                    "prop",
                    ScanFlags::NO_ERRORS
                        | ScanFlags::NO_WARNINGS
                        | ScanFlags::NO_FATAL_ERRORS,
                    1,
                );
                for _ in 0..256 {
                    match scanner.next_token() {
                        Ok(None) => break,
                        Ok(Some(_)) | Err(_) => {}
                    }
                }
            }

            /// Identifiers round-trip through a scan.
            #[test]
            fn identifier_round_trip(name in "[A-Za-z_][A-Za-z0-9_]{0,16}") {
                let tokens = scan_all(&name, ScanFlags::empty());
                prop_assert_eq!(tokens.len(), 1);
                prop_assert_eq!(tokens[0].text(), name.as_str());
            }

            /// Decimal integers round-trip and evaluate.
            #[test]
            fn integer_round_trip(value in 0u32..=u32::MAX) {
                let text = value.to_string();
                let tokens = scan_all(&text, ScanFlags::empty());
                prop_assert_eq!(tokens.len(), 1);
                prop_assert_eq!(tokens[0].as_int(), i64::from(value));
            }

            /// `as_int` equals `as_double` truncated for ordinary numbers.
            #[test]
            fn int_matches_truncated_double(value in -1000.0f64..1000.0) {
                let text = format!("{value:.6}");
                let flagless = text.trim_start_matches('-');
                let tokens = scan_all(flagless, ScanFlags::empty());
                prop_assert_eq!(tokens.len(), 1);
                let token = &tokens[0];
                prop_assert_eq!(token.as_int(), token.as_double() as i64);
            }
        }
    }
}
