//! Macro expansion.
//!
//! Expansion is token-level and two-phase: parameter substitution
//! (including `#` stringize and `##` paste) produces a token list, which
//! is then rescanned for further macro names. Multi-token arguments are
//! carried as pre-rendered chunk tokens so their original tight spacing
//! survives substitution.

use chrono::Local;

use crisp_lex::{NumFlags, Punct, ScanFlags, Scanner, Token, TokenKind};
use crisp_util::{name_hash, Error, Result};

use crate::macros::{Builtin, Macro};
use crate::preprocessor::output::{render_loose, render_tight};
use crate::preprocessor::{Include, Preprocessor, VaFrame};

impl Preprocessor {
    /// Expands the macro named by `first` into the output. Arguments of
    /// a function-like macro are read from the live scanner.
    pub(crate) fn expand_into_output(&mut self, entry: &mut Include, first: Token) -> Result<()> {
        let Some(mac) = self.macros.find(name_hash(first.text())).cloned() else {
            self.emit_token(&first);
            return Ok(());
        };

        let tokens = if let Some(builtin) = mac.builtin {
            self.expand_builtin(entry, builtin)?
        } else {
            let args = if mac.is_function_like() {
                match self.collect_args_from_scanner(entry, &mac)? {
                    Some(args) => args,
                    None => return Ok(()),
                }
            } else {
                Vec::new()
            };
            self.expand_macro(entry, &mac, args)?
        };

        let text = render_loose(&tokens);
        self.emit_expansion(&text);
        Ok(())
    }

    /// Fully expands `mac` with the given raw arguments into a token
    /// list. Self-reference (direct or through another macro) is an
    /// error.
    pub(crate) fn expand_macro(
        &mut self,
        entry: &mut Include,
        mac: &Macro,
        raw_args: Vec<Vec<Token>>,
    ) -> Result<Vec<Token>> {
        if self.expanding.contains(&mac.hash) {
            self.err_at(
                &entry.scanner,
                Error::Semantic(format!(
                    "macro '{}' expansion references itself",
                    mac.name
                )),
            )?;
            return Ok(Vec::new());
        }

        let body: Vec<Token> = self.macros.body(mac).to_vec();
        if let (Some(head), Some(tail)) = (body.first(), body.last()) {
            let bad = |t: &Token| t.is_punct(Punct::Hash) || t.is_punct(Punct::HashHash);
            if bad(head) || bad(tail) {
                self.err_at(
                    &entry.scanner,
                    Error::Semantic(format!(
                        "body of macro '{}' may not begin or end with '#' or '##'",
                        mac.name
                    )),
                )?;
                return Ok(Vec::new());
            }
        }

        self.expanding.push(mac.hash);
        let result = self.expand_guarded(entry, mac, &body, raw_args);
        self.expanding.pop();
        result
    }

    fn expand_guarded(
        &mut self,
        entry: &mut Include,
        mac: &Macro,
        body: &[Token],
        raw_args: Vec<Vec<Token>>,
    ) -> Result<Vec<Token>> {
        let params: Vec<Token> = self.macros.params(mac).to_vec();
        let named = mac.param_count().min(raw_args.len());

        let mut expanded_args = Vec::with_capacity(raw_args.len());
        for arg in &raw_args {
            expanded_args.push(self.expand_token_list(entry, arg)?);
        }

        if mac.variadic {
            self.va_stack.push(VaFrame {
                raw: raw_args[named..].to_vec(),
                expanded: expanded_args[named..].to_vec(),
            });
        }

        let substituted = self.substitute_body(
            body,
            &params,
            &raw_args[..named],
            &expanded_args[..named],
        );
        let result = self.expand_token_list(entry, &substituted);

        if mac.variadic {
            self.va_stack.pop();
        }
        result
    }

    /// Phase one: replaces parameters with their (pre-expanded)
    /// arguments, applies `#` stringize and `##` paste.
    fn substitute_body(
        &mut self,
        body: &[Token],
        params: &[Token],
        raw_args: &[Vec<Token>],
        expanded_args: &[Vec<Token>],
    ) -> Vec<Token> {
        let param_index =
            |name: &str| params.iter().position(|param| param.text() == name);

        let mut out = Vec::new();
        let mut i = 0;
        while i < body.len() {
            let token = &body[i];

            // `# P` stringizes the raw argument text.
            if token.is_punct(Punct::Hash) && i + 1 < body.len() {
                if let Some(p) = param_index(body[i + 1].text()) {
                    let raw = render_tight(&raw_args[p]);
                    out.push(Token::new(
                        TokenKind::String,
                        raw.trim(),
                        NumFlags::empty(),
                    ));
                    i += 2;
                    continue;
                }
            }

            // `A ## B` pastes, chaining left to right.
            if i + 1 < body.len() && body[i + 1].is_punct(Punct::HashHash) {
                let mut text = self.paste_text(token, params, raw_args);
                let mut j = i + 1;
                while j + 1 < body.len() && body[j].is_punct(Punct::HashHash) {
                    text.push_str(&self.paste_text(&body[j + 1], params, raw_args));
                    j += 2;
                }
                out.push(self.rescan_pasted(&text));
                i = j;
                continue;
            }

            if token.kind() == TokenKind::Identifier {
                if let Some(p) = param_index(token.text()) {
                    out.push(chunk_of(&expanded_args[p]));
                    i += 1;
                    continue;
                }
            }

            out.push(token.clone());
            i += 1;
        }
        out
    }

    /// Text a paste operand contributes: parameters paste their raw
    /// argument text.
    fn paste_text(&self, token: &Token, params: &[Token], raw_args: &[Vec<Token>]) -> String {
        if token.kind() == TokenKind::Identifier {
            if let Some(p) = params.iter().position(|param| param.text() == token.text()) {
                return render_tight(&raw_args[p]);
            }
        }
        token.text().to_string()
    }

    /// Classifies a pasted spelling by rescanning it; a spelling that is
    /// not exactly one token stays an identifier-like blob.
    fn rescan_pasted(&self, text: &str) -> Token {
        let mut scanner = Scanner::from_buffer(
            text,
            "<paste>",
            ScanFlags::NO_ERRORS | ScanFlags::NO_WARNINGS | ScanFlags::NO_FATAL_ERRORS,
            1,
        )
        .with_punct_table(self.punct_table());
        match scanner.next_token() {
            Ok(Some(token)) if scanner.remaining().is_empty() => token,
            _ => Token::identifier(text),
        }
    }

    /// Phase two: walks a token list and expands every identifier that
    /// names a macro; function-like calls take their arguments from the
    /// list itself.
    pub(crate) fn expand_token_list(
        &mut self,
        entry: &mut Include,
        tokens: &[Token],
    ) -> Result<Vec<Token>> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < tokens.len() {
            let token = &tokens[i];
            if token.kind() == TokenKind::Identifier {
                if let Some(mac) = self.macros.find(name_hash(token.text())).cloned() {
                    if let Some(builtin) = mac.builtin {
                        out.extend(self.expand_builtin(entry, builtin)?);
                        i += 1;
                        continue;
                    }
                    if mac.is_function_like() {
                        let mut next = i + 1;
                        match self.collect_args_from_list(entry, tokens, &mut next, &mac)? {
                            Some(args) => {
                                out.extend(self.expand_macro(entry, &mac, args)?);
                                i = next;
                            }
                            None => {
                                out.push(token.clone());
                                i += 1;
                            }
                        }
                        continue;
                    }
                    out.extend(self.expand_macro(entry, &mac, Vec::new())?);
                    i += 1;
                    continue;
                }
            }
            out.push(token.clone());
            i += 1;
        }
        Ok(out)
    }

    /// Reads `(...)` arguments for `mac` from the live scanner.
    fn collect_args_from_scanner(
        &mut self,
        entry: &mut Include,
        mac: &Macro,
    ) -> Result<Option<Vec<Vec<Token>>>> {
        match entry.scanner.next_token()? {
            Some(token) if token.is_punct(Punct::OpenParen) => {}
            other => {
                if let Some(token) = other {
                    entry.scanner.unread(token);
                }
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!(
                        "function-like macro '{}' used without '('",
                        mac.name
                    )),
                )?;
                return Ok(None);
            }
        }

        let mut args: Vec<Vec<Token>> = vec![Vec::new()];
        let mut depth = 1u32;
        loop {
            let Some(token) = entry.scanner.next_token()? else {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("unterminated arguments for macro '{}'", mac.name)),
                )?;
                return Ok(None);
            };
            match token.punct() {
                Punct::OpenParen => {
                    depth += 1;
                    push_arg_token(&mut args, token);
                }
                Punct::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    push_arg_token(&mut args, token);
                }
                Punct::Comma if depth == 1 => args.push(Vec::new()),
                _ => push_arg_token(&mut args, token),
            }
        }
        self.finish_args(entry, mac, args)
    }

    /// Reads `(...)` arguments for `mac` from a token list, starting at
    /// `*index` (the position after the macro name). On success `*index`
    /// is left after the closing parenthesis.
    fn collect_args_from_list(
        &mut self,
        entry: &mut Include,
        tokens: &[Token],
        index: &mut usize,
        mac: &Macro,
    ) -> Result<Option<Vec<Vec<Token>>>> {
        if !tokens
            .get(*index)
            .is_some_and(|t| t.is_punct(Punct::OpenParen))
        {
            self.err_at(
                &entry.scanner,
                Error::Grammar(format!(
                    "function-like macro '{}' used without '('",
                    mac.name
                )),
            )?;
            return Ok(None);
        }
        *index += 1;

        let mut args: Vec<Vec<Token>> = vec![Vec::new()];
        let mut depth = 1u32;
        loop {
            let Some(token) = tokens.get(*index) else {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("unterminated arguments for macro '{}'", mac.name)),
                )?;
                return Ok(None);
            };
            *index += 1;
            match token.punct() {
                Punct::OpenParen => {
                    depth += 1;
                    push_arg_token(&mut args, token.clone());
                }
                Punct::CloseParen => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    push_arg_token(&mut args, token.clone());
                }
                Punct::Comma if depth == 1 => args.push(Vec::new()),
                _ => push_arg_token(&mut args, token.clone()),
            }
        }
        self.finish_args(entry, mac, args)
    }

    /// Shared argument post-processing: `__VA_ARGS__` splice, `()` as
    /// zero arguments, and the arity check.
    fn finish_args(
        &mut self,
        entry: &mut Include,
        mac: &Macro,
        args: Vec<Vec<Token>>,
    ) -> Result<Option<Vec<Vec<Token>>>> {
        // An argument that is exactly `__VA_ARGS__` splices the parent
        // expansion's varargs into this call's argument list.
        let mut spliced: Vec<Vec<Token>> = Vec::new();
        for arg in args {
            if arg.len() == 1 && arg[0].is_identifier("__VA_ARGS__") {
                if let Some(frame) = self.va_stack.last() {
                    spliced.extend(frame.raw.iter().cloned());
                    continue;
                }
            }
            spliced.push(arg);
        }
        let mut args = spliced;

        if args.len() == 1 && args[0].is_empty() {
            args.pop();
        }

        let expected = mac.param_count();
        let ok = if mac.variadic {
            args.len() >= expected
        } else {
            args.len() == expected
        };
        if !ok {
            self.err_at(
                &entry.scanner,
                Error::Semantic(format!(
                    "macro '{}' expects {} argument(s), found {}",
                    mac.name,
                    expected,
                    args.len()
                )),
            )?;
            return Ok(None);
        }
        Ok(Some(args))
    }

    /// Expands one built-in macro.
    pub(crate) fn expand_builtin(
        &mut self,
        entry: &mut Include,
        builtin: Builtin,
    ) -> Result<Vec<Token>> {
        Ok(match builtin {
            Builtin::File => vec![Token::new(
                TokenKind::String,
                entry.scanner.file_name(),
                NumFlags::empty(),
            )],
            Builtin::Line => vec![Token::new(
                TokenKind::Number,
                entry.scanner.line().to_string(),
                NumFlags::DECIMAL | NumFlags::INTEGER | NumFlags::SIGNED,
            )],
            Builtin::Date => vec![Token::new(
                TokenKind::String,
                Local::now().format("%b %e %Y").to_string(),
                NumFlags::empty(),
            )],
            Builtin::Time => vec![Token::new(
                TokenKind::String,
                Local::now().format("%H:%M:%S").to_string(),
                NumFlags::empty(),
            )],
            Builtin::VaArgs => match self.va_stack.last() {
                Some(frame) => {
                    let mut out = Vec::new();
                    for (i, arg) in frame.expanded.iter().enumerate() {
                        if i > 0 {
                            out.push(Token::punctuation(Punct::Comma, ","));
                        }
                        out.push(chunk_of(arg));
                    }
                    out
                }
                None => {
                    self.err_at(
                        &entry.scanner,
                        Error::Semantic(
                            "'__VA_ARGS__' outside a variadic macro expansion".into(),
                        ),
                    )?;
                    Vec::new()
                }
            },
        })
    }
}

fn push_arg_token(args: &mut Vec<Vec<Token>>, token: Token) {
    if let Some(arg) = args.last_mut() {
        arg.push(token);
    }
}

/// A single-token argument substitutes as itself; a multi-token one
/// becomes a pre-rendered chunk so its tight spacing survives.
fn chunk_of(tokens: &[Token]) -> Token {
    if tokens.len() == 1 {
        tokens[0].clone()
    } else {
        Token::new(TokenKind::None, render_tight(tokens), NumFlags::empty())
    }
}

#[cfg(test)]
mod tests {
    use crate::preprocessor::{PpFlags, Preprocessor};

    fn run(source: &str) -> String {
        Preprocessor::new(PpFlags::empty())
            .process_buffer(source, "test")
            .unwrap()
    }

    #[test]
    fn test_object_like_expansion() {
        assert_eq!(run("#define X 42\nX"), "42");
    }

    #[test]
    fn test_function_like_textual_substitution() {
        let out = run("#define SQUARE(x) ((x) * (x))\nSQUARE(3+1)");
        assert_eq!(out, "((3+1) * (3+1))");
    }

    #[test]
    fn test_nested_object_macros() {
        assert_eq!(run("#define A B\n#define B 7\nA"), "7");
    }

    #[test]
    fn test_macro_call_in_argument() {
        let out = run("#define ID(x) x\n#define SQUARE(x) ((x) * (x))\nSQUARE(ID(2))");
        assert_eq!(out, "((2) * (2))");
    }

    #[test]
    fn test_paste() {
        assert_eq!(run("#define A(x) x##_tag\nA(foo)"), "foo_tag");
    }

    #[test]
    fn test_paste_chain() {
        assert_eq!(run("#define GLUE(a, b) a##_##b\nGLUE(x, y)"), "x_y");
    }

    #[test]
    fn test_pasted_token_reexpands() {
        let out = run("#define WIDE 9\n#define CAT(a, b) a##b\nCAT(WI, DE)");
        assert_eq!(out, "9");
    }

    #[test]
    fn test_stringize() {
        assert_eq!(run("#define STR(x) #x\nSTR(hello)"), "\"hello\"");
    }

    #[test]
    fn test_stringize_expression() {
        assert_eq!(run("#define STR(x) #x\nSTR(1+2)"), "\"1+2\"");
    }

    #[test]
    fn test_stringize_string_double_escapes() {
        let out = run("#define STR(x) #x\nSTR(\"a\")");
        assert_eq!(out, "\"\\\"a\\\"\"");
    }

    #[test]
    fn test_variadic() {
        let out = run("#define V(x, ...) f(x, __VA_ARGS__)\nV(1, 2, 3)");
        assert_eq!(out, "f(1, 2, 3)");
    }

    #[test]
    fn test_variadic_forwarding() {
        let out = run(
            "#define INNER(x, ...) g(x, __VA_ARGS__)\n\
             #define OUTER(...) INNER(0, __VA_ARGS__)\n\
             OUTER(1, 2)",
        );
        assert_eq!(out, "g(0, 1, 2)");
    }

    #[test]
    fn test_va_args_outside_variadic_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("__VA_ARGS__", "test").is_err());
    }

    #[test]
    fn test_self_reference_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#define X X\nX", "test").is_err());
        assert_eq!(pp.error_count(), 1);
    }

    #[test]
    fn test_mutual_reference_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#define A B\n#define B A\nA", "test").is_err());
    }

    #[test]
    fn test_empty_call_macro() {
        assert_eq!(run("#define NOTHING() void\nNOTHING()"), "void");
    }

    #[test]
    fn test_wrong_arity_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp
            .process_buffer("#define F(a, b) a b\nF(1)", "test")
            .is_err());
    }

    #[test]
    fn test_function_like_without_parens_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#define F(a) a\nF + 1", "test").is_err());
    }

    #[test]
    fn test_commas_inside_parens_do_not_split_args() {
        // The nested call is one argument; its text is carried tightly.
        let out = run("#define FIRST(a, b) a\nFIRST(g(1, 2), 3)");
        assert_eq!(out, "g(1,2)");
    }

    #[test]
    fn test_line_builtin() {
        assert_eq!(run("a\nb __LINE__"), "a b 2");
    }

    #[test]
    fn test_file_builtin() {
        assert_eq!(run("__FILE__"), "\"test\"");
    }

    #[test]
    fn test_date_time_builtins_are_strings() {
        let out = run("__DATE__ __TIME__");
        assert_eq!(out.matches('"').count(), 4);
    }

    #[test]
    fn test_body_may_not_start_with_paste() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp
            .process_buffer("#define BAD ## x\nBAD", "test")
            .is_err());
    }

    #[test]
    fn test_body_validation_happens_at_expansion() {
        // Defining the malformed body alone is fine; only use trips it.
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#define BAD ## x\nok", "test").is_ok());
        assert_eq!(pp.error_count(), 0);
    }
}
