//! Directive dispatch.
//!
//! A `#` token introduces a directive; `$` introduces the
//! `$eval`/`$evalint`/`$evalfloat` output extensions. While the
//! conditional stack is skipping, only the conditional directives are
//! live and everything else is consumed silently.

use std::path::{Path, PathBuf};

use crisp_lex::{Punct, ScanFlags, Scanner, Token, TokenKind};
use crisp_util::{Error, Result};

use crate::eval::{EvalFlags, ExprEvaluator};
use crate::preprocessor::{CondKind, Flow, Include, PpFlags, Preprocessor};

/// Evaluation flags for `#if`/`#elif`: C-style, undefined names are
/// zero.
const IF_FLAGS: EvalFlags = EvalFlags::DETECT_TYPE
    .union(EvalFlags::ALLOW_MATH_FUNCS)
    .union(EvalFlags::ALLOW_MATH_CONSTS)
    .union(EvalFlags::UNDEFINED_CONSTS_ARE_ZERO);

impl Preprocessor {
    /// Dispatches a `#` directive; the name must follow on the same
    /// line.
    pub(crate) fn directive(&mut self, entry: &mut Include) -> Result<Flow> {
        let name = match entry.scanner.next_token_on_line()? {
            Some(token) if token.kind() == TokenKind::Identifier => token,
            Some(token) => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("found '#' without a directive name, got '{}'", token.text())),
                )?;
                entry.scanner.skip_rest_of_line()?;
                return Ok(Flow::Continue);
            }
            None => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("found '#' without a directive name".into()),
                )?;
                return Ok(Flow::Continue);
            }
        };

        match name.text() {
            "if" => self.directive_if(entry),
            "ifdef" => self.directive_ifdef(entry, CondKind::Ifdef),
            "ifndef" => self.directive_ifdef(entry, CondKind::Ifndef),
            "elif" => self.directive_elif(entry),
            "else" => self.directive_else(entry),
            "endif" => self.directive_endif(entry),
            _ if self.skipping > 0 => {
                entry.scanner.skip_rest_of_line()?;
                Ok(Flow::Continue)
            }
            "define" => self.directive_define(entry),
            "undef" => self.directive_undef(entry),
            "include" => self.directive_include(entry),
            "line" => self.directive_line(entry),
            "error" => self.directive_error(entry),
            "warning" | "warn" => self.directive_warning(entry),
            "pragma" => self.directive_pragma(entry),
            other @ ("eval" | "evalint" | "evalfloat") => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("'#{other}' is not a directive, use '${other}'")),
                )?;
                entry.scanner.skip_rest_of_line()?;
                Ok(Flow::Continue)
            }
            other => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("unknown preprocessor directive '#{other}'")),
                )?;
                entry.scanner.skip_rest_of_line()?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Collects tokens to end of line, honoring `\` line continuations.
    pub(crate) fn collect_line_tokens(&mut self, scanner: &mut Scanner) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        loop {
            match scanner.next_token_on_line()? {
                Some(token) if token.is_punct(Punct::Backslash) => {
                    match scanner.next_token()? {
                        Some(next) => tokens.push(next),
                        None => break,
                    }
                }
                Some(token) => tokens.push(token),
                None => break,
            }
        }
        Ok(tokens)
    }

    fn directive_if(&mut self, entry: &mut Include) -> Result<Flow> {
        let tokens = self.collect_line_tokens(&mut entry.scanner)?;
        if self.skipping > 0 {
            // The whole group sits inside a skipped region; never
            // evaluated, never emitted.
            self.push_cond(CondKind::If, true, false);
            return Ok(Flow::Continue);
        }
        let truth = self.eval_condition(&entry.scanner, &tokens)?;
        self.push_cond(CondKind::If, !truth, !truth);
        Ok(Flow::Continue)
    }

    fn directive_ifdef(&mut self, entry: &mut Include, kind: CondKind) -> Result<Flow> {
        let name = entry.scanner.next_token_on_line()?;
        if self.skipping > 0 {
            self.push_cond(kind, true, false);
            return Ok(Flow::Continue);
        }
        let defined = match name {
            Some(token) if token.kind() == TokenKind::Identifier => {
                self.macros.is_defined(token.text())
            }
            _ => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("expected a macro name after '#ifdef'".into()),
                )?;
                false
            }
        };
        let truth = if kind == CondKind::Ifndef { !defined } else { defined };
        self.push_cond(kind, !truth, !truth);
        Ok(Flow::Continue)
    }

    fn directive_elif(&mut self, entry: &mut Include) -> Result<Flow> {
        let tokens = self.collect_line_tokens(&mut entry.scanner)?;
        let prev = match self.pop_cond() {
            Some(frame) => frame,
            None => {
                self.err_at(&entry.scanner, Error::State("misplaced '#elif'".into()))?;
                return Ok(Flow::Continue);
            }
        };
        if prev.kind == CondKind::Else {
            self.push_cond(prev.kind, prev.skip_body, prev.parent_state);
            self.err_at(
                &entry.scanner,
                Error::State("'#elif' after '#else'".into()),
            )?;
            return Ok(Flow::Continue);
        }

        // Inside a skipped outer region (or after a taken branch) the
        // expression is never evaluated.
        let live = self.skipping == 0 && prev.parent_state && prev.skip_body;
        let truth = if live {
            self.eval_condition(&entry.scanner, &tokens)?
        } else {
            false
        };

        let skip = !truth || !prev.skip_body || !prev.parent_state;
        let parent = prev.parent_state && skip;
        self.push_cond(CondKind::Elif, skip, parent);
        Ok(Flow::Continue)
    }

    fn directive_else(&mut self, entry: &mut Include) -> Result<Flow> {
        let prev = match self.pop_cond() {
            Some(frame) => frame,
            None => {
                self.err_at(&entry.scanner, Error::State("misplaced '#else'".into()))?;
                return Ok(Flow::Continue);
            }
        };
        if prev.kind == CondKind::Else {
            self.push_cond(prev.kind, prev.skip_body, prev.parent_state);
            self.err_at(
                &entry.scanner,
                Error::State("'#else' after '#else'".into()),
            )?;
            return Ok(Flow::Continue);
        }

        let skip = !prev.skip_body || !prev.parent_state;
        let parent = prev.parent_state && skip;
        self.push_cond(CondKind::Else, skip, parent);
        Ok(Flow::Continue)
    }

    fn directive_endif(&mut self, entry: &mut Include) -> Result<Flow> {
        if self.pop_cond().is_none() {
            self.err_at(&entry.scanner, Error::State("misplaced '#endif'".into()))?;
        }
        Ok(Flow::Continue)
    }

    fn eval_condition(&mut self, scanner: &Scanner, tokens: &[Token]) -> Result<bool> {
        match ExprEvaluator::new(IF_FLAGS)
            .with_macros(&self.macros)
            .evaluate(tokens)
        {
            Ok(value) => Ok(value.truthy()),
            Err(err) => {
                self.err_at(scanner, err)?;
                Ok(false)
            }
        }
    }

    fn directive_define(&mut self, entry: &mut Include) -> Result<Flow> {
        self.parse_define(&mut entry.scanner)?;
        Ok(Flow::Continue)
    }

    /// Parses `NAME[(params)] body...` after `#define`. A `(` with no
    /// whitespace after the name opens the parameter list; otherwise it
    /// belongs to the body.
    pub(crate) fn parse_define(&mut self, scanner: &mut Scanner) -> Result<()> {
        let name = match scanner.next_token_on_line()? {
            Some(token) if token.kind() == TokenKind::Identifier => token,
            Some(token) => {
                self.err_at(
                    scanner,
                    Error::Grammar(format!("invalid macro name '{}'", token.text())),
                )?;
                scanner.skip_rest_of_line()?;
                return Ok(());
            }
            None => {
                self.err_at(
                    scanner,
                    Error::Grammar("macro name missing after '#define'".into()),
                )?;
                return Ok(());
            }
        };

        let mut params = Vec::new();
        let mut empty_call = false;
        let mut variadic = false;

        match scanner.next_token_on_line()? {
            Some(token)
                if token.is_punct(Punct::OpenParen) && !scanner.had_leading_whitespace() =>
            {
                loop {
                    match scanner.next_token_on_line()? {
                        Some(t) if t.is_punct(Punct::CloseParen) => break,
                        Some(t) if t.is_punct(Punct::Comma) => {}
                        Some(t) if t.is_punct(Punct::Ellipsis) => {
                            if variadic {
                                self.err_at(
                                    scanner,
                                    Error::Grammar("duplicate '...' in macro parameters".into()),
                                )?;
                            }
                            variadic = true;
                        }
                        Some(t) if t.kind() == TokenKind::Identifier => {
                            if variadic {
                                self.err_at(
                                    scanner,
                                    Error::Grammar(
                                        "macro parameter after '...'".into(),
                                    ),
                                )?;
                            }
                            params.push(t);
                        }
                        Some(t) => {
                            self.err_at(
                                scanner,
                                Error::Grammar(format!(
                                    "invalid token '{}' in macro parameters",
                                    t.text()
                                )),
                            )?;
                        }
                        None => {
                            self.err_at(
                                scanner,
                                Error::Grammar(format!(
                                    "unterminated parameter list for macro '{}'",
                                    name.text()
                                )),
                            )?;
                            break;
                        }
                    }
                }
                empty_call = params.is_empty() && !variadic;
            }
            Some(token) => scanner.unread(token),
            None => {}
        }

        let body = self.collect_line_tokens(scanner)?;

        let replaced = self
            .macros
            .define(name.text(), params, body, empty_call, variadic);
        if replaced && self.warn_redefinitions() {
            self.warn_at(scanner, &format!("macro '{}' redefined", name.text()));
        }
        Ok(())
    }

    fn directive_undef(&mut self, entry: &mut Include) -> Result<Flow> {
        match entry.scanner.next_token_on_line()? {
            Some(token) if token.kind() == TokenKind::Identifier => {
                self.macros.undefine(token.text());
            }
            _ => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("expected a macro name after '#undef'".into()),
                )?;
            }
        }
        Ok(Flow::Continue)
    }

    fn directive_include(&mut self, entry: &mut Include) -> Result<Flow> {
        if self.pp_flags().contains(PpFlags::NO_INCLUDES) {
            self.err_at(&entry.scanner, Error::State("includes are disabled".into()))?;
            entry.scanner.skip_rest_of_line()?;
            return Ok(Flow::Continue);
        }
        if self.include_depth() >= self.max_include_depth() {
            self.err_at(
                &entry.scanner,
                Error::State("include nesting too deep".into()),
            )?;
            entry.scanner.skip_rest_of_line()?;
            return Ok(Flow::Continue);
        }

        let candidates = match entry.scanner.next_token_on_line()? {
            // `#include "name"`: caller-local search only.
            Some(token) if token.kind() == TokenKind::String => {
                entry.scanner.skip_rest_of_line()?;
                let name = token.text().to_string();
                let mut list = Vec::new();
                if let Some(dir) = Path::new(entry.scanner.file_name()).parent() {
                    list.push(dir.join(&name));
                }
                list.push(PathBuf::from(&name));
                (name, list)
            }
            // `#include <name>`: the rest of the line is raw text so the
            // name may contain dots, slashes, and hyphens.
            Some(token) if token.is_punct(Punct::Less) => {
                let raw = entry.scanner.parse_rest_of_line()?;
                let Some(name) = raw.strip_suffix('>').map(str::trim) else {
                    self.err_at(
                        &entry.scanner,
                        Error::Grammar("missing '>' after '#include <'".into()),
                    )?;
                    return Ok(Flow::Continue);
                };
                if self.pp_flags().contains(PpFlags::NO_BASE_INCLUDES) {
                    self.err_at(
                        &entry.scanner,
                        Error::State("base includes are disabled".into()),
                    )?;
                    return Ok(Flow::Continue);
                }
                let list = self
                    .search_paths()
                    .iter()
                    .map(|dir| dir.join(name))
                    .collect();
                (name.to_string(), list)
            }
            _ => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("expected \"name\" or <name> after '#include'".into()),
                )?;
                entry.scanner.skip_rest_of_line()?;
                return Ok(Flow::Continue);
            }
        };

        let (name, list) = candidates;
        match self.open_include(&list) {
            Some(include) => Ok(Flow::Push(include)),
            None => {
                self.err_at(
                    &entry.scanner,
                    Error::Io(std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        format!("could not open include '{name}'"),
                    )),
                )?;
                Ok(Flow::Continue)
            }
        }
    }

    /// `#line N ["file"]`: the following line becomes line N.
    fn directive_line(&mut self, entry: &mut Include) -> Result<Flow> {
        match entry.scanner.next_token_on_line()? {
            Some(token) if token.kind() == TokenKind::Number => {
                let line = token.as_int().max(1) as u32;
                entry.scanner.set_line(line.saturating_sub(1));
            }
            _ => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("expected a line number after '#line'".into()),
                )?;
                entry.scanner.skip_rest_of_line()?;
                return Ok(Flow::Continue);
            }
        }
        if let Some(token) = entry.scanner.next_token_on_line()? {
            if token.kind() == TokenKind::String {
                entry.scanner.set_file_name(token.text());
            } else {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("expected a file name string after '#line N'".into()),
                )?;
            }
        }
        Ok(Flow::Continue)
    }

    fn directive_error(&mut self, entry: &mut Include) -> Result<Flow> {
        let message = entry.scanner.parse_rest_of_line()?;
        self.err_at(&entry.scanner, Error::Semantic(format!("#error: {message}")))?;
        Ok(Flow::Continue)
    }

    fn directive_warning(&mut self, entry: &mut Include) -> Result<Flow> {
        let message = entry.scanner.parse_rest_of_line()?;
        self.warn_at(&entry.scanner, &format!("#warning: {message}"));
        Ok(Flow::Continue)
    }

    /// `#pragma once`, `#pragma warning:(enable|disable)`, either bare
    /// or wrapped as `#pragma(...)`. Unknown pragmas warn.
    fn directive_pragma(&mut self, entry: &mut Include) -> Result<Flow> {
        let mut first = match entry.scanner.next_token_on_line()? {
            Some(token) => token,
            None => {
                self.warn_at(&entry.scanner, "empty #pragma");
                return Ok(Flow::Continue);
            }
        };
        if first.is_punct(Punct::OpenParen) {
            first = match entry.scanner.next_token_on_line()? {
                Some(token) => token,
                None => {
                    self.warn_at(&entry.scanner, "empty #pragma");
                    return Ok(Flow::Continue);
                }
            };
        }

        match first.text() {
            "once" => {
                if self.scan_count(entry.scanner.file_name()) > 1 {
                    entry.scanner.skip_to_end();
                    return Ok(Flow::Continue);
                }
            }
            "warning" => {
                if !entry.scanner.check_punct(Punct::Colon)? {
                    self.warn_at(&entry.scanner, "expected ':' after '#pragma warning'");
                } else {
                    match entry.scanner.next_token_on_line()? {
                        Some(mode) if mode.text() == "enable" => {
                            let flags = entry.scanner.flags() & !ScanFlags::NO_WARNINGS;
                            entry.scanner.set_flags(flags);
                        }
                        Some(mode) if mode.text() == "disable" => {
                            let flags = entry.scanner.flags() | ScanFlags::NO_WARNINGS;
                            entry.scanner.set_flags(flags);
                        }
                        _ => self.warn_at(
                            &entry.scanner,
                            "expected 'enable' or 'disable' after '#pragma warning:'",
                        ),
                    }
                }
            }
            other => {
                self.warn_at(&entry.scanner, &format!("unknown #pragma '{other}'"));
            }
        }
        entry.scanner.skip_rest_of_line()?;
        Ok(Flow::Continue)
    }

    /// `$eval(expr)`, `$evalint(expr)`, `$evalfloat(expr)`: the numeric
    /// result is emitted into the output.
    pub(crate) fn dollar_directive(&mut self, entry: &mut Include) -> Result<Flow> {
        let name = match entry.scanner.next_token_on_line()? {
            Some(token) => token,
            None => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar("found '$' without a directive name".into()),
                )?;
                return Ok(Flow::Continue);
            }
        };

        let eval_flags = match name.text() {
            "eval" => EvalFlags::DETECT_TYPE,
            "evalint" => EvalFlags::FORCE_INT,
            "evalfloat" => EvalFlags::FORCE_FLOAT,
            other => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("unknown '$' directive '${other}'")),
                )?;
                return Ok(Flow::Continue);
            }
        } | EvalFlags::ALLOW_MATH_FUNCS
            | EvalFlags::ALLOW_MATH_CONSTS;

        // Collect the balanced parenthesized expression, parens
        // included.
        let mut tokens = Vec::new();
        match entry.scanner.next_token()? {
            Some(token) if token.is_punct(Punct::OpenParen) => tokens.push(token),
            _ => {
                self.err_at(
                    &entry.scanner,
                    Error::Grammar(format!("expected '(' after '${}'", name.text())),
                )?;
                return Ok(Flow::Continue);
            }
        }
        let mut depth = 1u32;
        while depth > 0 {
            match entry.scanner.next_token()? {
                Some(token) => {
                    match token.punct() {
                        Punct::OpenParen => depth += 1,
                        Punct::CloseParen => depth -= 1,
                        _ => {}
                    }
                    tokens.push(token);
                }
                None => {
                    self.err_at(
                        &entry.scanner,
                        Error::Grammar(format!("missing ')' after '${}'", name.text())),
                    )?;
                    return Ok(Flow::Continue);
                }
            }
        }

        match ExprEvaluator::new(eval_flags)
            .with_macros(&self.macros)
            .evaluate(&tokens)
        {
            Ok(value) => {
                let token = value.render(eval_flags);
                self.emit_token(&token);
            }
            Err(err) => self.err_at(&entry.scanner, err)?,
        }
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> String {
        Preprocessor::new(PpFlags::empty())
            .process_buffer(source, "test")
            .unwrap()
    }

    #[test]
    fn test_define_object_like() {
        assert_eq!(run("#define GREETING \"hi\"\nGREETING"), "\"hi\"");
    }

    #[test]
    fn test_define_body_paren_after_whitespace() {
        // A space before '(' makes the parenthesis part of the body.
        assert_eq!(run("#define P (1)\nP"), "(1)");
    }

    #[test]
    fn test_define_line_continuation() {
        assert_eq!(run("#define LONG 1 + \\\n2\nLONG"), "1 + 2");
    }

    #[test]
    fn test_define_continuation_before_body() {
        assert_eq!(run("#define N \\\n3\n$eval(N)"), "3");
    }

    #[test]
    fn test_undef() {
        assert_eq!(run("#define X 1\n#undef X\nX"), "X");
    }

    #[test]
    fn test_redefinition_warns_when_asked() {
        let mut pp = Preprocessor::new(PpFlags::WARN_MACRO_REDEFINITIONS | PpFlags::NO_WARNINGS);
        pp.process_buffer("#define X 1\n#define X 2\nX", "test")
            .unwrap();
        assert_eq!(pp.warning_count(), 1);
    }

    #[test]
    fn test_redefinition_silent_by_default() {
        let mut pp = Preprocessor::new(PpFlags::empty());
        let out = pp.process_buffer("#define X 1\n#define X 2\nX", "test").unwrap();
        assert_eq!(out, "2");
        assert_eq!(pp.warning_count(), 0);
    }

    #[test]
    fn test_unknown_directive_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#bogus", "test").is_err());
    }

    #[test]
    fn test_hash_eval_suggests_dollar() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS | PpFlags::NO_FATAL_ERRORS);
        pp.process_buffer("#eval(1)", "test").unwrap();
        assert!(pp.error_count() >= 1);
    }

    #[test]
    fn test_dollar_eval() {
        assert_eq!(run("$eval(1 + 2)"), "3");
    }

    #[test]
    fn test_dollar_eval_float_detection() {
        assert_eq!(run("$eval(2 * cos(0))"), "2.00000000000000000000");
    }

    #[test]
    fn test_dollar_evalint_truncates() {
        assert_eq!(run("$evalint(7.9)"), "7");
    }

    #[test]
    fn test_dollar_evalfloat_widens() {
        assert_eq!(run("$evalfloat(2)"), "2.00000000000000000000");
    }

    #[test]
    fn test_dollar_disabled() {
        let mut pp = Preprocessor::new(PpFlags::NO_DOLLAR_PREPROC);
        let out = pp.process_buffer("$ x", "test").unwrap();
        assert_eq!(out, "$x");
    }

    #[test]
    fn test_dollar_eval_across_lines() {
        assert_eq!(run("$eval(1 +\n2)"), "3");
    }

    #[test]
    fn test_if_with_defined() {
        let out = run("#define FOO 1\n#if defined(FOO)\nY\n#else\nN\n#endif");
        assert_eq!(out, "Y");
    }

    #[test]
    fn test_if_undefined_name_is_zero() {
        assert_eq!(run("#if NOPE\nY\n#else\nN\n#endif"), "N");
    }

    #[test]
    fn test_if_line_continuation() {
        assert_eq!(run("#if 1 + \\\n1\nY\n#endif"), "Y");
    }

    #[test]
    fn test_error_directive() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#error broken build", "test").is_err());
        assert_eq!(pp.error_count(), 1);
    }

    #[test]
    fn test_warning_directive() {
        let mut pp = Preprocessor::new(PpFlags::NO_WARNINGS);
        pp.process_buffer("#warning check this\n#warn and this", "test")
            .unwrap();
        assert_eq!(pp.warning_count(), 2);
    }

    #[test]
    fn test_error_directive_skipped_in_dead_branch() {
        let out = run("#if 0\n#error never\n#endif\nok");
        assert_eq!(out, "ok");
    }

    #[test]
    fn test_unknown_pragma_warns() {
        let mut pp = Preprocessor::new(PpFlags::NO_WARNINGS);
        pp.process_buffer("#pragma mystery", "test").unwrap();
        assert_eq!(pp.warning_count(), 1);
    }

    #[test]
    fn test_pragma_parenthesized() {
        let mut pp = Preprocessor::new(PpFlags::NO_WARNINGS);
        pp.process_buffer("#pragma(mystery)", "test").unwrap();
        assert_eq!(pp.warning_count(), 1);
    }

    #[test]
    fn test_pragma_warning_toggle() {
        // Disabled warnings keep counting but are not forwarded; the
        // nested comment after re-enable still warns.
        let mut pp = Preprocessor::new(PpFlags::empty());
        let source = "#pragma warning:disable\n/* /* */\n#pragma warning:enable\n";
        pp.process_buffer(source, "test").unwrap();
        assert_eq!(pp.warning_count(), 1);
    }

    #[test]
    fn test_line_directive() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        let result = pp.process_buffer("#line 100 \"other\"\n#error here", "test");
        assert!(result.is_err());
        // The #error reports at the overridden location; reaching it at
        // all proves #line parsed.
        assert_eq!(pp.error_count(), 1);
    }

    #[test]
    fn test_include_disabled() {
        let mut pp = Preprocessor::new(PpFlags::NO_INCLUDES | PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#include \"x\"", "test").is_err());
    }

    #[test]
    fn test_missing_include_is_error() {
        let mut pp = Preprocessor::new(PpFlags::NO_ERRORS);
        assert!(pp
            .process_buffer("#include \"no_such_file_anywhere.h\"", "test")
            .is_err());
    }

    #[test]
    fn test_base_include_disabled() {
        let mut pp = Preprocessor::new(PpFlags::NO_BASE_INCLUDES | PpFlags::NO_ERRORS);
        assert!(pp.process_buffer("#include <stdio.h>", "test").is_err());
    }
}
