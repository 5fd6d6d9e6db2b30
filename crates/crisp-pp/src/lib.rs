//! crisp-pp - Preprocessor for C-like source.
//!
//! Built on top of the `crisp-lex` scanner, the preprocessor expands
//! object-like, function-like, variadic, and built-in macros, resolves
//! conditional compilation, evaluates constant expressions (also behind
//! the `$eval`/`$evalint`/`$evalfloat` output extensions), resolves
//! nested includes with `#pragma once` semantics, and emits a flattened
//! minified token stream.
//!
//! Module layout:
//! - `macros` - Macro records and the append-only token pool
//! - `eval` - Constant expression evaluation
//! - `preprocessor` - Directive dispatch, expansion, and output

mod eval;
mod macros;
mod preprocessor;

pub use eval::{EvalFlags, ExprEvaluator, MathFn, Value};
pub use macros::{Builtin, Macro, MacroTable};
pub use preprocessor::{PpFlags, Preprocessor};

// The published name-hash used for macro lookup, and the diagnostics
// surface embedders plug into.
pub use crisp_util::{name_hash, Handler, Report};
