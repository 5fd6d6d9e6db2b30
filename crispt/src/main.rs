//! crispt - Command-line front end for the crisp preprocessor.
//!
//! Reads one source file, runs the preprocessor over it, and writes the
//! flattened minified token stream to stdout or a file.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crisp_lex::ScanFlags;
use crisp_pp::{PpFlags, Preprocessor};

/// Preprocess a C-like source file.
#[derive(Parser, Debug)]
#[command(name = "crispt")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Macro-expanding preprocessor for C-like source", long_about = None)]
struct Cli {
    /// Input file.
    input: PathBuf,

    /// Output file (default: stdout).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory searched by #include <...>; may be repeated.
    #[arg(short = 'I', long = "include-dir")]
    include_dirs: Vec<PathBuf>,

    /// Macro definition, NAME or NAME=VALUE; may be repeated.
    #[arg(short = 'D', long = "define")]
    defines: Vec<String>,

    /// Output column hint; a newline follows the first ';' past it.
    #[arg(long, default_value_t = 128)]
    line_hint: usize,

    /// Report errors but keep preprocessing.
    #[arg(short, long)]
    keep_going: bool,

    /// Suppress warnings.
    #[arg(short = 'w', long)]
    no_warnings: bool,

    /// Disable the $eval/$evalint/$evalfloat extensions.
    #[arg(long)]
    no_dollar: bool,

    /// Disable #include handling.
    #[arg(long)]
    no_includes: bool,

    /// Warn when a macro is redefined.
    #[arg(long)]
    warn_redefinitions: bool,

    /// Recognize 1.#INF-style float exceptions and IPv4 tokens.
    #[arg(long)]
    permissive_numbers: bool,

    /// Enable verbose logging.
    #[arg(short, long, env = "CRISPT_VERBOSE")]
    verbose: bool,
}

/// Routes preprocessor diagnostics into `tracing`.
struct TracingReport;

impl crisp_pp::Report for TracingReport {
    fn error(&mut self, message: &str, fatal: bool) {
        if fatal {
            tracing::error!(fatal = true, "{message}");
        } else {
            tracing::error!("{message}");
        }
    }

    fn warning(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut pp = Preprocessor::new(pp_flags(&cli));
    pp.set_report(Box::new(TracingReport));
    pp.set_line_hint(cli.line_hint);
    if cli.permissive_numbers {
        pp.set_scan_flags(ScanFlags::ALLOW_FLOAT_EXCEPTIONS | ScanFlags::ALLOW_IP_ADDRESSES);
    }
    for dir in &cli.include_dirs {
        pp.add_search_path(dir);
    }
    for define in &cli.defines {
        pp.define(define)
            .with_context(|| format!("invalid definition '{define}'"))?;
    }

    tracing::debug!(input = %cli.input.display(), "preprocessing");
    let output = pp
        .process_file(&cli.input)
        .with_context(|| format!("failed to preprocess '{}'", cli.input.display()))?;

    match &cli.output {
        Some(path) => std::fs::write(path, output.as_bytes())
            .with_context(|| format!("failed to write '{}'", path.display()))?,
        None => println!("{output}"),
    }

    tracing::debug!(
        errors = pp.error_count(),
        warnings = pp.warning_count(),
        "done"
    );
    if pp.error_count() > 0 {
        bail!("{} error(s) reported", pp.error_count());
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn pp_flags(cli: &Cli) -> PpFlags {
    let mut flags = PpFlags::empty();
    if cli.keep_going {
        flags |= PpFlags::NO_FATAL_ERRORS;
    }
    if cli.no_warnings {
        flags |= PpFlags::NO_WARNINGS;
    }
    if cli.no_dollar {
        flags |= PpFlags::NO_DOLLAR_PREPROC;
    }
    if cli.no_includes {
        flags |= PpFlags::NO_INCLUDES;
    }
    if cli.warn_redefinitions {
        flags |= PpFlags::WARN_MACRO_REDEFINITIONS;
    }
    flags
}
