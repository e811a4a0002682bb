//! `decafc` driver library (§4.G): wires the `clap` CLI surface to
//! `decaf-sem`'s Namer+Typer pass pair. The out-of-scope lexer/parser means
//! this driver cannot read raw `.decaf` source; instead it deserializes a
//! JSON-encoded `TopLevel` AST, the shape a real parser would hand the
//! analyzer, from a file or stdin.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use decaf_ast::TopLevel;
use decaf_util::diagnostic::{Diagnostic, Level};
use decaf_util::Handler;
use serde::Serialize;

/// `decafc`: runs semantic analysis over a JSON-serialized Decaf AST.
#[derive(Debug, Parser)]
#[command(name = "decafc", about = "Decaf semantic analyzer")]
pub struct Cli {
    /// Path to the JSON-serialized AST, or `-`/omitted for stdin.
    #[arg(long)]
    pub ast: Option<PathBuf>,

    /// Print the scope tree after a successful pass.
    #[arg(long)]
    pub emit_scopes: bool,

    /// Raise log verbosity (`-v` = info, `-vv` = debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Emit diagnostics as JSON lines instead of human-readable text.
    #[arg(long)]
    pub json_diagnostics: bool,
}

/// Maps `-v` repetition to a `log` level, per §4.G.2.
pub fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    }
}

fn wants_stdin(path: Option<&std::path::Path>) -> bool {
    match path {
        None => true,
        Some(p) => p == std::path::Path::new("-"),
    }
}

/// Reads the AST from `cli.ast`, or stdin when absent / `-`.
pub fn load_ast(cli: &Cli) -> Result<TopLevel> {
    let (text, source) = if wants_stdin(cli.ast.as_deref()) {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading AST from stdin")?;
        (buf, "<stdin>".to_string())
    } else {
        let path = cli.ast.as_deref().expect("wants_stdin false implies Some(path)");
        let buf = std::fs::read_to_string(path)
            .with_context(|| format!("reading AST file '{}'", path.display()))?;
        (buf, path.display().to_string())
    };

    serde_json::from_str(&text).with_context(|| format!("parsing AST JSON from {source}"))
}

fn format_diagnostic(diag: &Diagnostic) -> String {
    let level = match diag.level {
        Level::Error => "error",
        Level::Warning => "warning",
        Level::Note => "note",
        Level::Help => "help",
        Level::Bug => "bug",
    };
    match &diag.code {
        Some(code) => format!("{level}[{}]: {} ({}:{})", code.as_str(), diag.message, diag.span.line, diag.span.column),
        None => format!("{level}: {} ({}:{})", diag.message, diag.span.line, diag.span.column),
    }
}

/// A serializable projection of `Diagnostic` for `--json-diagnostics`; the
/// library type itself carries no `Serialize` impl since its primary
/// consumer is human-readable rendering.
#[derive(Serialize)]
struct DiagnosticLine {
    level: &'static str,
    code: Option<String>,
    message: String,
    line: u32,
    column: u32,
}

impl From<&Diagnostic> for DiagnosticLine {
    fn from(diag: &Diagnostic) -> Self {
        let level = match diag.level {
            Level::Error => "error",
            Level::Warning => "warning",
            Level::Note => "note",
            Level::Help => "help",
            Level::Bug => "bug",
        };
        DiagnosticLine {
            level,
            code: diag.code.map(|c| c.as_str()),
            message: diag.message.clone(),
            line: diag.span.line,
            column: diag.span.column,
        }
    }
}

/// Prints diagnostics either as plain text (one per line) or JSON lines.
pub fn report_diagnostics(diagnostics: &[Diagnostic], json: bool) {
    for diag in diagnostics {
        if json {
            let line = DiagnosticLine::from(diag);
            match serde_json::to_string(&line) {
                Ok(s) => println!("{s}"),
                Err(e) => eprintln!("failed to serialize diagnostic: {e}"),
            }
        } else {
            eprintln!("{}", format_diagnostic(diag));
        }
    }
}

/// Runs the full `decafc` pipeline: load AST, analyze, report, return an
/// exit code (`0` clean, `1` if any diagnostic is an error).
pub fn run(cli: &Cli) -> Result<i32> {
    let mut ast = load_ast(cli)?;
    let handler = Handler::new();

    let result = decaf_sem::analyze(&mut ast, &handler);

    let diagnostics = handler.diagnostics();
    report_diagnostics(&diagnostics, cli.json_diagnostics);

    if cli.emit_scopes && result.typed {
        print!("{}", decaf_sem::dump_scopes(&result.symtab));
    }

    Ok(if handler.has_errors() { 1 } else { 0 })
}
