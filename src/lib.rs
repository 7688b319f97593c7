//! # batlint
//!
//! Static analyzer for Windows command-interpreter scripts (`.bat` / `.cmd`).
//!
//! `batlint` reads a script, detects its encoding and line endings, and runs
//! a catalog of 137 rules across five severities (Error, Warning, Style,
//! Security, Performance), producing line-anchored diagnostics. It never
//! executes or modifies the scripts it analyzes.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::path::Path;
//! use batlint::{lint, config::LintOptions};
//!
//! let options = LintOptions::default();
//! let diagnostics = lint(Path::new("deploy.bat"), &options)?;
//! for d in &diagnostics {
//!     println!("line {}: {} ({})", d.line_number, d.rule.name, d.code());
//! }
//! # Ok::<(), batlint::loader::LoadError>(())
//! ```
//!
//! ## Architecture
//!
//! The crate is a pipeline:
//!
//! 1. **[`loader`]** — bytes to decoded, line-indexed text (encoding and
//!    line-ending detection).
//! 2. **[`classify`]** — blank/comment/label/code classification and
//!    `LINT:IGNORE` suppression directives.
//! 3. **[`lexical`]** — quote-aware tokenizing, paren balance, percent-tilde
//!    and `SET /A` validation shared by the engines.
//! 4. **[`catalog`]** — the immutable rule table.
//! 5. **[`engine`]** — the per-line and whole-file rule passes over an
//!    [`context::AnalysisContext`].
//! 6. **[`calls`]** — optional CALL following that imports variable
//!    definitions from called scripts.
//! 7. **[`config`]** — options, the config file, and the suppression gate.
//! 8. **[`diagnostic`]** — ordering and deduplication of the final report.
//!
//! Analysis of a single script is sequential and owns all of its state, so
//! callers may lint many scripts concurrently; the rule catalog is the only
//! shared data and it is read-only.

pub mod calls;
pub mod catalog;
pub mod classify;
pub mod config;
pub mod context;
pub mod diagnostic;
pub mod engine;
pub mod lexical;
pub mod loader;
pub mod output;

use std::collections::HashSet;
use std::path::Path;

use config::LintOptions;
use context::AnalysisContext;
use diagnostic::Diagnostic;
use loader::{LoadError, SourceScript};

/// Lints the script at `path` and returns its ordered diagnostics.
///
/// Load problems (missing file, oversize, undecodable) come back as a
/// [`LoadError`]; they never surface as diagnostics. An empty file yields an
/// empty report.
pub fn lint(path: &Path, options: &LintOptions) -> Result<Vec<Diagnostic>, LoadError> {
    let script = SourceScript::load(path, options.max_file_size)?;
    Ok(lint_script(&script, options))
}

/// Lints an already-loaded script.
pub fn lint_script(script: &SourceScript, options: &LintOptions) -> Vec<Diagnostic> {
    if script.lines.is_empty() {
        return Vec::new();
    }

    let metas = classify::classify(script);
    let mut ctx = AnalysisContext::build(script, &metas);

    let mut raw = Vec::new();
    if options.follow_calls {
        let mut visited: HashSet<std::path::PathBuf> = HashSet::new();
        let own = script
            .path
            .canonicalize()
            .unwrap_or_else(|_| script.path.clone());
        visited.insert(own);
        raw.extend(calls::follow_calls(
            script,
            &mut ctx,
            options.max_file_size,
            &mut visited,
        ));
    }

    raw.extend(engine::analyze(script, &metas, &ctx, options));

    diagnostic::finalize(config::gate(raw, options, &metas))
}
