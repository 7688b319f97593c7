//! The two rule engines: per-line and whole-file.

pub mod file_rules;
pub mod line_rules;

use crate::classify::LineMeta;
use crate::config::LintOptions;
use crate::context::AnalysisContext;
use crate::diagnostic::Diagnostic;
use crate::loader::SourceScript;

/// Runs both engines over a classified script and returns the raw,
/// unfiltered findings.
pub fn analyze(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    options: &LintOptions,
) -> Vec<Diagnostic> {
    let mut diags = line_rules::evaluate(script, metas, options);
    diags.extend(file_rules::evaluate(script, metas, ctx));
    diags
}
