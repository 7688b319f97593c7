//! The call-follower: imports variable definitions from CALLed scripts.
//!
//! With `follow_calls` enabled, each `CALL target.bat` is resolved relative
//! to the calling script, loaded and classified (nothing more), and its
//! variable definitions merged into the caller's context. Imported variables
//! take effect at the caller's CALL line, so undefined-variable checks stay
//! position-aware. Following never introduces diagnostics other than W003
//! for unresolvable targets.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::catalog::known;
use crate::classify;
use crate::context::AnalysisContext;
use crate::diagnostic::Diagnostic;
use crate::loader::SourceScript;

/// Resolves and follows every CALL target of `script`, merging imported
/// definitions into `ctx`. Returns the W003 diagnostics for targets that
/// could not be resolved.
pub fn follow_calls(
    script: &SourceScript,
    ctx: &mut AnalysisContext,
    max_file_size: u64,
    visited: &mut HashSet<PathBuf>,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let base = script.path.parent().map(Path::to_path_buf).unwrap_or_default();
    let targets = ctx.call_targets.clone();

    for (target, call_line) in targets {
        // %~dp0 expands to the script's own directory; anything else dynamic
        // cannot be resolved statically.
        let cleaned = strip_dp0(&target);
        if cleaned.contains('%') || cleaned.contains('!') {
            continue;
        }

        let Some(resolved) = resolve(&base, &cleaned) else {
            diags.push(Diagnostic::with_context(
                call_line,
                known("W003"),
                format!("CALL target '{target}' could not be resolved"),
            ));
            continue;
        };

        let canonical = resolved.canonicalize().unwrap_or_else(|_| resolved.clone());
        if !visited.insert(canonical) {
            continue;
        }

        let Ok(called) = SourceScript::load(&resolved, max_file_size) else {
            diags.push(Diagnostic::with_context(
                call_line,
                known("W003"),
                format!("CALL target '{target}' could not be read"),
            ));
            continue;
        };

        let metas = classify::classify(&called);
        let mut called_ctx = AnalysisContext::build(&called, &metas);

        // The callee may itself CALL further scripts; those definitions are
        // just as visible to the caller after the CALL returns.
        follow_calls(&called, &mut called_ctx, max_file_size, visited);

        for name in called_ctx.variables_defined.keys() {
            merge(ctx, name, call_line);
        }
        for name in called_ctx.external_definitions.keys() {
            merge(ctx, name, call_line);
        }
    }

    diags
}

fn merge(ctx: &mut AnalysisContext, name: &str, call_line: usize) {
    let entry = ctx
        .external_definitions
        .entry(name.to_string())
        .or_insert(call_line);
    *entry = (*entry).min(call_line);
}

fn strip_dp0(target: &str) -> String {
    if target.to_ascii_lowercase().starts_with("%~dp0") {
        target[5..].to_string()
    } else {
        target.to_string()
    }
}

/// Resolves `target` against the caller's directory; extensionless names try
/// `.bat` then `.cmd`.
fn resolve(base: &Path, target: &str) -> Option<PathBuf> {
    let raw = PathBuf::from(target);
    let joined = if raw.is_absolute() { raw } else { base.join(target) };

    if joined.extension().is_some() {
        return joined.is_file().then_some(joined);
    }
    for ext in ["bat", "cmd"] {
        let candidate = joined.with_extension(ext);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}
