//! Diagnostics and final report ordering.

use std::collections::HashSet;

use crate::catalog::Rule;

/// A single finding: a rule violated on a specific line.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// 1-based line the finding is tied to.
    pub line_number: usize,
    /// The violated rule.
    pub rule: &'static Rule,
    /// Optional note with line-specific detail.
    pub context: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic without a context note.
    pub fn new(line_number: usize, rule: &'static Rule) -> Diagnostic {
        Diagnostic { line_number, rule, context: None }
    }

    /// Creates a diagnostic with a context note.
    pub fn with_context(
        line_number: usize,
        rule: &'static Rule,
        context: impl Into<String>,
    ) -> Diagnostic {
        Diagnostic {
            line_number,
            rule,
            context: Some(context.into()),
        }
    }

    /// The rule's stable code.
    pub fn code(&self) -> &'static str {
        self.rule.code
    }
}

/// Deduplicates `(line, code)` pairs (first occurrence wins) and sorts:
/// line ascending, severity rank descending, code ascending.
pub fn finalize(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen: HashSet<(usize, &'static str)> = HashSet::new();
    let mut unique: Vec<Diagnostic> = diagnostics
        .into_iter()
        .filter(|d| seen.insert((d.line_number, d.code())))
        .collect();
    unique.sort_by(|a, b| {
        a.line_number
            .cmp(&b.line_number)
            .then(b.rule.severity.rank().cmp(&a.rule.severity.rank()))
            .then(a.code().cmp(b.code()))
    });
    unique
}
