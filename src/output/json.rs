//! JSON report formatter.

use crate::output::FileReport;

#[derive(serde::Serialize)]
struct JsonReport<'a> {
    file: String,
    generated_at: String,
    issue_count: usize,
    diagnostics: Vec<JsonDiagnostic<'a>>,
}

#[derive(serde::Serialize)]
struct JsonDiagnostic<'a> {
    line: usize,
    code: &'a str,
    severity: crate::catalog::Severity,
    name: &'a str,
    explanation: &'a str,
    recommendation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a str>,
}

/// Formats one file's diagnostics as a pretty-printed JSON document.
pub fn format(report: &FileReport<'_>) -> String {
    let document = JsonReport {
        file: report.path.display().to_string(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        issue_count: report.diagnostics.len(),
        diagnostics: report
            .diagnostics
            .iter()
            .map(|d| JsonDiagnostic {
                line: d.line_number,
                code: d.code(),
                severity: d.rule.severity,
                name: d.rule.name,
                explanation: d.rule.explanation,
                recommendation: d.rule.recommendation,
                context: d.context.as_deref(),
            })
            .collect(),
    };
    serde_json::to_string_pretty(&document).unwrap_or_else(|_| "{}".to_string())
}
