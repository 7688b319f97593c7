//! Human-readable colored text formatter.

use colored::Colorize;

use crate::catalog::Severity;
use crate::output::FileReport;

/// Formats one file's diagnostics as ANSI-colored text: a header, one line
/// per finding (severity, code, line, name), dimmed context notes, and a
/// per-severity count line.
pub fn format(report: &FileReport<'_>) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "\n{}\n",
        format!("  {}  ", report.path.display()).bold().underline()
    ));

    if report.diagnostics.is_empty() {
        out.push_str(&format!("  {}\n", "No issues found".green()));
        return out;
    }

    for diagnostic in report.diagnostics {
        let severity = severity_tag(diagnostic.rule.severity);
        out.push_str(&format!(
            "  [{severity}] {code:<7} line {line:<5} {name}\n",
            code = diagnostic.code().dimmed(),
            line = diagnostic.line_number,
            name = diagnostic.rule.name,
        ));
        if let Some(context) = &diagnostic.context {
            out.push_str(&format!("            {}\n", context.dimmed()));
        }
    }

    let mut counts = [0usize; 5];
    for diagnostic in report.diagnostics {
        counts[diagnostic.rule.severity.rank() as usize] += 1;
    }
    out.push_str(&format!(
        "\n  {} | {} errors, {} warnings, {} security, {} performance, {} style\n",
        format!("{} issues", report.diagnostics.len()).bold(),
        counts[Severity::Error.rank() as usize],
        counts[Severity::Warning.rank() as usize],
        counts[Severity::Security.rank() as usize],
        counts[Severity::Performance.rank() as usize],
        counts[Severity::Style.rank() as usize],
    ));

    out
}

fn severity_tag(severity: Severity) -> String {
    match severity {
        Severity::Error => "ERROR".red().bold().to_string(),
        Severity::Warning => " WARN".yellow().bold().to_string(),
        Severity::Security => "  SEC".magenta().bold().to_string(),
        Severity::Performance => " PERF".cyan().to_string(),
        Severity::Style => "STYLE".blue().to_string(),
    }
}
