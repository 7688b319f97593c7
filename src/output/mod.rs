//! Report formatters for the CLI layer.

pub mod json;
pub mod pretty;

use std::path::Path;

use crate::diagnostic::Diagnostic;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable colored text.
    Pretty,
    /// Machine-readable JSON.
    Json,
}

/// One file's diagnostics, ready for formatting.
pub struct FileReport<'a> {
    /// Path of the linted script.
    pub path: &'a Path,
    /// Final, ordered diagnostics.
    pub diagnostics: &'a [Diagnostic],
}

/// Formats a report in the requested format.
pub fn format_report(report: &FileReport<'_>, format: OutputFormat) -> String {
    match format {
        OutputFormat::Pretty => pretty::format(report),
        OutputFormat::Json => json::format(report),
    }
}
