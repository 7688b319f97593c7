mod cli;

use std::path::{Path, PathBuf};

use batlint::catalog::Severity;
use batlint::config::{self, CONFIG_FILE_NAME};
use batlint::diagnostic::Diagnostic;
use batlint::loader::LoadError;
use batlint::output::{self, FileReport, OutputFormat};
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;
use walkdir::WalkDir;

fn main() {
    let cli = cli::Cli::parse();

    if cli.create_config {
        let target = Path::new(CONFIG_FILE_NAME);
        match config::create_default_file(target) {
            Ok(()) => {
                println!("Wrote {}", target.display());
                std::process::exit(0);
            }
            Err(error) => {
                eprintln!("Error creating configuration file: {error}");
                std::process::exit(2);
            }
        }
    }

    // Clap guarantees the path is present when --create-config is absent.
    let Some(target) = cli.path else {
        eprintln!("Error: no path given");
        std::process::exit(2);
    };
    if !target.exists() {
        eprintln!("Error: path does not exist: {}", target.display());
        std::process::exit(2);
    }

    let mut options = config::load(cli.config.as_deref(), !cli.no_config);
    if let Some(max) = cli.max_line_length {
        options.max_line_length = max;
    }
    if cli.no_recursive {
        options.recursive = false;
    }
    if cli.follow_calls {
        options.follow_calls = true;
    }
    if cli.summary {
        options.show_summary = true;
    }

    let files = discover(&target, options.recursive);
    if files.is_empty() {
        eprintln!(
            "Error: no batch files (.bat or .cmd) found in: {}",
            target.display()
        );
        std::process::exit(2);
    }

    // Each analysis owns its state, so files lint in parallel.
    let mut results: Vec<(PathBuf, Result<Vec<Diagnostic>, LoadError>)> = files
        .par_iter()
        .map(|file| (file.clone(), batlint::lint(file, &options)))
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));

    let mut load_failures = 0usize;
    let mut all: Vec<&Diagnostic> = Vec::new();
    for (file, result) in &results {
        match result {
            Ok(diagnostics) => {
                let report = FileReport { path: file, diagnostics };
                print!("{}", output::format_report(&report, cli.format));
                all.extend(diagnostics.iter());
            }
            Err(error) => {
                eprintln!("Error: {error}");
                load_failures += 1;
            }
        }
    }

    if options.show_summary && cli.format == OutputFormat::Pretty {
        print!("{}", format_summary(&results, &all));
    }

    // 2 when the requested target itself could not be processed, 1 on any
    // Error-severity finding, 0 otherwise.
    if load_failures == results.len() {
        std::process::exit(2);
    }
    let has_errors = all.iter().any(|d| d.rule.severity == Severity::Error);
    std::process::exit(if has_errors { 1 } else { 0 });
}

/// Collects `.bat`/`.cmd` files under `target` (or `target` itself).
fn discover(target: &Path, recursive: bool) -> Vec<PathBuf> {
    if target.is_file() {
        return vec![target.to_path_buf()];
    }
    let depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(target)
        .max_depth(depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension().is_some_and(|ext| {
                ext.eq_ignore_ascii_case("bat") || ext.eq_ignore_ascii_case("cmd")
            })
        })
        .collect();
    files.sort();
    files
}

fn format_summary(
    results: &[(PathBuf, Result<Vec<Diagnostic>, LoadError>)],
    all: &[&Diagnostic],
) -> String {
    let mut out = String::new();
    let processed = results.iter().filter(|(_, r)| r.is_ok()).count();

    out.push_str(&format!(
        "\n{}\n",
        format!("  Summary: {processed} file(s), {} issue(s)", all.len())
            .bold()
            .underline()
    ));

    let mut by_severity = [0usize; 5];
    for diagnostic in all {
        by_severity[diagnostic.rule.severity.rank() as usize] += 1;
    }
    for severity in [
        Severity::Error,
        Severity::Warning,
        Severity::Security,
        Severity::Performance,
        Severity::Style,
    ] {
        let count = by_severity[severity.rank() as usize];
        if count > 0 {
            out.push_str(&format!("  {severity}: {count}\n"));
        }
    }

    // Most common rule, ties broken by code.
    let mut counts: std::collections::HashMap<&str, usize> = std::collections::HashMap::new();
    for diagnostic in all {
        *counts.entry(diagnostic.code()).or_default() += 1;
    }
    let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    if let Some((code, count)) = ranked.first() {
        out.push_str(&format!(
            "  Most common: {} ({count} occurrence(s))\n",
            code.bold()
        ));
    }

    out
}
