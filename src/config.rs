//! Linting options, the on-disk configuration file, and the suppression /
//! filter gate applied to raw findings.
//!
//! # Configuration file
//!
//! `batlint.toml` in the working directory (or an explicit path), with
//! `[general]` and `[rules]` tables. Rule lists are comma-separated strings
//! so they read the same way they are passed on a command line:
//!
//! ```toml
//! [general]
//! recursive = true
//! show_summary = false
//! max_line_length = 100
//! follow_calls = false
//! min_severity = "WARNING"
//!
//! [rules]
//! enabled_rules = ""
//! disabled_rules = "S007,S013"
//! ```
//!
//! Command-line flags override file settings. A missing or malformed file
//! falls back to defaults (with a warning on stderr for the malformed case).

use std::collections::HashSet;
use std::path::Path;

use crate::catalog::Severity;
use crate::classify::LineMeta;
use crate::diagnostic::Diagnostic;
use crate::loader::DEFAULT_MAX_FILE_SIZE;

/// Default name of the on-disk configuration file.
pub const CONFIG_FILE_NAME: &str = "batlint.toml";

/// Options controlling one lint run.
///
/// `recursive` and `show_summary` belong to the CLI discovery/reporting
/// layer; they ride along here so one file configures everything.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Maximum allowed line length for S011/S020.
    pub max_line_length: usize,
    /// When `Some`, only these rule codes may fire.
    pub enabled_rules: Option<HashSet<String>>,
    /// Rules that never fire; overrides `enabled_rules`.
    pub disabled_rules: HashSet<String>,
    /// Drop findings below this severity.
    pub min_severity: Option<Severity>,
    /// Follow CALLed scripts and import their variable definitions.
    pub follow_calls: bool,
    /// Recurse into subdirectories when linting a directory.
    pub recursive: bool,
    /// Print the aggregate summary after per-file output.
    pub show_summary: bool,
    /// Input size ceiling in bytes.
    pub max_file_size: u64,
}

impl Default for LintOptions {
    fn default() -> Self {
        LintOptions {
            max_line_length: 100,
            enabled_rules: None,
            disabled_rules: HashSet::new(),
            min_severity: None,
            follow_calls: false,
            recursive: true,
            show_summary: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl LintOptions {
    /// True when `code` may produce findings. Disabled rules override the
    /// enabled set.
    pub fn is_rule_enabled(&self, code: &str) -> bool {
        if self.disabled_rules.contains(code) {
            return false;
        }
        match &self.enabled_rules {
            Some(enabled) => enabled.contains(code),
            None => true,
        }
    }

    /// True when findings of `severity` pass the minimum-severity filter.
    pub fn includes_severity(&self, severity: Severity) -> bool {
        match self.min_severity {
            Some(min) => severity.rank() >= min.rank(),
            None => true,
        }
    }
}

/// Applies the configuration filters and inline suppressions to raw
/// findings. `metas` is index-aligned with the script's lines.
pub fn gate(
    diagnostics: Vec<Diagnostic>,
    options: &LintOptions,
    metas: &[LineMeta],
) -> Vec<Diagnostic> {
    diagnostics
        .into_iter()
        .filter(|d| options.is_rule_enabled(d.code()))
        .filter(|d| options.includes_severity(d.rule.severity))
        .filter(|d| match metas.get(d.line_number.saturating_sub(1)) {
            Some(meta) => !meta.suppresses(d.code()),
            None => true,
        })
        .collect()
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct ConfigFile {
    general: GeneralSection,
    rules: RulesSection,
}

#[derive(Debug, serde::Deserialize)]
#[serde(default)]
struct GeneralSection {
    recursive: bool,
    show_summary: bool,
    max_line_length: usize,
    follow_calls: bool,
    min_severity: Option<String>,
}

impl Default for GeneralSection {
    fn default() -> Self {
        GeneralSection {
            recursive: true,
            show_summary: false,
            max_line_length: 100,
            follow_calls: false,
            min_severity: None,
        }
    }
}

#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
struct RulesSection {
    enabled_rules: String,
    disabled_rules: String,
}

/// Loads options from a configuration file.
///
/// Resolution: an explicit `path` wins; otherwise `batlint.toml` in the
/// current directory; otherwise defaults. With `use_config` false the file
/// is ignored entirely. Parse failures warn on stderr and fall back to
/// defaults rather than aborting the run.
pub fn load(path: Option<&Path>, use_config: bool) -> LintOptions {
    if !use_config {
        return LintOptions::default();
    }
    let candidate = path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| Path::new(CONFIG_FILE_NAME).to_path_buf());
    let Ok(content) = std::fs::read_to_string(&candidate) else {
        return LintOptions::default();
    };
    let parsed: ConfigFile = match toml::from_str(&content) {
        Ok(parsed) => parsed,
        Err(error) => {
            eprintln!("Warning: failed to parse {}: {error}", candidate.display());
            return LintOptions::default();
        }
    };

    let min_severity = parsed.general.min_severity.as_deref().and_then(|name| {
        let severity = Severity::parse(name);
        if severity.is_none() {
            eprintln!("Warning: unknown min_severity '{name}' in config, ignoring");
        }
        severity
    });

    let enabled = parse_csv(&parsed.rules.enabled_rules);
    LintOptions {
        max_line_length: parsed.general.max_line_length,
        enabled_rules: if enabled.is_empty() { None } else { Some(enabled) },
        disabled_rules: parse_csv(&parsed.rules.disabled_rules),
        min_severity,
        follow_calls: parsed.general.follow_calls,
        recursive: parsed.general.recursive,
        show_summary: parsed.general.show_summary,
        max_file_size: DEFAULT_MAX_FILE_SIZE,
    }
}

fn parse_csv(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| code.to_ascii_uppercase())
        .collect()
}

/// Writes a commented default configuration file.
pub fn create_default_file(path: &Path) -> std::io::Result<()> {
    let content = r#"# batlint configuration

[general]
# Recurse into subdirectories when a directory is linted.
recursive = true
# Print the aggregate summary after per-file output.
show_summary = false
# Maximum line length for S011/S020.
max_line_length = 100
# Follow CALLed scripts and import their variable definitions.
follow_calls = false
# Drop findings below this severity. One of:
# STYLE, PERFORMANCE, SECURITY, WARNING, ERROR
# min_severity = "STYLE"

[rules]
# Comma-separated rule codes. An empty enabled list means all rules.
enabled_rules = ""
disabled_rules = ""
"#;
    std::fs::write(path, content)
}
