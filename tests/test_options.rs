//! Option handling: rule sets, severity filter, line-length limits, and the
//! configuration file.

use batlint::catalog::Severity;
use batlint::config::{self, LintOptions};
use batlint::diagnostic::Diagnostic;

fn lint_with(name: &str, content: &str, options: &LintOptions) -> Vec<Diagnostic> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    batlint::lint(&path, options).unwrap()
}

fn fires(diags: &[Diagnostic], code: &str) -> bool {
    diags.iter().any(|d| d.code() == code)
}

const LONG_LINE_SCRIPT: &str = concat!(
    "@ECHO OFF\r\nREM ",
    // 97 'x' characters, making line 2 exactly 101 characters long.
    "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx",
    "\r\n",
);

#[test]
fn line_over_the_default_limit_fires_s011_and_s020() {
    let diags = lint_with("t.cmd", LONG_LINE_SCRIPT, &LintOptions::default());
    assert!(fires(&diags, "S011"), "{diags:?}");
    assert!(fires(&diags, "S020"), "{diags:?}");
}

#[test]
fn line_at_exactly_the_limit_is_clean() {
    // One character shorter: exactly 100 columns.
    let content = LONG_LINE_SCRIPT.replacen("xx", "x", 1);
    let diags = lint_with("t.cmd", &content, &LintOptions::default());
    assert!(!fires(&diags, "S011"), "{diags:?}");
    assert!(!fires(&diags, "S020"), "{diags:?}");
}

#[test]
fn max_line_length_override_moves_both_rules() {
    let relaxed = LintOptions {
        max_line_length: 120,
        ..LintOptions::default()
    };
    let diags = lint_with("t.cmd", LONG_LINE_SCRIPT, &relaxed);
    assert!(!fires(&diags, "S011"), "{diags:?}");
    assert!(!fires(&diags, "S020"), "{diags:?}");

    let strict = LintOptions {
        max_line_length: 50,
        ..LintOptions::default()
    };
    let diags = lint_with("t.cmd", LONG_LINE_SCRIPT, &strict);
    assert!(fires(&diags, "S011"), "{diags:?}");
    assert!(fires(&diags, "S020"), "{diags:?}");
}

#[test]
fn continuation_caret_exempts_s020_but_not_s011() {
    let content = format!(
        "@ECHO OFF\r\nCOPY \"{}\" target.txt ^\r\n     /Y\r\n",
        "x".repeat(100)
    );
    let diags = lint_with("t.cmd", &content, &LintOptions::default());
    assert!(fires(&diags, "S011"), "{diags:?}");
    assert!(!fires(&diags, "S020"), "{diags:?}");
}

#[test]
fn disabled_rules_are_dropped() {
    let options = LintOptions {
        disabled_rules: ["S011".to_string(), "S020".to_string()].into(),
        ..LintOptions::default()
    };
    let diags = lint_with("t.cmd", LONG_LINE_SCRIPT, &options);
    assert!(!fires(&diags, "S011"), "{diags:?}");
    assert!(!fires(&diags, "S020"), "{diags:?}");
}

#[test]
fn enabled_set_restricts_to_listed_rules() {
    let options = LintOptions {
        enabled_rules: Some(["E002".to_string()].into()),
        ..LintOptions::default()
    };
    let diags = lint_with("t.cmd", "echo off\r\nGOTO nowhere\r\n", &options);
    assert!(fires(&diags, "E002"), "{diags:?}");
    assert!(
        diags.iter().all(|d| d.code() == "E002"),
        "only E002 is enabled: {diags:?}"
    );
}

#[test]
fn min_severity_warning_drops_style_security_and_performance() {
    let options = LintOptions {
        min_severity: Some(Severity::Warning),
        ..LintOptions::default()
    };
    let diags = lint_with(
        "t.cmd",
        "echo off\r\nGOTO nowhere\r\nformat c:\r\n",
        &options,
    );
    assert!(fires(&diags, "E002"), "{diags:?}");
    assert!(!fires(&diags, "S001"), "{diags:?}");
    assert!(!fires(&diags, "S002"), "{diags:?}");
    assert!(!fires(&diags, "SEC003"), "Security ranks below Warning: {diags:?}");
    assert!(diags
        .iter()
        .all(|d| d.rule.severity.rank() >= Severity::Warning.rank()));
}

#[test]
fn config_file_round_trips_through_load() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("batlint.toml");
    std::fs::write(
        &config_path,
        r#"
[general]
recursive = false
show_summary = true
max_line_length = 80
follow_calls = true
min_severity = "WARNING"

[rules]
enabled_rules = "E001,E002,W001"
disabled_rules = "S001, S002 , S003"
"#,
    )
    .unwrap();

    let options = config::load(Some(&config_path), true);
    assert!(!options.recursive);
    assert!(options.show_summary);
    assert!(options.follow_calls);
    assert_eq!(options.max_line_length, 80);
    assert_eq!(options.min_severity, Some(Severity::Warning));
    let enabled = options.enabled_rules.as_ref().unwrap();
    assert!(enabled.contains("E001") && enabled.contains("W001"));
    assert!(options.disabled_rules.contains("S003"));
}

#[test]
fn missing_config_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let options = config::load(Some(&dir.path().join("absent.toml")), true);
    assert_eq!(options.max_line_length, 100);
    assert!(options.recursive);
    assert!(options.enabled_rules.is_none());
}

#[test]
fn no_config_ignores_the_file_entirely() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("batlint.toml");
    std::fs::write(&config_path, "[general]\nmax_line_length = 10\n").unwrap();

    let options = config::load(Some(&config_path), false);
    assert_eq!(options.max_line_length, 100);
}

#[test]
fn default_config_file_parses_back() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("batlint.toml");
    config::create_default_file(&config_path).unwrap();

    let options = config::load(Some(&config_path), true);
    assert_eq!(options.max_line_length, 100);
    assert!(options.recursive);
    assert!(!options.follow_calls);
    assert!(options.enabled_rules.is_none());
    assert!(options.disabled_rules.is_empty());
}

#[test]
fn suppressed_codes_survive_rule_filters_independently() {
    // E009 is suppressed inline while E002 stays live on the same script.
    let content = "@ECHO OFF\r\nREM LINT:IGNORE E009\r\nECHO \"\r\nGOTO nowhere\r\n";
    let diags = lint_with("t.cmd", content, &LintOptions::default());
    assert!(!fires(&diags, "E009"), "{diags:?}");
    assert!(fires(&diags, "E002"), "{diags:?}");
}
