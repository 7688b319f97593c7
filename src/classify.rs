//! Line classification and inline suppression directives.
//!
//! Classification is a pure function over the decoded lines: each line is a
//! blank, a comment (`REM` or `::`), a label, or code. Comment lines are also
//! scanned for `LINT:IGNORE` directives:
//!
//! - `REM LINT:IGNORE [codes]` suppresses the **next** non-blank line.
//! - `REM LINT:IGNORE-LINE [codes]` suppresses its **own** line and, when the
//!   comment carries nothing but the directive, the next non-blank line too.
//! - `:: LINT:IGNORE…` is accepted as an alternative comment marker.
//! - An empty code list suppresses every rule on the target line.

use std::sync::LazyLock;

use regex::Regex;

use crate::loader::SourceScript;

/// What a line is, for rule-evaluation purposes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    /// Only whitespace.
    Blank,
    /// `REM …` or `:: …` (including decorative `:::::` separators).
    Comment(CommentStyle),
    /// `:name` label definition; the name is stored lowercased.
    Label(String),
    /// Anything else.
    Code,
}

/// Which comment marker introduced a comment line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// `REM` keyword.
    Rem,
    /// Double colon.
    DoubleColon,
}

/// Per-line classification plus the suppressions that apply to it.
#[derive(Debug, Clone)]
pub struct LineMeta {
    /// Line kind.
    pub kind: LineKind,
    /// True when a directive with an empty code list covers this line.
    pub suppress_all: bool,
    /// Rule codes suppressed on this line (uppercased).
    pub suppressed_codes: Vec<String>,
}

impl LineMeta {
    /// True when `code` must not be reported on this line.
    pub fn suppresses(&self, code: &str) -> bool {
        self.suppress_all || self.suppressed_codes.iter().any(|c| c == code)
    }

    /// True for `REM` and `::` lines.
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, LineKind::Comment(_))
    }
}

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bLINT:IGNORE(-LINE)?\b[ \t]*([A-Za-z0-9_, \t]*)").unwrap()
});

/// Classifies every line of `script` and resolves suppression directives.
///
/// The returned vector is index-aligned with `script.lines`.
pub fn classify(script: &SourceScript) -> Vec<LineMeta> {
    let mut metas: Vec<LineMeta> = script
        .lines
        .iter()
        .map(|line| LineMeta {
            kind: classify_line(&line.text),
            suppress_all: false,
            suppressed_codes: Vec::new(),
        })
        .collect();

    // Directive carried forward to the next non-blank line:
    // (suppress_all, codes).
    let mut pending: Option<(bool, Vec<String>)> = None;

    for i in 0..script.lines.len() {
        let text = script.lines[i].text.clone();
        let is_blank = matches!(metas[i].kind, LineKind::Blank);

        if !is_blank {
            if let Some((all, codes)) = pending.take() {
                apply(&mut metas[i], all, &codes);
            }
        }

        if metas[i].is_comment() {
            if let Some((same_line, all, codes)) = parse_directive(&text) {
                if same_line {
                    apply(&mut metas[i], all, &codes);
                    // A comment that is nothing but the directive has no
                    // diagnostics of its own; the author means the line the
                    // directive precedes.
                    if directive_is_whole_comment(&text) {
                        pending = Some((all, codes));
                    }
                } else {
                    pending = Some((all, codes));
                }
            }
        }
    }

    metas
}

fn apply(meta: &mut LineMeta, all: bool, codes: &[String]) {
    if all {
        meta.suppress_all = true;
    }
    meta.suppressed_codes.extend(codes.iter().cloned());
}

/// Returns `(applies_to_same_line, suppress_all, codes)` when the comment
/// carries a directive.
fn parse_directive(text: &str) -> Option<(bool, bool, Vec<String>)> {
    let caps = DIRECTIVE.captures(text)?;
    let same_line = caps.get(1).is_some();
    let codes: Vec<String> = caps
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or("")
        .split([' ', '\t', ','])
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_uppercase())
        .collect();
    let all = codes.is_empty();
    Some((same_line, all, codes))
}

fn directive_is_whole_comment(text: &str) -> bool {
    let body = comment_body(text);
    body.to_ascii_uppercase().starts_with("LINT:IGNORE")
}

/// The comment text after its `REM` or `::` marker, trimmed.
pub fn comment_body(text: &str) -> &str {
    let trimmed = text.trim_start();
    if let Some(rest) = trimmed.strip_prefix("::") {
        return rest.trim();
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower == "rem" {
        return "";
    }
    if lower.starts_with("rem ") || lower.starts_with("rem\t") {
        return trimmed[4..].trim();
    }
    trimmed
}

fn classify_line(text: &str) -> LineKind {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with("::") {
        return LineKind::Comment(CommentStyle::DoubleColon);
    }
    let lower = trimmed.to_ascii_lowercase();
    // @REM is as much a comment as REM.
    let lower = lower.strip_prefix('@').unwrap_or(&lower);
    if lower == "rem" || lower.starts_with("rem ") || lower.starts_with("rem\t") {
        return LineKind::Comment(CommentStyle::Rem);
    }
    if let Some(rest) = trimmed.strip_prefix(':') {
        // Decorative separators like ::::: carry no identifier; treat them as
        // comments rather than labels.
        if !rest.chars().any(|c| c.is_ascii_alphanumeric()) {
            return LineKind::Comment(CommentStyle::DoubleColon);
        }
        let name: String = rest
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_ascii_lowercase();
        if !name.is_empty() {
            return LineKind::Label(name);
        }
    }
    LineKind::Code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn classify_text(text: &str) -> Vec<LineMeta> {
        let script = SourceScript::from_bytes(Path::new("t.cmd"), text.as_bytes()).unwrap();
        classify(&script)
    }

    #[test]
    fn kinds_are_detected() {
        let metas = classify_text("@ECHO OFF\r\n\r\nREM note\r\n:: note\r\n:start\r\nECHO hi\r\n");
        assert_eq!(metas[0].kind, LineKind::Code);
        assert_eq!(metas[1].kind, LineKind::Blank);
        assert_eq!(metas[2].kind, LineKind::Comment(CommentStyle::Rem));
        assert_eq!(metas[3].kind, LineKind::Comment(CommentStyle::DoubleColon));
        assert_eq!(metas[4].kind, LineKind::Label("start".into()));
        assert_eq!(metas[5].kind, LineKind::Code);
    }

    #[test]
    fn ignore_applies_to_next_nonblank_line() {
        let metas = classify_text("REM LINT:IGNORE E009\r\n\r\nECHO \"\r\n");
        assert!(metas[2].suppresses("E009"));
        assert!(!metas[2].suppresses("E002"));
    }

    #[test]
    fn ignore_line_directive_covers_following_line_too() {
        let metas = classify_text("@ECHO OFF\r\nREM LINT:IGNORE-LINE E009\r\nECHO \"\r\n");
        assert!(metas[1].suppresses("E009"));
        assert!(metas[2].suppresses("E009"));
    }

    #[test]
    fn empty_code_list_suppresses_everything() {
        let metas = classify_text(":: LINT:IGNORE\r\nGOTO nowhere\r\n");
        assert!(metas[1].suppress_all);
    }

    #[test]
    fn decorative_labels_are_comments() {
        let metas = classify_text(":::::::::::\r\n:real_label\r\n");
        assert!(metas[0].is_comment());
        assert_eq!(metas[1].kind, LineKind::Label("real_label".into()));
    }
}
