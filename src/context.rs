//! Per-run analysis state shared by the two rule engines.
//!
//! An [`AnalysisContext`] is built once per script, consumed by the engines,
//! and discarded with the script. It holds the cross-line bookkeeping the
//! whole-file rules need: label definitions and references, variable
//! definitions and references, SETLOCAL/ENDLOCAL events, and CALL targets.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::classify::{LineKind, LineMeta};
use crate::loader::SourceScript;

/// Environment variables assumed to exist without a SET (the E006 allowlist).
pub const WELL_KNOWN_VARS: &[&str] = &[
    "PATH",
    "TEMP",
    "TMP",
    "USERPROFILE",
    "APPDATA",
    "LOCALAPPDATA",
    "WINDIR",
    "SYSTEMROOT",
    "COMSPEC",
    "HOMEDRIVE",
    "HOMEPATH",
    "USERNAME",
    "COMPUTERNAME",
    "PROCESSOR_ARCHITECTURE",
    "PROCESSOR_IDENTIFIER",
    "NUMBER_OF_PROCESSORS",
    "ERRORLEVEL",
    "RANDOM",
    "DATE",
    "TIME",
    "CD",
    "CMDCMDLINE",
    "CMDEXTVERSION",
    "OS",
    "PATHEXT",
    "PROMPT",
];

/// A SETLOCAL/ENDLOCAL/exit event, in line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeEvent {
    /// `SETLOCAL` with its option flags.
    Setlocal {
        /// Line index.
        line: usize,
        /// `Some(true)` for ENABLEDELAYEDEXPANSION, `Some(false)` for
        /// DISABLEDELAYEDEXPANSION, `None` when unspecified.
        delayed: Option<bool>,
        /// ENABLEEXTENSIONS appeared in the option list.
        extensions: bool,
    },
    /// `ENDLOCAL`.
    Endlocal {
        /// Line index.
        line: usize,
    },
    /// `EXIT`, `EXIT /B`, or `GOTO :EOF` — a script exit point.
    Exit {
        /// Line index.
        line: usize,
    },
}

/// Cross-line state for one script analysis.
#[derive(Debug, Default)]
pub struct AnalysisContext {
    /// Label name (lowercased) to its first defining line.
    pub labels_defined: HashMap<String, usize>,
    /// Re-definitions: `(name, line)` for the second and later occurrences.
    pub duplicate_labels: Vec<(String, usize)>,
    /// `(name, line)` for every GOTO/CALL label reference.
    pub labels_referenced: Vec<(String, usize)>,
    /// Variable name (uppercased) to its earliest defining line.
    pub variables_defined: HashMap<String, usize>,
    /// `(name, line)` for every `%NAME%` / `!NAME!` reference on code lines.
    pub variables_referenced: Vec<(String, usize)>,
    /// SETLOCAL/ENDLOCAL/exit events in line order.
    pub scope_events: Vec<ScopeEvent>,
    /// `(target, line)` for CALLs to external scripts.
    pub call_targets: Vec<(String, usize)>,
    /// Variables imported by the call-follower: name to the caller's CALL
    /// line (their effective definition point).
    pub external_definitions: HashMap<String, usize>,
    /// Any `SET name=value` exists in the script.
    pub has_set_commands: bool,
    /// Any `!var!` reference exists in the script.
    pub uses_delayed_vars: bool,
    /// Any `SETLOCAL ENABLEDELAYEDEXPANSION` exists in the script.
    pub enables_delayed_expansion: bool,
    /// Any literal `!` appears anywhere in the script text.
    pub has_bang_chars: bool,
}

static SET_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*@?set\s+(?:/[pa]\s+)?"?([A-Za-z_][A-Za-z0-9_]*)\s*[+\-*/%&|^]?="#)
        .unwrap()
});
static VAR_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%([A-Za-z_][A-Za-z0-9_]*)(?::[^%]*)?%|!([A-Za-z_][A-Za-z0-9_]*)!").unwrap()
});
static GOTO_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgoto\s+(:?[^\s&]+)").unwrap());
static CALL_LABEL_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bcall\s+:([^\s&]+)").unwrap());
static CALL_SCRIPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*@?call\s+(?:"([^"]+)"|([^:\s][^\s]*))"#).unwrap()
});
static SETLOCAL_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?setlocal\b(.*)$").unwrap());
static EXIT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?(exit\b|goto\s+:eof\b)").unwrap());

/// Commands CALL can target that are not scripts; used to keep the
/// call-target list to actual files.
const CALL_BUILTINS: &[&str] = &[
    "attrib", "cd", "choice", "cls", "copy", "date", "del", "dir", "echo", "find", "findstr",
    "help", "ipconfig", "mkdir", "more", "move", "net", "netstat", "ping", "popd", "powershell",
    "pushd", "reg", "rmdir", "robocopy", "sc", "sort", "taskkill", "tasklist", "time", "timeout",
    "type", "ver", "vol", "wmic", "xcopy",
];

/// True when `name` (lowercased) is a command CALL can run that is not a
/// script or label.
pub fn is_call_builtin(name: &str) -> bool {
    CALL_BUILTINS.contains(&name)
}

/// True when the text at byte offset `start` sits in command position: at
/// the start of the line, after a command separator, after an opening paren,
/// or in the tail of an `IF`/`FOR` line. Keeps `ECHO goto retry` from
/// reading as a GOTO.
fn command_position(text: &str, start: usize) -> bool {
    let prefix = text[..start].trim_end();
    if prefix.is_empty() || prefix.ends_with(['&', '(', '|']) {
        return true;
    }
    let first = prefix
        .trim_start()
        .trim_start_matches('@')
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    matches!(first.as_str(), "if" | "for" | "else")
}

impl AnalysisContext {
    /// Builds the context from classified lines.
    pub fn build(script: &SourceScript, metas: &[LineMeta]) -> AnalysisContext {
        let mut ctx = AnalysisContext::default();

        for (line, meta) in script.lines.iter().zip(metas) {
            if line.text.contains('!') {
                ctx.has_bang_chars = true;
            }

            match &meta.kind {
                LineKind::Label(name) => {
                    if ctx.labels_defined.contains_key(name) {
                        ctx.duplicate_labels.push((name.clone(), line.index));
                    } else {
                        ctx.labels_defined.insert(name.clone(), line.index);
                    }
                    continue;
                }
                LineKind::Blank | LineKind::Comment(_) => continue,
                LineKind::Code => {}
            }

            let text = &line.text;

            if let Some(caps) = SET_DEF.captures(text) {
                let name = caps[1].to_ascii_uppercase();
                ctx.variables_defined.entry(name).or_insert(line.index);
                ctx.has_set_commands = true;
            }

            // %% is a literal percent; blank the pairs out before looking for
            // variable references so `100%%` does not read as a reference.
            let masked = text.replace("%%", "  ");
            for caps in VAR_REF.captures_iter(&masked) {
                let name = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_ascii_uppercase());
                if let Some(name) = name {
                    if caps.get(2).is_some() {
                        ctx.uses_delayed_vars = true;
                    }
                    ctx.variables_referenced.push((name, line.index));
                }
            }

            for caps in GOTO_REF.captures_iter(text) {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                if !command_position(text, start) {
                    continue;
                }
                let target = caps[1].trim_start_matches(':').to_ascii_lowercase();
                // Dynamic targets cannot be resolved statically.
                if !target.is_empty() && !target.contains('%') && !target.contains('!') {
                    ctx.labels_referenced.push((target, line.index));
                }
            }
            for caps in CALL_LABEL_REF.captures_iter(text) {
                let start = caps.get(0).map(|m| m.start()).unwrap_or(0);
                if !command_position(text, start) {
                    continue;
                }
                let target = caps[1].to_ascii_lowercase();
                if !target.contains('%') && !target.contains('!') {
                    ctx.labels_referenced.push((target, line.index));
                }
            }

            if let Some(caps) = CALL_SCRIPT.captures(text) {
                let target = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default();
                let lower = target.to_ascii_lowercase();
                let name_only = lower.rsplit(['\\', '/']).next().unwrap_or(&lower);
                let bare = name_only.split('.').next().unwrap_or(name_only);
                if !target.is_empty() && !CALL_BUILTINS.contains(&bare) {
                    ctx.call_targets.push((target, line.index));
                }
            }

            if let Some(caps) = SETLOCAL_LINE.captures(text) {
                let options = caps[1].to_ascii_lowercase();
                let delayed = if options.contains("enabledelayedexpansion") {
                    ctx.enables_delayed_expansion = true;
                    Some(true)
                } else if options.contains("disabledelayedexpansion") {
                    Some(false)
                } else {
                    None
                };
                ctx.scope_events.push(ScopeEvent::Setlocal {
                    line: line.index,
                    delayed,
                    extensions: options.contains("enableextensions"),
                });
            } else if text.trim().to_ascii_lowercase().trim_start_matches('@') == "endlocal" {
                ctx.scope_events.push(ScopeEvent::Endlocal { line: line.index });
            } else if EXIT_LINE.is_match(text) {
                ctx.scope_events.push(ScopeEvent::Exit { line: line.index });
            }
        }

        ctx
    }

    /// True when `name` (uppercased) counts as defined at `line`, honoring
    /// definition position and call-follower imports.
    pub fn variable_defined_at(&self, name: &str, line: usize) -> bool {
        if WELL_KNOWN_VARS.contains(&name) {
            return true;
        }
        if let Some(&def) = self.variables_defined.get(name) {
            if def <= line {
                return true;
            }
        }
        if let Some(&call_line) = self.external_definitions.get(name) {
            if call_line <= line {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::classify;
    use std::path::Path;

    fn build(text: &str) -> AnalysisContext {
        let script = SourceScript::from_bytes(Path::new("t.cmd"), text.as_bytes()).unwrap();
        let metas = classify(&script);
        AnalysisContext::build(&script, &metas)
    }

    #[test]
    fn labels_and_duplicates() {
        let ctx = build(":start\r\nGOTO start\r\n:start\r\n");
        assert_eq!(ctx.labels_defined.get("start"), Some(&1));
        assert_eq!(ctx.duplicate_labels, vec![("start".to_string(), 3)]);
        assert_eq!(ctx.labels_referenced, vec![("start".to_string(), 2)]);
    }

    #[test]
    fn set_variants_define_variables() {
        let ctx = build(
            "SET PLAIN=1\r\nSET /P ASKED=prompt\r\nSET /A COUNT=1+2\r\nSET \"QUOTED=a b\"\r\n",
        );
        for name in ["PLAIN", "ASKED", "COUNT", "QUOTED"] {
            assert!(ctx.variables_defined.contains_key(name), "missing {name}");
        }
    }

    #[test]
    fn position_aware_definitions() {
        let ctx = build("ECHO %LATER%\r\nSET LATER=1\r\nECHO %LATER%\r\n");
        assert!(!ctx.variable_defined_at("LATER", 1));
        assert!(ctx.variable_defined_at("LATER", 3));
        assert!(ctx.variable_defined_at("TEMP", 1));
    }

    #[test]
    fn call_targets_exclude_labels_and_builtins() {
        let ctx = build("CALL :sub\r\nCALL other.bat arg\r\nCALL COPY a b\r\n:sub\r\n");
        assert_eq!(ctx.call_targets, vec![("other.bat".to_string(), 2)]);
    }

    #[test]
    fn scope_events_in_order() {
        let ctx = build("SETLOCAL ENABLEDELAYEDEXPANSION\r\nENDLOCAL\r\nEXIT /B 0\r\n");
        assert!(matches!(
            ctx.scope_events[0],
            ScopeEvent::Setlocal { line: 1, delayed: Some(true), .. }
        ));
        assert!(matches!(ctx.scope_events[1], ScopeEvent::Endlocal { line: 2 }));
        assert!(matches!(ctx.scope_events[2], ScopeEvent::Exit { line: 3 }));
    }
}
