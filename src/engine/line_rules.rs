//! Per-line rule evaluation (rules whose decision is local to one line).
//!
//! The checks run in line order over classified lines. Character-level style
//! rules apply to every non-blank line; comment and label lines then get
//! their few dedicated checks; everything else runs on code lines only.

use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::known;
use crate::classify::{CommentStyle, LineKind, LineMeta};
use crate::config::LintOptions;
use crate::diagnostic::Diagnostic;
use crate::lexical::{self, Continuation, SetAIssue, TildeIssue};
use crate::loader::SourceScript;

// Command keywords used by the S003 casing accumulator.
const CASING_KEYWORDS: &[&str] = &[
    "echo", "set", "if", "for", "goto", "call", "exit", "pause", "copy", "move", "del", "dir",
    "type", "find", "findstr", "sort", "more", "cls", "cd", "pushd", "popd", "mkdir", "rmdir",
    "attrib", "xcopy", "robocopy", "ping", "ipconfig", "netstat", "tasklist", "taskkill", "sc",
    "net", "reg", "wmic", "powershell", "timeout", "choice", "setlocal", "endlocal",
];

const COMMAND_TYPOS: &[(&str, &str)] = &[
    ("iff", "if"),
    ("ecko", "echo"),
    ("ecoh", "echo"),
    ("forx", "for"),
    ("fro", "for"),
    ("goot", "goto"),
    ("sett", "set"),
    ("caal", "call"),
    ("exitt", "exit"),
];

// Deprecated in current Windows releases (W024). XCOPY is not on this list.
const DEPRECATED_COMMANDS: &[&str] = &[
    "wmic", "cacls", "winrm", "bitsadmin", "nbtstat", "dpath", "keys", "at",
];

// Removed from current Windows releases (E034).
const REMOVED_COMMANDS: &[&str] = &[
    "caspol", "diskcomp", "append", "browstat", "inuse", "diskcopy", "streams",
];

// Legacy DOS commands absent from modern installs (W015).
const LEGACY_COMMANDS: &[&str] = &["assign", "backup", "comp", "edlin", "join", "subst"];

const OLDER_WINDOWS_COMMANDS: &[&str] =
    &["choice", "forfiles", "where", "robocopy", "timeout", "icacls"];

const INTERPRETER_DIFF_COMMANDS: &[&str] = &["append", "dpath", "ftype", "assoc", "path"];

const ARCHITECTURE_PATTERNS: &[&str] = &["Wow6432Node", "Program Files (x86)", "SysWow64"];

static RE_GOTO_EOF_NO_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?goto\s+eof\s*$").unwrap());
static RE_CALL_BARE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?call\s+([^:\s][^\s]*)").unwrap());
static RE_IF: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^\s*@?if\s+(.+)$").unwrap());
static RE_IF_GLUED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?i)^\s*@?if["(%!=]"#).unwrap());
static RE_IF_EXIST_MIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?if\s+(?:/i\s+)?(?:not\s+)?exist\s+.*==").unwrap());
static RE_IF_BARE_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^["']?%?\w+%?["']?\s*$"#).unwrap());
static RE_IF_VALID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(exist\s+|defined\s+|errorlevel\s+\d+|/i\s+|not\s+)|==|\b(equ|neq|lss|leq|gtr|geq)\b")
        .unwrap()
});
static RE_ERRORLEVEL_NO_OP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*@?if\s+(?:not\s+)?%errorlevel%\s+(\S+)").unwrap()
});
static RE_ERRORLEVEL_NEQ1: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%errorlevel%\s+neq\s+1\b").unwrap());
static RE_EMPTY_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bif\s+(?:/i\s+)?(?:not\s+)?%[^%\s]+%\s*==\s*"""#).unwrap()
});
static RE_IF_UNQUOTED_LHS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*@?if\s+(?:/i\s+)?(?:not\s+)?%[A-Za-z_][A-Za-z0-9_]*%\s*==").unwrap()
});
static RE_FOR_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?for\s").unwrap());
static RE_FOR_F_OPTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*@?for\s+/f\s+(?:"([^"]*)"\s+)?%"#).unwrap()
});
static RE_SET_A: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?set\s+/a\s+(.+)$").unwrap());
static RE_SET_UNQUOTED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?set\s+([A-Za-z_][A-Za-z0-9_]*)=(.+)$").unwrap());
static RE_SET_P_WITH_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bset\s+/p\s+[^=]+=.*%.+%").unwrap());
static RE_SUBSTRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*:~([^%]*)%").unwrap()
});
static RE_SUBSTRING_VALID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(,-?\d+)?$").unwrap());
static RE_REPLACEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*:([^=%~][^=%]*|)=[^%]*%").unwrap()
});
static RE_TILDE_ENV_CONTEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%~[A-Za-z]*[A-Za-z_][A-Za-z0-9_]{2,}%").unwrap()
});
static RE_ADJACENT_TILDES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%~[fdpnx]+[0-9]\s*%~[fdpnx]+[0-9]").unwrap()
});
static RE_CD_UNC: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?cd\s+\\\\[^\\]+\\").unwrap());
static RE_TRIPLE_QUOTE_OK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""""[^"]*""""#).unwrap());
static RE_ODD_QUOTE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"["\s]""[^"]"#).unwrap());
static RE_VAR_NAME_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*").unwrap());
static RE_BANG_NAME_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"![A-Za-z_][A-Za-z0-9_]*").unwrap());
static RE_UNQUOTED_EXPANSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*%|![A-Za-z_][A-Za-z0-9_]*!").unwrap()
});
static RE_PING_NO_OPTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?ping\s+[^-]*$").unwrap());
static RE_SETX_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?setx\s+path\b").unwrap());
static RE_DOT_COM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.com\b").unwrap());
static RE_SYSTEM_DIR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)%windir%|%systemroot%|c:\\windows\\").unwrap()
});
static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b\d{2,}\b").unwrap());
static RE_DELAY_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)timeout\s+/t\s+(\d+)|ping\s+.*\s-n\s+(\d+)").unwrap()
});
static RE_CALL_PARAMS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*@?call\s+:[A-Za-z0-9_]+\s+(.*)$").unwrap()
});
static RE_REDUNDANT_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*[^()&|]+\s*\)$").unwrap());
static RE_ECHO_OFF_NO_AT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^echo\s+off\s*$").unwrap());
static RE_QUOTED_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#""([^"]*)""#).unwrap());
static RE_HAS_EXTENSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\.[a-z]{1,4}$").unwrap());

// Security patterns.
static RE_DANGEROUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?i)del\s+["']?\*\.\*["']?(\s|$)|del\s+["']?[a-z]:\\\*|format\s+[a-z]:|shutdown|rmdir\s+/s\s+/q\s+"#,
    )
    .unwrap()
});
static RE_REG_FORCE_DELETE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)reg\s+delete\s+.*\s/f\b").unwrap());
static RE_ADMIN_OP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\breg\s+(add|delete)\s+hklm|^\s*@?sc\s+|^\s*@?net\s+").unwrap()
});
static RE_HARDCODED_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)[cde]:\\|/users/|/home/").unwrap());
static RE_HARDCODED_TEMP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)c:\\te?mp\b|(^|[^\w%])/tmp\b").unwrap());
static RE_CREDENTIALS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(password|pwd|passwd|apikey|api_key|secret|token)\s*=\s*["']?[^\s"']+"#)
        .unwrap()
});
static RE_SENSITIVE_ECHO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*@?echo\b.*(password|pwd|passwd|apikey|api_key|secret|token)").unwrap()
});
static RE_PS_BYPASS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)powershell.*-executionpolicy\s+bypass").unwrap()
});
static RE_UNC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\\\[^\\\s]+\\").unwrap());
static RE_FORK_BOMB: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)start\s+""\s*%0|start\s+%0|start\s+cmd\s*/c\s*%0"#).unwrap()
});
static RE_HOSTS_WRITE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)>>?\s*\S*hosts\b").unwrap());
static RE_AUTORUN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)echo.*>\s*\S*autorun\.inf|copy.*autorun\.inf").unwrap()
});
static RE_SELF_COPY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(copy|xcopy)\s+.*%0.*\s[a-z]:").unwrap()
});
static RE_INJECTION_OPS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*%[^&|<>]*[&|<>]").unwrap()
});
static RE_TEMP_FILE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)te?mp[^%\s]*\.(tmp|txt|log|bat|cmd)").unwrap());
static RE_DOWNLOAD_EXEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)certutil\s+.*-urlcache|bitsadmin\s+/transfer|powershell.*(downloadstring|downloadfile|invoke-webrequest|invoke-expression|\biex\b)",
    )
    .unwrap()
});
static RE_ENCODED_PS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)powershell.*\s-enc(odedcommand)?\b").unwrap()
});
static RE_SYSTEM_TASK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)schtasks\s+.*/create.*/ru\s+"?system"#).unwrap()
});
static RE_FIREWALL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)netsh\s+(adv)?firewall\s+.*(add|delete|state\s+off|opmode\s+disable)").unwrap()
});
static RE_LOG_CLEAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)wevtutil\s+cl\b|auditpol\s+.*/clear").unwrap()
});
static RE_CRED_STORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)reg\s+save\s+hklm\\(sam|system|security)\b|\bntdsutil\b").unwrap()
});

// Performance patterns.
static RE_ECHO_DOT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?echo\.").unwrap());
static RE_CMD_C_INTERNAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bcmd\s+/c\s+(echo|set|dir|type|copy|del|md|mkdir|rd|rmdir|cls|ver)\b")
        .unwrap()
});
static RE_FOR_F_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)for\s+/f\s+.*\bin\s*\(\s*'type\s+").unwrap()
});
static RE_DIR_EXISTENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?dir\s+\S+\s*>\s*nul").unwrap());
static RE_DO_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdo\s+call\s+:").unwrap());
static RE_FOR_DO_APPEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?for\s+.*\bdo\b[^(]*>>").unwrap());
static RE_DELAY_PING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)ping\s+.*-n\s+\d+.*(localhost|127\.0\.0\.1)|ping\s+.*(localhost|127\.0\.0\.1).*-n\s+\d+|choice\s+/t\s+\d+.*>\s*nul").unwrap()
});
static RE_DIR_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?dir(\s|$)").unwrap());
static RE_ERRORLEVEL_CHECK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\berrorlevel\b|\|\|").unwrap()
});

/// S003 casing accumulator: the first classified command token fixes the
/// script's style.
#[derive(Clone, Copy, PartialEq, Eq)]
enum CasingStyle {
    Upper,
    Lower,
}

/// Runs every per-line rule over the script.
pub fn evaluate(
    script: &SourceScript,
    metas: &[LineMeta],
    options: &LintOptions,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();
    let mut casing: Option<CasingStyle> = None;
    let last_index = script.lines.len();

    for (line, meta) in script.lines.iter().zip(metas) {
        if matches!(meta.kind, LineKind::Blank) {
            continue;
        }
        let text = line.text.as_str();
        let index = line.index;

        character_rules(text, index, options, &mut diags);

        match &meta.kind {
            LineKind::Comment(style) => {
                if *style == CommentStyle::Rem
                    && lexical::continuation(text) != Continuation::None
                {
                    diags.push(Diagnostic::with_context(
                        index,
                        known("E033"),
                        "trailing ^ makes REM swallow the next line",
                    ));
                }
            }
            LineKind::Label(name) => {
                // A label followed by arguments reads like a subroutine call
                // that forgot its CALL.
                let rest = text.trim_start();
                if rest.split_whitespace().count() > 1 {
                    diags.push(Diagnostic::with_context(
                        index,
                        known("E012"),
                        format!("':{name}' with arguments does not invoke the subroutine"),
                    ));
                }
            }
            LineKind::Code => {
                error_rules(text, index, &mut diags);
                warning_rules(script, metas, text, index, &mut diags);
                style_rules(text, index, &mut casing, &mut diags);
                security_rules(text, index, &mut diags);
                performance_rules(text, index, index == last_index, &mut diags);
            }
            LineKind::Blank => unreachable!(),
        }
    }

    diags
}

/// Rules keyed on raw characters; they apply to comments and labels too.
fn character_rules(text: &str, index: usize, options: &LintOptions, diags: &mut Vec<Diagnostic>) {
    if text.trim_end() != text {
        diags.push(Diagnostic::new(index, known("S004")));
    }

    let length = text.chars().count();
    if length > options.max_line_length {
        diags.push(Diagnostic::with_context(
            index,
            known("S011"),
            format!("line is {length} characters (max {})", options.max_line_length),
        ));
    }
    if length > options.max_line_length
        && lexical::continuation(text) == Continuation::None
    {
        diags.push(Diagnostic::with_context(
            index,
            known("S020"),
            format!("line exceeds {} characters without ^ continuation", options.max_line_length),
        ));
    }

    let indent: String = text.chars().take_while(|c| *c == ' ' || *c == '\t').collect();
    if indent.contains(' ') && indent.contains('\t') {
        diags.push(Diagnostic::with_context(
            index,
            known("S012"),
            "line mixes tabs and spaces for indentation",
        ));
    }

    if text.chars().any(|c| !c.is_ascii()) {
        diags.push(Diagnostic::new(index, known("W012")));
        diags.push(Diagnostic::with_context(
            index,
            known("W030"),
            "characters outside Code Page 437 detected",
        ));
    }
}

fn error_rules(text: &str, index: usize, diags: &mut Vec<Diagnostic>) {
    let stripped = text.trim();
    let first = lexical::first_word(text).unwrap_or_default();

    // E013 before anything keyed on recognized commands.
    if let Some((_, correct)) = COMMAND_TYPOS.iter().find(|(typo, _)| *typo == first) {
        diags.push(Diagnostic::with_context(
            index,
            known("E013"),
            format!("'{first}' looks like a typo of '{correct}'"),
        ));
    }

    if lexical::has_unmatched_quotes(text) {
        diags.push(Diagnostic::new(index, known("E009")));
    }

    if RE_GOTO_EOF_NO_COLON.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E015"),
            "GOTO EOF must be written GOTO :EOF",
        ));
    }

    // E014: CALL to what looks like an internal label, without the colon.
    if let Some(caps) = RE_CALL_BARE.captures(stripped) {
        let target = &caps[1];
        let lower = target.to_ascii_lowercase();
        let pathish = lower.contains(['\\', '/', '.', ':', '%']);
        if !pathish && !crate::context::is_call_builtin(&lower) {
            diags.push(Diagnostic::with_context(
                index,
                known("E014"),
                format!("CALL to label '{target}' needs a colon: CALL :{target}"),
            ));
        }
    }

    if RE_IF_GLUED.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E003"),
            "IF keyword must be separated from its condition by whitespace",
        ));
    } else if let Some(caps) = RE_IF.captures(stripped) {
        let condition = caps[1].trim();
        if !RE_IF_VALID.is_match(condition)
            && !condition.contains(['&', '|', '('])
            && RE_IF_BARE_TERM.is_match(condition)
        {
            diags.push(Diagnostic::with_context(
                index,
                known("E003"),
                "IF statement is missing its comparison operator or condition",
            ));
        }
    }

    if let Some(caps) = RE_ERRORLEVEL_NO_OP.captures(stripped) {
        let operand = caps[1].to_ascii_lowercase();
        if !matches!(operand.as_str(), "==" | "equ" | "neq" | "lss" | "leq" | "gtr" | "geq") {
            diags.push(Diagnostic::with_context(
                index,
                known("E016"),
                "errorlevel comparison is missing its operator",
            ));
        }
    }

    if RE_IF_EXIST_MIX.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("E004")));
    }

    if RE_EMPTY_CHECK.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E007"),
            "use IF \"%VAR%\"==\"\" for empty checks",
        ));
    }

    // E005: a quoted path-looking string carrying filename-invalid characters.
    for caps in RE_QUOTED_SPAN.captures_iter(stripped) {
        let inner = &caps[1];
        if (inner.contains('\\') || inner.contains(":\\"))
            && inner.chars().any(|c| matches!(c, '<' | '>' | '|'))
        {
            diags.push(Diagnostic::with_context(
                index,
                known("E005"),
                "path contains characters invalid in file names",
            ));
            break;
        }
    }

    if RE_FOR_HEADER.is_match(stripped) && !stripped.to_ascii_lowercase().contains(" do ")
        && !stripped.to_ascii_lowercase().ends_with(" do")
    {
        diags.push(Diagnostic::new(index, known("E010")));
    }

    if lexical::for_variable_uses_single_percent(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E020"),
            "FOR variables need %% inside a batch file",
        ));
    }

    // E011: unmatched expansion delimiters, with %% literals blanked out.
    let masked = stripped.replace("%%", "  ");
    if masked.matches('%').count() % 2 == 1 && RE_VAR_NAME_REF.is_match(&masked) {
        diags.push(Diagnostic::with_context(
            index,
            known("E011"),
            "variable reference may have unmatched % delimiters",
        ));
    }
    if masked.matches('!').count() % 2 == 1 && RE_BANG_NAME_REF.is_match(&masked) {
        diags.push(Diagnostic::with_context(
            index,
            known("E011"),
            "delayed expansion reference may have unmatched ! delimiters",
        ));
    }

    for issue in lexical::scan_percent_tilde(stripped) {
        match issue {
            TildeIssue::UnknownModifier(m) => diags.push(Diagnostic::with_context(
                index,
                known("E017"),
                format!("'{m}' is not a percent-tilde modifier"),
            )),
            TildeIssue::BadTarget(what) => diags.push(Diagnostic::with_context(
                index,
                known("E019"),
                format!("percent-tilde applied to '{what}'"),
            )),
            TildeIssue::BadCombination(what) => diags.push(Diagnostic::with_context(
                index,
                known("E024"),
                what,
            )),
        }
    }
    if RE_TILDE_ENV_CONTEXT.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E025"),
            "parameter modifiers do not apply to environment variables",
        ));
    }

    // E021: malformed substring / replacement operations.
    for caps in RE_SUBSTRING.captures_iter(stripped) {
        if !RE_SUBSTRING_VALID.is_match(caps[1].trim()) {
            diags.push(Diagnostic::with_context(
                index,
                known("E021"),
                format!("malformed substring operation '{}'", &caps[0]),
            ));
        }
    }
    for caps in RE_REPLACEMENT.captures_iter(stripped) {
        if caps[1].is_empty() {
            diags.push(Diagnostic::with_context(
                index,
                known("E021"),
                "string replacement with empty search text",
            ));
        }
    }

    if let Some(caps) = RE_SET_A.captures(stripped) {
        // The expression runs to the first unquoted command separator.
        let raw = caps[1].to_string();
        let expr = match lexical::mask_quoted(&raw).find('&') {
            Some(pos) => &raw[..pos],
            None => &raw[..],
        };
        for issue in lexical::validate_set_a(expr) {
            match issue {
                SetAIssue::UnquotedSpecial(ch) => diags.push(Diagnostic::with_context(
                    index,
                    known("E023"),
                    format!("quote the expression to protect '{ch}'"),
                )),
                SetAIssue::Syntax(note) => {
                    diags.push(Diagnostic::with_context(index, known("E022"), note))
                }
                SetAIssue::Pathological(note) => {
                    diags.push(Diagnostic::with_context(index, known("E029"), note))
                }
            }
        }
    }

    if RE_CD_UNC.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("E027")));
    }

    if (stripped.contains("\"\"\"") || RE_ODD_QUOTE_RUN.is_match(stripped))
        && !RE_TRIPLE_QUOTE_OK.is_match(stripped)
    {
        diags.push(Diagnostic::with_context(
            index,
            known("E028"),
            "embedded quote pattern may not parse as written",
        ));
    }

    match lexical::continuation(text) {
        Continuation::BrokenByWhitespace => diags.push(Diagnostic::with_context(
            index,
            known("E030"),
            "whitespace after the trailing ^ defeats the continuation",
        )),
        Continuation::Continues | Continuation::None => {}
    }

    if lexical::caret_escapes_percent(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("E032"),
            "use %% for a literal percent; ^ does not escape it",
        ));
    }

    if REMOVED_COMMANDS.contains(&first.as_str())
        || stripped.to_ascii_lowercase().starts_with("net print")
    {
        diags.push(Diagnostic::with_context(
            index,
            known("E034"),
            format!("'{}' was removed from Windows", first.to_uppercase()),
        ));
    }
}

fn warning_rules(
    script: &SourceScript,
    metas: &[LineMeta],
    text: &str,
    index: usize,
    diags: &mut Vec<Diagnostic>,
) {
    let stripped = text.trim();
    let first = lexical::first_word(text).unwrap_or_default();

    // W005: unquoted expansion in a context where spaces break parsing.
    if has_unquoted_expansion(stripped) {
        let lower = stripped.to_ascii_lowercase();
        if ["if ", "echo ", "set ", "call "].iter().any(|kw| lower.contains(kw)) {
            diags.push(Diagnostic::with_context(
                index,
                known("W005"),
                "expansion may contain spaces and should be quoted",
            ));
        }
    }

    if RE_PING_NO_OPTS.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("W006")));
    }

    if RE_SYSTEM_DIR.is_match(stripped)
        && matches!(first.as_str(), "del" | "copy" | "move" | "ren" | "type" | "attrib")
    {
        diags.push(Diagnostic::with_context(
            index,
            known("W007"),
            "target under the Windows directory may be locked",
        ));
    }

    if RE_SETX_PATH.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("W008")));
    }

    if OLDER_WINDOWS_COMMANDS.contains(&first.as_str()) {
        diags.push(Diagnostic::with_context(
            index,
            known("W009"),
            format!("'{first}' is unavailable on older Windows versions"),
        ));
    }

    for pattern in ARCHITECTURE_PATTERNS {
        if stripped.contains(pattern) {
            diags.push(Diagnostic::with_context(
                index,
                known("W010"),
                format!("architecture-specific reference: {pattern}"),
            ));
            break;
        }
    }

    // W011: content-reading commands mixed with non-ASCII text.
    if matches!(first.as_str(), "type" | "find" | "findstr" | "more")
        && stripped.chars().any(|c| !c.is_ascii())
    {
        diags.push(Diagnostic::new(index, known("W011")));
    }

    if LEGACY_COMMANDS.contains(&first.as_str()) {
        diags.push(Diagnostic::with_context(
            index,
            known("W015"),
            format!("'{first}' is a legacy DOS command"),
        ));
    }

    if RE_ERRORLEVEL_NEQ1.is_match(stripped) && !stripped.contains("&&") && !stripped.contains("||")
    {
        diags.push(Diagnostic::with_context(
            index,
            known("W017"),
            "NEQ 1 matches every value except 1, including failures above 1",
        ));
    }

    if let Some(caps) = RE_FOR_F_OPTS.captures(stripped) {
        let opts = caps.get(1).map(|m| m.as_str().to_ascii_lowercase()).unwrap_or_default();
        if !opts.contains("tokens") {
            diags.push(Diagnostic::with_context(
                index,
                known("W020"),
                "FOR /F without explicit tokens/delims options",
            ));
        }
    }

    if RE_IF_UNQUOTED_LHS.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("W021"),
            "quote both sides of the comparison",
        ));
    }

    if RE_FOR_HEADER.is_match(stripped) && RE_DO_FOR.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("W023")));
    }

    if DEPRECATED_COMMANDS.contains(&first.as_str())
        || stripped.to_ascii_lowercase().starts_with("net send")
    {
        let shown = if stripped.to_ascii_lowercase().starts_with("net send") {
            "NET SEND".to_string()
        } else {
            first.to_uppercase()
        };
        diags.push(Diagnostic::with_context(
            index,
            known("W024"),
            format!("'{shown}' is deprecated"),
        ));
    }

    if matches!(first.as_str(), "del" | "copy" | "move" | "mkdir" | "rmdir")
        && !stripped.contains("2>")
        && !stripped.to_ascii_lowercase().contains(">nul")
    {
        diags.push(Diagnostic::with_context(
            index,
            known("W025"),
            format!("{} without error redirection", first.to_uppercase()),
        ));
    }

    if RE_ADJACENT_TILDES.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("W026"),
            "combine the modifiers: %~dpnx1",
        ));
    }

    if INTERPRETER_DIFF_COMMANDS.contains(&first.as_str()) {
        diags.push(Diagnostic::with_context(
            index,
            known("W027"),
            format!("'{first}' behaves differently in COMMAND.COM and cmd.exe"),
        ));
    }

    if RE_DOT_COM.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("W029")));
    }

    // W031: file operation whose argument carries non-ASCII characters.
    if matches!(first.as_str(), "copy" | "move" | "del" | "type" | "ren" | "rename")
        && stripped.chars().any(|c| !c.is_ascii())
    {
        diags.push(Diagnostic::new(index, known("W031")));
    }

    // W033: extensionless CALL resolves through PATHEXT.
    if let Some(caps) = RE_CALL_BARE.captures(stripped) {
        let target = caps[1].to_ascii_lowercase();
        let has_ext = RE_HAS_EXTENSION.is_match(&target);
        if !has_ext && !target.starts_with(':') && !target.contains('%') {
            diags.push(Diagnostic::with_context(
                index,
                known("W033"),
                format!("CALL '{}' without extension may be ambiguous", &caps[1]),
            ));
        }
    }

    // W002: copy-like operations that never check their outcome.
    if matches!(first.as_str(), "robocopy" | "xcopy")
        || stripped.to_ascii_lowercase().starts_with("reg ")
    {
        let checked = RE_ERRORLEVEL_CHECK.is_match(stripped)
            || next_code_lines(script, metas, index, 2)
                .iter()
                .any(|t| RE_ERRORLEVEL_CHECK.is_match(t));
        if !checked {
            diags.push(Diagnostic::with_context(
                index,
                known("W002"),
                format!("{} result is never checked", first.to_uppercase()),
            ));
        }
    }
}

static RE_DO_FOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bdo\s+.*\bfor\s+").unwrap());

fn style_rules(
    text: &str,
    index: usize,
    casing: &mut Option<CasingStyle>,
    diags: &mut Vec<Diagnostic>,
) {
    let stripped = text.trim();

    if RE_ECHO_OFF_NO_AT.is_match(stripped) {
        diags.push(Diagnostic::with_context(index, known("S002"), "use @ECHO OFF"));
    }

    // S003: compare each command token's casing with the established style.
    if let Some(raw) = stripped.trim_start_matches('@').split_whitespace().next() {
        let lower = raw.to_ascii_lowercase();
        if CASING_KEYWORDS.contains(&lower.as_str()) {
            let style = if raw.chars().all(|c| !c.is_ascii_lowercase()) {
                Some(CasingStyle::Upper)
            } else if raw.chars().all(|c| !c.is_ascii_uppercase()) {
                Some(CasingStyle::Lower)
            } else {
                None
            };
            match (style, *casing) {
                (Some(s), None) => *casing = Some(s),
                (Some(s), Some(established)) if s != established => {
                    diags.push(Diagnostic::with_context(
                        index,
                        known("S003"),
                        format!("'{raw}' breaks the script's command casing"),
                    ));
                }
                (None, _) => {
                    diags.push(Diagnostic::with_context(
                        index,
                        known("S003"),
                        format!("'{raw}' mixes upper and lower case"),
                    ));
                }
                _ => {}
            }
        }
    }

    for caps in RE_DELAY_NUMBER.captures_iter(stripped) {
        let number = caps
            .get(1)
            .or_else(|| caps.get(2))
            .map(|m| m.as_str())
            .unwrap_or("0");
        if number.parse::<u64>().unwrap_or(0) > 10 {
            diags.push(Diagnostic::with_context(
                index,
                known("S009"),
                format!("delay count {number} should be a named variable"),
            ));
        }
    }

    if let Some(caps) = RE_CALL_PARAMS.captures(stripped) {
        let params = caps[1].split_whitespace().count();
        if params > 5 {
            diags.push(Diagnostic::with_context(
                index,
                known("S014"),
                format!("subroutine call passes {params} parameters"),
            ));
        }
    }

    // S019: bare multi-digit literals outside expansions.
    for m in RE_NUMBER.find_iter(stripped) {
        let value = m.as_str();
        if matches!(value, "10" | "100" | "256" | "60" | "24" | "365") {
            continue;
        }
        let before = stripped[..m.start()].chars().next_back();
        let after = stripped[m.end()..].chars().next();
        if before == Some('%') || after == Some('%') {
            continue;
        }
        diags.push(Diagnostic::with_context(
            index,
            known("S019"),
            format!("magic number {value}"),
        ));
    }

    if RE_REDUNDANT_PARENS.is_match(stripped) {
        let inner = stripped[1..stripped.len() - 1].trim();
        let inner_first = inner.split_whitespace().next().unwrap_or("").to_ascii_lowercase();
        if !inner.is_empty() && inner_first != "if" && inner_first != "for" {
            diags.push(Diagnostic::new(index, known("S028")));
        }
    }
}

fn security_rules(text: &str, index: usize, diags: &mut Vec<Diagnostic>) {
    let stripped = text.trim();
    let masked = lexical::mask_quoted(stripped);

    if RE_SET_P_WITH_VAR.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC001"),
            "user input is combined with expansions unvalidated",
        ));
    }

    if let Some(caps) = RE_SET_UNQUOTED.captures(stripped) {
        let value = caps[2].trim();
        if !(value.starts_with('"') && value.ends_with('"')) {
            diags.push(Diagnostic::with_context(
                index,
                known("SEC002"),
                "quote the assignment: SET \"var=value\"",
            ));
        }
    }

    if RE_DANGEROUS.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC003"),
            "destructive command should require confirmation",
        ));
    }

    if RE_REG_FORCE_DELETE.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC004")));
    }

    if RE_ADMIN_OP.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC005"),
            "operation may require administrator privileges",
        ));
    }

    if RE_HARDCODED_PATH.is_match(&masked) || RE_HARDCODED_PATH.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC006")));
    }

    if RE_HARDCODED_TEMP.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC007"),
            "use %TEMP% instead of a hardcoded temp path",
        ));
    }

    if RE_CREDENTIALS.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC008")));
    }

    if RE_PS_BYPASS.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC009")));
    }

    if RE_SENSITIVE_ECHO.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC010")));
    }

    if stripped.contains("..")
        && ["cd", "copy", "move", "del"]
            .iter()
            .any(|op| stripped.to_ascii_lowercase().contains(op))
    {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC011"),
            "path contains .. and may traverse directories",
        ));
    }

    if RE_TEMP_FILE.is_match(stripped) && !stripped.to_ascii_lowercase().contains("%random%") {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC012"),
            "temp file name has no random component",
        ));
    }

    if RE_INJECTION_OPS.is_match(&masked) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC013"),
            "expansion meets shell operators unescaped",
        ));
    }

    if RE_UNC.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC014"),
            "UNC operation may fail under UAC without elevation",
        ));
    }

    if RE_FORK_BOMB.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC015"),
            "recursive self-execution detected",
        ));
    }

    if RE_HOSTS_WRITE.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC016")));
    }

    if RE_AUTORUN.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC017")));
    }

    if RE_SELF_COPY.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC018")));
    }

    if RE_DOWNLOAD_EXEC.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("SEC019"),
            "remote content is fetched and executed in one step",
        ));
    }

    if RE_ENCODED_PS.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC020")));
    }

    if RE_SYSTEM_TASK.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC021")));
    }

    if RE_FIREWALL.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC022")));
    }

    if RE_LOG_CLEAR.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC023")));
    }

    if RE_CRED_STORE.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("SEC024")));
    }
}

fn performance_rules(
    text: &str,
    index: usize,
    is_last_line: bool,
    diags: &mut Vec<Diagnostic>,
) {
    let stripped = text.trim();
    let lower = stripped.to_ascii_lowercase();
    let first = lexical::first_word(text).unwrap_or_default();

    if RE_TEMP_FILE.is_match(stripped) && !lower.contains("random") {
        diags.push(Diagnostic::with_context(
            index,
            known("P007"),
            "temp file should use %RANDOM% to avoid collisions",
        ));
    }

    if let Some(caps) = RE_FOR_F_OPTS.captures(stripped) {
        if let Some(opts) = caps.get(1) {
            if !opts.as_str().to_ascii_lowercase().contains("tokens=*") {
                diags.push(Diagnostic::with_context(
                    index,
                    known("P009"),
                    "consider \"tokens=*\" when the whole line is wanted",
                ));
            }
        }
    }

    if RE_DIR_LINE.is_match(stripped) {
        if !lower.contains("/f") {
            diags.push(Diagnostic::new(index, known("P010")));
        }
        if !lower.contains("/b") && (stripped.contains('|') || stripped.contains('>')) {
            diags.push(Diagnostic::new(index, known("P013")));
        }
    }

    // P014: output nobody consumes; the last line is exempt because output
    // there is usually the point.
    if matches!(first.as_str(), "echo" | "type" | "dir")
        && !stripped.starts_with('@')
        && !lower.contains(">nul")
        && !stripped.contains('>')
        && !is_last_line
    {
        diags.push(Diagnostic::with_context(
            index,
            known("P014"),
            format!("{} output may be unnecessary", first.to_uppercase()),
        ));
    }

    if RE_DELAY_PING.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("P015"),
            "use TIMEOUT for delays on Vista and later",
        ));
    }

    if RE_ECHO_DOT.is_match(stripped) {
        diags.push(Diagnostic::with_context(index, known("P016"), "use ECHO( instead"));
    }

    if RE_CMD_C_INTERNAL.is_match(stripped) {
        diags.push(Diagnostic::new(index, known("P017")));
    }

    if RE_FOR_F_TYPE.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("P018"),
            "read the file directly: FOR /F %%i IN (file)",
        ));
    }

    if RE_DIR_EXISTENCE.is_match(stripped) {
        diags.push(Diagnostic::with_context(index, known("P019"), "use IF EXIST"));
    }

    if RE_DO_CALL.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("P020"),
            "CALL per iteration re-parses the script",
        ));
    }

    if RE_FOR_DO_APPEND.is_match(stripped) {
        diags.push(Diagnostic::with_context(
            index,
            known("P023"),
            "redirect the whole loop once instead",
        ));
    }
}

fn has_unquoted_expansion(stripped: &str) -> bool {
    for m in RE_UNQUOTED_EXPANSION.find_iter(stripped) {
        let before = stripped[..m.start()].chars().next_back();
        if !matches!(before, Some('"') | Some('\'')) {
            return true;
        }
    }
    false
}

/// Texts of the next `count` code lines after `index` (1-based).
fn next_code_lines<'a>(
    script: &'a SourceScript,
    metas: &[LineMeta],
    index: usize,
    count: usize,
) -> Vec<&'a str> {
    script
        .lines
        .iter()
        .zip(metas)
        .filter(|(line, meta)| line.index > index && matches!(meta.kind, LineKind::Code))
        .take(count)
        .map(|(line, _)| line.text.as_str())
        .collect()
}
