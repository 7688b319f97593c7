//! Whole-file rule evaluation (rules needing cross-line context).
//!
//! Runs after the per-line pass over the same [`AnalysisContext`]: label
//! resolution, reachability, undefined variables, SETLOCAL balance, the
//! coarse exit-path CFG, loop detection, duplication, and the file-level
//! style and line-ending rules.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

use crate::catalog::known;
use crate::classify::{CommentStyle, LineKind, LineMeta};
use crate::context::{AnalysisContext, ScopeEvent};
use crate::diagnostic::Diagnostic;
use crate::lexical::{self, Continuation};
use crate::loader::{LineEnding, SourceScript};

static RE_ECHO_OFF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^@echo\s+off\b").unwrap());
static RE_GOTO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?goto\s+(:?\S+)").unwrap());
static RE_GOTO_OR_CALL_COLON: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?(goto|call)\s+:").unwrap());
static RE_BANG_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"![A-Za-z_][A-Za-z0-9_]*!").unwrap());
static RE_PERCENT_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%[A-Za-z_][A-Za-z0-9_]*%").unwrap());
static RE_IF_EXIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bif\s+exist\s+(\S+)").unwrap());
static RE_SET_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s*@?set\s+(?:/[pa]\s+)?"?([A-Za-z_][A-Za-z0-9_]*)\s*="#).unwrap()
});
static RE_STRING_OP_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*@?set\s+([A-Za-z_][A-Za-z0-9_]*)=%([A-Za-z_][A-Za-z0-9_]*):").unwrap()
});
static RE_SEARCH_CMD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?(find|findstr)\s+\S").unwrap());
static RE_COPY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?copy\s+(\S+)\s+\S+").unwrap());
static RE_DEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?del\s+(?:/\S+\s+)*(\S+)").unwrap());
static RE_ECHO_APPEND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?echo\b.*>>\s*(\S+)").unwrap());
static RE_USER_INPUT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bset\s+/p\s+|\bchoice\b").unwrap());
static RE_PAUSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bpause\b").unwrap());
static RE_CHCP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*@?chcp\s").unwrap());
static RE_DOC_KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(script|purpose|author|date|description)\s*:").unwrap()
});

const ERRORLEVEL_SENSITIVE: &[&str] =
    &["append", "dpath", "ftype", "set", "path", "assoc", "prompt"];

/// Runs every whole-file rule.
pub fn evaluate(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
) -> Vec<Diagnostic> {
    let mut diags = Vec::new();

    header_rules(script, metas, &mut diags);
    line_ending_rules(script, metas, &mut diags);
    paren_balance(script, metas, &mut diags);
    label_rules(ctx, &mut diags);
    reachability(script, metas, ctx, &mut diags);
    undefined_variables(ctx, &mut diags);
    scope_rules(script, metas, ctx, &mut diags);
    exit_path(script, metas, ctx, &mut diags);
    infinite_loops(script, metas, ctx, &mut diags);
    duplication_rules(script, metas, &mut diags);
    redundancy_rules(script, metas, ctx, &mut diags);
    interaction_rules(script, metas, &mut diags);
    file_style_rules(script, metas, ctx, &mut diags);

    diags
}

/// S001, S002 (first line), S007, W028, E031.
fn header_rules(script: &SourceScript, metas: &[LineMeta], diags: &mut Vec<Diagnostic>) {
    if script.lines.is_empty() {
        return;
    }

    // S001: @ECHO OFF on any of the first three non-blank non-comment lines.
    let mut satisfied = false;
    for (line, _) in script
        .lines
        .iter()
        .zip(metas)
        .filter(|(_, m)| !matches!(m.kind, LineKind::Blank | LineKind::Comment(_)))
        .take(3)
    {
        if RE_ECHO_OFF.is_match(line.text.trim()) {
            satisfied = true;
            break;
        }
    }
    if !satisfied {
        diags.push(Diagnostic::with_context(
            1,
            known("S001"),
            "script should start with @ECHO OFF",
        ));
    }

    if script.is_bat() {
        diags.push(Diagnostic::with_context(
            1,
            known("S007"),
            "consider the .cmd extension for modern Windows targets",
        ));

        // W028: first command whose errorlevel behavior depends on the
        // extension; flagged once per file.
        for (line, meta) in script.lines.iter().zip(metas) {
            if !matches!(meta.kind, LineKind::Code) {
                continue;
            }
            if let Some(word) = lexical::first_word(&line.text) {
                if ERRORLEVEL_SENSITIVE.contains(&word.as_str()) {
                    diags.push(Diagnostic::with_context(
                        line.index,
                        known("W028"),
                        format!("'{word}' sets errorlevel differently in .bat and .cmd"),
                    ));
                    break;
                }
            }
        }
    }

    // E031: dangling continuation on the script's final non-blank line.
    if let Some((line, meta)) = script
        .lines
        .iter()
        .zip(metas)
        .rev()
        .find(|(_, m)| !matches!(m.kind, LineKind::Blank))
    {
        if matches!(meta.kind, LineKind::Code)
            && lexical::continuation(&line.text) == Continuation::Continues
        {
            diags.push(Diagnostic::with_context(
                line.index,
                known("E031"),
                "nothing follows the continuation caret",
            ));
        }
    }
}

/// E018, S005, W018, W019, S016 — all driven by the detected ending style.
fn line_ending_rules(script: &SourceScript, metas: &[LineMeta], diags: &mut Vec<Diagnostic>) {
    match script.line_ending {
        LineEnding::Lf => {
            diags.push(Diagnostic::with_context(
                1,
                known("E018"),
                format!("{} LF-only line endings found", script.lf_count),
            ));
        }
        LineEnding::Mixed => {
            diags.push(Diagnostic::with_context(
                1,
                known("S005"),
                format!(
                    "CRLF: {}, LF-only: {}, CR-only: {}",
                    script.crlf_count, script.lf_count, script.cr_count
                ),
            ));
        }
        _ => {}
    }

    let risky = matches!(
        script.line_ending,
        LineEnding::Lf | LineEnding::Cr | LineEnding::Mixed
    );
    if !risky {
        return;
    }

    if let Some(line) = script
        .lines
        .iter()
        .find(|l| l.text.chars().any(|c| !c.is_ascii()))
    {
        diags.push(Diagnostic::with_context(
            line.index,
            known("W018"),
            "multi-byte characters combined with non-CRLF line endings",
        ));
    }

    if let Some(line) = script
        .lines
        .iter()
        .find(|l| RE_GOTO_OR_CALL_COLON.is_match(&l.text))
    {
        diags.push(Diagnostic::with_context(
            line.index,
            known("W019"),
            "GOTO/CALL label lookup is unreliable with non-CRLF endings",
        ));
    }

    if let Some((line, _)) = script.lines.iter().zip(metas).find(|(_, m)| {
        matches!(m.kind, LineKind::Comment(CommentStyle::DoubleColon))
    }) {
        diags.push(Diagnostic::with_context(
            line.index,
            known("S016"),
            ":: comments can be misparsed with non-CRLF endings",
        ));
    }
}

/// E001: net parenthesis depth across the file.
fn paren_balance(script: &SourceScript, metas: &[LineMeta], diags: &mut Vec<Diagnostic>) {
    let mut depth = 0i32;
    // Lines that opened currently-unmatched parens, outermost first.
    let mut open_lines: Vec<usize> = Vec::new();

    for (line, meta) in script.lines.iter().zip(metas) {
        if !matches!(meta.kind, LineKind::Code) {
            continue;
        }
        let (delta, minimum) = lexical::paren_delta(&line.text);
        if depth + minimum < 0 {
            diags.push(Diagnostic::with_context(
                line.index,
                known("E001"),
                "closing parenthesis without a matching opener",
            ));
            depth = (depth + delta).max(0);
            open_lines.clear();
            continue;
        }
        match delta.cmp(&0) {
            std::cmp::Ordering::Greater => {
                for _ in 0..delta {
                    open_lines.push(line.index);
                }
            }
            std::cmp::Ordering::Less => {
                for _ in 0..(-delta) {
                    open_lines.pop();
                }
            }
            std::cmp::Ordering::Equal => {}
        }
        depth += delta;
    }

    if depth > 0 {
        let at = open_lines.first().copied().unwrap_or(script.lines.len().max(1));
        diags.push(Diagnostic::with_context(
            at,
            known("E001"),
            format!("{depth} parenthesis left unclosed at end of file"),
        ));
    }
}

/// E002 and W013.
fn label_rules(ctx: &AnalysisContext, diags: &mut Vec<Diagnostic>) {
    for (name, line) in &ctx.labels_referenced {
        if name == "eof" {
            continue;
        }
        if !ctx.labels_defined.contains_key(name) {
            diags.push(Diagnostic::with_context(
                *line,
                known("E002"),
                format!("no label ':{name}' is defined"),
            ));
        }
    }
    for (name, line) in &ctx.duplicate_labels {
        let first = ctx.labels_defined.get(name).copied().unwrap_or(0);
        diags.push(Diagnostic::with_context(
            *line,
            known("W013"),
            format!("label ':{name}' already defined on line {first}"),
        ));
    }
}

/// E008 (once per unreachable region) and S010 (dead labels).
fn reachability(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    let referenced: HashSet<&str> = ctx
        .labels_referenced
        .iter()
        .map(|(name, _)| name.as_str())
        .collect();

    let mut reachable = true;
    let mut region_flagged = false;
    let mut depth = 0i32;

    for (line, meta) in script.lines.iter().zip(metas) {
        match &meta.kind {
            LineKind::Blank | LineKind::Comment(_) => {}
            LineKind::Label(name) => {
                if !reachable && !referenced.contains(name.as_str()) {
                    diags.push(Diagnostic::with_context(
                        line.index,
                        known("S010"),
                        format!("label ':{name}' is unreachable and never referenced"),
                    ));
                }
                reachable = true;
                region_flagged = false;
            }
            LineKind::Code => {
                if !reachable && !region_flagged {
                    diags.push(Diagnostic::with_context(
                        line.index,
                        known("E008"),
                        "code after an unconditional EXIT or GOTO",
                    ));
                    region_flagged = true;
                }
                let first = lexical::first_word(&line.text).unwrap_or_default();
                let terminator = matches!(first.as_str(), "exit" | "goto");
                let (delta, _) = lexical::paren_delta(&line.text);
                if terminator && depth == 0 {
                    reachable = false;
                    region_flagged = false;
                }
                depth = (depth + delta).max(0);
            }
        }
    }
}

/// E006: position-aware undefined variable references.
fn undefined_variables(ctx: &AnalysisContext, diags: &mut Vec<Diagnostic>) {
    for (name, line) in &ctx.variables_referenced {
        if !ctx.variable_defined_at(name, *line) {
            diags.push(Diagnostic::with_context(
                *line,
                known("E006"),
                format!("variable '{name}' is used but never defined"),
            ));
        }
    }
}

/// SETLOCAL family: P003, P004, P005, P006, P008, P024, P026, W022.
fn scope_rules(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    let mut stack: Vec<usize> = Vec::new();
    let mut delayed_stack: Vec<bool> = vec![false];
    let mut p006_lines: HashSet<usize> = HashSet::new();

    for event in &ctx.scope_events {
        match event {
            ScopeEvent::Setlocal { line, delayed, extensions } => {
                let delayed_now = *delayed_stack.last().unwrap_or(&false);

                if *delayed == Some(false)
                    && *line > 10
                    && !*extensions
                    && !delayed_now
                    && !ctx.has_bang_chars
                    && previous_code_word(script, metas, *line).as_deref() != Some("endlocal")
                {
                    diags.push(Diagnostic::with_context(
                        *line,
                        known("P026"),
                        "delayed expansion is already disabled here",
                    ));
                }

                if *delayed == Some(true) && !ctx.uses_delayed_vars {
                    diags.push(Diagnostic::with_context(
                        *line,
                        known("P004"),
                        "no !var! references in the script",
                    ));
                }

                if next_code_word(script, metas, *line).as_deref() == Some("endlocal") {
                    diags.push(Diagnostic::new(*line, known("P024")));
                }

                stack.push(*line);
                delayed_stack.push(delayed.unwrap_or(delayed_now));
            }
            ScopeEvent::Endlocal { line } => {
                if stack.pop().is_none() {
                    diags.push(Diagnostic::with_context(
                        *line,
                        known("P005"),
                        "no SETLOCAL is open here",
                    ));
                } else {
                    delayed_stack.pop();
                }
            }
            ScopeEvent::Exit { line: _ } => {
                for open in &stack {
                    if p006_lines.insert(*open) {
                        diags.push(Diagnostic::with_context(
                            *open,
                            known("P006"),
                            "SETLOCAL is still open at an exit point",
                        ));
                    }
                }
            }
        }
    }
    // Falling off the end of the file is an exit point too.
    for open in &stack {
        if p006_lines.insert(*open) {
            diags.push(Diagnostic::with_context(
                *open,
                known("P006"),
                "SETLOCAL is never closed",
            ));
        }
    }

    // P003: a SETLOCAL in a script with no SET at all — unless the more
    // specific P006 already covers that line.
    if !ctx.has_set_commands {
        for event in &ctx.scope_events {
            if let ScopeEvent::Setlocal { line, .. } = event {
                if !p006_lines.contains(line) {
                    diags.push(Diagnostic::with_context(
                        *line,
                        known("P003"),
                        "no SET commands in the script",
                    ));
                }
            }
        }
    }

    if ctx.uses_delayed_vars && !ctx.enables_delayed_expansion {
        if let Some(line) = first_matching_code_line(script, metas, &RE_BANG_VAR) {
            diags.push(Diagnostic::with_context(
                line,
                known("P008"),
                "!var! used without ENABLEDELAYEDEXPANSION",
            ));
        }
        diags.push(Diagnostic::with_context(
            1,
            known("W022"),
            "script uses !var! but never enables delayed expansion",
        ));
    }
}

/// W001: coarse fall-through detection.
fn exit_path(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    // Linear scripts with no control flow at all manage no exit codes; the
    // rule is about scripts that do.
    let has_control_flow = !ctx.labels_defined.is_empty()
        || !ctx.scope_events.is_empty()
        || !ctx.labels_referenced.is_empty();
    if !has_control_flow {
        return;
    }

    // Pure subroutine library: a label comes before any command.
    for (_, meta) in script.lines.iter().zip(metas) {
        match &meta.kind {
            LineKind::Label(_) => return,
            LineKind::Code => break,
            _ => {}
        }
    }

    let mut last_code: Option<&crate::loader::SourceLine> = None;
    let mut only_echo_off = true;
    for (line, meta) in script.lines.iter().zip(metas) {
        if matches!(meta.kind, LineKind::Code) {
            if !RE_ECHO_OFF.is_match(line.text.trim()) {
                only_echo_off = false;
            }
            last_code = Some(line);
        }
    }
    let Some(last) = last_code else { return };
    if only_echo_off {
        return;
    }

    let first = lexical::first_word(&last.text).unwrap_or_default();
    if first != "exit" && first != "goto" {
        diags.push(Diagnostic::with_context(
            last.index,
            known("W001"),
            "execution can reach the end of the script without an exit code",
        ));
    }
}

/// W004: `:label … GOTO label` with nothing changing in between.
fn infinite_loops(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    for (name, label_line) in &ctx.labels_defined {
        let goto_line = script.lines.iter().zip(metas).find(|(line, meta)| {
            line.index > *label_line
                && matches!(meta.kind, LineKind::Code)
                && lexical::first_word(&line.text).as_deref() == Some("goto")
                && RE_GOTO
                    .captures(&line.text)
                    .is_some_and(|c| c[1].trim_start_matches(':').eq_ignore_ascii_case(name))
        });
        let Some((goto_stmt, _)) = goto_line else { continue };

        let mut escapes = false;
        let mut mutated = false;
        let mut referenced: HashSet<String> = HashSet::new();
        for (line, meta) in script.lines.iter().zip(metas) {
            if line.index <= *label_line || line.index >= goto_stmt.index {
                continue;
            }
            if !matches!(meta.kind, LineKind::Code) {
                continue;
            }
            let first = lexical::first_word(&line.text).unwrap_or_default();
            if matches!(first.as_str(), "exit" | "goto" | "if" | "call") {
                escapes = true;
                break;
            }
            for caps in RE_PERCENT_VAR.captures_iter(&line.text.replace("%%", "  ")) {
                let name = caps[0].trim_matches('%').to_ascii_uppercase();
                referenced.insert(name);
            }
            if let Some(caps) = RE_SET_ASSIGN.captures(&line.text) {
                if referenced.contains(&caps[1].to_ascii_uppercase()) {
                    mutated = true;
                }
            }
        }
        // A second look: SETs before the variable is read still count as
        // mutation of loop state.
        if !escapes && !mutated {
            for (line, meta) in script.lines.iter().zip(metas) {
                if line.index <= *label_line || line.index >= goto_stmt.index {
                    continue;
                }
                if !matches!(meta.kind, LineKind::Code) {
                    continue;
                }
                if let Some(caps) = RE_SET_ASSIGN.captures(&line.text) {
                    if referenced.contains(&caps[1].to_ascii_uppercase()) {
                        mutated = true;
                        break;
                    }
                }
            }
        }
        if !escapes && !mutated {
            diags.push(Diagnostic::with_context(
                goto_stmt.index,
                known("W004"),
                format!("GOTO {name} loops with no exit condition or state change"),
            ));
        }
    }
}

/// P002: a run of three identical code lines recurring elsewhere.
fn duplication_rules(script: &SourceScript, metas: &[LineMeta], diags: &mut Vec<Diagnostic>) {
    let code: Vec<(usize, String)> = script
        .lines
        .iter()
        .zip(metas)
        .filter(|(_, m)| matches!(m.kind, LineKind::Code))
        .map(|(l, _)| (l.index, l.text.trim().to_string()))
        .collect();
    if code.len() < 6 {
        return;
    }

    let mut first_seen: HashMap<[&str; 3], usize> = HashMap::new();
    let mut pos = 0;
    while pos + 2 < code.len() {
        let key = [
            code[pos].1.as_str(),
            code[pos + 1].1.as_str(),
            code[pos + 2].1.as_str(),
        ];
        match first_seen.get(&key) {
            Some(&origin) if pos >= origin + 3 => {
                diags.push(Diagnostic::with_context(
                    code[pos].0,
                    known("P002"),
                    format!("block repeats lines first seen at line {}", code[origin].0),
                ));
                pos += 3;
                continue;
            }
            Some(_) => {}
            None => {
                first_seen.insert(key, pos);
            }
        }
        pos += 1;
    }
}

/// P001, P011, P012, P021, P022, P025.
fn redundancy_rules(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    let code: Vec<(usize, &str)> = script
        .lines
        .iter()
        .zip(metas)
        .filter(|(_, m)| matches!(m.kind, LineKind::Code))
        .map(|(l, _)| (l.index, l.text.as_str()))
        .collect();

    // P001: the same IF EXIST check repeated nearby.
    for (i, (index, text)) in code.iter().enumerate() {
        let Some(caps) = RE_IF_EXIST.captures(text) else { continue };
        let target = caps[1].to_ascii_lowercase();
        for (next_index, next_text) in code.iter().skip(i + 1).take(4) {
            if RE_IF_EXIST
                .captures(next_text)
                .is_some_and(|c| c[1].eq_ignore_ascii_case(&target))
            {
                diags.push(Diagnostic::with_context(
                    *next_index,
                    known("P001"),
                    format!("existence of {target} was already checked on line {index}"),
                ));
                break;
            }
        }
    }

    // P011: reassignment with no use of the previous value.
    let mut assignments: HashMap<String, Vec<usize>> = HashMap::new();
    for (index, text) in &code {
        if let Some(caps) = RE_SET_ASSIGN.captures(text) {
            assignments
                .entry(caps[1].to_ascii_uppercase())
                .or_default()
                .push(*index);
        }
    }
    for (name, lines) in &assignments {
        let usages: Vec<usize> = ctx
            .variables_referenced
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, l)| *l)
            .collect();
        for pair in lines.windows(2) {
            let used_between = usages.iter().any(|&u| u > pair[0] && u < pair[1]);
            if !used_between {
                diags.push(Diagnostic::with_context(
                    pair[0],
                    known("P011"),
                    format!("'{name}' is reassigned on line {} without being read", pair[1]),
                ));
            }
        }
    }

    // P012: adjacent string operations on the same variable.
    for window in code.windows(2) {
        let (_, first_text) = window[0];
        let (second_line, second_text) = window[1];
        if let (Some(a), Some(b)) = (
            RE_STRING_OP_ASSIGN.captures(first_text),
            RE_STRING_OP_ASSIGN.captures(second_text),
        ) {
            if a[1].eq_ignore_ascii_case(&b[1]) && a[2].eq_ignore_ascii_case(&b[2]) {
                diags.push(Diagnostic::with_context(
                    second_line,
                    known("P012"),
                    "combine the consecutive string operations",
                ));
            }
        }
    }

    // P021: the identical search command run more than once.
    let mut searches: HashMap<String, usize> = HashMap::new();
    for (index, text) in &code {
        if RE_SEARCH_CMD.is_match(text) {
            let normalized = text.trim().to_ascii_lowercase();
            if let Some(&first) = searches.get(&normalized) {
                diags.push(Diagnostic::with_context(
                    *index,
                    known("P021"),
                    format!("identical search already ran on line {first}"),
                ));
            } else {
                searches.insert(normalized, *index);
            }
        }
    }

    // P022: COPY followed closely by DEL of the source.
    for (i, (_, text)) in code.iter().enumerate() {
        let Some(caps) = RE_COPY.captures(text) else { continue };
        let source = caps[1].to_ascii_lowercase();
        for (next_index, next_text) in code.iter().skip(i + 1).take(3) {
            if RE_DEL
                .captures(next_text)
                .is_some_and(|c| c[1].eq_ignore_ascii_case(&source))
            {
                diags.push(Diagnostic::with_context(
                    *next_index,
                    known("P022"),
                    "COPY followed by DEL of the source; use MOVE",
                ));
                break;
            }
        }
    }

    // P025: three or more consecutive ECHO appends to one file.
    let mut run_start: Option<(usize, String)> = None;
    let mut run_len = 0usize;
    let mut flagged_runs: HashSet<usize> = HashSet::new();
    for (index, text) in &code {
        let target = RE_ECHO_APPEND
            .captures(text)
            .map(|c| c[1].to_ascii_lowercase());
        let Some(target) = target else {
            run_start = None;
            run_len = 0;
            continue;
        };
        let continues = run_start
            .as_ref()
            .is_some_and(|(_, current)| *current == target);
        if continues {
            run_len += 1;
            let start = run_start.as_ref().map(|(s, _)| *s).unwrap_or(*index);
            if run_len >= 3 && flagged_runs.insert(start) {
                diags.push(Diagnostic::with_context(
                    start,
                    known("P025"),
                    format!("{run_len} consecutive appends to {target}; write one block"),
                ));
            }
        } else {
            run_start = Some((*index, target));
            run_len = 1;
        }
    }
}

/// W014, W016, W032.
fn interaction_rules(script: &SourceScript, metas: &[LineMeta], diags: &mut Vec<Diagnostic>) {
    let code_lines: Vec<&crate::loader::SourceLine> = script
        .lines
        .iter()
        .zip(metas)
        .filter(|(_, m)| matches!(m.kind, LineKind::Code))
        .map(|(l, _)| l)
        .collect();

    let has_input = code_lines.iter().any(|l| RE_USER_INPUT.is_match(&l.text));
    let has_pause = code_lines.iter().any(|l| RE_PAUSE.is_match(&l.text));
    if has_input && !has_pause {
        if let Some(last) = code_lines.last() {
            diags.push(Diagnostic::with_context(
                last.index,
                known("W014"),
                "interactive script should PAUSE before closing",
            ));
        }
    }

    // W016: both expansion styles in one script; the later style is flagged.
    let first_percent = first_matching_code_line(script, metas, &RE_PERCENT_VAR);
    let first_bang = first_matching_code_line(script, metas, &RE_BANG_VAR);
    if let (Some(p), Some(b)) = (first_percent, first_bang) {
        let (line, other, style) = if b > p {
            (b, p, "%VAR%")
        } else {
            (p, b, "!VAR!")
        };
        diags.push(Diagnostic::with_context(
            line,
            known("W016"),
            format!("mixed expansion styles ({style} first used on line {other})"),
        ));
    }

    let has_non_ascii = script
        .lines
        .iter()
        .any(|l| l.text.chars().any(|c| !c.is_ascii()));
    let has_chcp = code_lines.iter().any(|l| RE_CHCP.is_match(&l.text));
    if has_non_ascii && !has_chcp {
        diags.push(Diagnostic::with_context(
            1,
            known("W032"),
            "non-ASCII content without a CHCP declaration",
        ));
    }
}

/// S006, S008, S012 (cross-file), S013, S015, S017, S018.
fn file_style_rules(
    script: &SourceScript,
    metas: &[LineMeta],
    ctx: &AnalysisContext,
    diags: &mut Vec<Diagnostic>,
) {
    // S013: a header comment in the first five lines.
    if script.lines.len() >= 5 {
        let documented = script.lines.iter().take(5).zip(metas).any(|(line, meta)| {
            meta.is_comment() && RE_DOC_KEYWORD.is_match(&line.text)
        });
        if !documented {
            diags.push(Diagnostic::with_context(
                1,
                known("S013"),
                "no header comment describing purpose, author or date",
            ));
        }
    }

    // S012 (cross-file): tab-indented and space-indented lines coexist.
    let mut first_tab: Option<usize> = None;
    let mut first_space: Option<usize> = None;
    for line in &script.lines {
        match line.text.chars().next() {
            Some('\t') => first_tab = first_tab.or(Some(line.index)),
            Some(' ') => first_space = first_space.or(Some(line.index)),
            _ => {}
        }
    }
    if let (Some(t), Some(s)) = (first_tab, first_space) {
        diags.push(Diagnostic::with_context(
            t.max(s),
            known("S012"),
            format!("file mixes tab (line {t}) and space (line {s}) indentation"),
        ));
    }

    // S015: GOTO colon style consistency (GOTO :EOF is exempt).
    let mut first_style: Option<(usize, bool)> = None;
    for (line, meta) in script.lines.iter().zip(metas) {
        if !matches!(meta.kind, LineKind::Code) {
            continue;
        }
        let Some(caps) = RE_GOTO.captures(&line.text) else { continue };
        let target = caps[1].to_ascii_lowercase();
        if target == ":eof" || target == "eof" || target.contains('%') || target.contains('!') {
            continue;
        }
        let uses_colon = target.starts_with(':');
        match first_style {
            None => first_style = Some((line.index, uses_colon)),
            Some((first_line, style)) if style != uses_colon => {
                diags.push(Diagnostic::with_context(
                    line.index,
                    known("S015"),
                    format!(
                        "GOTO style differs from the first GOTO on line {first_line}"
                    ),
                ));
            }
            Some(_) => {}
        }
    }

    // S017: the same variable SET with different casing.
    let mut case_styles: HashMap<String, &'static str> = HashMap::new();
    for (line, meta) in script.lines.iter().zip(metas) {
        if !matches!(meta.kind, LineKind::Code) {
            continue;
        }
        let Some(caps) = RE_SET_ASSIGN.captures(&line.text) else { continue };
        let name = caps[1].to_string();
        let style = if name.chars().all(|c| !c.is_ascii_lowercase()) {
            "upper"
        } else if name.chars().all(|c| !c.is_ascii_uppercase()) {
            "lower"
        } else {
            "mixed"
        };
        let key = name.to_ascii_uppercase();
        match case_styles.get(key.as_str()) {
            Some(&seen) if seen != style => {
                diags.push(Diagnostic::with_context(
                    line.index,
                    known("S017"),
                    format!("inconsistent casing for variable {key}"),
                ));
            }
            Some(_) => {}
            None => {
                case_styles.insert(key, style);
            }
        }
    }

    // S006: naming conventions mixed across different variables. The context
    // stores names uppercased, so this reads the raw SET lines.
    let mut caps_line: Option<usize> = None;
    let mut lower_line: Option<usize> = None;
    for (line, meta) in script.lines.iter().zip(metas) {
        if !matches!(meta.kind, LineKind::Code) {
            continue;
        }
        if let Some(caps) = RE_SET_ASSIGN.captures(&line.text) {
            let name = &caps[1];
            if name.len() < 2 {
                continue;
            }
            if name.chars().any(|c| c.is_ascii_lowercase()) {
                lower_line = lower_line.or(Some(line.index));
            } else {
                caps_line = caps_line.or(Some(line.index));
            }
        }
    }
    if let (Some(c), Some(l)) = (caps_line, lower_line) {
        diags.push(Diagnostic::with_context(
            c.max(l),
            known("S006"),
            "ALL_CAPS and lower-case variable names are mixed",
        ));
    }

    // S018: subroutine labels without a nearby comment.
    for (line, meta) in script.lines.iter().zip(metas) {
        let LineKind::Label(name) = &meta.kind else { continue };
        if ctx.labels_defined.get(name) != Some(&line.index) {
            continue; // duplicates already carry W013
        }
        let documented = script.lines[line.index.saturating_sub(5)..line.index - 1]
            .iter()
            .any(|prev| metas[prev.index - 1].is_comment());
        if !documented {
            diags.push(Diagnostic::with_context(
                line.index,
                known("S018"),
                format!("':{name}' has no describing comment"),
            ));
        }
    }

    // S008: long uncommented stretches of code.
    let mut run_start: Option<usize> = None;
    let mut run_len = 0usize;
    for (line, meta) in script.lines.iter().zip(metas) {
        match meta.kind {
            LineKind::Code => {
                if run_start.is_none() {
                    run_start = Some(line.index);
                }
                run_len += 1;
            }
            _ => {
                if run_len > 10 {
                    if let Some(start) = run_start {
                        diags.push(Diagnostic::with_context(
                            start,
                            known("S008"),
                            format!("{run_len} consecutive lines without a comment"),
                        ));
                    }
                }
                run_start = None;
                run_len = 0;
            }
        }
    }
    if run_len > 10 {
        if let Some(start) = run_start {
            diags.push(Diagnostic::with_context(
                start,
                known("S008"),
                format!("{run_len} consecutive lines without a comment"),
            ));
        }
    }
}

fn first_matching_code_line(
    script: &SourceScript,
    metas: &[LineMeta],
    regex: &Regex,
) -> Option<usize> {
    script
        .lines
        .iter()
        .zip(metas)
        .find(|(line, meta)| {
            matches!(meta.kind, LineKind::Code) && regex.is_match(&line.text.replace("%%", "  "))
        })
        .map(|(line, _)| line.index)
}

fn next_code_word(script: &SourceScript, metas: &[LineMeta], after: usize) -> Option<String> {
    script
        .lines
        .iter()
        .zip(metas)
        .find(|(line, meta)| line.index > after && matches!(meta.kind, LineKind::Code))
        .and_then(|(line, _)| lexical::first_word(&line.text))
}

fn previous_code_word(script: &SourceScript, metas: &[LineMeta], before: usize) -> Option<String> {
    script
        .lines
        .iter()
        .zip(metas)
        .filter(|(line, meta)| line.index < before && matches!(meta.kind, LineKind::Code))
        .next_back()
        .and_then(|(line, _)| lexical::first_word(&line.text))
}
