//! Lexical helpers shared by both rule engines.
//!
//! Everything here is a pure function over line text. The helpers understand
//! just enough cmd.exe lexing — double quotes, caret escapes, `%%` literals —
//! to keep the pattern rules honest; they are not a full parser.

use std::sync::LazyLock;

use regex::Regex;

/// A token with the column (0-based, in chars) it starts at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// Token text, quotes included for quoted tokens.
    pub text: String,
    /// 0-based starting column.
    pub column: usize,
}

/// Splits a code line into whitespace-separated tokens, keeping quoted
/// spans together and honoring caret escapes.
pub fn tokenize(line: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut start = 0usize;
    let mut in_quotes = false;
    let mut escaped = false;

    for (col, ch) in line.chars().enumerate() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }
        match ch {
            '^' if !in_quotes => {
                current.push(ch);
                escaped = true;
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(ch);
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(Token {
                        text: std::mem::take(&mut current),
                        column: start,
                    });
                }
                start = col + 1;
            }
            other => {
                if current.is_empty() {
                    start = col;
                }
                current.push(other);
            }
        }
    }
    if !current.is_empty() {
        tokens.push(Token { text: current, column: start });
    }
    tokens
}

/// True when the line has an odd number of effective double quotes
/// (caret-escaped quotes do not count).
pub fn has_unmatched_quotes(line: &str) -> bool {
    let mut count = 0usize;
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '^' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count % 2 == 1
}

/// Replaces every quoted span with spaces so callers can pattern-match only
/// the unquoted parts of a line. Byte offsets are preserved: each masked
/// character becomes one space per byte, so positions found in the masked
/// text index safely into the original.
pub fn mask_quoted(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut in_quotes = false;
    for ch in line.chars() {
        if ch == '"' {
            in_quotes = !in_quotes;
            out.push('"');
        } else if in_quotes {
            for _ in 0..ch.len_utf8() {
                out.push(' ');
            }
        } else {
            out.push(ch);
        }
    }
    out
}

/// Net parenthesis contribution of one line, ignoring parens inside quotes
/// and caret-escaped parens. Returns `(depth_delta, minimum_running_delta)`.
pub fn paren_delta(line: &str) -> (i32, i32) {
    let mut delta = 0i32;
    let mut minimum = 0i32;
    let mut in_quotes = false;
    let mut escaped = false;
    for ch in line.chars() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '^' if !in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            '(' if !in_quotes => delta += 1,
            ')' if !in_quotes => {
                delta -= 1;
                minimum = minimum.min(delta);
            }
            _ => {}
        }
    }
    (delta, minimum)
}

/// Problems a percent-tilde expansion can have.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TildeIssue {
    /// A modifier letter outside the valid set (E017).
    UnknownModifier(char),
    /// Target is neither a parameter digit nor a FOR variable letter (E019).
    BadTarget(String),
    /// `a` combined with `z`, or `$PATH:` search on a non-digit (E024).
    BadCombination(String),
}

const VALID_TILDE_MODIFIERS: &str = "fdpnxsatz";

/// Scans one line for `%~` expansions and reports malformed ones.
pub fn scan_percent_tilde(line: &str) -> Vec<TildeIssue> {
    let chars: Vec<char> = line.chars().collect();
    let mut issues = Vec::new();
    let mut i = 0;
    while i + 1 < chars.len() {
        if chars[i] != '%' || chars[i + 1] != '~' {
            i += 1;
            continue;
        }
        // %%~ is an escaped percent followed by a tilde, not an expansion.
        if i > 0 && chars[i - 1] == '%' {
            i += 2;
            continue;
        }
        let mut j = i + 2;

        // Optional $VAR: path-search prefix.
        let mut path_search = false;
        if j < chars.len() && chars[j] == '$' {
            let mut k = j + 1;
            while k < chars.len() && (chars[k].is_ascii_alphanumeric() || chars[k] == '_') {
                k += 1;
            }
            if k < chars.len() && chars[k] == ':' {
                path_search = true;
                j = k + 1;
            }
        }

        // Letters: all but possibly the last are modifiers.
        let letters_start = j;
        while j < chars.len() && chars[j].is_ascii_alphabetic() {
            j += 1;
        }
        let letters: String = chars[letters_start..j].iter().collect();
        let digit_target = j < chars.len() && chars[j].is_ascii_digit();

        // With a digit target the letters are all modifiers. Without one,
        // the last letter can only be a FOR variable if everything before it
        // is a valid modifier; otherwise the letters are a plain variable
        // name, which percent-tilde cannot expand.
        let (modifiers, target): (String, String) = if digit_target {
            (letters, chars[j].to_string())
        } else if !letters.is_empty()
            && letters[..letters.len() - 1]
                .chars()
                .all(|m| VALID_TILDE_MODIFIERS.contains(m.to_ascii_lowercase()))
        {
            let split = letters.len() - 1;
            (letters[..split].to_string(), letters[split..].to_string())
        } else {
            (String::new(), letters.clone())
        };

        let trailing_ident = !digit_target
            && j < chars.len()
            && (chars[j].is_ascii_alphanumeric() || chars[j] == '_');

        if modifiers.is_empty() && target.len() != 1 || target.is_empty() || trailing_ident {
            while j < chars.len() && (chars[j].is_ascii_alphanumeric() || chars[j] == '_') {
                j += 1;
            }
            let shown: String = chars[i..j.min(chars.len()).min(i + 16)].iter().collect();
            issues.push(TildeIssue::BadTarget(shown));
            i = j;
            continue;
        }

        let lower = modifiers.to_ascii_lowercase();
        for m in lower.chars() {
            if !VALID_TILDE_MODIFIERS.contains(m) {
                issues.push(TildeIssue::UnknownModifier(m));
            }
        }
        if lower.contains('a') && lower.contains('z') {
            issues.push(TildeIssue::BadCombination(format!("%~{modifiers}{target}")));
        }
        if path_search && !digit_target {
            issues.push(TildeIssue::BadCombination(format!("$PATH: applied to {target}")));
        }

        i = j + 1;
    }
    issues
}

static FOR_SINGLE_PERCENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bfor\s+(?:/[a-z]\s+(?:\x22[^\x22]*\x22\s+)?)?%([A-Za-z])\s+in\b").unwrap()
});

/// True when a `FOR` header uses the interactive `%x` form instead of the
/// batch-file `%%x` form.
pub fn for_variable_uses_single_percent(line: &str) -> bool {
    FOR_SINGLE_PERCENT
        .captures(line)
        .is_some_and(|caps| {
            let whole = caps.get(0).map(|m| m.as_str()).unwrap_or("");
            !whole.contains("%%")
        })
}

/// Problems found in a `SET /A` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetAIssue {
    /// `^ & | < >` outside quotes will be eaten by the command parser (E023).
    UnquotedSpecial(char),
    /// Lexical or structural error in the expression (E022).
    Syntax(String),
    /// Unbalanced parens, extreme nesting, or assignment chains (E029).
    Pathological(String),
}

/// Validates the text between `SET /A` and end of statement.
pub fn validate_set_a(raw_expr: &str) -> Vec<SetAIssue> {
    let mut issues = Vec::new();
    let expr = raw_expr.trim();
    if expr.is_empty() {
        issues.push(SetAIssue::Syntax("empty expression".into()));
        return issues;
    }

    let quoted = expr.starts_with('"') && expr.ends_with('"') && expr.len() >= 2;
    let inner = if quoted { &expr[1..expr.len() - 1] } else { expr };

    if !quoted {
        for ch in inner.chars() {
            if matches!(ch, '^' | '&' | '|' | '<' | '>') {
                issues.push(SetAIssue::UnquotedSpecial(ch));
                break;
            }
        }
    }

    let mut depth = 0i32;
    let mut max_depth = 0i32;
    let mut assignments = 0usize;
    let mut prev: Option<char> = None;
    for ch in inner.chars() {
        match ch {
            '(' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            ')' => {
                depth -= 1;
                if depth < 0 {
                    issues.push(SetAIssue::Pathological("unbalanced parentheses".into()));
                    return issues;
                }
            }
            '=' => {
                // Compound operators (+=, <<=, …) count once; == never occurs
                // in arithmetic context.
                if prev != Some('=') {
                    assignments += 1;
                }
            }
            c if c.is_ascii_alphanumeric()
                || c.is_ascii_whitespace()
                || "+-*/%^&|~<>!,_\"".contains(c) => {}
            other => {
                issues.push(SetAIssue::Syntax(format!("invalid character '{other}'")));
                return issues;
            }
        }
        prev = Some(ch);
    }
    if depth != 0 {
        issues.push(SetAIssue::Pathological(format!("{depth} unclosed parenthesis")));
    }
    if max_depth > 8 {
        issues.push(SetAIssue::Pathological(format!("nesting depth {max_depth}")));
    }
    if assignments > 3 {
        issues.push(SetAIssue::Pathological(format!("{assignments} chained assignments")));
    }
    if inner
        .trim_end()
        .ends_with(['+', '-', '*', '/', '%', '&', '|', '^', '<', '>', '='])
    {
        issues.push(SetAIssue::Syntax("expression ends with an operator".into()));
    }
    issues
}

/// How a line participates in caret continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    /// No trailing caret.
    None,
    /// Ends with an unescaped caret; the next line is continued.
    Continues,
    /// A trailing caret is followed by whitespace, so cmd.exe will not
    /// actually continue the line.
    BrokenByWhitespace,
}

/// Classifies the trailing caret (if any) of `line`.
pub fn continuation(line: &str) -> Continuation {
    let trimmed = line.trim_end();
    let trailing_carets = trimmed.chars().rev().take_while(|&c| c == '^').count();
    if trailing_carets % 2 == 0 {
        // Even runs are self-escaped carets, not continuations.
        return Continuation::None;
    }
    if trimmed.len() == line.len() {
        Continuation::Continues
    } else {
        Continuation::BrokenByWhitespace
    }
}

/// True when the line contains `^%` outside quotes — a caret trying (and
/// failing) to escape a percent sign.
pub fn caret_escapes_percent(line: &str) -> bool {
    let masked = mask_quoted(line);
    let chars: Vec<char> = masked.chars().collect();
    for i in 0..chars.len().saturating_sub(1) {
        if chars[i] == '^' && chars[i + 1] == '%' {
            // ^^% is an escaped caret followed by an expansion; skip it.
            let preceding = chars[..i].iter().rev().take_while(|&&c| c == '^').count();
            if preceding % 2 == 0 {
                return true;
            }
        }
    }
    false
}

/// Lowercased first token of a code line, with a leading `@` stripped.
pub fn first_word(line: &str) -> Option<String> {
    let trimmed = line.trim_start().trim_start_matches('@');
    let word = trimmed.split_whitespace().next()?;
    Some(word.to_ascii_lowercase())
}
