//! The rule catalog.
//!
//! Every diagnostic the analyzer can produce references one [`Rule`] from the
//! static [`RULES`] table. The table is data only: decision procedures live in
//! the [`engine`](crate::engine) modules. Codes are a public API — once
//! assigned, a code never changes severity or meaning, and removed rules
//! leave their codes reserved (`E026` and `S021`–`S027` are such gaps).

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// Severity level of a rule.
///
/// The ordering used for both the `--min-severity` filter and report
/// ordering is `Style < Performance < Security < Warning < Error`
/// (see [`Severity::rank`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Will break the script or produce wrong behavior at runtime.
    Error,
    /// Likely problem or fragile construct; the script may still run.
    Warning,
    /// Readability and formatting concerns.
    Style,
    /// Security weaknesses and abuse patterns.
    Security,
    /// Inefficient constructs with faster equivalents.
    Performance,
}

impl Severity {
    /// Numeric rank for filtering and ordering; higher is more severe.
    pub fn rank(self) -> u8 {
        match self {
            Severity::Style => 0,
            Severity::Performance => 1,
            Severity::Security => 2,
            Severity::Warning => 3,
            Severity::Error => 4,
        }
    }

    /// Parses a severity name as written in config files (case-insensitive).
    pub fn parse(name: &str) -> Option<Severity> {
        match name.to_ascii_uppercase().as_str() {
            "ERROR" => Some(Severity::Error),
            "WARNING" => Some(Severity::Warning),
            "STYLE" => Some(Severity::Style),
            "SECURITY" => Some(Severity::Security),
            "PERFORMANCE" => Some(Severity::Performance),
            _ => None,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Style => write!(f, "Style"),
            Severity::Security => write!(f, "Security"),
            Severity::Performance => write!(f, "Performance"),
        }
    }
}

/// A single linting rule: stable code, severity, and the human-facing text
/// shown in reports.
#[derive(Debug, serde::Serialize)]
pub struct Rule {
    /// Stable public identifier (e.g. `"E002"`, `"SEC015"`).
    pub code: &'static str,
    /// One-line name.
    pub name: &'static str,
    /// Severity level.
    pub severity: Severity,
    /// What the problem is.
    pub explanation: &'static str,
    /// How to fix it.
    pub recommendation: &'static str,
}

/// Returns the rule for `code`, if it exists in the catalog.
pub fn lookup(code: &str) -> Option<&'static Rule> {
    static INDEX: LazyLock<HashMap<&'static str, &'static Rule>> =
        LazyLock::new(|| RULES.iter().map(|r| (r.code, r)).collect());
    INDEX.get(code).copied()
}

/// Returns the rule for a code known at compile time.
///
/// Engines reference catalog entries by literal code; a miss here is a
/// catalog/engine mismatch, which the integration suite surfaces on the
/// first script that exercises the offending check.
pub(crate) fn known(code: &'static str) -> &'static Rule {
    match lookup(code) {
        Some(rule) => rule,
        None => panic!("rule {code} referenced by an engine but missing from the catalog"),
    }
}

/// The full rule table, grouped by severity series.
pub static RULES: &[Rule] = &[
    // Error level (E001-E034, E026 reserved)
    Rule {
        code: "E001",
        name: "Nested parentheses mismatch",
        severity: Severity::Error,
        explanation: "Improperly nested or unmatched parentheses cause syntax errors",
        recommendation: "Ensure every opening parenthesis has a matching closing parenthesis",
    },
    Rule {
        code: "E002",
        name: "Missing label for GOTO statement",
        severity: Severity::Error,
        explanation: "GOTO points to a label that does not exist, which fails at runtime",
        recommendation: "Create the missing label or correct the GOTO target",
    },
    Rule {
        code: "E003",
        name: "IF statement improper formatting",
        severity: Severity::Error,
        explanation: "IF statement is missing its comparison operator or condition",
        recommendation: "Use IF \"value1\" operator \"value2\" command",
    },
    Rule {
        code: "E004",
        name: "IF EXIST syntax mixing",
        severity: Severity::Error,
        explanation: "Mixing IF EXIST with comparison operators is invalid syntax",
        recommendation: "Use either IF EXIST filename or IF \"var\"==\"value\", not both",
    },
    Rule {
        code: "E005",
        name: "Invalid path syntax",
        severity: Severity::Error,
        explanation: "Path contains characters that are invalid in Windows file names",
        recommendation: "Remove <>|*? from paths and keep them under the system length limit",
    },
    Rule {
        code: "E006",
        name: "Undefined variable reference",
        severity: Severity::Error,
        explanation: "Variable is referenced before any SET defines it",
        recommendation: "Define the variable with SET before use, or add an existence check",
    },
    Rule {
        code: "E007",
        name: "Empty variable check syntax error",
        severity: Severity::Error,
        explanation: "Unquoted empty-variable comparison breaks when the variable is empty",
        recommendation: "Use IF \"%VAR%\"==\"\" for empty checks",
    },
    Rule {
        code: "E008",
        name: "Unreachable code after EXIT or GOTO",
        severity: Severity::Error,
        explanation: "Code after an unconditional EXIT or GOTO never executes",
        recommendation: "Remove the unreachable code or restructure the control flow",
    },
    Rule {
        code: "E009",
        name: "Mismatched quotes",
        severity: Severity::Error,
        explanation: "An odd number of double quotes leaves a string unterminated",
        recommendation: "Pair every opening quote with a closing quote",
    },
    Rule {
        code: "E010",
        name: "Malformed FOR loop missing DO",
        severity: Severity::Error,
        explanation: "FOR loops require the DO keyword",
        recommendation: "Write FOR %%i IN (items) DO command",
    },
    Rule {
        code: "E011",
        name: "Invalid variable expansion syntax",
        severity: Severity::Error,
        explanation: "Variable reference has unmatched % or ! delimiters",
        recommendation: "Use matching delimiters: %VAR% or !VAR!",
    },
    Rule {
        code: "E012",
        name: "Missing CALL for subroutine invocation",
        severity: Severity::Error,
        explanation: "A label used as a command with arguments does not return control",
        recommendation: "Invoke subroutines with CALL :label arguments",
    },
    Rule {
        code: "E013",
        name: "Invalid command syntax detected",
        severity: Severity::Error,
        explanation: "Command name appears to be a typo of a batch keyword",
        recommendation: "Check spelling: IF not IFF, ECHO not ECKO, FOR not FORX",
    },
    Rule {
        code: "E014",
        name: "Missing colon in CALL statement",
        severity: Severity::Error,
        explanation: "CALL to an internal label requires a colon, unlike GOTO",
        recommendation: "Use CALL :label_name for internal subroutines",
    },
    Rule {
        code: "E015",
        name: "Missing colon in GOTO :EOF statement",
        severity: Severity::Error,
        explanation: "GOTO :EOF is a built-in construct and the colon is mandatory",
        recommendation: "Write GOTO :EOF, never GOTO EOF",
    },
    Rule {
        code: "E016",
        name: "Invalid errorlevel comparison syntax",
        severity: Severity::Error,
        explanation: "Errorlevel comparison lacks a comparison operator",
        recommendation: "Use IF ERRORLEVEL n, IF NOT ERRORLEVEL n, or IF %ERRORLEVEL% EQU n",
    },
    Rule {
        code: "E017",
        name: "Invalid percent-tilde syntax",
        severity: Severity::Error,
        explanation: "Percent-tilde expansion contains an unknown modifier",
        recommendation: "Valid modifiers are f d p n x s a t z, e.g. %~nx1",
    },
    Rule {
        code: "E018",
        name: "Unix line endings detected",
        severity: Severity::Error,
        explanation: "LF-only line endings cause GOTO/CALL label lookup failures in cmd.exe",
        recommendation: "Convert the file to CRLF line endings",
    },
    Rule {
        code: "E019",
        name: "Percent-tilde on non-parameter variable",
        severity: Severity::Error,
        explanation: "Percent-tilde works only on %0-%9 parameters and FOR variables",
        recommendation: "Apply %~ modifiers to %1-%9 or FOR variables such as %%i",
    },
    Rule {
        code: "E020",
        name: "Invalid FOR loop variable syntax",
        severity: Severity::Error,
        explanation: "FOR variables need %% in batch files; single % is command-line syntax",
        recommendation: "Use %%i inside a batch file, %i only interactively",
    },
    Rule {
        code: "E021",
        name: "Invalid string operation syntax",
        severity: Severity::Error,
        explanation: "Substring or replacement expression is malformed",
        recommendation: "Use %var:~start,length% or %var:old=new%",
    },
    Rule {
        code: "E022",
        name: "Invalid arithmetic expression in SET /A",
        severity: Severity::Error,
        explanation: "SET /A expression contains invalid tokens or operators",
        recommendation: "Use the documented operators and balanced parentheses",
    },
    Rule {
        code: "E023",
        name: "Missing quotes in SET /A with special characters",
        severity: Severity::Error,
        explanation: "Unquoted ^ & | << >> inside SET /A are taken by the command parser",
        recommendation: "Quote the expression: SET /A \"result=5^2\"",
    },
    Rule {
        code: "E024",
        name: "Invalid parameter modifier combination",
        severity: Severity::Error,
        explanation: "Percent-tilde modifiers are combined in a way cmd.exe rejects",
        recommendation: "Do not combine a with z; $PATH: search applies to parameters only",
    },
    Rule {
        code: "E025",
        name: "Parameter modifier on wrong context",
        severity: Severity::Error,
        explanation: "Parameter modifier applied to an ordinary environment variable",
        recommendation: "Use modifiers only with %1-%9 or FOR variables",
    },
    Rule {
        code: "E027",
        name: "UNC path used as working directory",
        severity: Severity::Error,
        explanation: "CD cannot change to a UNC path",
        recommendation: "Use PUSHD \\\\server\\share ... POPD instead of CD",
    },
    Rule {
        code: "E028",
        name: "Complex quote escaping error",
        severity: Severity::Error,
        explanation: "Embedded quote pattern is not handled the way it reads",
        recommendation: "Use the \"\"\"text\"\"\" pattern or a variable for literal quotes",
    },
    Rule {
        code: "E029",
        name: "Complex SET /A expression errors",
        severity: Severity::Error,
        explanation: "Arithmetic expression is unbalanced or pathologically nested",
        recommendation: "Balance parentheses and split multi-assignment expressions",
    },
    Rule {
        code: "E030",
        name: "Line continuation broken by trailing whitespace",
        severity: Severity::Error,
        explanation: "Whitespace after a trailing caret stops cmd.exe from continuing the line",
        recommendation: "Make the caret the last character on the line",
    },
    Rule {
        code: "E031",
        name: "Dangling line continuation at end of file",
        severity: Severity::Error,
        explanation: "The final line ends with a continuation caret but nothing follows",
        recommendation: "Remove the trailing caret or add the continued line",
    },
    Rule {
        code: "E032",
        name: "Caret used to escape percent sign",
        severity: Severity::Error,
        explanation: "Caret does not escape %; the percent still expands",
        recommendation: "Write %% to produce a literal percent sign",
    },
    Rule {
        code: "E033",
        name: "Comment line ends with continuation caret",
        severity: Severity::Error,
        explanation: "A REM line ending in ^ swallows the following line into the comment",
        recommendation: "Drop the trailing caret from the comment",
    },
    Rule {
        code: "E034",
        name: "Removed command detected",
        severity: Severity::Error,
        explanation: "Command has been removed from current Windows releases",
        recommendation: "Replace the command with a supported equivalent",
    },
    // Warning level (W001-W033)
    Rule {
        code: "W001",
        name: "Missing exit code",
        severity: Severity::Warning,
        explanation: "Execution can fall off the end of the script without setting an exit code",
        recommendation: "End every path with EXIT /B 0, EXIT /B 1 or GOTO :EOF",
    },
    Rule {
        code: "W002",
        name: "Missing ERRORLEVEL check",
        severity: Severity::Warning,
        explanation: "Operation that commonly fails is never checked for success",
        recommendation: "Test IF ERRORLEVEL 1 (or use ||) after the operation",
    },
    Rule {
        code: "W003",
        name: "Operation without error handling",
        severity: Severity::Warning,
        explanation: "Referenced script could not be resolved, so failures go unnoticed",
        recommendation: "Verify the CALL target path and add error handling",
    },
    Rule {
        code: "W004",
        name: "Potential infinite loop",
        severity: Severity::Warning,
        explanation: "GOTO returns to a label with no state change or exit between them",
        recommendation: "Add a counter or exit condition inside the loop",
    },
    Rule {
        code: "W005",
        name: "Unquoted variable with spaces",
        severity: Severity::Warning,
        explanation: "An expansion that may contain spaces is used unquoted",
        recommendation: "Quote the expansion: IF \"%VAR%\"==\"value\"",
    },
    Rule {
        code: "W006",
        name: "Network operation without timeout",
        severity: Severity::Warning,
        explanation: "Network command can hang indefinitely without a timeout",
        recommendation: "Add a count or timeout parameter, e.g. PING -n 4",
    },
    Rule {
        code: "W007",
        name: "File operation on potentially locked file",
        severity: Severity::Warning,
        explanation: "Files under the Windows directory are often locked by the system",
        recommendation: "Check availability before operating on system files",
    },
    Rule {
        code: "W008",
        name: "Permanent PATH modification",
        severity: Severity::Warning,
        explanation: "SETX changes PATH permanently for the whole account",
        recommendation: "Use SET for a session-local change, or confirm the permanence is wanted",
    },
    Rule {
        code: "W009",
        name: "Windows version compatibility",
        severity: Severity::Warning,
        explanation: "Command is unavailable on older Windows versions",
        recommendation: "Guard with a version check or provide a fallback",
    },
    Rule {
        code: "W010",
        name: "Architecture-specific operation",
        severity: Severity::Warning,
        explanation: "Operation is tied to 32-bit or 64-bit Windows specifics",
        recommendation: "Detect the architecture and handle both variants",
    },
    Rule {
        code: "W011",
        name: "Unicode handling issue",
        severity: Severity::Warning,
        explanation: "Command may mangle Unicode content",
        recommendation: "Prefer commands with proper Unicode support",
    },
    Rule {
        code: "W012",
        name: "Non-ASCII characters detected",
        severity: Severity::Warning,
        explanation: "Non-ASCII characters can be misread under other code pages",
        recommendation: "Stick to ASCII or pin the code page explicitly",
    },
    Rule {
        code: "W013",
        name: "Duplicate label",
        severity: Severity::Warning,
        explanation: "Only the first definition of a label is ever the GOTO target",
        recommendation: "Rename duplicate labels to be unique",
    },
    Rule {
        code: "W014",
        name: "Missing PAUSE for user interaction",
        severity: Severity::Warning,
        explanation: "Interactive script can close its window before output is read",
        recommendation: "Add PAUSE before the final EXIT",
    },
    Rule {
        code: "W015",
        name: "Deprecated command usage",
        severity: Severity::Warning,
        explanation: "Legacy DOS command may be missing from newer Windows versions",
        recommendation: "Replace the command with its modern equivalent",
    },
    Rule {
        code: "W016",
        name: "Mixed variable syntax within script",
        severity: Severity::Warning,
        explanation: "Mixing %VAR% and !VAR! styles obscures when expansion happens",
        recommendation: "Pick one expansion style and use it consistently",
    },
    Rule {
        code: "W017",
        name: "Errorlevel comparison semantic difference",
        severity: Severity::Warning,
        explanation: "IF %ERRORLEVEL% NEQ 1 matches 0,2,3,... unlike IF NOT ERRORLEVEL 1",
        recommendation: "Use IF NOT ERRORLEVEL 1, or IF %ERRORLEVEL% EQU 0 for success",
    },
    Rule {
        code: "W018",
        name: "Multi-byte characters with line ending risks",
        severity: Severity::Warning,
        explanation: "Multi-byte characters plus non-CRLF endings misalign the batch parser",
        recommendation: "Remove the non-ASCII characters or convert the file to CRLF",
    },
    Rule {
        code: "W019",
        name: "GOTO/CALL with line ending risks",
        severity: Severity::Warning,
        explanation: "Label lookup can fail near buffer boundaries with non-CRLF endings",
        recommendation: "Convert the file to CRLF line endings",
    },
    Rule {
        code: "W020",
        name: "FOR /F missing parsing options",
        severity: Severity::Warning,
        explanation: "FOR /F without tokens/delims relies on fragile default parsing",
        recommendation: "Specify options explicitly: FOR /F \"tokens=1,2 delims=,\"",
    },
    Rule {
        code: "W021",
        name: "IF comparison without quotes",
        severity: Severity::Warning,
        explanation: "Unquoted comparison breaks when the value contains spaces or is empty",
        recommendation: "Quote both sides: IF \"%VAR%\"==\"value\"",
    },
    Rule {
        code: "W022",
        name: "Missing SETLOCAL EnableDelayedExpansion",
        severity: Severity::Warning,
        explanation: "!var! syntax is used but delayed expansion is never enabled",
        recommendation: "Add SETLOCAL ENABLEDELAYEDEXPANSION near the top of the script",
    },
    Rule {
        code: "W023",
        name: "Inefficient nested FOR loops",
        severity: Severity::Warning,
        explanation: "Nested FOR loops multiply iteration cost on large inputs",
        recommendation: "Restructure the loops or pre-filter the data set",
    },
    Rule {
        code: "W024",
        name: "Deprecated command detected",
        severity: Severity::Warning,
        explanation: "Command is deprecated in current Windows releases",
        recommendation: "Replace it: WMIC with PowerShell CIM, CACLS with ICACLS, AT with SCHTASKS",
    },
    Rule {
        code: "W025",
        name: "Missing error redirection",
        severity: Severity::Warning,
        explanation: "Command failure output will leak to the console",
        recommendation: "Redirect errors: 2>NUL to discard or 2>&1 to capture",
    },
    Rule {
        code: "W026",
        name: "Inefficient parameter modifier usage",
        severity: Severity::Warning,
        explanation: "Adjacent percent-tilde expansions of one parameter can be combined",
        recommendation: "Use a combined modifier such as %~dpnx1",
    },
    Rule {
        code: "W027",
        name: "Command behavior differs between interpreters",
        severity: Severity::Warning,
        explanation: "Command behaves differently under COMMAND.COM and cmd.exe",
        recommendation: "Test on the target interpreter or use a portable alternative",
    },
    Rule {
        code: "W028",
        name: "Errorlevel handling difference between .bat and .cmd",
        severity: Severity::Warning,
        explanation: "APPEND, DPATH, FTYPE, SET, PATH, ASSOC and PROMPT set errorlevel only in .cmd",
        recommendation: "Use the .cmd extension for consistent errorlevel behavior",
    },
    Rule {
        code: "W029",
        name: "16-bit command in 64-bit context",
        severity: Severity::Warning,
        explanation: "16-bit .COM binaries do not run on 64-bit Windows",
        recommendation: "Use a 32-bit or 64-bit replacement",
    },
    Rule {
        code: "W030",
        name: "Characters outside Code Page 437",
        severity: Severity::Warning,
        explanation: "Characters beyond the OEM code page may display or compare incorrectly",
        recommendation: "Use ASCII, or declare a code page with CHCP",
    },
    Rule {
        code: "W031",
        name: "Unicode filename in batch operation",
        severity: Severity::Warning,
        explanation: "File operations on Unicode names can fail in batch context",
        recommendation: "Run cmd /U or rename the files to ASCII",
    },
    Rule {
        code: "W032",
        name: "Missing character set declaration",
        severity: Severity::Warning,
        explanation: "Non-ASCII content without CHCP depends on the console's default code page",
        recommendation: "Add @CHCP 65001 (or the appropriate code page) at the top",
    },
    Rule {
        code: "W033",
        name: "Command execution may be ambiguous",
        severity: Severity::Warning,
        explanation: "Extensionless CALL resolves through PATHEXT and may pick the wrong file",
        recommendation: "Spell out the extension in CALL statements",
    },
    // Style level (S001-S020, S021-S027 reserved, S028)
    Rule {
        code: "S001",
        name: "Missing @ECHO OFF at file start",
        severity: Severity::Style,
        explanation: "Scripts normally start with @ECHO OFF to suppress command echo",
        recommendation: "Add @ECHO OFF as the first line",
    },
    Rule {
        code: "S002",
        name: "ECHO OFF without @ prefix",
        severity: Severity::Style,
        explanation: "Without @ the ECHO OFF command itself is echoed",
        recommendation: "Use @ECHO OFF",
    },
    Rule {
        code: "S003",
        name: "Inconsistent command capitalization",
        severity: Severity::Style,
        explanation: "Command keywords switch casing style partway through the script",
        recommendation: "Pick one casing for commands and keep it throughout",
    },
    Rule {
        code: "S004",
        name: "Trailing whitespace",
        severity: Severity::Style,
        explanation: "Trailing spaces and tabs can end up inside values and comparisons",
        recommendation: "Strip whitespace from line ends",
    },
    Rule {
        code: "S005",
        name: "Mixed line endings",
        severity: Severity::Style,
        explanation: "The file mixes CRLF, LF and CR line terminators",
        recommendation: "Normalize the whole file to CRLF",
    },
    Rule {
        code: "S006",
        name: "Inconsistent variable naming",
        severity: Severity::Style,
        explanation: "Variable names switch between ALL_CAPS and lower/camelCase styles",
        recommendation: "Use one naming convention for all variables",
    },
    Rule {
        code: "S007",
        name: "BAT extension used instead of CMD",
        severity: Severity::Style,
        explanation: ".cmd is preferred over .bat on Windows 2000 and newer",
        recommendation: "Rename the script to .cmd for modern Windows targets",
    },
    Rule {
        code: "S008",
        name: "Missing comments for complex code",
        severity: Severity::Style,
        explanation: "A long uncommented block is hard to maintain",
        recommendation: "Add REM comments explaining the block's purpose",
    },
    Rule {
        code: "S009",
        name: "Magic numbers used",
        severity: Severity::Style,
        explanation: "Hardcoded counts and delays obscure intent",
        recommendation: "Define the value once with SET and reference the variable",
    },
    Rule {
        code: "S010",
        name: "Dead code detected",
        severity: Severity::Style,
        explanation: "Label is unreachable and never referenced",
        recommendation: "Remove the unused label and its block",
    },
    Rule {
        code: "S011",
        name: "Line exceeds maximum length",
        severity: Severity::Style,
        explanation: "Overlong lines are hard to read and review",
        recommendation: "Split the line with caret continuations",
    },
    Rule {
        code: "S012",
        name: "Inconsistent indentation",
        severity: Severity::Style,
        explanation: "Tabs and spaces are mixed for indentation",
        recommendation: "Indent with either tabs or spaces, not both",
    },
    Rule {
        code: "S013",
        name: "Missing file header documentation",
        severity: Severity::Style,
        explanation: "The script has no header stating purpose, author or date",
        recommendation: "Add REM header comments at the top",
    },
    Rule {
        code: "S014",
        name: "Long parameter list affects readability",
        severity: Severity::Style,
        explanation: "Subroutine call passes many positional parameters",
        recommendation: "Group related parameters into variables",
    },
    Rule {
        code: "S015",
        name: "Inconsistent colon usage in GOTO statements",
        severity: Severity::Style,
        explanation: "GOTO targets are written both with and without a leading colon",
        recommendation: "Choose GOTO label or GOTO :label and keep it consistent",
    },
    Rule {
        code: "S016",
        name: "Potentially unsafe double-colon comment",
        severity: Severity::Style,
        explanation: ":: comments can be misparsed as labels with non-CRLF endings",
        recommendation: "Use REM, or ensure the file is CRLF throughout",
    },
    Rule {
        code: "S017",
        name: "Inconsistent variable naming convention",
        severity: Severity::Style,
        explanation: "The same variable is SET with different casings",
        recommendation: "Keep each variable's casing identical everywhere",
    },
    Rule {
        code: "S018",
        name: "Missing function documentation",
        severity: Severity::Style,
        explanation: "Subroutine label has no comment describing it",
        recommendation: "Add a REM line above the label describing purpose and parameters",
    },
    Rule {
        code: "S019",
        name: "Magic numbers in code",
        severity: Severity::Style,
        explanation: "Unexplained numeric literal",
        recommendation: "Define a named constant: SET MAX_RETRIES=3",
    },
    Rule {
        code: "S020",
        name: "Long line without continuation",
        severity: Severity::Style,
        explanation: "Line exceeds the limit and does not use caret continuation",
        recommendation: "Break the line with ^ continuations",
    },
    Rule {
        code: "S028",
        name: "Redundant parentheses around single command",
        severity: Severity::Style,
        explanation: "Parentheses around one simple command add nothing",
        recommendation: "Drop the surrounding parentheses",
    },
    // Security level (SEC001-SEC024)
    Rule {
        code: "SEC001",
        name: "Potential command injection vulnerability",
        severity: Severity::Security,
        explanation: "User input flows into a command without validation",
        recommendation: "Validate and sanitize input before using it in commands",
    },
    Rule {
        code: "SEC002",
        name: "Unsafe SET command usage",
        severity: Severity::Security,
        explanation: "Unquoted SET value can pick up stray characters and operators",
        recommendation: "Quote assignments: SET \"var=value\"",
    },
    Rule {
        code: "SEC003",
        name: "Dangerous command without confirmation",
        severity: Severity::Security,
        explanation: "Destructive command runs without any user confirmation",
        recommendation: "Prompt for confirmation before destructive operations",
    },
    Rule {
        code: "SEC004",
        name: "Dangerous registry operation",
        severity: Severity::Security,
        explanation: "Forced registry deletion can damage the system",
        recommendation: "Back up the key first and target specific values",
    },
    Rule {
        code: "SEC005",
        name: "Missing privilege check",
        severity: Severity::Security,
        explanation: "Admin-level operation is attempted without checking privileges",
        recommendation: "Check with NET SESSION >NUL 2>&1 before admin operations",
    },
    Rule {
        code: "SEC006",
        name: "Hardcoded absolute path",
        severity: Severity::Security,
        explanation: "Absolute path may not exist on other machines",
        recommendation: "Use environment variables such as %USERPROFILE%",
    },
    Rule {
        code: "SEC007",
        name: "Hardcoded temporary directory",
        severity: Severity::Security,
        explanation: "Fixed temp path may be absent or attacker-controlled",
        recommendation: "Use the %TEMP% variable",
    },
    Rule {
        code: "SEC008",
        name: "Plain text credentials detected",
        severity: Severity::Security,
        explanation: "Credentials are embedded in the script text",
        recommendation: "Prompt at runtime or use a secure credential store",
    },
    Rule {
        code: "SEC009",
        name: "PowerShell execution policy bypass",
        severity: Severity::Security,
        explanation: "-ExecutionPolicy Bypass disables script policy protections",
        recommendation: "Avoid the bypass flag unless strictly required",
    },
    Rule {
        code: "SEC010",
        name: "Sensitive information in ECHO output",
        severity: Severity::Security,
        explanation: "ECHO may print secrets to the console or logs",
        recommendation: "Never echo passwords, keys or tokens",
    },
    Rule {
        code: "SEC011",
        name: "Unvalidated path traversal",
        severity: Severity::Security,
        explanation: ".. sequences in file operations enable directory traversal",
        recommendation: "Validate paths and reject .. components",
    },
    Rule {
        code: "SEC012",
        name: "Unsafe temporary file creation",
        severity: Severity::Security,
        explanation: "Predictable temp file names invite squatting attacks",
        recommendation: "Mix %RANDOM% into temp file names",
    },
    Rule {
        code: "SEC013",
        name: "Command injection via variable substitution",
        severity: Severity::Security,
        explanation: "Variable content meets shell operators unescaped",
        recommendation: "Sanitize variables before combining them with & | < >",
    },
    Rule {
        code: "SEC014",
        name: "UNC path without UAC elevation check",
        severity: Severity::Security,
        explanation: "UNC operations can fail silently under UAC without elevation",
        recommendation: "Check privileges before touching UNC paths",
    },
    Rule {
        code: "SEC015",
        name: "Fork bomb pattern detected",
        severity: Severity::Security,
        explanation: "Script starts a copy of itself, exhausting the machine",
        recommendation: "Remove recursive self-execution",
    },
    Rule {
        code: "SEC016",
        name: "Potential hosts file modification",
        severity: Severity::Security,
        explanation: "Writing to the hosts file is a DNS poisoning vector",
        recommendation: "Do not modify the hosts file from scripts",
    },
    Rule {
        code: "SEC017",
        name: "Autorun.inf creation detected",
        severity: Severity::Security,
        explanation: "autorun.inf creation is a classic malware spreading vector",
        recommendation: "Remove autorun.inf creation unless building install media",
    },
    Rule {
        code: "SEC018",
        name: "Batch file copying itself to removable media",
        severity: Severity::Security,
        explanation: "Self-copying to other drives is virus-like behavior",
        recommendation: "Remove the self-copy unless it is deliberate deployment",
    },
    Rule {
        code: "SEC019",
        name: "Download-and-execute pattern",
        severity: Severity::Security,
        explanation: "Remote content is fetched and executed in one step",
        recommendation: "Download, verify, then execute explicitly",
    },
    Rule {
        code: "SEC020",
        name: "Obfuscated PowerShell invocation",
        severity: Severity::Security,
        explanation: "-EncodedCommand hides the actual payload from review",
        recommendation: "Invoke PowerShell with readable script text",
    },
    Rule {
        code: "SEC021",
        name: "Scheduled task with SYSTEM privileges",
        severity: Severity::Security,
        explanation: "Task created to run as SYSTEM is a persistence mechanism",
        recommendation: "Run scheduled tasks under the least privileged account",
    },
    Rule {
        code: "SEC022",
        name: "Firewall configuration tampering",
        severity: Severity::Security,
        explanation: "Script opens firewall rules or disables the firewall",
        recommendation: "Leave firewall policy to dedicated administration",
    },
    Rule {
        code: "SEC023",
        name: "Event log clearing detected",
        severity: Severity::Security,
        explanation: "Clearing event logs destroys the audit trail",
        recommendation: "Do not clear logs from scripts",
    },
    Rule {
        code: "SEC024",
        name: "Credential store access",
        severity: Severity::Security,
        explanation: "Script reads the SAM/SECURITY hives or directory credentials",
        recommendation: "Remove credential store access from batch scripts",
    },
    // Performance level (P001-P026)
    Rule {
        code: "P001",
        name: "Redundant file existence check",
        severity: Severity::Performance,
        explanation: "The same IF EXIST test is repeated within a few lines",
        recommendation: "Check once and reuse the result",
    },
    Rule {
        code: "P002",
        name: "Code duplication detected",
        severity: Severity::Performance,
        explanation: "An identical block of lines appears in more than one place",
        recommendation: "Extract the block into a CALL :subroutine",
    },
    Rule {
        code: "P003",
        name: "Unnecessary SETLOCAL",
        severity: Severity::Performance,
        explanation: "SETLOCAL has no effect when the script sets no variables",
        recommendation: "Remove the SETLOCAL",
    },
    Rule {
        code: "P004",
        name: "Unnecessary ENABLEDELAYEDEXPANSION",
        severity: Severity::Performance,
        explanation: "Delayed expansion is enabled but no !var! is ever used",
        recommendation: "Drop ENABLEDELAYEDEXPANSION",
    },
    Rule {
        code: "P005",
        name: "ENDLOCAL without SETLOCAL",
        severity: Severity::Performance,
        explanation: "ENDLOCAL without a matching SETLOCAL does nothing",
        recommendation: "Remove the extra ENDLOCAL",
    },
    Rule {
        code: "P006",
        name: "Missing ENDLOCAL before exit",
        severity: Severity::Performance,
        explanation: "SETLOCAL scope is still open when the script exits",
        recommendation: "Pair every SETLOCAL with ENDLOCAL before EXIT",
    },
    Rule {
        code: "P007",
        name: "Temporary file without random name",
        severity: Severity::Performance,
        explanation: "Fixed temp names collide when the script runs twice",
        recommendation: "Name temp files with %RANDOM%: temp_%RANDOM%.txt",
    },
    Rule {
        code: "P008",
        name: "Delayed expansion without enablement",
        severity: Severity::Performance,
        explanation: "!var! stays literal unless delayed expansion is enabled",
        recommendation: "Add SETLOCAL ENABLEDELAYEDEXPANSION before using !var!",
    },
    Rule {
        code: "P009",
        name: "Inefficient FOR loop pattern",
        severity: Severity::Performance,
        explanation: "FOR /F default tokenizing is slower on large inputs",
        recommendation: "Use \"tokens=*\" when the whole line is wanted",
    },
    Rule {
        code: "P010",
        name: "Missing optimization flags for directory operations",
        severity: Severity::Performance,
        explanation: "Directory listing is slower without the appropriate flags",
        recommendation: "Use DIR /F for large directories",
    },
    Rule {
        code: "P011",
        name: "Redundant variable assignments",
        severity: Severity::Performance,
        explanation: "Variable is reassigned before the previous value is ever read",
        recommendation: "Remove the dead assignment",
    },
    Rule {
        code: "P012",
        name: "Inefficient string operations",
        severity: Severity::Performance,
        explanation: "Consecutive string operations on one variable can be combined",
        recommendation: "Merge the operations into a single expansion",
    },
    Rule {
        code: "P013",
        name: "Missing /B flag for large DIR operations",
        severity: Severity::Performance,
        explanation: "Processing verbose DIR output wastes work",
        recommendation: "Use DIR /B when only names are needed",
    },
    Rule {
        code: "P014",
        name: "Unnecessary command output",
        severity: Severity::Performance,
        explanation: "Unwanted console output slows the script down",
        recommendation: "Redirect it away: command >NUL 2>&1",
    },
    Rule {
        code: "P015",
        name: "Inefficient delay implementation",
        severity: Severity::Performance,
        explanation: "PING/CHOICE-based delays burn cycles compared to TIMEOUT",
        recommendation: "Use TIMEOUT /T n on Vista and later",
    },
    Rule {
        code: "P016",
        name: "ECHO. used for blank line",
        severity: Severity::Performance,
        explanation: "ECHO. triggers a file lookup and fails if a file named ECHO exists",
        recommendation: "Use ECHO( to print a blank line",
    },
    Rule {
        code: "P017",
        name: "Child interpreter for internal command",
        severity: Severity::Performance,
        explanation: "CMD /C spawns a whole interpreter for a built-in command",
        recommendation: "Run the built-in directly",
    },
    Rule {
        code: "P018",
        name: "FOR /F over TYPE output",
        severity: Severity::Performance,
        explanation: "Spawning TYPE inside FOR /F is slower than reading the file set",
        recommendation: "Use FOR /F %%i IN (file.txt) instead of ('TYPE file.txt')",
    },
    Rule {
        code: "P019",
        name: "DIR used as existence test",
        severity: Severity::Performance,
        explanation: "DIR >NUL to probe a file is slower than IF EXIST",
        recommendation: "Use IF EXIST file.txt",
    },
    Rule {
        code: "P020",
        name: "CALL inside FOR loop body",
        severity: Severity::Performance,
        explanation: "CALL per iteration re-parses the script each time",
        recommendation: "Inline the body or batch the work outside the loop",
    },
    Rule {
        code: "P021",
        name: "Repeated search invocation",
        severity: Severity::Performance,
        explanation: "The identical FIND/FINDSTR command runs more than once",
        recommendation: "Run the search once and store the result",
    },
    Rule {
        code: "P022",
        name: "COPY then DEL instead of MOVE",
        severity: Severity::Performance,
        explanation: "Copying then deleting duplicates the data transfer",
        recommendation: "Use MOVE",
    },
    Rule {
        code: "P023",
        name: "Per-iteration append redirection",
        severity: Severity::Performance,
        explanation: "Opening the output file on every loop iteration is slow",
        recommendation: "Redirect the whole loop once: (FOR ...) >> file",
    },
    Rule {
        code: "P024",
        name: "SETLOCAL immediately followed by ENDLOCAL",
        severity: Severity::Performance,
        explanation: "The scope is opened and closed with nothing inside",
        recommendation: "Remove the empty SETLOCAL/ENDLOCAL pair",
    },
    Rule {
        code: "P025",
        name: "Consecutive echo appends to same file",
        severity: Severity::Performance,
        explanation: "Each >> reopens the file; a block writes once",
        recommendation: "Group the ECHOs: (ECHO a& ECHO b) >> file",
    },
    Rule {
        code: "P026",
        name: "Redundant DISABLEDELAYEDEXPANSION",
        severity: Severity::Performance,
        explanation: "Delayed expansion is already disabled at this point",
        recommendation: "Remove the redundant SETLOCAL DISABLEDELAYEDEXPANSION",
    },
];
