//! Per-line rule coverage: one small script per rule, positive and negative.

use batlint::config::LintOptions;
use batlint::diagnostic::Diagnostic;

fn lint_named(name: &str, content: &str) -> Vec<Diagnostic> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    batlint::lint(&path, &LintOptions::default()).unwrap()
}

fn codes_on_line(diags: &[Diagnostic], line: usize) -> Vec<&str> {
    diags
        .iter()
        .filter(|d| d.line_number == line)
        .map(|d| d.code())
        .collect()
}

fn fires(diags: &[Diagnostic], code: &str) -> bool {
    diags.iter().any(|d| d.code() == code)
}

#[test]
fn mismatched_quotes_fire_e009() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO \"unterminated\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"E009"), "{diags:?}");
}

#[test]
fn goto_eof_without_colon_is_e015_not_e002() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nGOTO EOF\r\n");
    assert!(fires(&diags, "E015"), "{diags:?}");
    assert!(!fires(&diags, "E002"), "EOF is built in, not a missing label: {diags:?}");
}

#[test]
fn call_to_label_without_colon_is_e014() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nCALL mysub\r\n:mysub\r\nEXIT /B 0\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"E014"), "{diags:?}");
}

#[test]
fn command_typos_fire_e013() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\necko hello\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"E013"), "{diags:?}");
}

#[test]
fn for_without_do_is_e010() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nFOR %%i IN (1 2 3)\r\n");
    assert!(fires(&diags, "E010"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nFOR %%i IN (1 2 3) DO ECHO %%i\r\n");
    assert!(!fires(&ok, "E010"), "{ok:?}");
}

#[test]
fn errorlevel_comparison_without_operator_is_e016() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nIF NOT %ERRORLEVEL% 1 ECHO failed\r\n");
    assert!(fires(&diags, "E016"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nIF %ERRORLEVEL% EQU 0 ECHO ok\r\n");
    assert!(!fires(&ok, "E016"), "{ok:?}");
}

#[test]
fn errorlevel_neq_one_semantics_is_w017() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nIF %ERRORLEVEL% NEQ 1 ECHO odd\r\n");
    assert!(fires(&diags, "W017"), "{diags:?}");
}

#[test]
fn percent_tilde_problems_are_classified() {
    let unknown = lint_named("a.cmd", "@ECHO OFF\r\nECHO %~q1\r\n");
    assert!(fires(&unknown, "E017"), "{unknown:?}");

    let bad_target = lint_named("b.cmd", "@ECHO OFF\r\nECHO %~nMYVAR\r\n");
    assert!(fires(&bad_target, "E019"), "{bad_target:?}");

    let bad_combo = lint_named("c.cmd", "@ECHO OFF\r\nECHO %~az1\r\n");
    assert!(fires(&bad_combo, "E024"), "{bad_combo:?}");

    let valid = lint_named("d.cmd", "@ECHO OFF\r\nSET DIR=\"%~dp0\"\r\nECHO %DIR%\r\n");
    for code in ["E017", "E019", "E024"] {
        assert!(!fires(&valid, code), "%~dp0 is valid: {valid:?}");
    }
}

#[test]
fn tilde_modifier_on_environment_variable_is_e025() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO %~nLONGNAME%\r\n");
    assert!(fires(&diags, "E025"), "{diags:?}");
}

#[test]
fn set_a_special_characters_need_quotes() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET /A RESULT=5^2\r\n");
    assert!(fires(&diags, "E023"), "{diags:?}");

    let quoted = lint_named("ok.cmd", "@ECHO OFF\r\nSET /A \"RESULT=5^2\"\r\nECHO %RESULT%\r\n");
    assert!(!fires(&quoted, "E023"), "{quoted:?}");
}

#[test]
fn set_a_unbalanced_parens_are_e029() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET /A X=(1+2\r\n");
    assert!(fires(&diags, "E029"), "{diags:?}");
}

#[test]
fn set_a_trailing_operator_is_e022() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET /A X=1+\r\n");
    assert!(fires(&diags, "E022"), "{diags:?}");
}

#[test]
fn cd_to_unc_path_is_e027() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nCD \\\\server\\share\\tools\r\n");
    assert!(fires(&diags, "E027"), "{diags:?}");
}

#[test]
fn broken_continuation_is_e030() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nCOPY a.txt b.txt ^  \r\nECHO done\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"E030"), "{diags:?}");
}

#[test]
fn caret_escaped_percent_is_e032() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO progress 50^%\r\n");
    assert!(fires(&diags, "E032"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nECHO progress 50%%\r\n");
    assert!(!fires(&ok, "E032"), "{ok:?}");
}

#[test]
fn rem_comment_ending_in_caret_is_e033() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nREM see the notes ^\r\nECHO swallowed\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"E033"), "{diags:?}");
}

#[test]
fn removed_commands_are_e034() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\ncaspol -q -machine\r\n");
    assert!(fires(&diags, "E034"), "{diags:?}");

    let phrase = lint_named("p.cmd", "@ECHO OFF\r\nnet print \\\\server\\queue\r\n");
    assert!(fires(&phrase, "E034"), "{phrase:?}");
}

#[test]
fn deprecated_commands_are_w024_but_xcopy_is_not() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nwmic os get caption\r\n");
    assert!(fires(&diags, "W024"), "{diags:?}");

    let at = lint_named("a.cmd", "@ECHO OFF\r\nat 12:00 backup.cmd\r\n");
    assert!(fires(&at, "W024"), "{at:?}");

    let xcopy = lint_named("x.cmd", "@ECHO OFF\r\nxcopy src dst /E\r\nIF ERRORLEVEL 1 EXIT /B 1\r\n");
    assert!(!fires(&xcopy, "W024"), "XCOPY is not deprecated: {xcopy:?}");
}

#[test]
fn for_f_without_options_is_w020() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nFOR /F %%a IN (data.txt) DO ECHO %%a\r\n");
    assert!(fires(&diags, "W020"), "{diags:?}");

    let ok = lint_named(
        "ok.cmd",
        "@ECHO OFF\r\nFOR /F \"tokens=* delims=\" %%a IN (data.txt) DO ECHO %%a\r\n",
    );
    assert!(!fires(&ok, "W020"), "{ok:?}");
}

#[test]
fn file_operation_without_error_redirect_is_w025() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\ndel old.txt\r\nEXIT /B 0\r\n");
    assert!(fires(&diags, "W025"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\ndel old.txt 2>nul\r\nEXIT /B 0\r\n");
    assert!(!fires(&ok, "W025"), "{ok:?}");
}

#[test]
fn trailing_whitespace_is_s004() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO hi   \r\n");
    assert!(codes_on_line(&diags, 2).contains(&"S004"), "{diags:?}");
}

#[test]
fn redundant_parentheses_are_s028() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\n(ECHO hello)\r\n");
    assert!(fires(&diags, "S028"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nIF EXIST x (ECHO hello) ELSE (ECHO bye)\r\n");
    assert!(!fires(&ok, "S028"), "{ok:?}");
}

#[test]
fn inconsistent_command_casing_is_s003() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO one\r\necho two\r\nECHO three\r\n");
    assert!(codes_on_line(&diags, 3).contains(&"S003"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nECHO one\r\nECHO two\r\n");
    assert!(!fires(&ok, "S003"), "{ok:?}");
}

#[test]
fn unquoted_set_value_is_sec002() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET TARGET=build output\r\nECHO %TARGET%\r\n");
    assert!(fires(&diags, "SEC002"), "{diags:?}");

    let ok = lint_named("ok.cmd", "@ECHO OFF\r\nSET \"TARGET=build output\"\r\nECHO %TARGET%\r\n");
    assert!(!fires(&ok, "SEC002"), "{ok:?}");
}

#[test]
fn destructive_command_is_sec003() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nformat c:\r\n");
    assert!(fires(&diags, "SEC003"), "{diags:?}");
}

#[test]
fn hardcoded_credentials_are_sec008() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET \"PASSWORD=hunter2\"\r\nECHO %PASSWORD%\r\n");
    assert!(fires(&diags, "SEC008"), "{diags:?}");
}

#[test]
fn fork_bomb_pattern_is_sec015() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\n:boom\r\nstart \"\" %0\r\nGOTO boom\r\n");
    assert!(fires(&diags, "SEC015"), "{diags:?}");
}

#[test]
fn download_and_execute_is_sec019() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\npowershell -c \"IEX (New-Object Net.WebClient).DownloadString('h')\"\r\n",
    );
    assert!(fires(&diags, "SEC019"), "{diags:?}");
}

#[test]
fn encoded_powershell_is_sec020() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\npowershell -EncodedCommand SQBFAFgA\r\n");
    assert!(fires(&diags, "SEC020"), "{diags:?}");
}

#[test]
fn event_log_clearing_is_sec023() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nwevtutil cl Security\r\n");
    assert!(fires(&diags, "SEC023"), "{diags:?}");
}

#[test]
fn ping_delay_is_p015() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nping -n 5 127.0.0.1 >nul\r\nECHO done\r\n");
    assert!(fires(&diags, "P015"), "{diags:?}");
}

#[test]
fn echo_dot_is_p016() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO.\r\nECHO next\r\n");
    assert!(codes_on_line(&diags, 2).contains(&"P016"), "{diags:?}");
}

#[test]
fn cmd_c_for_internal_command_is_p017() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\ncmd /c echo hi\r\n");
    assert!(fires(&diags, "P017"), "{diags:?}");
}

#[test]
fn call_inside_for_body_is_p020() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nFOR %%i IN (1 2) DO CALL :work %%i\r\nEXIT /B 0\r\n:work\r\nEXIT /B 0\r\n",
    );
    assert!(fires(&diags, "P020"), "{diags:?}");
}
