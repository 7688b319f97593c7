//! Whole-file rule coverage: labels, reachability, scope balance, loops,
//! duplication, and the file-level style and line-ending rules.

use batlint::config::LintOptions;
use batlint::diagnostic::Diagnostic;

fn lint_named(name: &str, content: &str) -> Vec<Diagnostic> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    batlint::lint(&path, &LintOptions::default()).unwrap()
}

fn has(diags: &[Diagnostic], line: usize, code: &str) -> bool {
    diags.iter().any(|d| d.line_number == line && d.code() == code)
}

fn fires(diags: &[Diagnostic], code: &str) -> bool {
    diags.iter().any(|d| d.code() == code)
}

#[test]
fn duplicate_label_is_w013_on_the_second_definition() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\n:task\r\nECHO a\r\n:task\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 4, "W013"), "{diags:?}");
    let w013 = diags.iter().find(|d| d.code() == "W013").unwrap();
    assert!(
        w013.context.as_deref().unwrap_or("").contains("line 2"),
        "context should name the first definition: {w013:?}"
    );
}

#[test]
fn code_after_unconditional_exit_is_e008() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nEXIT /B 0\r\nECHO dead\r\n");
    assert!(has(&diags, 3, "E008"), "{diags:?}");
}

#[test]
fn label_restores_reachability() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nCALL :sub\r\nEXIT /B 0\r\n:sub\r\nECHO alive\r\nEXIT /B 0\r\n",
    );
    assert!(!fires(&diags, "E008"), "{diags:?}");
    assert!(!fires(&diags, "S010"), "the label is referenced: {diags:?}");
}

#[test]
fn unreachable_unreferenced_label_is_s010() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nEXIT /B 0\r\n:unused\r\nECHO x\r\n");
    assert!(has(&diags, 3, "S010"), "{diags:?}");
    assert!(!fires(&diags, "E008"), "code after the label is reachable: {diags:?}");
}

#[test]
fn endlocal_without_setlocal_is_p005() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nENDLOCAL\r\n");
    assert!(has(&diags, 2, "P005"), "{diags:?}");
}

#[test]
fn empty_scope_pair_is_p024() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSETLOCAL\r\nENDLOCAL\r\nSET X=1\r\nECHO %X%\r\n",
    );
    assert!(has(&diags, 2, "P024"), "{diags:?}");
    assert!(!fires(&diags, "P003"), "the script does SET: {diags:?}");
}

#[test]
fn unused_delayed_expansion_is_p004() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSETLOCAL ENABLEDELAYEDEXPANSION\r\nSET X=1\r\nENDLOCAL\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 2, "P004"), "{diags:?}");
    assert!(!fires(&diags, "P006"), "the scope is closed before exit: {diags:?}");
}

#[test]
fn delayed_vars_without_enablement_fire_p008_and_w022() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSET X=1\r\nECHO !X!\r\nEXIT /B 0\r\n");
    assert!(has(&diags, 3, "P008"), "{diags:?}");
    assert!(has(&diags, 1, "W022"), "{diags:?}");
}

#[test]
fn setlocal_open_at_end_of_file_is_p006() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nSETLOCAL\r\nSET X=1\r\nECHO %X%\r\n");
    assert!(has(&diags, 2, "P006"), "{diags:?}");
}

#[test]
fn redundant_disabledelayedexpansion_after_line_ten_is_p026() {
    let mut content = String::from("@ECHO OFF\r\n");
    for i in 2..11 {
        content.push_str(&format!("ECHO filler {i}0\r\n"));
    }
    content.push_str("SETLOCAL DISABLEDELAYEDEXPANSION\r\nEXIT /B 0\r\n");
    let diags = lint_named("t.cmd", &content);
    assert!(has(&diags, 11, "P026"), "{diags:?}");
}

#[test]
fn disabledelayedexpansion_near_script_start_is_not_p026() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSETLOCAL DISABLEDELAYEDEXPANSION\r\nECHO defensive\r\nEXIT /B 0\r\n",
    );
    assert!(!fires(&diags, "P026"), "{diags:?}");
}

#[test]
fn disabledelayedexpansion_after_endlocal_is_not_p026() {
    let mut content = String::from("@ECHO OFF\r\nSETLOCAL ENABLEDELAYEDEXPANSION\r\n");
    for i in 3..11 {
        content.push_str(&format!("ECHO step {i}0\r\n"));
    }
    content.push_str("ENDLOCAL\r\nSETLOCAL DISABLEDELAYEDEXPANSION\r\nEXIT /B 0\r\n");
    let diags = lint_named("t.cmd", &content);
    assert!(!fires(&diags, "P026"), "toggling after ENDLOCAL is legitimate: {diags:?}");
}

#[test]
fn disabledelayedexpansion_with_extensions_is_not_p026() {
    let mut content = String::from("@ECHO OFF\r\n");
    for i in 2..12 {
        content.push_str(&format!("ECHO filler {i}0\r\n"));
    }
    content.push_str("SETLOCAL ENABLEEXTENSIONS DISABLEDELAYEDEXPANSION\r\nEXIT /B 0\r\n");
    let diags = lint_named("t.cmd", &content);
    assert!(!fires(&diags, "P026"), "{diags:?}");
}

#[test]
fn disabledelayedexpansion_with_literal_bangs_is_not_p026() {
    let mut content = String::from("@ECHO OFF\r\n");
    for i in 2..12 {
        content.push_str(&format!("ECHO filler {i}0\r\n"));
    }
    content.push_str("SETLOCAL DISABLEDELAYEDEXPANSION\r\nECHO Done!\r\nEXIT /B 0\r\n");
    let diags = lint_named("t.cmd", &content);
    assert!(!fires(&diags, "P026"), "literal ! is why the author disabled it: {diags:?}");
}

#[test]
fn tight_goto_loop_is_w004() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\n:wait\r\nECHO waiting\r\nGOTO wait\r\n");
    assert!(has(&diags, 4, "W004"), "{diags:?}");
}

#[test]
fn counted_loop_is_not_w004() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSET COUNT=0\r\n:loop\r\nSET /A COUNT+=1\r\nIF %COUNT% LSS 10 GOTO loop\r\nEXIT /B 0\r\n",
    );
    assert!(!fires(&diags, "W004"), "{diags:?}");
}

#[test]
fn repeated_three_line_block_is_p002() {
    let block = "COPY a.txt b.txt 2>nul\r\nDEL a.txt 2>nul\r\nECHO moved\r\n";
    let content = format!("@ECHO OFF\r\n{block}ECHO ----\r\n{block}EXIT /B 0\r\n");
    let diags = lint_named("t.cmd", &content);
    assert!(fires(&diags, "P002"), "{diags:?}");
}

#[test]
fn repeated_existence_check_is_p001() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nIF EXIST data.txt ECHO found\r\nIF EXIST data.txt ECHO again\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 3, "P001"), "{diags:?}");
}

#[test]
fn unread_reassignment_is_p011() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSET X=1\r\nSET X=2\r\nECHO %X%\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 2, "P011"), "{diags:?}");
}

#[test]
fn copy_then_del_is_p022() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nCOPY data.txt backup.txt 2>nul\r\nDEL data.txt 2>nul\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 3, "P022"), "{diags:?}");
}

#[test]
fn consecutive_appends_are_p025() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nECHO a>> log.txt\r\nECHO b>> log.txt\r\nECHO c>> log.txt\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 2, "P025"), "{diags:?}");
}

#[test]
fn mixed_expansion_styles_are_w016() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSETLOCAL ENABLEDELAYEDEXPANSION\r\nSET COUNT=1\r\nECHO %COUNT%\r\nECHO !COUNT!\r\nENDLOCAL\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 5, "W016"), "{diags:?}");
}

#[test]
fn interactive_script_without_pause_is_w014() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSET /P NAME=Enter name:\r\nECHO Hello %NAME%\r\n",
    );
    assert!(has(&diags, 3, "W014"), "{diags:?}");
}

#[test]
fn bat_extension_gets_s007_and_w028() {
    let diags = lint_named("t.bat", "@ECHO OFF\r\nPATH C:\\tools;%PATH%\r\nEXIT /B 0\r\n");
    assert!(has(&diags, 1, "S007"), "{diags:?}");
    assert!(has(&diags, 2, "W028"), "{diags:?}");

    let cmd = lint_named("t.cmd", "@ECHO OFF\r\nPATH C:\\tools;%PATH%\r\nEXIT /B 0\r\n");
    assert!(!fires(&cmd, "S007"), "{cmd:?}");
    assert!(!fires(&cmd, "W028"), "{cmd:?}");
}

#[test]
fn lf_only_endings_are_e018() {
    let diags = lint_named("t.cmd", "@ECHO OFF\nECHO hi\n");
    assert!(has(&diags, 1, "E018"), "{diags:?}");
}

#[test]
fn mixed_endings_are_s005() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nECHO a\nECHO b\r\nECHO c\n");
    assert!(has(&diags, 1, "S005"), "{diags:?}");
}

#[test]
fn goto_with_lf_endings_is_w019() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\nGOTO :end\nECHO skipped\n:end\nEXIT /B 0\n",
    );
    assert!(has(&diags, 2, "W019"), "{diags:?}");
}

#[test]
fn double_colon_comment_with_lf_endings_is_s016() {
    let diags = lint_named("t.cmd", ":: setup\n@ECHO OFF\nECHO hi\n");
    assert!(has(&diags, 1, "S016"), "{diags:?}");
}

#[test]
fn unclosed_block_is_e001() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nIF EXIST x.txt (\r\nECHO found\r\nEXIT /B 0\r\n");
    assert!(has(&diags, 2, "E001"), "{diags:?}");
}

#[test]
fn stray_closing_paren_is_e001() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\n)\r\n");
    assert!(has(&diags, 2, "E001"), "{diags:?}");
}

#[test]
fn dangling_continuation_at_eof_is_e031() {
    let diags = lint_named("t.cmd", "@ECHO OFF\r\nCOPY a.txt b.txt ^\r\n");
    assert!(has(&diags, 2, "E031"), "{diags:?}");
}

#[test]
fn missing_header_documentation_is_s013() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSET X=1\r\nECHO %X%\r\nECHO more\r\nECHO lines\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 1, "S013"), "{diags:?}");

    let documented = lint_named(
        "d.cmd",
        "@ECHO OFF\r\nREM Purpose: demonstrate headers\r\nSET X=1\r\nECHO %X%\r\nEXIT /B 0\r\n",
    );
    assert!(!fires(&documented, "S013"), "{documented:?}");
}

#[test]
fn inconsistent_goto_colon_style_is_s015() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nGOTO first\r\n:first\r\nGOTO :second\r\n:second\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 4, "S015"), "{diags:?}");
}

#[test]
fn variable_casing_drift_is_s017() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nSET RETRIES=3\r\nSET retries=5\r\nECHO %RETRIES%\r\nEXIT /B 0\r\n",
    );
    assert!(has(&diags, 3, "S017"), "{diags:?}");
}

#[test]
fn missing_exit_code_is_w001_when_control_flow_exists() {
    let diags = lint_named(
        "t.cmd",
        "@ECHO OFF\r\nIF \"%1\"==\"\" GOTO usage\r\nECHO running\r\nEXIT /B 0\r\n:usage\r\nECHO usage: t\r\n",
    );
    assert!(has(&diags, 6, "W001"), "{diags:?}");

    let linear = lint_named("l.cmd", "@ECHO OFF\r\nECHO one\r\nECHO two\r\n");
    assert!(!fires(&linear, "W001"), "no control flow, no exit-code duty: {linear:?}");
}
