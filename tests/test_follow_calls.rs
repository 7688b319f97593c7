//! Call-follower behavior: imported variable definitions are position-aware,
//! accumulate across CALLs, and never make the report worse.

use std::path::Path;

use batlint::config::LintOptions;
use batlint::diagnostic::Diagnostic;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn follow_options() -> LintOptions {
    LintOptions {
        follow_calls: true,
        ..LintOptions::default()
    }
}

fn e006_for(diags: &[Diagnostic], var: &str) -> Vec<usize> {
    diags
        .iter()
        .filter(|d| d.code() == "E006" && d.context.as_deref().unwrap_or("").contains(var))
        .map(|d| d.line_number)
        .collect()
}

#[test]
fn variables_from_called_script_count_as_defined() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nSET \"ANOTHER_VAR=more\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL helper.cmd\r\nECHO %HELPER_VAR%\r\nECHO %ANOTHER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(e006_for(&diags, "HELPER_VAR").is_empty(), "{diags:?}");
    assert!(e006_for(&diags, "ANOTHER_VAR").is_empty(), "{diags:?}");
}

#[test]
fn use_before_the_call_still_fires_e006() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nECHO %HELPER_VAR%\r\nCALL helper.cmd\r\nECHO %HELPER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert_eq!(
        e006_for(&diags, "HELPER_VAR"),
        vec![2],
        "only the pre-CALL use is undefined: {diags:?}"
    );
}

#[test]
fn multiple_calls_accumulate_definitions() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "one.cmd", "@ECHO OFF\r\nSET \"VAR1=a\"\r\nEXIT /B 0\r\n");
    write(dir.path(), "two.cmd", "@ECHO OFF\r\nSET \"VAR2=b\"\r\nEXIT /B 0\r\n");
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL one.cmd\r\nECHO %VAR1%\r\nCALL two.cmd\r\nECHO %VAR1% %VAR2%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(e006_for(&diags, "VAR1").is_empty(), "{diags:?}");
    assert!(e006_for(&diags, "VAR2").is_empty(), "{diags:?}");
}

#[test]
fn missing_call_target_is_w003_and_analysis_continues() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL nonexistent.cmd\r\nECHO %UNDEFINED_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(
        diags.iter().any(|d| d.line_number == 2 && d.code() == "W003"),
        "{diags:?}"
    );
    assert_eq!(e006_for(&diags, "UNDEFINED_VAR"), vec![3], "{diags:?}");
}

#[test]
fn without_follow_calls_the_import_does_not_happen() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL helper.cmd\r\nECHO %HELPER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &LintOptions::default()).unwrap();
    assert_eq!(e006_for(&diags, "HELPER_VAR"), vec![3], "{diags:?}");
}

#[test]
fn following_never_adds_e006() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL helper.cmd\r\nECHO %HELPER_VAR%\r\nECHO %STILL_MISSING%\r\nEXIT /B 0\r\n",
    );

    let plain = batlint::lint(&main, &LintOptions::default()).unwrap();
    let followed = batlint::lint(&main, &follow_options()).unwrap();

    let count = |diags: &[Diagnostic]| diags.iter().filter(|d| d.code() == "E006").count();
    assert!(count(&followed) <= count(&plain), "following may only remove E006");
    assert_eq!(e006_for(&followed, "STILL_MISSING"), vec![4], "{followed:?}");
}

#[test]
fn self_call_cycle_terminates() {
    let dir = tempfile::tempdir().unwrap();
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nIF \"%1\"==\"\" EXIT /B 0\r\nCALL main.cmd done\r\nEXIT /B 0\r\n",
    );

    // The visited set must break the cycle; reaching this assertion at all
    // means the analysis terminated.
    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(diags.iter().all(|d| d.line_number >= 1 && d.line_number <= 4));
}

#[test]
fn dp0_relative_call_resolves_against_the_script_directory() {
    let dir = tempfile::tempdir().unwrap();
    let sub = dir.path().join("scripts");
    std::fs::create_dir_all(&sub).unwrap();
    write(
        &sub,
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        &sub,
        "main.cmd",
        "@ECHO OFF\r\nCALL \"%~dp0helper.cmd\"\r\nECHO %HELPER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(e006_for(&diags, "HELPER_VAR").is_empty(), "{diags:?}");
}

#[test]
fn extensionless_target_tries_bat_then_cmd() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nCALL helper\r\nECHO %HELPER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert!(e006_for(&diags, "HELPER_VAR").is_empty(), "{diags:?}");
}

#[test]
fn call_inside_a_comment_is_not_followed() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "helper.cmd",
        "@ECHO OFF\r\nSET \"HELPER_VAR=helper value\"\r\nEXIT /B 0\r\n",
    );
    let main = write(
        dir.path(),
        "main.cmd",
        "@ECHO OFF\r\nREM CALL helper.cmd\r\nECHO %HELPER_VAR%\r\nEXIT /B 0\r\n",
    );

    let diags = batlint::lint(&main, &follow_options()).unwrap();
    assert_eq!(e006_for(&diags, "HELPER_VAR"), vec![3], "{diags:?}");
}
