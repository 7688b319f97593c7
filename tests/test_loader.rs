//! Loading behavior through the public entry point: load errors, the size
//! ceiling, and encoding detection.

use batlint::config::LintOptions;
use batlint::loader::{LineEnding, LoadError, SourceScript};

#[test]
fn missing_file_is_file_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let result = batlint::lint(&dir.path().join("absent.cmd"), &LintOptions::default());
    assert!(matches!(result, Err(LoadError::FileNotFound(_))));
}

#[test]
fn one_byte_over_the_ceiling_is_file_too_large() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("big.cmd");
    std::fs::write(&path, vec![b'x'; 11]).unwrap();

    let options = LintOptions {
        max_file_size: 10,
        ..LintOptions::default()
    };
    let result = batlint::lint(&path, &options);
    assert!(matches!(result, Err(LoadError::FileTooLarge { size: 11, limit: 10, .. })));
}

#[test]
fn file_at_exactly_the_ceiling_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("fits.cmd");
    std::fs::write(&path, b"@ECHO OFF\r").unwrap();

    let options = LintOptions {
        max_file_size: 10,
        ..LintOptions::default()
    };
    assert!(batlint::lint(&path, &options).is_ok());
}

#[test]
fn utf16le_with_bom_decodes_and_lints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("wide.cmd");
    let text = "@ECHO OFF\r\nGOTO nowhere\r\n";
    let mut bytes = vec![0xFF, 0xFE];
    bytes.extend(text.encode_utf16().flat_map(|u| u.to_le_bytes()));
    std::fs::write(&path, &bytes).unwrap();

    let diags = batlint::lint(&path, &LintOptions::default()).unwrap();
    assert!(
        diags.iter().any(|d| d.line_number == 2 && d.code() == "E002"),
        "{diags:?}"
    );
}

#[test]
fn single_lf_file_has_one_empty_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lf.cmd");
    std::fs::write(&path, b"\n").unwrap();

    let script = SourceScript::load(&path, 1024).unwrap();
    assert_eq!(script.line_ending, LineEnding::Lf);
    assert_eq!(script.lines.len(), 1);
    assert_eq!(script.lines[0].text, "");
}

#[test]
fn crlf_dominant_file_reports_crlf() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dom.cmd");
    // 40 CRLF lines against a single LF line keeps CRLF above the 95%
    // dominance threshold.
    let mut content = String::new();
    for i in 0..40 {
        content.push_str(&format!("ECHO {i}\r\n"));
    }
    content.push_str("ECHO stray\n");
    std::fs::write(&path, content.as_bytes()).unwrap();

    let script = SourceScript::load(&path, 1024 * 1024).unwrap();
    assert_eq!(script.line_ending, LineEnding::Crlf);
}

#[test]
fn cp1252_content_decodes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("legacy.cmd");
    std::fs::write(&path, b"@ECHO OFF\r\nECHO caf\xE9 \x80\r\n").unwrap();

    let script = SourceScript::load(&path, 1024).unwrap();
    assert_eq!(script.encoding, "cp1252");
    assert!(script.lines[1].text.contains('\u{20AC}'));
}
