//! Source loading: bytes to decoded, line-indexed script text.
//!
//! Detection order (deliberate, see the design notes): BOM match first, then
//! strict UTF-8, then a UTF-16 heuristic for BOM-less files, then CP1252,
//! then Latin-1 as the lossless last resort. A legacy file that happens to be
//! valid UTF-8 is treated as UTF-8 — the chain never second-guesses an
//! earlier success.

use std::fmt;
use std::path::{Path, PathBuf};

/// Default input size ceiling (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Failure to produce decoded text from a path.
///
/// Load errors are returned to the caller before any analysis starts; they
/// never surface as diagnostics.
#[derive(Debug)]
pub enum LoadError {
    /// The file does not exist or could not be opened.
    FileNotFound(PathBuf),
    /// The file exceeds the configured size ceiling.
    FileTooLarge {
        /// Offending path.
        path: PathBuf,
        /// Actual size in bytes.
        size: u64,
        /// Configured ceiling in bytes.
        limit: u64,
    },
    /// Every decoding attempt failed.
    DecodeFailure(PathBuf),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::FileNotFound(path) => {
                write!(f, "file not found or unreadable: {}", path.display())
            }
            LoadError::FileTooLarge { path, size, limit } => write!(
                f,
                "{} is {size} bytes, over the {limit} byte limit",
                path.display()
            ),
            LoadError::DecodeFailure(path) => {
                write!(f, "could not decode {} with any supported encoding", path.display())
            }
        }
    }
}

impl std::error::Error for LoadError {}

/// Line-ending style of a whole file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum LineEnding {
    /// Windows `\r\n` throughout (or ≥95% dominant).
    Crlf,
    /// Unix `\n` throughout.
    Lf,
    /// Classic Mac `\r` throughout.
    Cr,
    /// More than one style, none ≥95% dominant.
    Mixed,
    /// No line terminator in the file at all.
    None,
}

/// One decoded line, terminator stripped.
#[derive(Debug, Clone)]
pub struct SourceLine {
    /// 1-based line index.
    pub index: usize,
    /// Decoded text without its terminator.
    pub text: String,
    /// The original terminator: `"\r\n"`, `"\n"`, `"\r"`, or `""` for the
    /// final unterminated line.
    pub ending: &'static str,
}

/// A loaded script, immutable after construction.
#[derive(Debug)]
pub struct SourceScript {
    /// Path the bytes came from.
    pub path: PathBuf,
    /// Name of the encoding that decoded the bytes.
    pub encoding: &'static str,
    /// Dominant line-ending style.
    pub line_ending: LineEnding,
    /// CRLF terminator count.
    pub crlf_count: usize,
    /// Lone-LF terminator count.
    pub lf_count: usize,
    /// Lone-CR terminator count.
    pub cr_count: usize,
    /// Decoded, indexed lines.
    pub lines: Vec<SourceLine>,
}

impl SourceScript {
    /// Reads and decodes the file at `path`, enforcing the size ceiling.
    pub fn load(path: &Path, max_size: u64) -> Result<SourceScript, LoadError> {
        let meta =
            std::fs::metadata(path).map_err(|_| LoadError::FileNotFound(path.to_path_buf()))?;
        if meta.len() > max_size {
            return Err(LoadError::FileTooLarge {
                path: path.to_path_buf(),
                size: meta.len(),
                limit: max_size,
            });
        }
        let bytes =
            std::fs::read(path).map_err(|_| LoadError::FileNotFound(path.to_path_buf()))?;
        Self::from_bytes(path, &bytes)
    }

    /// Decodes raw bytes already in memory.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<SourceScript, LoadError> {
        let (text, encoding) =
            decode(bytes).ok_or_else(|| LoadError::DecodeFailure(path.to_path_buf()))?;
        let (lines, crlf, lf, cr) = split_lines(&text);
        Ok(SourceScript {
            path: path.to_path_buf(),
            encoding,
            line_ending: classify_endings(crlf, lf, cr),
            crlf_count: crlf,
            lf_count: lf,
            cr_count: cr,
            lines,
        })
    }

    /// True when the path carries a `.bat` extension (case-insensitive).
    pub fn is_bat(&self) -> bool {
        self.path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("bat"))
    }
}

fn decode(bytes: &[u8]) -> Option<(String, &'static str)> {
    // UTF-32 BOMs are byte-prefixes of the UTF-16 ones, so they go first.
    if bytes.starts_with(&[0xFF, 0xFE, 0x00, 0x00]) {
        return decode_utf32(&bytes[4..], true).map(|t| (t, "utf-32-le"));
    }
    if bytes.starts_with(&[0x00, 0x00, 0xFE, 0xFF]) {
        return decode_utf32(&bytes[4..], false).map(|t| (t, "utf-32-be"));
    }
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return std::str::from_utf8(&bytes[3..])
            .ok()
            .map(|t| (t.to_string(), "utf-8-sig"));
    }
    if bytes.starts_with(&[0xFF, 0xFE]) {
        return decode_utf16(&bytes[2..], true).map(|t| (t, "utf-16-le"));
    }
    if bytes.starts_with(&[0xFE, 0xFF]) {
        return decode_utf16(&bytes[2..], false).map(|t| (t, "utf-16-be"));
    }
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Some((text.to_string(), "utf-8"));
    }
    if looks_like_utf16(bytes, true) {
        if let Some(text) = decode_utf16(bytes, true) {
            return Some((text, "utf-16-le"));
        }
    }
    if looks_like_utf16(bytes, false) {
        if let Some(text) = decode_utf16(bytes, false) {
            return Some((text, "utf-16-be"));
        }
    }
    if let Some(text) = decode_cp1252(bytes) {
        return Some((text, "cp1252"));
    }
    // Latin-1 maps every byte, so this cannot fail.
    Some((bytes.iter().map(|&b| b as char).collect(), "latin-1"))
}

/// BOM-less UTF-16 heuristic: even byte count, and the vast majority of code
/// units are ASCII with a zero high byte.
fn looks_like_utf16(bytes: &[u8], little_endian: bool) -> bool {
    if bytes.len() < 4 || bytes.len() % 2 != 0 {
        return false;
    }
    let pairs = bytes.len() / 2;
    let ascii_pairs = bytes
        .chunks_exact(2)
        .filter(|pair| {
            let (lo, hi) = if little_endian {
                (pair[0], pair[1])
            } else {
                (pair[1], pair[0])
            };
            hi == 0 && (lo == b'\t' || lo == b'\r' || lo == b'\n' || (0x20..0x7F).contains(&lo))
        })
        .count();
    ascii_pairs * 10 >= pairs * 9
}

fn decode_utf16(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 2 != 0 {
        return None;
    }
    let units = bytes.chunks_exact(2).map(|pair| {
        if little_endian {
            u16::from_le_bytes([pair[0], pair[1]])
        } else {
            u16::from_be_bytes([pair[0], pair[1]])
        }
    });
    char::decode_utf16(units).collect::<Result<String, _>>().ok()
}

fn decode_utf32(bytes: &[u8], little_endian: bool) -> Option<String> {
    if bytes.len() % 4 != 0 {
        return None;
    }
    bytes
        .chunks_exact(4)
        .map(|quad| {
            let value = if little_endian {
                u32::from_le_bytes([quad[0], quad[1], quad[2], quad[3]])
            } else {
                u32::from_be_bytes([quad[0], quad[1], quad[2], quad[3]])
            };
            char::from_u32(value)
        })
        .collect()
}

/// Windows-1252 mappings for 0x80..0xA0; `None` entries are undefined in the
/// code page and make a strict decode fail.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

fn decode_cp1252(bytes: &[u8]) -> Option<String> {
    bytes
        .iter()
        .map(|&b| match b {
            0x00..=0x7F => Some(b as char),
            0x80..=0x9F => CP1252_HIGH[(b - 0x80) as usize],
            0xA0..=0xFF => Some(b as char),
        })
        .collect()
}

fn split_lines(text: &str) -> (Vec<SourceLine>, usize, usize, usize) {
    let mut lines = Vec::new();
    let (mut crlf, mut lf, mut cr) = (0usize, 0usize, 0usize);
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    let mut push = |current: &mut String, ending: &'static str, lines: &mut Vec<SourceLine>| {
        lines.push(SourceLine {
            index: lines.len() + 1,
            text: std::mem::take(current),
            ending,
        });
    };

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                    crlf += 1;
                    push(&mut current, "\r\n", &mut lines);
                } else {
                    cr += 1;
                    push(&mut current, "\r", &mut lines);
                }
            }
            '\n' => {
                lf += 1;
                push(&mut current, "\n", &mut lines);
            }
            other => current.push(other),
        }
    }
    if !current.is_empty() {
        push(&mut current, "", &mut lines);
    }
    (lines, crlf, lf, cr)
}

fn classify_endings(crlf: usize, lf: usize, cr: usize) -> LineEnding {
    let total = crlf + lf + cr;
    if total == 0 {
        return LineEnding::None;
    }
    let styles = [
        (crlf, LineEnding::Crlf),
        (lf, LineEnding::Lf),
        (cr, LineEnding::Cr),
    ];
    let nonzero = styles.iter().filter(|(count, _)| *count > 0).count();
    let (dominant_count, dominant) = styles
        .iter()
        .copied()
        .max_by_key(|(count, _)| *count)
        .unwrap_or((0, LineEnding::None));
    if nonzero == 1 {
        dominant
    } else if dominant_count * 100 >= total * 95 {
        dominant
    } else {
        LineEnding::Mixed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf16le_without_bom_is_detected() {
        let text = "@ECHO OFF\r\nECHO hi\r\n";
        let bytes: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
        let script = SourceScript::from_bytes(Path::new("x.cmd"), &bytes).unwrap();
        assert_eq!(script.encoding, "utf-16-le");
        assert_eq!(script.lines.len(), 2);
    }

    #[test]
    fn cp1252_euro_sign_decodes() {
        let bytes = b"ECHO price \x80100\r\n";
        let script = SourceScript::from_bytes(Path::new("x.cmd"), bytes).unwrap();
        assert_eq!(script.encoding, "cp1252");
        assert!(script.lines[0].text.contains('\u{20AC}'));
    }

    #[test]
    fn undefined_cp1252_byte_falls_back_to_latin1() {
        let bytes = b"ECHO \x81\r\n";
        let script = SourceScript::from_bytes(Path::new("x.cmd"), bytes).unwrap();
        assert_eq!(script.encoding, "latin-1");
    }

    #[test]
    fn ending_classification() {
        assert_eq!(classify_endings(5, 0, 0), LineEnding::Crlf);
        assert_eq!(classify_endings(0, 3, 0), LineEnding::Lf);
        assert_eq!(classify_endings(0, 0, 2), LineEnding::Cr);
        assert_eq!(classify_endings(10, 3, 0), LineEnding::Mixed);
        assert_eq!(classify_endings(100, 1, 0), LineEnding::Crlf);
        assert_eq!(classify_endings(0, 0, 0), LineEnding::None);
    }

    #[test]
    fn single_lf_yields_one_empty_line() {
        let script = SourceScript::from_bytes(Path::new("x.cmd"), b"\n").unwrap();
        assert_eq!(script.line_ending, LineEnding::Lf);
        assert_eq!(script.lines.len(), 1);
        assert_eq!(script.lines[0].text, "");
        assert_eq!(script.lines[0].ending, "\n");
    }
}
