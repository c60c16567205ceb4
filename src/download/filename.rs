//! Destination naming for materialized files.
//!
//! Names are derived deterministically from the display name so a rerun
//! lands on the same paths and sees what earlier runs produced.

use std::path::{Path, PathBuf};

use crate::resolver::FileFormat;

/// Suffix of the in-progress file next to a destination.
pub const PARTIAL_SUFFIX: &str = "part";

/// Derives the file base name for an item.
///
/// Spaces, dots and colons become `_`, slashes are dropped, and other
/// characters that are unsafe in file names become `_`. Falls back to
/// `fallback` (the item id) when nothing is left.
#[must_use]
pub fn item_base_name(display_name: &str, fallback: &str) -> String {
    let mut out = String::with_capacity(display_name.len());
    for ch in display_name.trim().chars() {
        match ch {
            '/' | '\\' => {}
            ' ' | '.' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => out.push('_'),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    if out.trim_matches('_').is_empty() {
        let fallback: String = fallback
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        return fallback;
    }
    out
}

/// Path a format is requested under: `<dir>/<base>.<format>`.
#[must_use]
pub fn destination_path(dir: &Path, base_name: &str, format: FileFormat) -> PathBuf {
    dir.join(format!("{base_name}.{}", format.as_str()))
}

/// Archive-renamed form of a source-archive destination (`X.code` → `X.zip`).
#[must_use]
pub fn archive_form(destination: &Path) -> Option<PathBuf> {
    let format: FileFormat = destination.extension()?.to_str()?.parse().ok()?;
    format
        .is_source_archive()
        .then(|| destination.with_extension(format.final_extension()))
}

/// Where a finished download for `destination` ends up.
#[must_use]
pub fn final_path(destination: &Path) -> PathBuf {
    archive_form(destination).unwrap_or_else(|| destination.to_path_buf())
}

/// In-progress file used while streaming (`X.pdf` → `X.pdf.part`).
#[must_use]
pub fn partial_path(destination: &Path) -> PathBuf {
    let mut name = destination.as_os_str().to_os_string();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_base_name_replaces_separators() {
        assert_eq!(
            item_base_name("Rust: The Book 2.0", "1"),
            "Rust__The_Book_2_0"
        );
    }

    #[test]
    fn test_item_base_name_drops_slashes() {
        assert_eq!(item_base_name("TCP/IP Guide", "1"), "TCPIP_Guide");
    }

    #[test]
    fn test_item_base_name_falls_back_to_id() {
        assert_eq!(item_base_name("   ", "9781"), "9781");
        assert_eq!(item_base_name("///", "ab/c"), "ab_c");
    }

    #[test]
    fn test_destination_uses_format_identifier() {
        let path = destination_path(Path::new("/lib"), "Book", FileFormat::Code);
        assert_eq!(path, PathBuf::from("/lib/Book.code"));
    }

    #[test]
    fn test_archive_form_only_for_code() {
        assert_eq!(
            archive_form(Path::new("/lib/Book.code")),
            Some(PathBuf::from("/lib/Book.zip"))
        );
        assert_eq!(archive_form(Path::new("/lib/Book.pdf")), None);
        assert_eq!(final_path(Path::new("/lib/Book.pdf")), PathBuf::from("/lib/Book.pdf"));
    }

    #[test]
    fn test_partial_path_appends_suffix() {
        assert_eq!(
            partial_path(Path::new("/lib/Book.code")),
            PathBuf::from("/lib/Book.code.part")
        );
    }
}
