//! Input boundary: load source files and reject non-PDF input early.
//!
//! The `%PDF` magic check runs before any pdfium call so callers get a
//! meaningful [`InvertError::NotAPdf`] for a stray `.docx` or truncated
//! download instead of an opaque parse failure from the rendering engine.

use crate::error::InvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The four magic bytes every PDF starts with.
const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// One input document: an opaque byte sequence plus a display name.
///
/// Read-only once constructed; a batch shares its sources by reference and
/// each document converter invocation owns exactly one.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Display name, used for output naming and diagnostics.
    pub name: String,
    /// Raw PDF bytes.
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }
}

/// Check that `bytes` starts with the PDF magic header.
pub fn validate_magic(name: &str, bytes: &[u8]) -> Result<(), InvertError> {
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);

    if &magic != PDF_MAGIC {
        return Err(InvertError::NotAPdf {
            name: name.to_string(),
            magic,
        });
    }
    Ok(())
}

/// Read a source file from disk, validating existence, permissions, and
/// magic bytes.
pub fn read_source(path: &Path) -> Result<SourceFile, InvertError> {
    if !path.exists() {
        return Err(InvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let data = match std::fs::read(path) {
        Ok(d) => d,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(InvertError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(InvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    validate_magic(&name, &data)?;
    debug!("Loaded source PDF: {} ({} bytes)", name, data.len());

    Ok(SourceFile { name, data })
}

/// Resolve where an output artifact should land: an explicit output
/// directory, or next to the input, or the current directory.
pub fn output_path(input: &Path, output_dir: Option<&Path>, output_name: &str) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(output_name),
        None => input
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.join(output_name))
            .unwrap_or_else(|| PathBuf::from(output_name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn magic_accepts_pdf_header() {
        assert!(validate_magic("doc.pdf", b"%PDF-1.7\n...").is_ok());
    }

    #[test]
    fn magic_rejects_other_formats() {
        let err = validate_magic("archive.zip", b"PK\x03\x04rest").unwrap_err();
        match err {
            InvertError::NotAPdf { name, magic } => {
                assert_eq!(name, "archive.zip");
                assert_eq!(&magic, b"PK\x03\x04");
            }
            other => panic!("expected NotAPdf, got {other:?}"),
        }
    }

    #[test]
    fn magic_rejects_short_input() {
        assert!(validate_magic("tiny", b"%P").is_err());
        assert!(validate_magic("empty", b"").is_err());
    }

    #[test]
    fn read_source_missing_file() {
        let err = read_source(Path::new("/nonexistent/never.pdf")).unwrap_err();
        assert!(matches!(err, InvertError::FileNotFound { .. }));
    }

    #[test]
    fn read_source_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sample.pdf");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(b"%PDF-1.4\nfake body").unwrap();

        let src = read_source(&path).unwrap();
        assert_eq!(src.name, "sample.pdf");
        assert!(src.data.starts_with(b"%PDF"));
    }

    #[test]
    fn output_path_prefers_explicit_dir() {
        let p = output_path(
            Path::new("/docs/in.pdf"),
            Some(Path::new("/out")),
            "in_inverted.pdf",
        );
        assert_eq!(p, PathBuf::from("/out/in_inverted.pdf"));
    }

    #[test]
    fn output_path_falls_back_to_input_dir() {
        let p = output_path(Path::new("/docs/in.pdf"), None, "in_inverted.pdf");
        assert_eq!(p, PathBuf::from("/docs/in_inverted.pdf"));

        let p = output_path(Path::new("bare.pdf"), None, "bare_inverted.pdf");
        assert_eq!(p, PathBuf::from("bare_inverted.pdf"));
    }
}
