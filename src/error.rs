//! Error types for the inkvert library.
//!
//! Every failure here is *document-scoped*: it terminates the conversion of
//! one document and is captured as a failed
//! [`crate::output::DocumentOutcome`]. A failing document never aborts its
//! siblings in a batch; the scheduler logs the error and moves on.
//!
//! The conversion taxonomy: [`InvertError::NotAPdf`] and
//! [`InvertError::CorruptPdf`] (unreadable input), [`InvertError::RenderFailed`]
//! (a page could not be rasterized), [`InvertError::EncodeFailed`]
//! (compression failure), and [`InvertError::EmptyDocument`] (zero pages
//! survived). The rest cover the I/O and configuration edges around them.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the inkvert library.
#[derive(Debug, Error)]
pub enum InvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The input bytes do not start with the PDF magic header.
    #[error("'{name}' is not a valid PDF\nFirst bytes: {magic:?}")]
    NotAPdf { name: String, magic: [u8; 4] },

    // ── Conversion errors ─────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{name}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { name: String, detail: String },

    /// Document is encrypted and no password was supplied.
    #[error("PDF '{name}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { name: String },

    /// The supplied password does not open the document.
    #[error("Wrong password for PDF '{name}'")]
    WrongPassword { name: String },

    /// A page could not be rasterized (corrupt content stream, unsupported
    /// embedded resource).
    #[error("Rasterization failed for page {page}: {detail}")]
    RenderFailed { page: usize, detail: String },

    /// An inverted page raster could not be compressed.
    #[error("Encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    /// No page survived the pipeline; an output document would be empty.
    #[error("No pages could be converted for '{name}'")]
    EmptyDocument { name: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write the output PDF file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
inkvert needs the PDFium shared library at runtime.\n\
  • Place libpdfium next to the executable, or\n\
  • install it system-wide, or\n\
  • set PDFIUM_DYNAMIC_LIB_PATH to its directory.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl InvertError {
    /// True for failures that can only be triggered by the input document
    /// itself (as opposed to configuration or the host environment).
    pub fn is_document_fault(&self) -> bool {
        matches!(
            self,
            InvertError::NotAPdf { .. }
                | InvertError::CorruptPdf { .. }
                | InvertError::PasswordRequired { .. }
                | InvertError::WrongPassword { .. }
                | InvertError::RenderFailed { .. }
                | InvertError::EncodeFailed { .. }
                | InvertError::EmptyDocument { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_a_pdf_display() {
        let e = InvertError::NotAPdf {
            name: "notes.txt".into(),
            magic: *b"PK\x03\x04",
        };
        let msg = e.to_string();
        assert!(msg.contains("notes.txt"), "got: {msg}");
    }

    #[test]
    fn render_failed_display() {
        let e = InvertError::RenderFailed {
            page: 3,
            detail: "bad content stream".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bad content stream"));
    }

    #[test]
    fn empty_document_display() {
        let e = InvertError::EmptyDocument {
            name: "blank.pdf".into(),
        };
        assert!(e.to_string().contains("blank.pdf"));
    }

    #[test]
    fn document_fault_classification() {
        assert!(InvertError::EmptyDocument { name: "x".into() }.is_document_fault());
        assert!(InvertError::RenderFailed {
            page: 1,
            detail: String::new()
        }
        .is_document_fault());
        assert!(!InvertError::InvalidConfig("bad".into()).is_document_fault());
        assert!(!InvertError::PdfiumBindingFailed("missing".into()).is_document_fault());
    }
}
