//! Single-document conversion: the core render → invert → encode → assemble
//! loop, plus the file-based and synchronous entry points built on it.

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info};

use crate::config::InvertConfig;
use crate::error::InvertError;
use crate::output::{DocumentInfo, DocumentStats, InvertedDocument, PageGeometry};
use crate::pipeline::{assemble::DocumentAssembler, encode, input, invert, render};

/// Invert a PDF already loaded into memory.
///
/// The heavy lifting happens on a blocking thread: pdfium is not
/// async-safe, and inverting megapixel rasters would starve the runtime's
/// worker threads. Pages are processed strictly in order, one raster
/// resident at a time.
///
/// # Example
///
/// ```no_run
/// use inkvert::{invert_bytes, InvertConfig};
///
/// # async fn run() -> Result<(), inkvert::InvertError> {
/// let bytes = std::fs::read("report.pdf").map_err(|e| {
///     inkvert::InvertError::Internal(e.to_string())
/// })?;
/// let doc = invert_bytes("report.pdf", bytes, &InvertConfig::default()).await?;
/// println!("{} pages, {} bytes", doc.stats.pages, doc.stats.output_bytes);
/// # Ok(())
/// # }
/// ```
pub async fn invert_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    config: &InvertConfig,
) -> Result<InvertedDocument, InvertError> {
    let name = name.into();
    let config = config.clone();
    tokio::task::spawn_blocking(move || invert_blocking(&name, &bytes, &config))
        .await
        .map_err(|e| InvertError::Internal(format!("Conversion task panicked: {e}")))?
}

/// Blocking implementation of the per-document pipeline.
pub(crate) fn invert_blocking(
    name: &str,
    bytes: &[u8],
    config: &InvertConfig,
) -> Result<InvertedDocument, InvertError> {
    let started = Instant::now();

    // ── Step 1: Validate the header before touching pdfium ───────────────
    input::validate_magic(name, bytes)?;

    // ── Step 2: Bind pdfium and parse the document ───────────────────────
    let pdfium = render::bind_pdfium()?;
    let document = render::load_document(&pdfium, name, bytes, config.password.as_deref())?;

    let pages = document.pages();
    let total_pages = pages.len() as usize;
    if total_pages == 0 {
        return Err(InvertError::EmptyDocument {
            name: name.to_string(),
        });
    }
    info!("{}: {} pages at {} DPI", name, total_pages, config.resolution);

    // ── Step 3: Per-page render → invert → encode → append ───────────────
    let mut assembler = DocumentAssembler::new();
    let mut render_ms = 0u64;
    let mut encode_ms = 0u64;

    for (index, page) in pages.iter().enumerate() {
        let render_start = Instant::now();
        let mut raster = render::render_page(&page, index, config.resolution)?;
        render_ms += render_start.elapsed().as_millis() as u64;

        let encode_start = Instant::now();
        invert::invert_in_place(&mut raster);
        let encoded = encode::encode_page(raster, config.quality, config.resolution, index)?;
        encode_ms += encode_start.elapsed().as_millis() as u64;

        assembler.append_page(&encoded)?;
        debug!("{}: page {}/{} done", name, index + 1, total_pages);
    }

    // ── Step 4: Serialize the output document ────────────────────────────
    let data = assembler.finish(name)?;
    let stats = DocumentStats {
        pages: total_pages,
        render_ms,
        encode_ms,
        total_ms: started.elapsed().as_millis() as u64,
        output_bytes: data.len(),
    };
    info!(
        "{}: inverted {} pages in {} ms ({} bytes out)",
        name, stats.pages, stats.total_ms, stats.output_bytes
    );

    Ok(InvertedDocument {
        source_name: name.to_string(),
        output_name: output_name(name),
        data,
        stats,
    })
}

/// Invert a PDF file on disk, returning the result in memory.
pub async fn invert_file(
    path: impl AsRef<Path>,
    config: &InvertConfig,
) -> Result<InvertedDocument, InvertError> {
    let source = input::read_source(path.as_ref())?;
    invert_bytes(source.name, source.data, config).await
}

/// Invert a PDF file and write the result next to `output_path`.
///
/// Writes to a sibling temporary file first and renames into place, so a
/// crash mid-write never leaves a truncated PDF at the destination.
pub async fn invert_to_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &InvertConfig,
) -> Result<InvertedDocument, InvertError> {
    let document = invert_file(input_path, config).await?;
    let output_path = output_path.as_ref();

    let tmp_path = output_path.with_extension("pdf.tmp");
    let write_err = |source: std::io::Error| InvertError::OutputWriteFailed {
        path: output_path.to_path_buf(),
        source,
    };
    tokio::fs::write(&tmp_path, &document.data)
        .await
        .map_err(&write_err)?;
    tokio::fs::rename(&tmp_path, output_path)
        .await
        .map_err(&write_err)?;

    info!("Wrote {}", output_path.display());
    Ok(document)
}

/// Synchronous wrapper around [`invert_file`] for callers without a
/// tokio runtime.
pub fn invert_sync(
    path: impl AsRef<Path>,
    config: &InvertConfig,
) -> Result<InvertedDocument, InvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| InvertError::Internal(format!("Failed to create runtime: {e}")))?
        .block_on(invert_file(path, config))
}

/// Read document structure and metadata without rendering any page.
pub async fn inspect(path: impl AsRef<Path>) -> Result<DocumentInfo, InvertError> {
    let source = input::read_source(path.as_ref())?;
    tokio::task::spawn_blocking(move || inspect_blocking(&source.name, &source.data))
        .await
        .map_err(|e| InvertError::Internal(format!("Inspect task panicked: {e}")))?
}

fn inspect_blocking(name: &str, bytes: &[u8]) -> Result<DocumentInfo, InvertError> {
    use pdfium_render::prelude::PdfDocumentMetadataTagType;

    let pdfium = render::bind_pdfium()?;
    let document = render::load_document(&pdfium, name, bytes, None)?;

    let metadata = document.metadata();
    let get_meta = |tag: PdfDocumentMetadataTagType| -> Option<String> {
        metadata.get(tag).and_then(|t| {
            let v = t.value().to_string();
            if v.is_empty() {
                None
            } else {
                Some(v)
            }
        })
    };

    let pages = document
        .pages()
        .iter()
        .map(|page| PageGeometry {
            width_pt: page.width().value,
            height_pt: page.height().value,
        })
        .collect::<Vec<_>>();

    Ok(DocumentInfo {
        page_count: pages.len(),
        title: get_meta(PdfDocumentMetadataTagType::Title),
        author: get_meta(PdfDocumentMetadataTagType::Author),
        pages,
    })
}

/// Derive the output filename: strip a trailing `.pdf` (any case) and
/// append `_inverted.pdf`.
pub fn output_name(source: &str) -> String {
    let stem = if source.len() >= 4
        && source.is_char_boundary(source.len() - 4)
        && source[source.len() - 4..].eq_ignore_ascii_case(".pdf")
    {
        &source[..source.len() - 4]
    } else {
        source
    };
    format!("{stem}_inverted.pdf")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_strips_pdf_extension() {
        assert_eq!(output_name("report.pdf"), "report_inverted.pdf");
        assert_eq!(output_name("REPORT.PDF"), "REPORT_inverted.pdf");
        assert_eq!(output_name("a.b.pdf"), "a.b_inverted.pdf");
    }

    #[test]
    fn output_name_handles_missing_extension() {
        assert_eq!(output_name("scan"), "scan_inverted.pdf");
        assert_eq!(output_name(""), "_inverted.pdf");
        assert_eq!(output_name(".pdf"), "_inverted.pdf");
    }

    #[tokio::test]
    async fn non_pdf_bytes_fail_before_any_rendering() {
        let err = invert_bytes("notes.txt", b"hello world".to_vec(), &InvertConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, InvertError::NotAPdf { .. }));
    }
}
