//! # inkvert
//!
//! Invert the colors of PDF documents for ink-friendly printing.
//!
//! ## Why this crate?
//!
//! Dark-themed documents (slide decks, dark-mode exports, terminal
//! screenshots) drain toner fast: every page is a field of solid color.
//! inkvert rasterises each page, maps every RGB sample to its complement
//! (`255 − v`), and reassembles the pages into a new PDF with the original
//! per-page dimensions. Black backgrounds become white, light text becomes
//! dark, and the page prints on a fraction of the ink.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input     validate %PDF magic, load bytes
//!  ├─ 2. Render    rasterise pages via pdfium (CPU-bound, spawn_blocking)
//!  ├─ 3. Invert    255 − v per RGB channel, alpha untouched
//!  ├─ 4. Encode    lossy JPEG at the configured quality
//!  └─ 5. Assemble  new PDF, one full-bleed image per page, sizes preserved
//! ```
//!
//! Batches of documents run through [`run_batch`] with bounded concurrency;
//! one document failing never stops the rest.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use inkvert::{invert_to_file, InvertConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = InvertConfig::builder()
//!         .resolution(150)
//!         .quality(0.8)
//!         .build()?;
//!     let doc = invert_to_file("slides.pdf", "slides_inverted.pdf", &config).await?;
//!     eprintln!("{} pages in {} ms", doc.stats.pages, doc.stats.total_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `inkvert` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! inkvert = { version = "0.3", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! inkvert links pdfium dynamically. Place `libpdfium.so` /
//! `libpdfium.dylib` / `pdfium.dll` next to the executable or install it
//! system-wide; conversion fails with
//! [`InvertError::PdfiumBindingFailed`] otherwise.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::run_batch;
pub use config::{InvertConfig, InvertConfigBuilder};
pub use convert::{inspect, invert_bytes, invert_file, invert_sync, invert_to_file, output_name};
pub use error::InvertError;
pub use output::{
    BatchOutput, BatchSummary, DocumentInfo, DocumentOutcome, DocumentStats, InvertedDocument,
    PageGeometry,
};
pub use pipeline::input::SourceFile;
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
