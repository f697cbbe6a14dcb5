//! Pipeline stages for PDF color inversion.
//!
//! Each submodule implements exactly one transformation step. Keeping stages
//! separate makes each independently testable and lets us swap
//! implementations (e.g. switch rendering backend) without touching other
//! stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ invert ──▶ encode ──▶ assemble
//! (bytes)   (pdfium)   (255−v)    (JPEG)     (lopdf)
//! ```
//!
//! 1. [`input`]    — validate the raw bytes look like a PDF before pdfium
//!    ever sees them
//! 2. [`render`]   — rasterize one page at the configured resolution; runs
//!    inside `spawn_blocking` because pdfium is not async-safe
//! 3. [`invert`]   — complement each RGB sample, keep alpha; the only pure
//!    stage, and the only one that can never fail
//! 4. [`encode`]   — JPEG-compress the inverted raster and compute the
//!    physical page size the raster corresponds to
//! 5. [`assemble`] — accumulate encoded pages into a fresh output PDF with
//!    per-page sizes

pub mod assemble;
pub mod encode;
pub mod input;
pub mod invert;
pub mod render;
