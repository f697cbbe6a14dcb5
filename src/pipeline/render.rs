//! Page rasterization via pdfium.
//!
//! ## Why blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async
//! contexts. Everything in this module therefore runs inside
//! `tokio::task::spawn_blocking` scopes owned by [`crate::convert`];
//! nothing here is `async`.
//!
//! ## Scale math
//!
//! A page's nominal size is expressed in points (1/72 inch). Rendering at
//! `resolution` DPI gives pixel dimensions of `points × resolution / 72`,
//! rounded to the nearest whole pixel. The encoder later applies the exact
//! inverse so the output page keeps the source page's physical footprint
//! regardless of the resolution chosen.

use crate::error::InvertError;
use image::RgbaImage;
use pdfium_render::prelude::*;
use tracing::debug;

/// Bind to a pdfium library: next to the executable first, then system-wide.
///
/// Binding is re-acquired per blocking task rather than held in a process
/// global; the OS caches the loaded shared object, so repeat binds are cheap.
/// Configuration is always passed explicitly into [`render_page`]; nothing
/// reads ambient state after binding.
pub fn bind_pdfium() -> Result<Pdfium, InvertError> {
    Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| InvertError::PdfiumBindingFailed(format!("{e:?}")))
}

/// Load a document from raw bytes, mapping password and parse failures.
pub fn load_document<'a>(
    pdfium: &'a Pdfium,
    name: &str,
    bytes: &'a [u8],
    password: Option<&str>,
) -> Result<PdfDocument<'a>, InvertError> {
    pdfium.load_pdf_from_byte_slice(bytes, password).map_err(|e| {
        let err_str = format!("{e:?}");
        if err_str.contains("Password") || err_str.contains("password") {
            if password.is_some() {
                InvertError::WrongPassword {
                    name: name.to_string(),
                }
            } else {
                InvertError::PasswordRequired {
                    name: name.to_string(),
                }
            }
        } else {
            InvertError::CorruptPdf {
                name: name.to_string(),
                detail: err_str,
            }
        }
    })
}

/// Pixel dimensions for a page of `width_pt` × `height_pt` points rendered
/// at `resolution` DPI: each axis is `points × resolution / 72`, rounded,
/// and never less than one pixel.
pub fn pixel_dims(width_pt: f32, height_pt: f32, resolution: u32) -> (i32, i32) {
    let scale = resolution as f32 / 72.0;
    let w = (width_pt * scale).round().max(1.0) as i32;
    let h = (height_pt * scale).round().max(1.0) as i32;
    (w, h)
}

/// Rasterize one page into an RGBA buffer at the given resolution.
///
/// The transient pdfium bitmap lives only inside this call; it is released
/// when the function returns, success or failure.
pub fn render_page(
    page: &PdfPage<'_>,
    page_index: usize,
    resolution: u32,
) -> Result<RgbaImage, InvertError> {
    let (w_px, h_px) = pixel_dims(page.width().value, page.height().value, resolution);

    let render_config = PdfRenderConfig::new()
        .set_target_width(w_px)
        .set_target_height(h_px);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| InvertError::RenderFailed {
                page: page_index + 1,
                detail: format!("{e:?}"),
            })?;

    let raster = bitmap.as_image().into_rgba8();
    debug!(
        "Rendered page {} → {}x{} px at {} DPI",
        page_index + 1,
        raster.width(),
        raster.height(),
        resolution
    );

    Ok(raster)
}
