//! Lossy JPEG encoding of inverted page rasters.
//!
//! Inverted pages are mostly dark continuous-tone imagery, which JPEG
//! compresses far better than a lossless format would. Encoding flattens
//! the alpha channel; pdfium composites pages over an opaque background,
//! so nothing visible is lost.

use std::io::Cursor;

use crate::error::InvertError;
use image::{codecs::jpeg::JpegEncoder, DynamicImage, RgbaImage};
use tracing::debug;

/// A page after inversion and lossy encoding, carrying both its pixel
/// dimensions and the physical size the assembler must restore.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    /// JPEG-compressed image data.
    pub jpeg: Vec<u8>,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Physical page width in points (1/72 inch).
    pub width_pt: f32,
    /// Physical page height in points.
    pub height_pt: f32,
}

/// Map the `[0.0, 1.0]` quality knob onto the JPEG encoder's `1..=100`
/// scale. `0.0` still produces a valid (if very coarse) image.
pub fn jpeg_quality(quality: f32) -> u8 {
    (quality * 100.0).round().clamp(1.0, 100.0) as u8
}

/// Compress an inverted raster to JPEG at the configured quality.
///
/// `resolution` is the DPI the raster was rendered at; it determines the
/// physical size recorded on the encoded page (`px × 72 / resolution`).
pub fn encode_page(
    raster: RgbaImage,
    quality: f32,
    resolution: u32,
    page_index: usize,
) -> Result<EncodedPage, InvertError> {
    let (pixel_width, pixel_height) = raster.dimensions();
    if pixel_width == 0 || pixel_height == 0 {
        return Err(InvertError::EncodeFailed {
            page: page_index + 1,
            detail: format!("zero-sized raster ({pixel_width}x{pixel_height})"),
        });
    }

    // JPEG has no alpha; flatten to RGB before encoding.
    let rgb = DynamicImage::ImageRgba8(raster).into_rgb8();

    let mut jpeg = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), jpeg_quality(quality));
    rgb.write_with_encoder(encoder)
        .map_err(|e| InvertError::EncodeFailed {
            page: page_index + 1,
            detail: e.to_string(),
        })?;

    let scale = 72.0 / resolution as f32;
    let width_pt = pixel_width as f32 * scale;
    let height_pt = pixel_height as f32 * scale;

    debug!(
        "Encoded page {}: {}x{} px → {} bytes (quality {})",
        page_index + 1,
        pixel_width,
        pixel_height,
        jpeg.len(),
        jpeg_quality(quality)
    );

    Ok(EncodedPage {
        jpeg,
        pixel_width,
        pixel_height,
        width_pt,
        height_pt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient(w: u32, h: u32) -> RgbaImage {
        RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
        })
    }

    #[test]
    fn quality_mapping_covers_the_full_range() {
        assert_eq!(jpeg_quality(0.0), 1);
        assert_eq!(jpeg_quality(0.8), 80);
        assert_eq!(jpeg_quality(1.0), 100);
        assert_eq!(jpeg_quality(0.805), 81);
    }

    #[test]
    fn encodes_valid_jpeg_with_soi_marker() {
        let page = encode_page(gradient(64, 48), 0.8, 150, 0).unwrap();
        assert_eq!(&page.jpeg[..2], &[0xFF, 0xD8]);
        assert_eq!(page.pixel_width, 64);
        assert_eq!(page.pixel_height, 48);
    }

    #[test]
    fn lower_quality_yields_smaller_output() {
        let low = encode_page(gradient(128, 128), 0.2, 150, 0).unwrap();
        let high = encode_page(gradient(128, 128), 1.0, 150, 0).unwrap();
        assert!(low.jpeg.len() < high.jpeg.len());
    }

    #[test]
    fn physical_size_round_trips_through_the_scale() {
        // 1275 × 1650 px rendered at 150 DPI came from a 612 × 792 pt page.
        let raster = RgbaImage::from_pixel(1275, 1650, Rgba([0, 0, 0, 255]));
        let page = encode_page(raster, 0.5, 150, 0).unwrap();
        assert!((page.width_pt - 612.0).abs() < 0.5);
        assert!((page.height_pt - 792.0).abs() < 0.5);
    }

    #[test]
    fn zero_sized_raster_is_rejected() {
        let err = encode_page(RgbaImage::new(0, 10), 0.8, 150, 3).unwrap_err();
        match err {
            InvertError::EncodeFailed { page, .. } => assert_eq!(page, 4),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
