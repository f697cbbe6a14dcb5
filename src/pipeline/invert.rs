//! Per-pixel color inversion.
//!
//! Each RGB channel is mapped to its complement (`255 − v`); alpha is left
//! untouched. Applying the transform twice restores the original buffer.

use image::{Rgba, RgbaImage};

/// Invert every pixel of `raster` in place.
///
/// Runs channel-wise over the raw buffer with no intermediate allocation;
/// the page raster is the largest object in the pipeline and is mutated
/// where it sits.
pub fn invert_in_place(raster: &mut RgbaImage) {
    for pixel in raster.pixels_mut() {
        let Rgba([r, g, b, a]) = *pixel;
        *pixel = Rgba([255 - r, 255 - g, 255 - b, a]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_becomes_black() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        invert_in_place(&mut img);
        for p in img.pixels() {
            assert_eq!(*p, Rgba([0, 0, 0, 255]));
        }
    }

    #[test]
    fn midtones_map_to_complements() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([10, 100, 200, 255]));
        invert_in_place(&mut img);
        assert_eq!(*img.get_pixel(0, 0), Rgba([245, 155, 55, 255]));
    }

    #[test]
    fn alpha_is_preserved() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 128]));
        invert_in_place(&mut img);
        for p in img.pixels() {
            assert_eq!(*p, Rgba([255, 255, 255, 128]));
        }

        let mut transparent = RgbaImage::from_pixel(1, 1, Rgba([40, 50, 60, 0]));
        invert_in_place(&mut transparent);
        assert_eq!(transparent.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn inversion_is_an_involution() {
        let mut img = RgbaImage::from_fn(8, 8, |x, y| {
            Rgba([(x * 31) as u8, (y * 17) as u8, ((x + y) * 9) as u8, 255])
        });
        let original = img.clone();
        invert_in_place(&mut img);
        assert_ne!(img, original);
        invert_in_place(&mut img);
        assert_eq!(img, original);
    }
}
