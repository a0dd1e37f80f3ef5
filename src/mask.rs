use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{ThresholdType, threshold as ip_threshold};

use crate::color::Color;
use crate::raster::{OPAQUE_ALPHA, RasterImage};

/// Mask value for pixels that belong to the traced layer.
pub const MASK_FOREGROUND: u8 = 0;
/// Mask value for everything else.
pub const MASK_BACKGROUND: u8 = 255;

/// Mark opaque pixels matching `target` within `tolerance` as foreground.
pub fn color_mask(image: &RasterImage, target: Color, tolerance: u8) -> GrayImage {
    let (w, h) = image.dimensions();
    let mut out = GrayImage::new(w, h);
    for (px, out_px) in image.pixels().zip(out.pixels_mut()) {
        let alpha = px.get(3).copied().unwrap_or(255);
        let inside = alpha >= OPAQUE_ALPHA && Color::from_slice(px).matches(&target, tolerance);
        *out_px = Luma([if inside { MASK_FOREGROUND } else { MASK_BACKGROUND }]);
    }
    out
}

/// Flatten onto `backdrop` and mark pixels at or below `threshold` luminance as foreground.
pub fn luminance_mask(image: &RasterImage, backdrop: Color, threshold: u8) -> GrayImage {
    let flat = image.flatten_onto(backdrop);
    let gray = DynamicImage::ImageRgb8(flat).into_luma8();
    threshold_mask(&gray, threshold)
}

/// Threshold the grayscale image to produce a binary mask.
pub fn threshold_mask(gray: &GrayImage, thr: u8) -> GrayImage {
    ip_threshold(gray, thr, ThresholdType::Binary)
}

/// Number of foreground pixels in a mask.
pub fn foreground_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|px| px[0] == MASK_FOREGROUND).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn gray_image(w: u32, h: u32, value: u8) -> GrayImage {
        GrayImage::from_pixel(w, h, Luma([value]))
    }

    mod color_mask {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn matching_opaque_pixels_are_foreground() {
                let mut img = RgbaImage::from_pixel(3, 1, Rgba([0, 0, 0, 0]));
                img.put_pixel(0, 0, Rgba([250, 5, 5, 255]));
                img.put_pixel(1, 0, Rgba([250, 5, 5, 100]));
                img.put_pixel(2, 0, Rgba([0, 0, 255, 255]));
                let mask = color_mask(&RasterImage::from_rgba(img), Color::new(255, 0, 0), 20);

                assert_eq!(mask.get_pixel(0, 0).0[0], MASK_FOREGROUND);
                assert_eq!(mask.get_pixel(1, 0).0[0], MASK_BACKGROUND);
                assert_eq!(mask.get_pixel(2, 0).0[0], MASK_BACKGROUND);
            }

            #[test]
            fn dimensions_preserved() {
                let image = RasterImage::from_rgba(RgbaImage::new(7, 3));
                assert_eq!(color_mask(&image, Color::new(0, 0, 0), 0).dimensions(), (7, 3));
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// color_mask: output is always binary
                #[test]
                fn output_is_binary(
                    pixels in proptest::collection::vec(proptest::num::u8::ANY, 4 * 25),
                    target in proptest::array::uniform3(proptest::num::u8::ANY),
                    tolerance in proptest::num::u8::ANY
                ) {
                    let image = RasterImage::new(5, 5, 4, pixels).unwrap();
                    let target = Color::new(target[0], target[1], target[2]);
                    let mask = color_mask(&image, target, tolerance);
                    for px in mask.pixels() {
                        prop_assert!(px[0] == MASK_FOREGROUND || px[0] == MASK_BACKGROUND);
                    }
                }
            }
        }
    }

    mod luminance_mask {
        use super::*;

        #[test]
        fn dark_ink_is_foreground_and_transparency_is_not() {
            let mut img = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 0]));
            img.put_pixel(0, 0, Rgba([20, 20, 20, 255]));
            let image = RasterImage::from_rgba(img);
            let mask = luminance_mask(&image, Color::new(255, 255, 255), 128);
            assert_eq!(mask.get_pixel(0, 0).0[0], MASK_FOREGROUND);
            assert_eq!(mask.get_pixel(1, 0).0[0], MASK_BACKGROUND);
            assert_eq!(foreground_count(&mask), 1);
        }
    }

    mod threshold_mask {
        use super::*;

        #[test]
        fn exact_threshold_becomes_black() {
            // imageproc threshold: > threshold -> white, <= threshold -> black
            let result = threshold_mask(&gray_image(2, 2, 128), 128);
            for px in result.pixels() {
                assert_eq!(px.0[0], 0);
            }
        }

        #[test]
        fn above_threshold_becomes_white() {
            let result = threshold_mask(&gray_image(2, 2, 129), 128);
            for px in result.pixels() {
                assert_eq!(px.0[0], 255);
            }
        }
    }
}
