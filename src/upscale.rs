use image::imageops::FilterType;
use tracing::debug;

use crate::raster::RasterImage;

/// Default ceiling on the longest upscaled side.
pub const DEFAULT_MAX_DIMENSION: u32 = 4000;

/// A raster after upscaling, with what is needed to size the final document.
#[derive(Debug, Clone)]
pub struct Upscaled {
    pub image: RasterImage,
    /// Scale actually applied (1.0 when the image was left alone).
    pub scale: f64,
    /// Dimensions before upscaling.
    pub original: (u32, u32),
}

/// Scale factor after enforcing the `max_dimension` ceiling.
pub fn effective_scale(width: u32, height: u32, factor: f64, max_dimension: u32) -> f64 {
    let longest = width.max(height) as f64;
    if longest <= 0.0 || !factor.is_finite() {
        return 1.0;
    }
    if longest * factor > max_dimension as f64 {
        max_dimension as f64 / longest
    } else {
        factor
    }
}

/// Enlarge the raster so tracing works on a finer grid.
pub fn upscale(
    image: RasterImage,
    factor: f64,
    max_dimension: u32,
    filter: FilterType,
) -> Upscaled {
    let original = image.dimensions();
    let (w, h) = original;
    let scale = effective_scale(w, h, factor, max_dimension);
    if scale <= 1.0 {
        return Upscaled {
            image,
            scale: 1.0,
            original,
        };
    }

    let target = |dim: u32| ((dim as f64 * scale).round() as u32).max(1);
    let (new_w, new_h) = (target(w), target(h));
    debug!(scale, from = ?original, to = ?(new_w, new_h), "upscaling before tracing");
    Upscaled {
        image: image.resize(new_w, new_h, filter),
        scale,
        original,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn raster(w: u32, h: u32) -> RasterImage {
        RasterImage::from_rgba(RgbaImage::from_pixel(w, h, Rgba([10, 20, 30, 255])))
    }

    mod effective_scale {
        use super::*;

        #[test]
        fn factor_kept_below_ceiling() {
            assert_eq!(effective_scale(100, 50, 2.0, 4000), 2.0);
        }

        #[test]
        fn factor_reduced_to_ceiling() {
            assert_eq!(effective_scale(3000, 1000, 2.0, 4000), 4000.0 / 3000.0);
        }
    }

    mod upscale {
        use super::*;

        mod unit {
            use super::*;

            #[test]
            fn doubles_and_remembers_original_size() {
                let out = upscale(raster(30, 20), 2.0, DEFAULT_MAX_DIMENSION, FilterType::Lanczos3);
                assert_eq!(out.image.dimensions(), (60, 40));
                assert_eq!(out.scale, 2.0);
                assert_eq!(out.original, (30, 20));
            }

            #[test]
            fn factor_of_one_is_passthrough() {
                let image = raster(5, 5);
                let out = upscale(image.clone(), 1.0, DEFAULT_MAX_DIMENSION, FilterType::Lanczos3);
                assert_eq!(out.image, image);
                assert_eq!(out.scale, 1.0);
            }

            #[test]
            fn oversized_image_is_not_shrunk() {
                let image = raster(50, 10);
                let out = upscale(image.clone(), 3.0, 40, FilterType::Lanczos3);
                assert_eq!(out.image, image);
                assert_eq!(out.scale, 1.0);
            }

            #[test]
            fn ceiling_limits_longest_side() {
                let out = upscale(raster(100, 40), 4.0, 200, FilterType::Triangle);
                assert_eq!(out.image.dimensions(), (200, 80));
                assert_eq!(out.original, (100, 40));
            }
        }

        mod prop {
            use super::*;
            use proptest::prelude::*;

            proptest! {
                /// upscale: never exceeds the ceiling unless the input already does
                #[test]
                fn respects_ceiling(
                    w in 1u32..64,
                    h in 1u32..64,
                    factor in 0.5f64..6.0,
                    max_dimension in 64u32..200
                ) {
                    let out = upscale(raster(w, h), factor, max_dimension, FilterType::Nearest);
                    let (nw, nh) = out.image.dimensions();
                    prop_assert!(nw.max(nh) <= max_dimension);
                    prop_assert!(out.scale >= 1.0);
                    prop_assert_eq!(out.original, (w, h));
                }
            }
        }
    }
}
