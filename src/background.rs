use tracing::debug;

use crate::color::{Color, ColorWithAlpha};
use crate::raster::{OPAQUE_ALPHA, RasterImage};

/// Default per-channel tolerance used when removing the background color.
pub const DEFAULT_BACKGROUND_TOLERANCE: u8 = 30;

/// Tolerance used to compare corner and center samples with each other.
const SAMPLE_MATCH_TOLERANCE: u8 = 30;
const MAX_CORNER_SAMPLE: u32 = 10;
const MIN_CORNER_SAMPLE: u32 = 2;

/// Mean color and alpha of the `size × size` square whose top-left corner is `(x0, y0)`.
fn region_mean(image: &RasterImage, x0: u32, y0: u32, size: u32) -> ColorWithAlpha {
    let mut sums = [0u64; 4];
    for y in y0..y0 + size {
        for x in x0..x0 + size {
            let c = image.color_at(x, y);
            sums[0] += c.r as u64;
            sums[1] += c.g as u64;
            sums[2] += c.b as u64;
            sums[3] += image.alpha_at(x, y) as u64;
        }
    }
    let count = (size as u64 * size as u64).max(1) as f64;
    let mean = |sum: u64| (sum as f64 / count).round() as u8;
    ColorWithAlpha {
        color: Color::new(mean(sums[0]), mean(sums[1]), mean(sums[2])),
        alpha: mean(sums[3]),
    }
}

fn average_colors(colors: &[Color]) -> Color {
    let n = colors.len().max(1) as f64;
    let avg = |channel: fn(&Color) -> u8| {
        (colors.iter().map(|c| channel(c) as f64).sum::<f64>() / n).round() as u8
    };
    Color::new(avg(|c| c.r), avg(|c| c.g), avg(|c| c.b))
}

/// Guess the flat backdrop color of a logo from its corners.
///
/// Returns `None` when the image is too small to sample, when the corners are already
/// transparent, when the corners disagree, or when the center shares the corner color
/// (the logo fills the frame and the "backdrop" is really its own fill).
pub fn detect_background(image: &RasterImage) -> Option<Color> {
    let (w, h) = image.dimensions();
    let short_side = w.min(h);
    let sample = MAX_CORNER_SAMPLE.min(short_side / 10);
    if sample < MIN_CORNER_SAMPLE {
        debug!(width = w, height = h, "image too small for background sampling");
        return None;
    }

    let corners = [
        region_mean(image, 0, 0, sample),
        region_mean(image, w - sample, 0, sample),
        region_mean(image, 0, h - sample, sample),
        region_mean(image, w - sample, h - sample, sample),
    ];

    let mean_alpha = corners.iter().map(|c| c.alpha as u32).sum::<u32>() / 4;
    if mean_alpha < OPAQUE_ALPHA as u32 {
        debug!(mean_alpha, "corners already transparent");
        return None;
    }

    let colors = corners.map(|c| c.color);
    let uniform = colors.iter().enumerate().all(|(i, a)| {
        colors[i + 1..]
            .iter()
            .all(|b| a.matches(b, SAMPLE_MATCH_TOLERANCE))
    });
    if !uniform {
        debug!(?colors, "corner colors disagree; no single backdrop");
        return None;
    }

    let candidate = average_colors(&colors);
    let center_size = (2 * sample).min(short_side / 4).max(1);
    let center = region_mean(
        image,
        (w - center_size) / 2,
        (h - center_size) / 2,
        center_size,
    );
    if center.color.matches(&candidate, SAMPLE_MATCH_TOLERANCE) {
        debug!(%candidate, "center matches corners; treating as logo fill");
        return None;
    }

    debug!(background = %candidate, "detected background color");
    Some(candidate)
}

/// Make every pixel matching the background color fully transparent.
///
/// An explicit `background` skips detection. The result always has an alpha channel;
/// pixels that do not match keep their color and alpha.
pub fn remove_background(
    image: RasterImage,
    background: Option<Color>,
    tolerance: u8,
) -> RasterImage {
    let background = background.or_else(|| detect_background(&image));
    let mut image = image.with_alpha();
    let Some(background) = background else {
        return image;
    };

    let mut removed = 0usize;
    for px in image.as_raw_mut().chunks_exact_mut(4) {
        if Color::from_slice(px).matches(&background, tolerance) {
            px.copy_from_slice(&[0, 0, 0, 0]);
            removed += 1;
        }
    }
    debug!(%background, tolerance, removed, "removed background pixels");
    image
}
