use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use crate::color::Color;
use crate::raster::{OPAQUE_ALPHA, RasterImage};

/// Default tolerance for collapsing near-duplicate shades into one palette entry.
pub const DEFAULT_COLOR_TOLERANCE: u8 = 20;

/// Count exact RGB triples among opaque pixels.
pub fn color_histogram(image: &RasterImage) -> HashMap<Color, usize> {
    let mut histogram = HashMap::new();
    for px in image.pixels() {
        if px.get(3).copied().unwrap_or(255) >= OPAQUE_ALPHA {
            *histogram.entry(Color::from_slice(px)).or_default() += 1;
        }
    }
    histogram
}

/// Distinct foreground colors, most frequent first.
///
/// A color is kept only if it does not match any already-kept color within
/// `tolerance`, so antialiased shades fold into their dominant neighbour.
pub fn extract_palette(image: &RasterImage, tolerance: u8) -> Vec<Color> {
    let mut ranked: Vec<(Color, usize)> = color_histogram(image).into_iter().collect();
    ranked.sort_unstable_by_key(|&(color, count)| (Reverse(count), color));

    let mut palette: Vec<Color> = Vec::new();
    for (candidate, _) in ranked {
        if palette.iter().all(|kept| !kept.matches(&candidate, tolerance)) {
            palette.push(candidate);
        }
    }
    debug!(colors = palette.len(), tolerance, "extracted palette");
    palette
}
