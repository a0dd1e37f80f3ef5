use std::cmp::Reverse;
use std::collections::HashMap;

use tracing::debug;

use crate::color::Color;
use crate::raster::{OPAQUE_ALPHA, RasterImage};

const BUCKET_STEP: u8 = 8;
const BASE_TOLERANCE: u32 = 30;
const TOLERANCE_PER_LEVEL: u32 = 5;
const MIN_LUMINANCE_GAP: f64 = 20.0;
const MAX_LUMINANCE_GAP: f64 = 150.0;
const MAX_RATIO_DRIFT: f64 = 0.3;
const SPECKLE_NEIGHBORS: usize = 4;

fn quantize(color: Color) -> Color {
    let q = |v: u8| v / BUCKET_STEP * BUCKET_STEP;
    Color::new(q(color.r), q(color.g), q(color.b))
}

/// The most common opaque color, bucketed to steps of 8 per channel.
pub fn dominant_color(image: &RasterImage) -> Option<Color> {
    let mut buckets: HashMap<Color, usize> = HashMap::new();
    for px in image.pixels() {
        let alpha = px.get(3).copied().unwrap_or(255);
        if alpha >= OPAQUE_ALPHA {
            *buckets.entry(quantize(Color::from_slice(px))).or_default() += 1;
        }
    }
    buckets
        .into_iter()
        .max_by_key(|&(color, count)| (count, Reverse(color)))
        .map(|(color, _)| color)
}

/// Precomputed reference values for the dominant color.
struct Reference {
    color: Color,
    luminance: f64,
    ratios: [f64; 3],
    tolerance: u8,
}

impl Reference {
    fn new(color: Color, level: u32) -> Self {
        let tolerance = (BASE_TOLERANCE + level.saturating_mul(TOLERANCE_PER_LEVEL)).min(255);
        Self {
            color,
            luminance: color.luminance(),
            ratios: color.ratios(),
            tolerance: tolerance as u8,
        }
    }

    /// An edge pixel is a remnant when it is a lighter/darker shade of the dominant hue,
    /// or when it is mostly surrounded by transparency.
    fn is_remnant(&self, color: Color, transparent_neighbors: usize) -> bool {
        if color.matches(&self.color, self.tolerance) {
            return false;
        }
        let gap = (color.luminance() - self.luminance).abs();
        let ratios = color.ratios();
        let same_hue = (0..3).all(|c| (ratios[c] - self.ratios[c]).abs() <= MAX_RATIO_DRIFT);
        let blended = gap > MIN_LUMINANCE_GAP && gap < MAX_LUMINANCE_GAP && same_hue;
        blended || transparent_neighbors >= SPECKLE_NEIGHBORS
    }
}

fn transparent_neighbors(image: &RasterImage, x: u32, y: u32) -> usize {
    let (w, h) = image.dimensions();
    let mut count = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if nx < 0 || ny < 0 || nx >= w as i64 || ny >= h as i64 {
                continue;
            }
            if image.alpha_at(nx as u32, ny as u32) < OPAQUE_ALPHA {
                count += 1;
            }
        }
    }
    count
}

/// Run one erosion pass, returning how many pixels were cleared.
///
/// Decisions are made against the pass input; clearing happens afterwards.
fn run_pass(image: &mut RasterImage, reference: &Reference) -> usize {
    let (w, h) = image.dimensions();
    let mut doomed = Vec::new();
    for y in 0..h {
        for x in 0..w {
            if image.alpha_at(x, y) < OPAQUE_ALPHA {
                continue;
            }
            let neighbors = transparent_neighbors(image, x, y);
            if neighbors > 0 && reference.is_remnant(image.color_at(x, y), neighbors) {
                doomed.push(image.offset(x, y));
            }
        }
    }

    let data = image.as_raw_mut();
    for &offset in &doomed {
        data[offset..offset + 4].copy_from_slice(&[0, 0, 0, 0]);
    }
    doomed.len()
}

/// Run up to `max_passes` passes, stopping after the first one that clears nothing.
/// Returns the number of pixels cleared by each pass that ran.
fn erode(image: &mut RasterImage, reference: &Reference, max_passes: u32) -> Vec<usize> {
    let mut removed = Vec::new();
    for pass in 0..max_passes {
        let cleared = run_pass(image, reference);
        debug!(pass, cleared, "gradient cleanup pass");
        removed.push(cleared);
        if cleared == 0 {
            break;
        }
    }
    removed
}

/// Erode the antialiasing halo left along transparent edges.
///
/// Level 0 disables the stage. Higher levels widen the tolerance around the dominant
/// color and allow more passes (`ceil(level / 2)`); a pass that clears nothing ends
/// the loop.
pub fn clean_gradient_edges(image: RasterImage, level: u32) -> RasterImage {
    if level == 0 {
        return image;
    }
    let mut image = image.with_alpha();
    let Some(dominant) = dominant_color(&image) else {
        debug!("no opaque pixels; skipping gradient cleanup");
        return image;
    };

    let reference = Reference::new(dominant, level);
    let removed = erode(&mut image, &reference, level.div_ceil(2));
    let total: usize = removed.iter().sum();
    debug!(%dominant, level, passes = removed.len(), total, "gradient cleanup finished");
    image
}
