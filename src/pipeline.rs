//! Stage wiring: the shared raster front end and the two tracing branches.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

use crate::LogotraceResult;
use crate::background::remove_background;
use crate::cleanup::clean_gradient_edges;
use crate::color::{BLACK, Color, WHITE};
use crate::config::{ConvertOptions, TraceParams};
use crate::document::{PathFragment, Placement};
use crate::mask::{color_mask, foreground_count, luminance_mask};
use crate::palette::extract_palette;
use crate::raster::RasterImage;
use crate::trim::{Trimmed, trim_with_origin};
use crate::upscale::{Upscaled, upscale};
use crate::vectorizer::MaskVectorizer;

/// Remove the backdrop, optionally erode gradient halos, and trim transparent borders.
pub fn isolate_foreground(image: RasterImage, options: &ConvertOptions) -> Trimmed {
    let image = remove_background(image, options.background, options.background_tolerance);
    let image = clean_gradient_edges(image, options.cleanup_level);
    trim_with_origin(image)
}

/// The raster handed to the tracer and where it came from on the input canvas.
#[derive(Debug, Clone)]
pub struct Prepared {
    pub upscaled: Upscaled,
    /// Trim origin in input pixels.
    pub origin: (u32, u32),
}

impl Prepared {
    pub fn image(&self) -> &RasterImage {
        &self.upscaled.image
    }

    /// Where the traced raster sits on the input canvas, before upscaling.
    pub fn placement(&self) -> Placement {
        Placement {
            origin: self.origin,
            size: self.upscaled.original,
        }
    }
}

/// Run the front end and upscale the result for tracing.
pub fn prepare(image: RasterImage, options: &ConvertOptions) -> Prepared {
    let Trimmed { image, origin } = isolate_foreground(image, options);
    let upscaled = upscale(
        image,
        options.upscale_factor,
        options.max_upscaled_dimension,
        options.upscale_filter,
    );
    Prepared { upscaled, origin }
}

/// Trace the layer of a single palette color. `None` when nothing traceable remains.
fn trace_layer<V: MaskVectorizer>(
    image: &RasterImage,
    color: Color,
    tolerance: u8,
    vectorizer: &V,
    params: &TraceParams,
) -> LogotraceResult<Option<PathFragment>> {
    let mask = color_mask(image, color, tolerance);
    let pixels = foreground_count(&mask);
    if pixels == 0 {
        debug!(%color, "layer mask is empty; skipping");
        return Ok(None);
    }

    let shape = vectorizer.vectorize(&mask, params)?;
    debug!(%color, pixels, paths = shape.paths.len(), "traced layer");
    if shape.is_empty() {
        return Ok(None);
    }
    Ok(Some(PathFragment {
        color,
        paths: shape.paths,
        view_box: shape.view_box,
    }))
}

/// Trace one fragment per palette color, returned in palette order.
///
/// Layers that trace to nothing are dropped. The first tracing failure aborts.
pub fn trace_palette<V: MaskVectorizer>(
    image: &RasterImage,
    palette: &[Color],
    tolerance: u8,
    vectorizer: &V,
    params: &TraceParams,
) -> LogotraceResult<Vec<PathFragment>> {
    #[cfg(feature = "parallel")]
    let layers: Vec<Option<PathFragment>> = palette
        .par_iter()
        .map(|&color| trace_layer(image, color, tolerance, vectorizer, params))
        .collect::<LogotraceResult<_>>()?;
    #[cfg(not(feature = "parallel"))]
    let layers: Vec<Option<PathFragment>> = palette
        .iter()
        .map(|&color| trace_layer(image, color, tolerance, vectorizer, params))
        .collect::<LogotraceResult<_>>()?;

    Ok(layers.into_iter().flatten().collect())
}

/// Extract the palette from `image` and trace each color.
pub fn trace_colors<V: MaskVectorizer>(
    image: &RasterImage,
    options: &ConvertOptions,
    vectorizer: &V,
) -> LogotraceResult<Vec<PathFragment>> {
    let palette = extract_palette(image, options.color_tolerance);
    if palette.is_empty() {
        return Ok(Vec::new());
    }
    trace_palette(
        image,
        &palette,
        options.color_tolerance,
        vectorizer,
        &options.trace,
    )
}

/// Trace a single black silhouette from the luminance of `image` flattened onto white.
pub fn trace_monochrome<V: MaskVectorizer>(
    image: &RasterImage,
    threshold: u8,
    vectorizer: &V,
    params: &TraceParams,
) -> LogotraceResult<Vec<PathFragment>> {
    let mask = luminance_mask(image, WHITE, threshold);
    if foreground_count(&mask) == 0 {
        return Ok(Vec::new());
    }
    let shape = vectorizer.vectorize(&mask, params)?;
    if shape.is_empty() {
        return Ok(Vec::new());
    }
    Ok(vec![PathFragment {
        color: BLACK,
        paths: shape.paths,
        view_box: shape.view_box,
    }])
}
