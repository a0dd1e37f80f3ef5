use image::GrayImage;
use tracing::warn;
use visioncortex::{PathSimplifyMode, PointF64};
use vtracer::{ColorImage, ColorMode, Config, Hierarchical, SvgFile, convert};

use crate::config::{MAX_CORNER_SHARPNESS, TraceParams, TurnPolicy};
use crate::{LogotraceError, LogotraceResult};

use super::{MaskVectorizer, SvgPathElement, TRACE_THRESHOLD, TracedShape};

const MIN_LENGTH_THRESHOLD: f64 = 3.5;
const MAX_LENGTH_THRESHOLD: f64 = 10.0;
const INK: [u8; 4] = [0, 0, 0, 255];
const PAPER: [u8; 4] = [255, 255, 255, 255];

/// VTracer-based vectorizer. Traces dark mask pixels as black ink on a transparent
/// background.
#[derive(Debug, Clone, Copy, Default)]
pub struct VtracerSvgVectorizer;

impl MaskVectorizer for VtracerSvgVectorizer {
    fn vectorize(&self, mask: &GrayImage, params: &TraceParams) -> LogotraceResult<TracedShape> {
        if params.turn_policy != TurnPolicy::Minority {
            warn!(policy = ?params.turn_policy, "vtracer has no turn policy setting; ignoring");
        }
        let svg = trace(mask_to_color_image(mask), params)?;
        Ok(traced_shape(&svg))
    }
}

/// Binarise a mask at [`TRACE_THRESHOLD`] into the black-on-white image vtracer reads.
pub fn mask_to_color_image(mask: &GrayImage) -> ColorImage {
    let (w, h) = mask.dimensions();
    let mut pixels = Vec::with_capacity(4 * w as usize * h as usize);
    for px in mask.pixels() {
        pixels.extend_from_slice(if px[0] < TRACE_THRESHOLD { &INK } else { &PAPER });
    }
    ColorImage {
        pixels,
        width: w as usize,
        height: h as usize,
    }
}

/// Translate the potrace-style parameters into a VTracer configuration.
pub fn config_from_params(params: &TraceParams) -> Config {
    let sharpness = params.corner_sharpness.clamp(0.0, MAX_CORNER_SHARPNESS);
    let mode = if sharpness == 0.0 {
        PathSimplifyMode::Polygon
    } else {
        PathSimplifyMode::Spline
    };
    // vtracer squares its speckle size; ours is already an area.
    let filter_speckle = (params.speckle_size as f64).sqrt().ceil() as usize;
    let length_threshold = (MIN_LENGTH_THRESHOLD + params.curve_tolerance.max(0.0) * 5.0)
        .clamp(MIN_LENGTH_THRESHOLD, MAX_LENGTH_THRESHOLD);

    Config {
        color_mode: ColorMode::Binary,
        hierarchical: Hierarchical::Stacked,
        mode,
        filter_speckle,
        color_precision: 6,
        layer_difference: 16,
        corner_threshold: (sharpness / MAX_CORNER_SHARPNESS * 180.0).round() as i32,
        length_threshold,
        max_iterations: 10,
        splice_threshold: 45,
        path_precision: params.path_precision,
    }
}

/// Trace a ColorImage into an SVG using VTracer with the given parameters.
pub fn trace(img: ColorImage, params: &TraceParams) -> LogotraceResult<SvgFile> {
    let svg_file = convert(img, config_from_params(params)).map_err(LogotraceError::Trace)?;
    Ok(svg_file)
}

/// Path geometry and trace space of a traced file. Paths with no geometry are dropped.
pub fn traced_shape(svg: &SvgFile) -> TracedShape {
    let paths = svg
        .paths
        .iter()
        .filter_map(|p| {
            let (data, offset) =
                p.path.to_svg_string(true, PointF64::default(), svg.path_precision);
            (!data.trim().is_empty()).then(|| SvgPathElement {
                data,
                offset: (offset.x, offset.y),
            })
        })
        .collect();
    TracedShape {
        view_box: Some((svg.width as u32, svg.height as u32)),
        paths,
    }
}
