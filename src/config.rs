use image::imageops::FilterType;

use crate::background::DEFAULT_BACKGROUND_TOLERANCE;
use crate::color::Color;
use crate::palette::DEFAULT_COLOR_TOLERANCE;
use crate::upscale::DEFAULT_MAX_DIMENSION;

/// Upper bound of the corner-sharpness parameter.
pub const MAX_CORNER_SHARPNESS: f64 = 1.3334;

/// How the tracer resolves pixel corners whose inside/outside status is ambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnPolicy {
    Black,
    White,
    Left,
    Right,
    #[default]
    Minority,
    Majority,
}

/// Parameters handed to the tracing backend for every mask.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceParams {
    /// Ambiguous-corner resolution.
    pub turn_policy: TurnPolicy,
    /// Regions smaller than this many pixels are dropped.
    pub speckle_size: usize,
    /// Corner smoothing, from 0 (sharp polygon) to [`MAX_CORNER_SHARPNESS`] (no corners).
    pub corner_sharpness: f64,
    /// Allowed error when fitting curves.
    pub curve_tolerance: f64,
    /// Decimal places kept in path coordinates.
    pub path_precision: Option<u32>,
}

impl Default for TraceParams {
    fn default() -> Self {
        Self {
            turn_policy: TurnPolicy::default(),
            speckle_size: 2,
            corner_sharpness: 1.0,
            curve_tolerance: 0.2,
            path_precision: Some(2),
        }
    }
}

/// Options for a single raster-to-vector conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Explicit backdrop color; detected from the corners when `None`.
    pub background: Option<Color>,
    /// Tolerance used when clearing the backdrop.
    pub background_tolerance: u8,
    /// Tolerance used for palette deduplication and layer masks.
    pub color_tolerance: u8,
    /// Gradient edge cleanup strength; 0 disables it.
    pub cleanup_level: u32,
    /// Trace one layer per palette color instead of a single black silhouette.
    pub preserve_colors: bool,
    /// Requested upscale before tracing.
    pub upscale_factor: f64,
    /// Resampling kernel for the upscale.
    pub upscale_filter: FilterType,
    /// Longest side allowed after upscaling.
    pub max_upscaled_dimension: u32,
    /// Luminance cut used by the silhouette branch.
    pub monochrome_threshold: u8,
    pub trace: TraceParams,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            background: None,
            background_tolerance: DEFAULT_BACKGROUND_TOLERANCE,
            color_tolerance: DEFAULT_COLOR_TOLERANCE,
            cleanup_level: 0,
            preserve_colors: true,
            upscale_factor: 2.0,
            upscale_filter: FilterType::Lanczos3,
            max_upscaled_dimension: DEFAULT_MAX_DIMENSION,
            monochrome_threshold: 128,
            trace: TraceParams::default(),
        }
    }
}

impl ConvertOptions {
    /// Use an explicit backdrop color instead of detecting one.
    pub fn with_background(mut self, background: Option<Color>) -> Self {
        self.background = background;
        self
    }

    pub fn with_background_tolerance(mut self, tolerance: u8) -> Self {
        self.background_tolerance = tolerance;
        self
    }

    pub fn with_color_tolerance(mut self, tolerance: u8) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    /// Set the gradient cleanup level (0 disables the stage).
    pub fn with_cleanup_level(mut self, level: u32) -> Self {
        self.cleanup_level = level;
        self
    }

    pub fn with_preserve_colors(mut self, preserve: bool) -> Self {
        self.preserve_colors = preserve;
        self
    }

    /// Set the upscale factor applied before tracing.
    pub fn with_upscale(mut self, factor: f64) -> Self {
        self.upscale_factor = factor;
        self
    }

    pub fn with_upscale_filter(mut self, filter: FilterType) -> Self {
        self.upscale_filter = filter;
        self
    }

    pub fn with_trace_params(mut self, trace: TraceParams) -> Self {
        self.trace = trace;
        self
    }
}
