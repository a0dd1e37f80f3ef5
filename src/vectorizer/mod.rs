use image::GrayImage;

use crate::LogotraceResult;
use crate::config::TraceParams;

/// One `<path>` element as reported by a tracer.
#[derive(Debug, Clone, PartialEq)]
pub struct SvgPathElement {
    /// Path geometry in SVG path syntax, relative to `offset`.
    pub data: String,
    /// Translation that places the geometry in trace space.
    pub offset: (f64, f64),
}

/// The outline a tracer produced for a single mask.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TracedShape {
    /// Coordinate space of the paths.
    pub view_box: Option<(u32, u32)>,
    pub paths: Vec<SvgPathElement>,
}

impl TracedShape {
    pub fn is_empty(&self) -> bool {
        self.paths.iter().all(|p| p.data.trim().is_empty())
    }
}

/// Mask values below this are ink; everything else is paper.
pub const TRACE_THRESHOLD: u8 = 128;

/// A trait representing an algorithm that can turn a binary mask into outlines.
///
/// Mask pixels below [`TRACE_THRESHOLD`] are ink; everything else is paper.
pub trait MaskVectorizer: Sync {
    fn vectorize(&self, mask: &GrayImage, params: &TraceParams) -> LogotraceResult<TracedShape>;
}

#[cfg(feature = "vectorizer-vtracer")]
pub mod vtracer;
