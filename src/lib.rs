pub mod background;
pub mod cleanup;
pub mod color;
pub mod config;
pub mod document;
pub mod error;
pub mod mask;
pub mod palette;
pub mod pipeline;
pub mod raster;
pub mod trim;
pub mod upscale;
pub mod vectorizer;

pub use color::{Color, ColorWithAlpha};
pub use config::{ConvertOptions, TraceParams, TurnPolicy};
pub use document::{PathFragment, Placement, VectorDocument, ViewBox};
pub use error::{LogotraceError, LogotraceResult};
pub use raster::RasterImage;
pub use vectorizer::{MaskVectorizer, SvgPathElement, TracedShape};
#[cfg(feature = "vectorizer-vtracer")]
pub use vectorizer::vtracer::VtracerSvgVectorizer;

use std::fs;
use std::path::Path;

use tracing::info;

use crate::pipeline::{isolate_foreground, prepare, trace_colors, trace_monochrome};

/// Convert encoded raster bytes into SVG text with the default VTracer backend.
#[cfg(feature = "vectorizer-vtracer")]
pub fn convert(raster_bytes: &[u8], options: &ConvertOptions) -> LogotraceResult<String> {
    let document = Logotrace::new(options.clone()).convert(raster_bytes)?;
    Ok(document.to_svg())
}

/// Entry point for configuring and running logo conversions.
///
/// Each call owns its intermediate rasters, so one instance can serve many images,
/// including from several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Logotrace {
    options: ConvertOptions,
}

impl Logotrace {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    /// Get a reference to the conversion options.
    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Replace the conversion options.
    pub fn with_options(mut self, options: ConvertOptions) -> Self {
        self.options = options;
        self
    }

    /// Convert encoded raster bytes with the default VTracer backend.
    #[cfg(feature = "vectorizer-vtracer")]
    pub fn convert(&self, raster_bytes: &[u8]) -> LogotraceResult<VectorDocument> {
        self.convert_with(raster_bytes, &VtracerSvgVectorizer)
    }

    /// Read and convert an image file with the default VTracer backend.
    #[cfg(feature = "vectorizer-vtracer")]
    pub fn convert_path(&self, path: impl AsRef<Path>) -> LogotraceResult<VectorDocument> {
        let bytes = fs::read(path.as_ref())?;
        self.convert(&bytes)
    }

    /// Convert encoded raster bytes with the given vectorizer.
    pub fn convert_with<V>(
        &self,
        raster_bytes: &[u8],
        vectorizer: &V,
    ) -> LogotraceResult<VectorDocument>
    where
        V: MaskVectorizer,
    {
        let image = RasterImage::decode(raster_bytes)?;
        self.convert_image_with(image, vectorizer)
    }

    /// Convert an already decoded raster with the given vectorizer.
    pub fn convert_image_with<V>(
        &self,
        image: RasterImage,
        vectorizer: &V,
    ) -> LogotraceResult<VectorDocument>
    where
        V: MaskVectorizer,
    {
        let display = image.dimensions();
        let prepared = prepare(image, &self.options);
        let traced = prepared.image().dimensions();

        let fragments = if self.options.preserve_colors {
            trace_colors(prepared.image(), &self.options, vectorizer)?
        } else {
            trace_monochrome(
                prepared.image(),
                self.options.monochrome_threshold,
                vectorizer,
                &self.options.trace,
            )?
        };

        let document =
            VectorDocument::compose(display, prepared.placement(), traced, fragments)?;
        info!(
            width = document.width,
            height = document.height,
            view_box = %document.view_box,
            scale = prepared.upscaled.scale,
            fragments = document.fragments.len(),
            "converted raster to vector document"
        );
        Ok(document)
    }

    /// Remove the background, clean edges, and trim, returning the raster itself.
    pub fn isolate(&self, image: RasterImage) -> RasterImage {
        isolate_foreground(image, &self.options).image
    }

    /// Produce a transparent, trimmed PNG of the logo.
    pub fn cut(&self, raster_bytes: &[u8]) -> LogotraceResult<Vec<u8>> {
        let image = RasterImage::decode(raster_bytes)?;
        self.isolate(image).encode_png()
    }

    /// Read an image file and produce a transparent, trimmed PNG of the logo.
    pub fn cut_path(&self, path: impl AsRef<Path>) -> LogotraceResult<Vec<u8>> {
        let bytes = fs::read(path.as_ref())?;
        self.cut(&bytes)
    }
}
