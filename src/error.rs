use thiserror::Error;

/// Result type alias for operations that may fail with [`LogotraceError`].
pub type LogotraceResult<T> = std::result::Result<T, LogotraceError>;

/// Error types that can occur while converting a raster logo to a vector document.
///
/// Degenerate inputs (fully transparent images, empty palettes, layers that trace to
/// nothing) are not errors; they produce pass-through rasters or empty documents.
#[derive(Debug, Error)]
pub enum LogotraceError {
    /// Image loading, decoding, or encoding error.
    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),
    /// File system I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Pixel buffer does not describe a valid raster.
    #[error(
        "Invalid raster: {width}x{height} with {channels} channels cannot hold {len} bytes"
    )]
    InvalidRaster {
        width: u32,
        height: u32,
        channels: u8,
        len: usize,
    },
    /// A color string could not be parsed as hex.
    #[error("Invalid color `{0}`; expected #rgb or #rrggbb")]
    InvalidColor(String),
    /// Vectorization or tracing operation failed.
    #[error("Tracing failed: {0}")]
    Trace(String),
    /// Two traced layers reported different coordinate spaces.
    #[error("Traced layers disagree on the view box: expected {expected:?}, found {found:?}")]
    ViewBoxMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}
