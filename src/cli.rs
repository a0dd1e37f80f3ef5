use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use image::imageops::FilterType;
use logotrace::{Color, ConvertOptions, TraceParams, TurnPolicy};

/// Command line interface definition.
#[derive(Parser, Debug)]
#[command(author, version, about, propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalOptions {
    /// Log filter directive (overridden by RUST_LOG)
    #[arg(long = "log-level", env = "LOGOTRACE_LOG", default_value = "warn", global = true)]
    pub log_level: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Remove the background and export the trimmed logo as a PNG
    Cut(CutCommand),
    /// Trace the logo into a layered SVG
    Trace(TraceCommand),
}

/// Resampling filters for image resizing.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ResampleFilter {
    Nearest,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<ResampleFilter> for FilterType {
    /// Convert ResampleFilter to image::imageops::FilterType.
    fn from(value: ResampleFilter) -> Self {
        match value {
            ResampleFilter::Nearest => FilterType::Nearest,
            ResampleFilter::Triangle => FilterType::Triangle,
            ResampleFilter::CatmullRom => FilterType::CatmullRom,
            ResampleFilter::Gaussian => FilterType::Gaussian,
            ResampleFilter::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// How ambiguous corners are resolved while tracing.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum TurnPolicyArg {
    Black,
    White,
    Left,
    Right,
    Minority,
    Majority,
}

impl From<TurnPolicyArg> for TurnPolicy {
    fn from(value: TurnPolicyArg) -> Self {
        match value {
            TurnPolicyArg::Black => TurnPolicy::Black,
            TurnPolicyArg::White => TurnPolicy::White,
            TurnPolicyArg::Left => TurnPolicy::Left,
            TurnPolicyArg::Right => TurnPolicy::Right,
            TurnPolicyArg::Minority => TurnPolicy::Minority,
            TurnPolicyArg::Majority => TurnPolicy::Majority,
        }
    }
}

#[derive(Args, Debug)]
pub struct CutCommand {
    /// Input image path
    pub input: PathBuf,
    /// PNG output path (defaults to `<name>-cut.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    #[command(flatten)]
    pub isolation: IsolationArgs,
}

#[derive(Args, Debug)]
pub struct TraceCommand {
    /// Input image path
    pub input: PathBuf,
    /// Output SVG path (defaults to input name with `.svg`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Trace a single black silhouette instead of one layer per color
    #[arg(long)]
    pub monochrome: bool,
    /// Luminance below which a pixel is ink in monochrome mode
    #[arg(long = "monochrome-threshold", default_value_t = 128)]
    pub monochrome_threshold: u8,
    /// Maximum per-channel distance for merging palette colors
    #[arg(long = "color-tolerance", default_value_t = 20)]
    pub color_tolerance: u8,
    /// Upscale factor applied before tracing
    #[arg(long = "upscale", default_value_t = 2.0)]
    pub upscale: f64,
    /// Filter used when upscaling before tracing
    #[arg(long = "upscale-filter", value_enum, default_value_t = ResampleFilter::Lanczos3)]
    pub upscale_filter: ResampleFilter,
    /// Largest side allowed after upscaling
    #[arg(long = "max-dimension", default_value_t = 4000)]
    pub max_dimension: u32,
    #[command(flatten)]
    pub isolation: IsolationArgs,
    #[command(flatten)]
    pub trace_options: TraceOptionsArgs,
}

#[derive(Args, Debug)]
pub struct IsolationArgs {
    /// Background color to remove (`#rgb` or `#rrggbb`); detected from corners when omitted
    #[arg(long, value_parser = parse_color)]
    pub background: Option<Color>,
    /// Maximum per-channel distance for background pixels
    #[arg(long = "background-tolerance", default_value_t = 30)]
    pub background_tolerance: u8,
    /// Gradient edge cleanup strength (0 disables)
    #[arg(long = "cleanup", default_value_t = 0)]
    pub cleanup_level: u32,
}

fn parse_color(value: &str) -> Result<Color, String> {
    value.parse().map_err(|err| format!("{err}"))
}

#[derive(Args, Debug)]
pub struct TraceOptionsArgs {
    /// Corner resolution policy
    #[arg(long = "turn-policy", value_enum, default_value_t = TurnPolicyArg::Minority)]
    pub turn_policy: TurnPolicyArg,
    /// Suppress shapes up to this many pixels
    #[arg(long = "speckle", default_value_t = 2)]
    pub speckle_size: usize,
    /// Corner smoothing, from 0 (sharp polygons) to 1.3334 (round)
    #[arg(long = "corner-sharpness", default_value_t = 1.0)]
    pub corner_sharpness: f64,
    /// Curve fitting tolerance
    #[arg(long = "curve-tolerance", default_value_t = 0.2)]
    pub curve_tolerance: f64,
    /// Path precision override (decimal places)
    #[arg(long = "path-precision")]
    pub path_precision: Option<u32>,
    /// Disable explicit path precision override
    #[arg(long = "no-path-precision")]
    pub no_path_precision: bool,
}

impl From<&TraceOptionsArgs> for TraceParams {
    fn from(args: &TraceOptionsArgs) -> Self {
        let defaults = TraceParams::default();
        let path_precision = if args.no_path_precision {
            None
        } else {
            args.path_precision.or(defaults.path_precision)
        };
        Self {
            turn_policy: args.turn_policy.into(),
            speckle_size: args.speckle_size,
            corner_sharpness: args.corner_sharpness,
            curve_tolerance: args.curve_tolerance,
            path_precision,
        }
    }
}

impl From<&IsolationArgs> for ConvertOptions {
    fn from(args: &IsolationArgs) -> Self {
        ConvertOptions::default()
            .with_background(args.background)
            .with_background_tolerance(args.background_tolerance)
            .with_cleanup_level(args.cleanup_level)
    }
}

impl From<&TraceCommand> for ConvertOptions {
    fn from(cmd: &TraceCommand) -> Self {
        let mut options = ConvertOptions::from(&cmd.isolation)
            .with_color_tolerance(cmd.color_tolerance)
            .with_preserve_colors(!cmd.monochrome)
            .with_upscale(cmd.upscale)
            .with_upscale_filter(cmd.upscale_filter.into())
            .with_trace_params((&cmd.trace_options).into());
        options.max_upscaled_dimension = cmd.max_dimension;
        options.monochrome_threshold = cmd.monochrome_threshold;
        options
    }
}
