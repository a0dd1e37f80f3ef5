use std::fs;

use logotrace::{ConvertOptions, Logotrace, LogotraceResult};
use tracing::info;

use crate::cli::CutCommand;

use super::utils::derive_variant_path;

/// The main function to run the cut command.
pub fn run(cmd: CutCommand) -> LogotraceResult<()> {
    let engine = Logotrace::new(ConvertOptions::from(&cmd.isolation));
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_variant_path(&cmd.input, "cut", "png"));

    let png = engine.cut_path(&cmd.input)?;
    fs::write(&output_path, &png)?;
    info!(input = %cmd.input.display(), bytes = png.len(), "wrote trimmed logo");
    println!("Cut PNG saved to {}", output_path.display());

    Ok(())
}
