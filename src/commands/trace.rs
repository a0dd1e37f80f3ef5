use std::fs;

use logotrace::{ConvertOptions, Logotrace, LogotraceResult};

use crate::cli::TraceCommand;

use super::utils::derive_svg_path;

/// The main function to run the trace command.
pub fn run(cmd: TraceCommand) -> LogotraceResult<()> {
    let engine = Logotrace::new(ConvertOptions::from(&cmd));
    let output_path = cmd
        .output
        .clone()
        .unwrap_or_else(|| derive_svg_path(&cmd.input));

    let document = engine.convert_path(&cmd.input)?;
    if document.fragments.is_empty() {
        eprintln!(
            "Warning: no foreground found in {}; writing an empty SVG.",
            cmd.input.display()
        );
    }
    fs::write(&output_path, document.to_svg())?;
    println!(
        "SVG with {} layer(s) saved to {}",
        document.fragments.len(),
        output_path.display()
    );

    Ok(())
}
