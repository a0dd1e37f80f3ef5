use logotrace::LogotraceError;

pub fn report_error(err: &LogotraceError) {
    match err {
        LogotraceError::Image(inner) => {
            eprintln!("Could not read the input image: {inner}");
            eprintln!();
            eprintln!("Supported inputs are PNG, JPEG, and the other raster formats");
            eprintln!("decoded by the `image` crate.");
        }
        LogotraceError::ViewBoxMismatch { .. } => {
            eprintln!("{err}");
            eprintln!();
            eprintln!("Try a different --upscale or --max-dimension value.");
        }
        _ => {
            eprintln!("{err}");
        }
    }
}
