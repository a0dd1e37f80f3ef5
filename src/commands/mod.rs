mod cut;
mod trace;
mod utils;

use crate::cli::{Cli, Commands};
use logotrace::LogotraceResult;

/// The main function to run the command based on CLI input.
pub fn run(cli: Cli) -> LogotraceResult<()> {
    dispatch(cli.command)
}

/// Dispatch the command to the appropriate handler.
fn dispatch(command: Commands) -> LogotraceResult<()> {
    match command {
        Commands::Cut(cmd) => cut::run(cmd),
        Commands::Trace(cmd) => trace::run(cmd),
    }
}
