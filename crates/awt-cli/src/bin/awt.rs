use anyhow::Result;
use clap::Parser;
use std::io::IsTerminal;

use awt_cli::args::CliArgs;

const EXIT_SUCCESS: i32 = 0;
/// At least one site or declaration reported an error.
const EXIT_DIAGNOSTICS: i32 = 2;

fn main() -> Result<()> {
    // AWT_LOG / AWT_LOG_FORMAT, see src/tracing_config.rs.
    awt_cli::tracing_config::init_tracing();

    let args = CliArgs::parse();
    let color = !args.no_color && std::io::stdout().is_terminal();
    let mut stdout = std::io::stdout().lock();
    let summary = awt_cli::run(&args, &mut stdout, color)?;
    drop(stdout);

    std::process::exit(if summary.errors == 0 {
        EXIT_SUCCESS
    } else {
        EXIT_DIAGNOSTICS
    });
}
