//! Command-line argument definitions.

use clap::Parser;

/// Clean up CSV, spreadsheet and JSON tables interactively.
///
/// The tool asks for a file path, a cleanup and an export format, then writes
/// `pycliner_output.<ext>` to the working directory.
#[derive(Parser, Debug)]
#[command(name = "cliner")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging on stderr (repeat for more detail)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Default log filter for the requested verbosity.
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    }
}
