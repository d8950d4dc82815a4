//! cliner CLI entry point.

use std::io::{self, IsTerminal};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use cliner::cli::{Args, LinePrompt, Session, TerminalPrompt};

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Set up logging on stderr so it never mixes with the prompts
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| args.log_filter().into()),
        )
        .with_writer(io::stderr)
        .init();

    let stdin = io::stdin();
    let result = if stdin.is_terminal() {
        let prompt = TerminalPrompt::new().context("Failed to initialize line editor")?;
        Session::new(prompt, io::stdout()).run()
    } else {
        let prompt = LinePrompt::new(stdin.lock(), io::stdout());
        Session::new(prompt, io::stdout()).run()
    };
    let summary = result.context("Console I/O failed")?;

    debug!(
        iterations = summary.iterations,
        restarts = summary.restarts,
        "exiting"
    );
    Ok(())
}
