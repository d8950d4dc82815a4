//! Command-line interface module.
//!
//! This module handles:
//! - Argument parsing via clap
//! - Line input via rustyline, or plain lines when stdin is not a terminal
//! - The interactive load, clean and export loop
//! - Writing the cleaned table as CSV, XLSX, JSON or HTML

mod args;
mod export;
mod prompt;
mod session;

pub use args::Args;
pub use export::{ExportFormat, Exporter, OUTPUT_STEM};
pub use prompt::{LinePrompt, Prompt, TerminalPrompt};
pub use session::{parse_choice, Session, SessionSummary};
