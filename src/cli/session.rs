//! Interactive cleanup session.
//!
//! One iteration walks through four prompts:
//!
//! ```text
//! Path: -> cleanup choice -> export choice -> clean again?
//! ```
//!
//! Any error before the export is written (missing file, unsupported type,
//! bad menu input, read or export failure) is printed and the iteration
//! starts over at the path prompt, discarding the table. Only the final
//! prompt can end the loop, unless the input runs out.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::export::{ExportFormat, Exporter};
use super::prompt::Prompt;
use crate::clean::{self, Cleanup};
use crate::error::{ChoiceError, Error, LoadError, Result};
use crate::load;

/// Totals for a finished session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSummary {
    /// Iterations that reached the export step
    pub iterations: usize,
    /// Iterations restarted after an error
    pub restarts: usize,
    /// Files written, in order
    pub exports: Vec<PathBuf>,
}

/// How a single iteration ended without an error.
enum Outcome {
    Exported(PathBuf),
    EndOfInput,
}

/// Drives the prompt loop, writing messages to `out`.
pub struct Session<P, W> {
    prompt: P,
    out: W,
    output_dir: PathBuf,
}

impl<P: Prompt, W: Write> Session<P, W> {
    /// Session that writes its output files to the working directory.
    pub fn new(prompt: P, out: W) -> Self {
        Self {
            prompt,
            out,
            output_dir: PathBuf::from("."),
        }
    }

    /// Write output files to `dir` instead of the working directory.
    pub fn with_output_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.output_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Run until the user declines to clean again or input ends.
    ///
    /// Only console I/O failures are returned as errors.
    pub fn run(&mut self) -> io::Result<SessionSummary> {
        let mut summary = SessionSummary::default();

        loop {
            match self.run_iteration() {
                Ok(Outcome::Exported(path)) => {
                    summary.iterations += 1;
                    summary.exports.push(path);
                }
                Ok(Outcome::EndOfInput) => break,
                Err(Error::Io(e)) => return Err(e),
                Err(e) => {
                    warn!(error = %e, "restarting iteration");
                    summary.restarts += 1;
                    self.report(&e)?;
                    continue;
                }
            }

            let Some(answer) = self.read("Would you like to clean again? [y/N]")? else {
                break;
            };
            if answer.trim().eq_ignore_ascii_case("n") {
                break;
            }
        }

        debug!(?summary, "session finished");
        Ok(summary)
    }

    /// Load, clean and export once.
    fn run_iteration(&mut self) -> Result<Outcome> {
        let Some(path) = self.read("Path: ")? else {
            return Ok(Outcome::EndOfInput);
        };

        let mut table = load::load(path.trim())?;
        writeln!(
            self.out,
            "Loaded {} rows and {} columns.",
            table.num_rows(),
            table.num_columns()
        )?;

        writeln!(self.out, "\nWhat type of cleanup would you like?")?;
        for cleanup in Cleanup::ALL {
            writeln!(self.out, "{}. {}", cleanup.code(), cleanup.label())?;
        }
        let Some(input) = self.read("Input: ")? else {
            return Ok(Outcome::EndOfInput);
        };
        let cleanup = parse_choice(&input, "cleanup", Cleanup::from_code)?;

        match cleanup {
            Cleanup::MissingValues => writeln!(self.out, "\nDropping missing values...")?,
            Cleanup::WrongTypes => {
                writeln!(self.out, "\nEliminating values with wrong data types...")?
            }
            Cleanup::Duplicates => writeln!(self.out, "\nDropping duplicate values...")?,
        }
        let report = clean::apply(cleanup, &mut table)?;
        match cleanup {
            Cleanup::MissingValues => writeln!(
                self.out,
                "\nDropped {} missing rows!",
                report.rows_removed
            )?,
            Cleanup::Duplicates => writeln!(
                self.out,
                "\nDropped {} duplicate rows!",
                report.rows_removed
            )?,
            Cleanup::WrongTypes => {}
        }
        writeln!(self.out, "\nDone!")?;

        writeln!(self.out, "\nCleanup done! How would you like to export?")?;
        for format in ExportFormat::ALL {
            writeln!(self.out, "{}. {}", format.code(), format.extension())?;
        }
        let Some(input) = self.read("Input: ")? else {
            return Ok(Outcome::EndOfInput);
        };
        let format = parse_choice(&input, "export", ExportFormat::from_code)?;

        let path = Exporter::export_to_dir(&self.output_dir, format, &table)?;
        writeln!(self.out, "\n\n")?;

        Ok(Outcome::Exported(path))
    }

    /// Flush pending output, then read one line.
    fn read(&mut self, message: &str) -> io::Result<Option<String>> {
        self.out.flush()?;
        self.prompt.read_line(message)
    }

    fn report(&mut self, err: &Error) -> io::Result<()> {
        match err {
            Error::Load(LoadError::UnsupportedFileType { .. }) => writeln!(self.out, "{err}"),
            _ => writeln!(self.out, "Error: {err}"),
        }
    }

    /// Consume the session, returning the output writer.
    pub fn into_output(self) -> W {
        self.out
    }
}

/// Parse a menu selection.
///
/// The trimmed input must be non-empty ASCII digits naming a listed option;
/// leading zeros are allowed.
pub fn parse_choice<T>(
    input: &str,
    menu: &'static str,
    lookup: impl Fn(u64) -> Option<T>,
) -> std::result::Result<T, ChoiceError> {
    let trimmed = input.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ChoiceError::NotNumeric {
            menu,
            input: input.to_string(),
        });
    }

    // Digits only, so the only parse failure is overflow
    let value = trimmed.parse::<u64>().unwrap_or(u64::MAX);
    lookup(value).ok_or(ChoiceError::OutOfRange { menu, value })
}
