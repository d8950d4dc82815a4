//! Line input for the interactive session.
//!
//! The session only needs "show a prompt, read one line". [`TerminalPrompt`]
//! does that with rustyline line editing when attached to a terminal;
//! [`LinePrompt`] reads plain lines from any reader, which covers piped
//! stdin and scripted input in tests.

use std::io::{self, BufRead, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// Source of user input, one line at a time.
pub trait Prompt {
    /// Show `message` and read one line without its line terminator.
    ///
    /// Returns `Ok(None)` once the input is exhausted or the user interrupts.
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>>;
}

/// Prompt backed by a rustyline editor.
pub struct TerminalPrompt {
    editor: DefaultEditor,
}

impl TerminalPrompt {
    pub fn new() -> io::Result<Self> {
        let editor = DefaultEditor::new().map_err(readline_to_io)?;
        Ok(Self { editor })
    }
}

impl Prompt for TerminalPrompt {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        match self.editor.readline(message) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = self.editor.add_history_entry(line.as_str());
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Eof) | Err(ReadlineError::Interrupted) => Ok(None),
            Err(e) => Err(readline_to_io(e)),
        }
    }
}

fn readline_to_io(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(e) => e,
        other => io::Error::other(other.to_string()),
    }
}

/// Prompt that writes the message to `writer` and reads from `reader`.
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }
}

impl<R: BufRead, W: Write> Prompt for LinePrompt<R, W> {
    fn read_line(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.writer, "{message}")?;
        self.writer.flush()?;

        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_line_prompt_reads_lines() {
        let mut output = Vec::new();
        let mut prompt = LinePrompt::new(Cursor::new("first\r\nsecond\n"), &mut output);

        assert_eq!(prompt.read_line("Path: ").unwrap().as_deref(), Some("first"));
        assert_eq!(prompt.read_line("Input: ").unwrap().as_deref(), Some("second"));
        assert_eq!(prompt.read_line("Input: ").unwrap(), None);

        assert_eq!(String::from_utf8(output).unwrap(), "Path: Input: Input: ");
    }

    #[test]
    fn test_line_prompt_keeps_inner_whitespace() {
        let mut prompt = LinePrompt::new(Cursor::new("  a b  \n"), io::sink());
        assert_eq!(prompt.read_line("").unwrap().as_deref(), Some("  a b  "));
    }

    #[test]
    fn test_line_prompt_last_line_without_newline() {
        let mut prompt = LinePrompt::new(Cursor::new("n"), io::sink());
        assert_eq!(prompt.read_line("").unwrap().as_deref(), Some("n"));
        assert_eq!(prompt.read_line("").unwrap(), None);
    }
}
