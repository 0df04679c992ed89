//! Parses generated command text into an executable argument vector.
//!
//! The backend is instructed to answer with a bare ffmpeg command, but models
//! sometimes prefix conversational text anyway, and file paths routinely
//! contain spaces and apostrophes. Naive whitespace splitting breaks on both,
//! so this module implements a minimal shell-grammar subset: locate the
//! executable literal, then scan the remainder character by character with
//! quote tracking. Arguments are kept as a vector and never re-joined into a
//! shell string for execution.

use crate::error::{Error, Result};

/// The executable literal the scanner searches for.
pub const EXECUTABLE: &str = "ffmpeg";

/// A command ready for process execution: executable name plus ordered,
/// unquoted arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub executable: String,
    pub args: Vec<String>,
}

impl ParsedCommand {
    /// Renders the command back to a single display line, double-quoting
    /// arguments that contain whitespace.
    pub fn to_command_line(&self) -> String {
        let mut line = self.executable.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.chars().any(char::is_whitespace) {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Tokenizes generated text into a [`ParsedCommand`] for [`EXECUTABLE`].
///
/// # Errors
///
/// Returns [`Error::MalformedCommand`] when the text contains no occurrence
/// of the executable literal.
pub fn tokenize(text: &str) -> Result<ParsedCommand> {
    tokenize_with(text, EXECUTABLE)
}

/// Tokenizes generated text, searching for the given executable literal.
pub fn tokenize_with(text: &str, executable: &str) -> Result<ParsedCommand> {
    let start = text
        .find(executable)
        .ok_or_else(|| Error::MalformedCommand(text.trim().to_string()))?;

    let argument_region = &text[start + executable.len()..];

    Ok(ParsedCommand {
        executable: executable.to_string(),
        args: scan_arguments(argument_region),
    })
}

/// Splits the argument region on unquoted whitespace.
///
/// Quote rules: an unescaped `"` or `'` opens a quoted region; only the same
/// character closes it, and the other kind is ordinary text inside it. A
/// backslash escapes an immediately following quote character. An
/// unterminated quote at end of input is tolerated; the accumulated text is
/// still emitted rather than discarding an otherwise usable command.
fn scan_arguments(region: &str) -> Vec<String> {
    let mut args: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut quote_char = '"';
    let mut prev = '\0';

    for ch in region.chars() {
        match ch {
            '"' | '\'' => {
                if prev == '\\' {
                    // Escaped quote: resolve the escape, keep the quote.
                    current.pop();
                    current.push(ch);
                } else if in_quotes {
                    if ch == quote_char {
                        in_quotes = false;
                    } else {
                        current.push(ch);
                    }
                } else {
                    in_quotes = true;
                    quote_char = ch;
                }
            }
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    args.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
        prev = ch;
    }

    if !current.is_empty() {
        args.push(current);
    }

    args.into_iter()
        .filter(|arg| !arg.is_empty())
        .map(strip_residual_quotes)
        .collect()
}

/// Removes one residual outer quote pair from an argument that is still
/// wrapped in matching quotes after scanning.
///
/// Compatibility shim, not a correctness guarantee: kept because some inputs
/// have historically reached this point with their wrappers intact.
fn strip_residual_quotes(arg: String) -> String {
    let bytes = arg.as_bytes();
    if bytes.len() >= 2 {
        let first = bytes[0];
        let last = bytes[bytes.len() - 1];
        if first == last && (first == b'"' || first == b'\'') {
            return arg[1..arg.len() - 1].to_string();
        }
    }
    arg
}
