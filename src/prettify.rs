//! External code formatter integration.
//!
//! File content is piped through a formatter subprocess (stdin → stdout) so
//! the committed history stays diffable. The filename is handed to the
//! formatter for language detection. Bundled JavaScript carries JSON blobs
//! as `JSON.parse('…')` string literals; those are unwrapped first so the
//! formatter can reach the embedded objects.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, error};

/// Failures from the formatter subprocess.
#[derive(Debug)]
pub enum FormatError {
    Io(std::io::Error),
    NonZeroExit(std::process::ExitStatus),
}

impl From<std::io::Error> for FormatError {
    fn from(e: std::io::Error) -> Self {
        FormatError::Io(e)
    }
}

/// Runs file content through the configured formatter command.
///
/// `command` is a shell line; every `{file}` placeholder is replaced with
/// `filename` so the extension drives language detection. `None` disables
/// the subprocess entirely and returns the (literal-stripped) input as-is.
pub async fn format_file(
    command: Option<&str>,
    filename: &str,
    input: Vec<u8>,
) -> Result<Vec<u8>, FormatError> {
    let input = strip_json_parse_literals(input);
    let Some(template) = command else {
        return Ok(input);
    };

    let shell_line = template.replace("{file}", filename);
    debug!(command = %shell_line, file = filename, "Running formatter");
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&shell_line)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(&input).await?;
    }

    let output = child.wait_with_output().await?;
    if !output.status.success() {
        error!(command = %shell_line, file = filename, status = ?output.status, "Formatter exited with failure");
        return Err(FormatError::NonZeroExit(output.status));
    }
    Ok(output.stdout)
}

/// Unwraps `JSON.parse('…')` calls into bare object literals.
///
/// The wrapper text and the closing `')` are dropped and escaped `\'` inside
/// the string literal are unescaped; all other content passes through
/// untouched. Non-UTF-8 input is returned unchanged.
pub fn strip_json_parse_literals(input: Vec<u8>) -> Vec<u8> {
    const OPEN: &str = "JSON.parse('";

    let text = match String::from_utf8(input) {
        Ok(text) => text,
        Err(e) => return e.into_bytes(),
    };

    let mut out = String::with_capacity(text.len());
    let mut rest = text.as_str();
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        rest = &rest[start + OPEN.len()..];

        // Copy the string body, unescaping \' and stopping at the bare quote.
        let mut chars = rest.char_indices();
        let mut end = None;
        while let Some((i, c)) = chars.next() {
            match c {
                '\\' => match chars.next() {
                    Some((_, '\'')) => out.push('\''),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                },
                '\'' => {
                    end = Some(i);
                    break;
                }
                other => out.push(other),
            }
        }

        match end {
            Some(i) => {
                rest = &rest[i + 1..];
                rest = rest.strip_prefix(')').unwrap_or(rest);
            }
            // Unterminated literal: keep what we have.
            None => rest = "",
        }
    }
    out.push_str(rest);
    out.into_bytes()
}
