//! Module for reading a stream of JSON values one at a time
//!
//! [`Session`] wraps a byte source holding any number of concatenated
//! top-level JSON values (separated by whitespace or by nothing at all) and
//! yields them one by one, each re-indented and terminated by a newline. Only
//! one value is buffered at a time, so the source may be far larger than
//! memory as long as each individual value fits.

use std::io::{ErrorKind, Read, Write};

use crate::color::ColorScheme;
use crate::format::{FormatError, Formatter};
use crate::scanner::{is_space, JsonScanner, Signal, SyntaxError};

/// Settings for a [`Session`]
///
/// These settings are used by [`Session::new_custom`]. To avoid breaking
/// backward compatibility when new settings are added, create the settings
/// based on the default:
/// ```
/// # use prettson::session::SessionSettings;
/// SessionSettings {
///     indent: "\t".to_owned(),
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(Clone, Debug)]
pub struct SessionSettings {
    /// Prefix written at the start of every output line
    pub prefix: String,
    /// Indent unit, repeated once per nesting level
    pub indent: String,
    /// Colors applied to the formatted values; the default scheme applies none
    pub colors: ColorScheme,
}

impl Default for SessionSettings {
    /// Empty prefix, an indent of four spaces and no colors
    fn default() -> Self {
        SessionSettings {
            prefix: String::new(),
            indent: "    ".to_owned(),
            colors: ColorScheme::default(),
        }
    }
}

/// Reader which extracts and formats one top-level JSON value at a time
///
/// The session implements [`Iterator`]; each item is one formatted value
/// including its trailing newline. After the first error the iterator is
/// exhausted and keeps returning `None`.
///
/// Syntax error offsets are absolute positions in the underlying stream, not
/// positions within the current value.
pub struct Session<R: Read> {
    reader: R,
    scan: JsonScanner,
    formatter: Formatter,
    prefix: String,
    indent: String,
    /// Raw input; bytes before `scan_pos` belong to already returned values
    buf: Vec<u8>,
    scan_pos: usize,
    /// Formatted output of the current value, reused between calls
    scratch: Vec<u8>,
    failed: bool,
}

impl<R: Read> Session<R> {
    /// Creates a session with [default settings](SessionSettings::default)
    pub fn new(reader: R) -> Self {
        Session::new_custom(reader, SessionSettings::default())
    }

    /// Creates a session with custom settings
    pub fn new_custom(reader: R, settings: SessionSettings) -> Self {
        Session {
            reader,
            scan: JsonScanner::new(),
            formatter: Formatter::new(settings.colors),
            prefix: settings.prefix,
            indent: settings.indent,
            buf: Vec::new(),
            scan_pos: 0,
            scratch: Vec::new(),
            failed: false,
        }
    }

    /// Slides consumed bytes out of the buffer and reads more input
    ///
    /// Returns the number of bytes read; 0 means end of input.
    fn refill(&mut self) -> std::io::Result<usize> {
        if self.scan_pos > 0 {
            self.buf.drain(..self.scan_pos);
            self.scan_pos = 0;
        }

        const MIN_READ: usize = 512;
        let old_len = self.buf.len();
        self.buf.resize(old_len + MIN_READ, 0);
        loop {
            match self.reader.read(&mut self.buf[old_len..]) {
                Ok(n) => {
                    self.buf.truncate(old_len + n);
                    return Ok(n);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => {
                    self.buf.truncate(old_len);
                    return Err(e);
                }
            }
        }
    }

    fn scan_error(&self) -> SyntaxError {
        self.scan
            .error()
            .cloned()
            .unwrap_or(SyntaxError::UnexpectedEndOfInput {
                offset: self.scan.bytes_consumed(),
            })
    }

    /// Scans the next value into the buffer
    ///
    /// Returns the length of its raw encoding starting at `scan_pos`
    /// (including any leading whitespace), or `None` at a clean end of input.
    fn read_value(&mut self) -> Result<Option<usize>, FormatError> {
        self.scan.reset();

        let mut pos = self.scan_pos;
        loop {
            // Look in the buffer for the end of the value
            while pos < self.buf.len() {
                let c = self.buf[pos];
                match self.scan.step(c) {
                    Signal::End => {
                        // The end signal is delayed one byte; give that byte
                        // back so it counts towards the next value
                        self.scan.bytes_consumed -= 1;
                        return Ok(Some(pos - self.scan_pos));
                    }
                    Signal::EndObject | Signal::EndArray => {
                        // The end signal is delayed one byte and we might
                        // block trying to read that byte from the source, so
                        // probe with an invented space instead
                        if self.scan.replay(b' ') == Signal::End {
                            pos += 1;
                            return Ok(Some(pos - self.scan_pos));
                        }
                    }
                    Signal::Error => return Err(self.scan_error().into()),
                    _ => {}
                }
                pos += 1;
            }

            let scanned = pos - self.scan_pos;
            let read = self.refill()?;
            pos = self.scan_pos + scanned;
            if read == 0 {
                // End of input; resolve the delayed end detection
                if self.scan.replay(b' ') == Signal::End {
                    return Ok(Some(pos - self.scan_pos));
                }
                if self.buf[self.scan_pos..].iter().any(|&c| !is_space(c)) {
                    return Err(SyntaxError::UnexpectedEndOfInput {
                        offset: self.scan.bytes_consumed(),
                    }
                    .into());
                }
                return Ok(None);
            }
        }
    }

    /// Reads and formats the next value
    ///
    /// Returns `None` at a clean end of input (only whitespace left), and
    /// after any previously returned error. The returned bytes are the
    /// re-indented value followed by one `\n`.
    pub fn next_value(&mut self) -> Option<Result<Vec<u8>, FormatError>> {
        if self.failed {
            return None;
        }
        let n = match self.read_value() {
            Ok(Some(n)) => n,
            Ok(None) => return None,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };
        let start = self.scan_pos;
        self.scan_pos += n;

        self.scratch.clear();
        if let Err(e) = self.formatter.indent(
            &mut self.scratch,
            &self.buf[start..start + n],
            &self.prefix,
            &self.indent,
        ) {
            self.failed = true;
            return Some(Err(e.into()));
        }
        self.scratch.push(b'\n');
        Some(Ok(self.scratch.clone()))
    }

    /// Formats all remaining values into `dst`
    ///
    /// Returns the total number of bytes written. Output written before an
    /// error is detected remains in the sink.
    pub fn format_all<W: Write>(&mut self, dst: &mut W) -> Result<u64, FormatError> {
        let mut total = 0;
        while let Some(value) = self.next_value() {
            let value = value?;
            dst.write_all(&value)?;
            total += value.len() as u64;
        }
        Ok(total)
    }
}

impl<R: Read> Iterator for Session<R> {
    type Item = Result<Vec<u8>, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_value()
    }
}
