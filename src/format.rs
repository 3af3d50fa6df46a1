//! Module for transcoding JSON into normalized output
//!
//! [`Formatter`] copies JSON bytes from a source to a destination while
//! normalizing the whitespace between tokens and optionally wrapping tokens in
//! terminal color escapes. Two families of methods exist:
//!
//! - whole-buffer: [`Formatter::indent`] and [`Formatter::compact`] transcode
//!   a complete in-memory value into a `Vec<u8>`; on a syntax error the
//!   destination is rolled back to its original length.
//! - streaming: [`Formatter::indent_stream`] and [`Formatter::compact_stream`]
//!   transcode from any [`BufRead`] source to a [`Write`] sink with memory
//!   bounded by the reader's buffer, and accept multiple concatenated
//!   top-level values. Output already emitted when an error is detected is
//!   *not* rolled back; the sink is flushed before the error is returned.
//!
//! The free functions [`compact`] and [`indent`] are shorthands for a
//! formatter without colors.

use std::io::{BufRead, ErrorKind, Write};

use thiserror::Error;

use crate::color::{Color, ColorScheme, RESET};
use crate::scanner::{JsonScanner, Signal, SyntaxError};

/// Error of the streaming transcoders and the session
#[derive(Error, Debug)]
pub enum FormatError {
    /// The input violated the JSON grammar
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    /// Reading from the source or writing to the sink failed
    ///
    /// The underlying error is propagated verbatim.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Maps an indent width in spaces to the indent unit string
///
/// A width of 8 becomes a single tab, every other width that many spaces.
pub fn indent_unit(width: usize) -> String {
    if width == 8 {
        return "\t".to_owned();
    }
    " ".repeat(width)
}

/// Writes `src` to `dst` with insignificant whitespace removed
///
/// Shorthand for [`Formatter::compact`] without colors. On error nothing is
/// appended to `dst`.
pub fn compact(dst: &mut Vec<u8>, src: &[u8]) -> Result<(), SyntaxError> {
    Formatter::default().compact(dst, src)
}

/// Writes `src` to `dst` re-indented
///
/// Shorthand for [`Formatter::indent`] without colors. On error nothing is
/// appended to `dst`.
pub fn indent(dst: &mut Vec<u8>, src: &[u8], prefix: &str, indent: &str) -> Result<(), SyntaxError> {
    Formatter::default().indent(dst, src, prefix, indent)
}

fn push_color(dst: &mut Vec<u8>, color: Option<Color>) {
    if let Some(color) = color {
        dst.extend_from_slice(color.escape().as_bytes());
    }
}

fn push_reset(dst: &mut Vec<u8>, color: Option<Color>) {
    if color.is_some() {
        dst.extend_from_slice(RESET.as_bytes());
    }
}

fn push_colored_byte(dst: &mut Vec<u8>, color: Option<Color>, c: u8) {
    push_color(dst, color);
    dst.push(c);
    push_reset(dst, color);
}

fn push_newline(dst: &mut Vec<u8>, prefix: &str, indent: &str, depth: usize) {
    dst.push(b'\n');
    dst.extend_from_slice(prefix.as_bytes());
    for _ in 0..depth {
        dst.extend_from_slice(indent.as_bytes());
    }
}

fn write_color<W: Write>(dst: &mut W, color: Option<Color>) -> std::io::Result<()> {
    if let Some(color) = color {
        dst.write_all(color.escape().as_bytes())?;
    }
    Ok(())
}

fn write_reset<W: Write>(dst: &mut W, color: Option<Color>) -> std::io::Result<()> {
    if color.is_some() {
        dst.write_all(RESET.as_bytes())?;
    }
    Ok(())
}

fn write_colored_byte<W: Write>(dst: &mut W, color: Option<Color>, c: u8) -> std::io::Result<()> {
    write_color(dst, color)?;
    dst.write_all(&[c])?;
    write_reset(dst, color)
}

fn write_newline<W: Write>(
    dst: &mut W,
    prefix: &str,
    indent: &str,
    depth: usize,
) -> std::io::Result<()> {
    dst.write_all(b"\n")?;
    dst.write_all(prefix.as_bytes())?;
    for _ in 0..depth {
        dst.write_all(indent.as_bytes())?;
    }
    Ok(())
}

/// Reads a single byte, retrying interrupted reads; `None` at end of input
fn read_byte<R: BufRead>(src: &mut R) -> std::io::Result<Option<u8>> {
    loop {
        match src.fill_buf() {
            Ok([]) => return Ok(None),
            Ok(buf) => {
                let c = buf[0];
                src.consume(1);
                return Ok(Some(c));
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
}

/// The error that stopped a scan
fn scan_error(scan: &JsonScanner) -> SyntaxError {
    scan.error()
        .cloned()
        .unwrap_or(SyntaxError::UnexpectedEndOfInput {
            offset: scan.bytes_consumed(),
        })
}

/// A JSON transcoder with a fixed color scheme
///
/// A `Formatter` is cheap to create and holds no per-call state; one instance
/// can transcode any number of inputs, also concurrently.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct Formatter {
    scheme: ColorScheme,
}

impl Formatter {
    /// Creates a formatter which colors tokens according to `scheme`
    ///
    /// [`Formatter::default()`] creates one without any colors.
    pub fn new(scheme: ColorScheme) -> Self {
        Formatter { scheme }
    }

    /// The color scheme this formatter applies
    pub fn scheme(&self) -> &ColorScheme {
        &self.scheme
    }

    /// Appends `src` to `dst` with insignificant whitespace removed
    ///
    /// `src` must hold one complete top-level value; trailing whitespace is
    /// passed through. On error `dst` is truncated back to the length it had
    /// on entry.
    pub fn compact(&self, dst: &mut Vec<u8>, src: &[u8]) -> Result<(), SyntaxError> {
        let orig_len = dst.len();
        let mut scan = JsonScanner::new();

        let mut i = 0;
        while i < src.len() {
            let mut c = src[i];
            let mut sig = scan.step(c);
            if sig == Signal::SkipSpace {
                i += 1;
                continue;
            }
            if sig == Signal::Error {
                break;
            }
            if sig == Signal::BeginLiteral {
                let color = self.scheme.literal_color(scan.current_frame(), c);
                let start = i;
                i += 1;
                while i < src.len() {
                    c = src[i];
                    sig = scan.step(c);
                    if sig != Signal::Continue {
                        break;
                    }
                    i += 1;
                }
                push_color(dst, color);
                dst.extend_from_slice(&src[start..i]);
                push_reset(dst, color);
                if i >= src.len() {
                    break;
                }
                if sig == Signal::Error {
                    break;
                }
                if sig == Signal::SkipSpace {
                    i += 1;
                    continue;
                }
            }

            match c {
                b'{' | b'[' | b',' | b':' | b'}' | b']' => {
                    push_colored_byte(dst, self.scheme.punctuation, c);
                }
                _ => dst.push(c),
            }
            i += 1;
        }

        if scan.end_of_input() == Signal::Error {
            dst.truncate(orig_len);
            return Err(scan_error(&scan));
        }
        Ok(())
    }

    /// Appends `src` to `dst` re-indented
    ///
    /// Every line of the output starts with `prefix` followed by one copy of
    /// `indent` per nesting level. Empty objects and arrays stay on one line
    /// as `{}` and `[]`, a colon is followed by a single space, and each
    /// element or member starts on its own line. `src` must hold one complete
    /// top-level value; trailing whitespace is passed through. On error `dst`
    /// is truncated back to the length it had on entry.
    pub fn indent(
        &self,
        dst: &mut Vec<u8>,
        src: &[u8],
        prefix: &str,
        indent: &str,
    ) -> Result<(), SyntaxError> {
        let orig_len = dst.len();
        let mut scan = JsonScanner::new();
        let mut need_indent = false;
        let mut depth: usize = 0;

        let mut i = 0;
        while i < src.len() {
            let mut c = src[i];
            let mut sig = scan.step(c);
            if sig == Signal::SkipSpace {
                i += 1;
                continue;
            }
            if sig == Signal::Error {
                break;
            }
            if need_indent && sig != Signal::EndObject && sig != Signal::EndArray {
                need_indent = false;
                depth += 1;
                push_newline(dst, prefix, indent, depth);
            }
            if sig == Signal::BeginLiteral {
                let color = self.scheme.literal_color(scan.current_frame(), c);
                let start = i;
                i += 1;
                while i < src.len() {
                    c = src[i];
                    sig = scan.step(c);
                    if sig != Signal::Continue {
                        break;
                    }
                    i += 1;
                }
                push_color(dst, color);
                dst.extend_from_slice(&src[start..i]);
                push_reset(dst, color);
                if i >= src.len() {
                    break;
                }
                if sig == Signal::Error {
                    break;
                }
                if sig == Signal::SkipSpace {
                    i += 1;
                    continue;
                }
            }

            // Add spacing around real punctuation
            match c {
                b'{' | b'[' => {
                    // delay the indent so that empty objects and arrays
                    // come out as {} and []
                    need_indent = true;
                    push_colored_byte(dst, self.scheme.punctuation, c);
                }
                b',' => {
                    push_colored_byte(dst, self.scheme.punctuation, c);
                    push_newline(dst, prefix, indent, depth);
                }
                b':' => {
                    push_colored_byte(dst, self.scheme.punctuation, c);
                    dst.push(b' ');
                }
                b'}' | b']' => {
                    if need_indent {
                        // suppress the indent in empty objects and arrays
                        need_indent = false;
                    } else {
                        depth = depth.saturating_sub(1);
                        push_newline(dst, prefix, indent, depth);
                    }
                    push_colored_byte(dst, self.scheme.punctuation, c);
                }
                _ => dst.push(c),
            }
            i += 1;
        }

        if scan.end_of_input() == Signal::Error {
            dst.truncate(orig_len);
            return Err(scan_error(&scan));
        }
        Ok(())
    }

    /// Streams JSON from `src` to `dst` with insignificant whitespace removed
    ///
    /// `src` may hold any number of concatenated top-level values, separated
    /// by whitespace or by nothing at all; a single `\n` is written between
    /// them. The sink is flushed before returning, also on error; already
    /// emitted bytes are not rolled back.
    pub fn compact_stream<R: BufRead, W: Write>(
        &self,
        dst: &mut W,
        src: &mut R,
    ) -> Result<(), FormatError> {
        let mut scan = JsonScanner::new();
        let mut completed_value = false;
        let mut reached_eof = false;

        'outer: loop {
            let mut c = match read_byte(src) {
                Ok(Some(c)) => c,
                Ok(None) => break,
                // A read error coinciding with the expected end of the
                // stream is treated like a clean end
                Err(_) if scan.has_ended() || (completed_value && scan.at_value_start()) => break,
                Err(e) => {
                    dst.flush()?;
                    return Err(e.into());
                }
            };
            let mut sig = scan.step(c);
            if sig == Signal::SkipSpace {
                continue;
            }
            if sig == Signal::Error {
                break;
            }
            if sig == Signal::End && scan.has_ended() {
                completed_value = true;
                scan.bytes_consumed -= 1;
                scan.reset();
                dst.write_all(b"\n")?;
                sig = scan.step(c);
                if sig == Signal::SkipSpace {
                    continue;
                }
                if sig == Signal::Error {
                    break;
                }
            }
            while sig == Signal::BeginLiteral {
                let color = self.scheme.literal_color(scan.current_frame(), c);
                write_color(dst, color)?;
                dst.write_all(&[c])?;
                // Copy runs out of the reader's buffer instead of going
                // byte by byte
                loop {
                    let (stop, filled) = {
                        let buf = match src.fill_buf() {
                            Ok(b) => b,
                            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                            Err(e) => {
                                // close the color escape before bailing out
                                write_reset(dst, color)?;
                                dst.flush()?;
                                return Err(e.into());
                            }
                        };
                        if buf.is_empty() {
                            reached_eof = true;
                            break;
                        }
                        let mut stop = None;
                        for (idx, &b) in buf.iter().enumerate() {
                            sig = scan.step(b);
                            if sig != Signal::Continue {
                                stop = Some(idx);
                                c = b;
                                break;
                            }
                        }
                        match stop {
                            Some(idx) => dst.write_all(&buf[..idx])?,
                            None => dst.write_all(buf)?,
                        }
                        (stop, buf.len())
                    };
                    match stop {
                        Some(idx) => {
                            src.consume(idx + 1);
                            break;
                        }
                        None => src.consume(filled),
                    }
                }
                write_reset(dst, color)?;
                if reached_eof || sig == Signal::Error {
                    break 'outer;
                }
                if sig == Signal::End && scan.has_ended() {
                    completed_value = true;
                    scan.bytes_consumed -= 1;
                    scan.reset();
                    dst.write_all(b"\n")?;
                    sig = scan.step(c);
                    if sig == Signal::Error {
                        break 'outer;
                    }
                    if sig == Signal::SkipSpace {
                        continue 'outer;
                    }
                    continue;
                }
                if sig == Signal::SkipSpace {
                    continue 'outer;
                }
                break;
            }

            match c {
                b'{' | b'[' | b',' | b':' | b'}' | b']' => {
                    write_colored_byte(dst, self.scheme.punctuation, c)?;
                }
                _ => dst.write_all(&[c])?,
            }
        }

        dst.flush()?;
        if completed_value && scan.at_value_start() {
            // only whitespace was consumed since the last completed value
            return Ok(());
        }
        match scan.end_of_input() {
            Signal::Error => Err(scan_error(&scan).into()),
            _ => Ok(()),
        }
    }

    /// Streams JSON from `src` to `dst` re-indented
    ///
    /// Indentation follows the same rules as [`Formatter::indent`]. `src` may
    /// hold any number of concatenated top-level values, separated by
    /// whitespace or by nothing at all; a single `\n` is written between
    /// them. The sink is flushed before returning, also on error; already
    /// emitted bytes are not rolled back.
    pub fn indent_stream<R: BufRead, W: Write>(
        &self,
        dst: &mut W,
        src: &mut R,
        prefix: &str,
        indent: &str,
    ) -> Result<(), FormatError> {
        let mut scan = JsonScanner::new();
        let mut need_indent = false;
        let mut depth: usize = 0;
        let mut completed_value = false;
        let mut reached_eof = false;

        'outer: loop {
            let mut c = match read_byte(src) {
                Ok(Some(c)) => c,
                Ok(None) => break,
                // A read error coinciding with the expected end of the
                // stream is treated like a clean end
                Err(_) if scan.has_ended() || (completed_value && scan.at_value_start()) => break,
                Err(e) => {
                    dst.flush()?;
                    return Err(e.into());
                }
            };
            let mut sig = scan.step(c);
            if sig == Signal::SkipSpace {
                continue;
            }
            if sig == Signal::Error {
                break;
            }
            if sig == Signal::End && scan.has_ended() {
                completed_value = true;
                scan.bytes_consumed -= 1;
                scan.reset();
                dst.write_all(b"\n")?;
                sig = scan.step(c);
                if sig == Signal::SkipSpace {
                    continue;
                }
                if sig == Signal::Error {
                    break;
                }
            }
            if need_indent && sig != Signal::EndObject && sig != Signal::EndArray {
                need_indent = false;
                depth += 1;
                write_newline(dst, prefix, indent, depth)?;
            }
            while sig == Signal::BeginLiteral {
                let color = self.scheme.literal_color(scan.current_frame(), c);
                write_color(dst, color)?;
                dst.write_all(&[c])?;
                // Copy runs out of the reader's buffer instead of going
                // byte by byte
                loop {
                    let (stop, filled) = {
                        let buf = match src.fill_buf() {
                            Ok(b) => b,
                            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                            Err(e) => {
                                // close the color escape before bailing out
                                write_reset(dst, color)?;
                                dst.flush()?;
                                return Err(e.into());
                            }
                        };
                        if buf.is_empty() {
                            reached_eof = true;
                            break;
                        }
                        let mut stop = None;
                        for (idx, &b) in buf.iter().enumerate() {
                            sig = scan.step(b);
                            if sig != Signal::Continue {
                                stop = Some(idx);
                                c = b;
                                break;
                            }
                        }
                        match stop {
                            Some(idx) => dst.write_all(&buf[..idx])?,
                            None => dst.write_all(buf)?,
                        }
                        (stop, buf.len())
                    };
                    match stop {
                        Some(idx) => {
                            src.consume(idx + 1);
                            break;
                        }
                        None => src.consume(filled),
                    }
                }
                write_reset(dst, color)?;
                if reached_eof || sig == Signal::Error {
                    break 'outer;
                }
                if sig == Signal::End && scan.has_ended() {
                    completed_value = true;
                    scan.bytes_consumed -= 1;
                    scan.reset();
                    dst.write_all(b"\n")?;
                    sig = scan.step(c);
                    if sig == Signal::Error {
                        break 'outer;
                    }
                    if sig == Signal::SkipSpace {
                        continue 'outer;
                    }
                    continue;
                }
                if sig == Signal::SkipSpace {
                    continue 'outer;
                }
                break;
            }

            // Add spacing around real punctuation
            match c {
                b'{' | b'[' => {
                    // delay the indent so that empty objects and arrays
                    // come out as {} and []
                    need_indent = true;
                    write_colored_byte(dst, self.scheme.punctuation, c)?;
                }
                b',' => {
                    write_colored_byte(dst, self.scheme.punctuation, c)?;
                    write_newline(dst, prefix, indent, depth)?;
                }
                b':' => {
                    write_colored_byte(dst, self.scheme.punctuation, c)?;
                    dst.write_all(b" ")?;
                }
                b'}' | b']' => {
                    if need_indent {
                        // suppress the indent in empty objects and arrays
                        need_indent = false;
                    } else {
                        depth = depth.saturating_sub(1);
                        write_newline(dst, prefix, indent, depth)?;
                    }
                    write_colored_byte(dst, self.scheme.punctuation, c)?;
                }
                _ => dst.write_all(&[c])?,
            }
        }

        dst.flush()?;
        if completed_value && scan.at_value_start() {
            // only whitespace was consumed since the last completed value
            return Ok(());
        }
        match scan.end_of_input() {
            Signal::Error => Err(scan_error(&scan).into()),
            _ => Ok(()),
        }
    }
}
