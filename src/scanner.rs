//! Module for incrementally recognizing JSON data
//!
//! [`JsonScanner`] is a byte-at-a-time state machine over the full JSON grammar.
//! Callers feed it one byte at a time via [`JsonScanner::step`] and receive a
//! [`Signal`] describing what that byte means in context, so they can follow
//! along without building a document tree. The scanner performs no lookahead
//! and never backtracks; see [`Signal::End`] for the one place where a result
//! is deliberately reported one byte late.

use thiserror::Error;

/// Maximum nesting depth of arrays and objects the scanner accepts
///
/// Inputs nested deeper than this are rejected with a syntax error
/// ([`SyntaxErrorKind::ExceededMaxDepth`]) instead of growing the parse
/// stack without bound. Limiting the depth is permitted by
/// [RFC 8259, section 9](https://www.rfc-editor.org/rfc/rfc8259.html#section-9).
pub const MAX_NESTING_DEPTH: usize = 10_000;

/// Classification the scanner assigns to a single input byte
///
/// It is okay to ignore the signal of any particular [`JsonScanner::step`]
/// call: if one call returns [`Signal::Error`], every subsequent call will
/// return `Error` too.
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum Signal {
    /// Uninteresting byte inside a literal, string or number
    Continue,
    /// First byte of a string, number, `true`, `false` or `null`;
    /// the end of the token is implied by the next signal != `Continue`
    BeginLiteral,
    /// Begin object: `{`
    BeginObject,
    /// Just finished an object key (the byte is the `:`)
    ObjectKey,
    /// Just finished a non-last object value (the byte is the `,`)
    ObjectValue,
    /// End object: `}`
    EndObject,
    /// Begin array: `[`
    BeginArray,
    /// Just finished a non-last array value (the byte is the `,`)
    ArrayValue,
    /// End array: `]`
    EndArray,
    /// Whitespace byte; can be skipped
    SkipSpace,
    /// The top-level value ended *before* this byte
    ///
    /// The indication must be delayed by one byte in order to recognize the
    /// end of numbers: is `123` a whole value or the beginning of `12345e+6`?
    /// Use [`JsonScanner::end_of_input`] to resolve the delayed signal once
    /// no further bytes are coming.
    End,
    /// A syntax error was hit; the error is available from [`JsonScanner::error`]
    Error,
}

/// One entry on the nesting stack
///
/// Records what the enclosing composite value expects next. If the scanner is
/// inside a nested value the frames describe the nesting, outermost at index 0.
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum ParseFrame {
    /// Parsing an object key (before the colon)
    ObjectKey,
    /// Parsing an object value (after the colon)
    ObjectValue,
    /// Parsing an array value
    ArrayValue,
}

/// Kind of a [`SyntaxError`], naming the grammar position where the offending
/// byte was encountered
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
#[allow(missing_docs)]
pub enum SyntaxErrorKind {
    #[strum(serialize = "looking for beginning of value")]
    ExpectingValue,
    #[strum(serialize = "looking for beginning of object key string")]
    ExpectingObjectKey,
    #[strum(serialize = "after object key")]
    AfterObjectKey,
    #[strum(serialize = "after object key:value pair")]
    AfterObjectValue,
    #[strum(serialize = "after array element")]
    AfterArrayValue,
    #[strum(serialize = "after top-level value")]
    AfterTopLevelValue,
    #[strum(serialize = "in string literal")]
    InString,
    #[strum(serialize = "in string escape code")]
    InStringEscape,
    #[strum(serialize = "in \\u hexadecimal character escape")]
    InUnicodeEscape,
    #[strum(serialize = "in numeric literal")]
    InNumber,
    #[strum(serialize = "after decimal point in numeric literal")]
    AfterDecimalPoint,
    #[strum(serialize = "in exponent of numeric literal")]
    InExponent,
    #[strum(serialize = "in literal true")]
    InLiteralTrue,
    #[strum(serialize = "in literal false")]
    InLiteralFalse,
    #[strum(serialize = "in literal null")]
    InLiteralNull,
    #[strum(serialize = "exceeded max depth")]
    ExceededMaxDepth,
}

/// Formats a byte as a quoted character literal for error messages
fn quote_byte(b: u8) -> String {
    format!("'{}'", std::ascii::escape_default(b))
}

/// A description of a JSON syntax error
///
/// The offset is the absolute number of bytes the scanner had consumed when
/// the violation occurred, which makes it the position of the first offending
/// byte (counting from 1) respectively the position after the last consumed
/// byte for [`SyntaxError::UnexpectedEndOfInput`].
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum SyntaxError {
    /// A byte violated the JSON grammar
    #[error("invalid character {} {} at offset {}", quote_byte(*.byte), .kind, .offset)]
    InvalidByte {
        /// The offending byte
        byte: u8,
        /// Grammar position where the byte was encountered
        kind: SyntaxErrorKind,
        /// Number of bytes consumed up to and including the offending byte
        offset: u64,
    },
    /// The input ended while a value was still structurally incomplete
    #[error("unexpected end of JSON input at offset {offset}")]
    UnexpectedEndOfInput {
        /// Number of bytes consumed when the input ended
        offset: u64,
    },
}

impl SyntaxError {
    /// Byte offset at which the error occurred
    pub fn offset(&self) -> u64 {
        match self {
            SyntaxError::InvalidByte { offset, .. } => *offset,
            SyntaxError::UnexpectedEndOfInput { offset } => *offset,
        }
    }
}

/// The literal currently being matched letter by letter
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum Literal {
    True,
    False,
    Null,
}

impl Literal {
    fn bytes(self) -> &'static [u8] {
        match self {
            Literal::True => b"true",
            Literal::False => b"false",
            Literal::Null => b"null",
        }
    }

    fn error_kind(self) -> SyntaxErrorKind {
        match self {
            Literal::True => SyntaxErrorKind::InLiteralTrue,
            Literal::False => SyntaxErrorKind::InLiteralFalse,
            Literal::Null => SyntaxErrorKind::InLiteralNull,
        }
    }
}

/// Grammar position the scanner is currently in
///
/// Each variant corresponds to one of the named positions of the JSON grammar,
/// for example `BeginStringOrEmpty` is the position right after reading `{`.
/// `UnicodeEscape` carries the number of hex digits already consumed and
/// `Literal` the number of letters already matched.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
enum State {
    /// At the beginning of the input, or where a value is expected
    BeginValue,
    /// After reading `[`
    BeginValueOrEmpty,
    /// After reading `{"key": value,`
    BeginString,
    /// After reading `{`
    BeginStringOrEmpty,
    /// After completing a value, such as after reading `{}` or `true` or `["x"`
    EndValue,
    /// After finishing the top-level value; only space characters may follow
    EndTop,
    /// After reading `"`
    InString,
    /// After reading `"\` during a quoted string
    InStringEscape,
    /// After reading `"\u` plus the given number of hex digits
    UnicodeEscape(u8),
    /// After reading `-` during a number
    Neg,
    /// After reading `0`, or after the digits of an integer part
    Zero,
    /// After reading a non-zero digit, such as after `1` or `100` but not `0`
    Digits,
    /// After reading the decimal point, such as after `1.`
    Dot,
    /// After reading digits following the decimal point, such as after `3.14`
    DotDigits,
    /// After reading the mantissa and `e`, such as after `314e`
    Exp,
    /// After reading the mantissa, `e` and sign, such as after `314e-`
    ExpSign,
    /// After reading at least one exponent digit, such as after `314e-2`
    ExpDigits,
    /// Matching `true`, `false` or `null` with the given number of letters consumed
    Literal(Literal, u8),
    /// After a syntax error, such as after reading `[1}` or `5.1.2`
    Error,
}

/// The four whitespace bytes JSON permits between tokens
pub(crate) fn is_space(c: u8) -> bool {
    matches!(c, b' ' | b'\t' | b'\r' | b'\n')
}

fn is_hex_digit(c: u8) -> bool {
    c.is_ascii_hexdigit()
}

/// A JSON scanning state machine
///
/// Callers pass bytes in one at a time by calling [`step`](Self::step) for each
/// byte and follow along using the returned [`Signal`]s. Once the end of the
/// input is reached, [`end_of_input`](Self::end_of_input) must be called to
/// resolve the delayed end-of-value detection (see [`Signal::End`]).
///
/// A scanner can be reused for independent inputs via [`reset`](Self::reset).
/// Note that `reset` deliberately does not zero [`bytes_consumed`](Self::bytes_consumed),
/// so that a caller scanning multiple values out of one stream gets absolute
/// offsets in errors; use a fresh scanner (or [`JsonScanner::new`]) when a
/// zeroed counter is needed.
#[derive(Clone, Debug)]
pub struct JsonScanner {
    state: State,
    /// What we're in the middle of: array values, object keys, object values.
    /// Outermost at index 0.
    stack: Vec<ParseFrame>,
    /// Error that happened, if any; sticky until [`reset`](Self::reset)
    error: Option<SyntaxError>,
    /// Reached end of top-level value
    end_top: bool,
    /// Total bytes consumed; deliberately not cleared by [`reset`](Self::reset)
    pub(crate) bytes_consumed: u64,
}

impl Default for JsonScanner {
    fn default() -> Self {
        JsonScanner::new()
    }
}

impl JsonScanner {
    /// Creates a scanner positioned at the beginning of a value, with a zeroed
    /// byte counter
    pub fn new() -> Self {
        JsonScanner {
            state: State::BeginValue,
            stack: Vec::new(),
            error: None,
            end_top: false,
            bytes_consumed: 0,
        }
    }

    /// Prepares the scanner for scanning a new value
    ///
    /// Clears the grammar position, the nesting stack, any sticky error and the
    /// end-of-top-level flag. The byte counter is kept, see the struct docs.
    pub fn reset(&mut self) {
        self.state = State::BeginValue;
        self.stack.clear();
        self.error = None;
        self.end_top = false;
    }

    /// Advances the state machine by exactly one input byte
    pub fn step(&mut self, c: u8) -> Signal {
        self.bytes_consumed += 1;
        self.dispatch(c)
    }

    /// Dispatches a byte without counting it
    ///
    /// Used by callers which re-feed a byte that was already counted, such as
    /// the synthetic-space probe of the session after a container close.
    pub(crate) fn replay(&mut self, c: u8) -> Signal {
        self.dispatch(c)
    }

    /// Tells the scanner that the end of input has been reached
    ///
    /// Returns [`Signal::End`] if a complete top-level value was consumed.
    /// If a value is still pending, a synthetic whitespace byte is fed to
    /// resolve the delayed end detection; if the value remains incomplete,
    /// a [`SyntaxError::UnexpectedEndOfInput`] is recorded and
    /// [`Signal::Error`] is returned.
    pub fn end_of_input(&mut self) -> Signal {
        if self.error.is_some() {
            return Signal::Error;
        }
        if self.end_top {
            return Signal::End;
        }
        self.dispatch(b' ');
        if self.end_top {
            return Signal::End;
        }
        if self.error.is_none() {
            self.error = Some(SyntaxError::UnexpectedEndOfInput {
                offset: self.bytes_consumed,
            });
        }
        Signal::Error
    }

    /// The error that stopped the scan, if any
    pub fn error(&self) -> Option<&SyntaxError> {
        self.error.as_ref()
    }

    /// Whether the single top-level value has been fully recognized
    pub fn has_ended(&self) -> bool {
        self.end_top
    }

    /// Total number of bytes consumed so far
    ///
    /// Not cleared by [`reset`](Self::reset), so offsets stay absolute when
    /// scanning several values out of one input stream.
    pub fn bytes_consumed(&self) -> u64 {
        self.bytes_consumed
    }

    /// Current nesting depth (number of open arrays and objects)
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The innermost parse frame, or `None` at top level
    pub fn current_frame(&self) -> Option<ParseFrame> {
        self.stack.last().copied()
    }

    /// Whether the scanner sits at the beginning of a value with nothing
    /// consumed since the last reset apart from whitespace
    pub(crate) fn at_value_start(&self) -> bool {
        self.state == State::BeginValue
            && self.stack.is_empty()
            && self.error.is_none()
            && !self.end_top
    }
}

// State transitions. Each method corresponds to one grammar position; they may
// call each other directly to process a byte in a follow-up position without
// counting it again.
impl JsonScanner {
    fn dispatch(&mut self, c: u8) -> Signal {
        match self.state {
            State::BeginValue => self.begin_value(c),
            State::BeginValueOrEmpty => self.begin_value_or_empty(c),
            State::BeginString => self.begin_string(c),
            State::BeginStringOrEmpty => self.begin_string_or_empty(c),
            State::EndValue => self.end_value(c),
            State::EndTop => self.end_top(c),
            State::InString => self.in_string(c),
            State::InStringEscape => self.in_string_escape(c),
            State::UnicodeEscape(digits) => self.unicode_escape(c, digits),
            State::Neg => self.neg(c),
            State::Zero => self.zero(c),
            State::Digits => self.digits(c),
            State::Dot => self.dot(c),
            State::DotDigits => self.dot_digits(c),
            State::Exp => self.exp(c),
            State::ExpSign => self.exp_sign(c),
            State::ExpDigits => self.exp_digits(c),
            State::Literal(literal, pos) => self.literal(c, literal, pos),
            State::Error => Signal::Error,
        }
    }

    /// Records an error and switches to the error state
    fn fail(&mut self, c: u8, kind: SyntaxErrorKind) -> Signal {
        self.state = State::Error;
        self.error = Some(SyntaxError::InvalidByte {
            byte: c,
            kind,
            offset: self.bytes_consumed,
        });
        Signal::Error
    }

    /// Pushes a new frame onto the parse stack
    ///
    /// Returns `success` unless [`MAX_NESTING_DEPTH`] was exceeded, in which
    /// case the over-limit frame is reported as a syntax error.
    fn push_frame(&mut self, c: u8, frame: ParseFrame, success: Signal) -> Signal {
        self.stack.push(frame);
        if self.stack.len() <= MAX_NESTING_DEPTH {
            return success;
        }
        self.fail(c, SyntaxErrorKind::ExceededMaxDepth)
    }

    /// Pops the innermost frame off the stack and updates the state accordingly
    fn pop_frame(&mut self) {
        self.stack.pop();
        if self.stack.is_empty() {
            self.state = State::EndTop;
            self.end_top = true;
        } else {
            self.state = State::EndValue;
        }
    }

    fn begin_value(&mut self, c: u8) -> Signal {
        if is_space(c) {
            return Signal::SkipSpace;
        }
        match c {
            b'{' => {
                self.state = State::BeginStringOrEmpty;
                self.push_frame(c, ParseFrame::ObjectKey, Signal::BeginObject)
            }
            b'[' => {
                self.state = State::BeginValueOrEmpty;
                self.push_frame(c, ParseFrame::ArrayValue, Signal::BeginArray)
            }
            b'"' => {
                self.state = State::InString;
                Signal::BeginLiteral
            }
            b'-' => {
                self.state = State::Neg;
                Signal::BeginLiteral
            }
            // beginning of 0.123
            b'0' => {
                self.state = State::Zero;
                Signal::BeginLiteral
            }
            // beginning of 1234.5
            b'1'..=b'9' => {
                self.state = State::Digits;
                Signal::BeginLiteral
            }
            b't' => {
                self.state = State::Literal(Literal::True, 1);
                Signal::BeginLiteral
            }
            b'f' => {
                self.state = State::Literal(Literal::False, 1);
                Signal::BeginLiteral
            }
            b'n' => {
                self.state = State::Literal(Literal::Null, 1);
                Signal::BeginLiteral
            }
            _ => self.fail(c, SyntaxErrorKind::ExpectingValue),
        }
    }

    fn begin_value_or_empty(&mut self, c: u8) -> Signal {
        if is_space(c) {
            return Signal::SkipSpace;
        }
        if c == b']' {
            return self.end_value(c);
        }
        self.begin_value(c)
    }

    fn begin_string(&mut self, c: u8) -> Signal {
        if is_space(c) {
            return Signal::SkipSpace;
        }
        if c == b'"' {
            self.state = State::InString;
            return Signal::BeginLiteral;
        }
        self.fail(c, SyntaxErrorKind::ExpectingObjectKey)
    }

    fn begin_string_or_empty(&mut self, c: u8) -> Signal {
        if is_space(c) {
            return Signal::SkipSpace;
        }
        if c == b'}' {
            // An empty object ends like an object whose last value was just
            // completed, so flip the frame before delegating
            let top = self.stack.len() - 1;
            self.stack[top] = ParseFrame::ObjectValue;
            return self.end_value(c);
        }
        self.begin_string(c)
    }

    fn end_value(&mut self, c: u8) -> Signal {
        let Some(&frame) = self.stack.last() else {
            // Completed the top-level value before the current byte
            self.state = State::EndTop;
            self.end_top = true;
            return self.end_top(c);
        };
        if is_space(c) {
            self.state = State::EndValue;
            return Signal::SkipSpace;
        }
        let top = self.stack.len() - 1;
        match frame {
            ParseFrame::ObjectKey => {
                if c == b':' {
                    self.stack[top] = ParseFrame::ObjectValue;
                    self.state = State::BeginValue;
                    return Signal::ObjectKey;
                }
                self.fail(c, SyntaxErrorKind::AfterObjectKey)
            }
            ParseFrame::ObjectValue => {
                if c == b',' {
                    self.stack[top] = ParseFrame::ObjectKey;
                    self.state = State::BeginString;
                    return Signal::ObjectValue;
                }
                if c == b'}' {
                    self.pop_frame();
                    return Signal::EndObject;
                }
                self.fail(c, SyntaxErrorKind::AfterObjectValue)
            }
            ParseFrame::ArrayValue => {
                if c == b',' {
                    self.state = State::BeginValue;
                    return Signal::ArrayValue;
                }
                if c == b']' {
                    self.pop_frame();
                    return Signal::EndArray;
                }
                self.fail(c, SyntaxErrorKind::AfterArrayValue)
            }
        }
    }

    fn end_top(&mut self, c: u8) -> Signal {
        if !is_space(c) {
            // Complain about the non-space byte on the next call
            self.fail(c, SyntaxErrorKind::AfterTopLevelValue);
        }
        Signal::End
    }

    fn in_string(&mut self, c: u8) -> Signal {
        match c {
            b'"' => {
                self.state = State::EndValue;
                Signal::Continue
            }
            b'\\' => {
                self.state = State::InStringEscape;
                Signal::Continue
            }
            0x00..=0x1F => self.fail(c, SyntaxErrorKind::InString),
            _ => Signal::Continue,
        }
    }

    fn in_string_escape(&mut self, c: u8) -> Signal {
        match c {
            b'b' | b'f' | b'n' | b'r' | b't' | b'\\' | b'/' | b'"' => {
                self.state = State::InString;
                Signal::Continue
            }
            b'u' => {
                self.state = State::UnicodeEscape(0);
                Signal::Continue
            }
            _ => self.fail(c, SyntaxErrorKind::InStringEscape),
        }
    }

    fn unicode_escape(&mut self, c: u8, digits: u8) -> Signal {
        if is_hex_digit(c) {
            self.state = if digits == 3 {
                State::InString
            } else {
                State::UnicodeEscape(digits + 1)
            };
            return Signal::Continue;
        }
        self.fail(c, SyntaxErrorKind::InUnicodeEscape)
    }

    fn neg(&mut self, c: u8) -> Signal {
        match c {
            b'0' => {
                self.state = State::Zero;
                Signal::Continue
            }
            b'1'..=b'9' => {
                self.state = State::Digits;
                Signal::Continue
            }
            _ => self.fail(c, SyntaxErrorKind::InNumber),
        }
    }

    fn digits(&mut self, c: u8) -> Signal {
        if c.is_ascii_digit() {
            return Signal::Continue;
        }
        self.zero(c)
    }

    fn zero(&mut self, c: u8) -> Signal {
        match c {
            b'.' => {
                self.state = State::Dot;
                Signal::Continue
            }
            b'e' | b'E' => {
                self.state = State::Exp;
                Signal::Continue
            }
            _ => self.end_value(c),
        }
    }

    fn dot(&mut self, c: u8) -> Signal {
        if c.is_ascii_digit() {
            self.state = State::DotDigits;
            return Signal::Continue;
        }
        self.fail(c, SyntaxErrorKind::AfterDecimalPoint)
    }

    fn dot_digits(&mut self, c: u8) -> Signal {
        if c.is_ascii_digit() {
            return Signal::Continue;
        }
        if c == b'e' || c == b'E' {
            self.state = State::Exp;
            return Signal::Continue;
        }
        self.end_value(c)
    }

    fn exp(&mut self, c: u8) -> Signal {
        if c == b'+' || c == b'-' {
            self.state = State::ExpSign;
            return Signal::Continue;
        }
        self.exp_sign(c)
    }

    fn exp_sign(&mut self, c: u8) -> Signal {
        if c.is_ascii_digit() {
            self.state = State::ExpDigits;
            return Signal::Continue;
        }
        self.fail(c, SyntaxErrorKind::InExponent)
    }

    fn exp_digits(&mut self, c: u8) -> Signal {
        if c.is_ascii_digit() {
            return Signal::Continue;
        }
        self.end_value(c)
    }

    fn literal(&mut self, c: u8, literal: Literal, pos: u8) -> Signal {
        let bytes = literal.bytes();
        if c != bytes[pos as usize] {
            return self.fail(c, literal.error_kind());
        }
        self.state = if pos as usize == bytes.len() - 1 {
            State::EndValue
        } else {
            State::Literal(literal, pos + 1)
        };
        Signal::Continue
    }
}

/// Verifies that `data` is a single valid JSON value
///
/// On failure the returned error carries the exact offset of the first
/// offending byte.
pub fn check_valid(data: &[u8]) -> Result<(), SyntaxError> {
    let mut scan = JsonScanner::new();
    for &c in data {
        if scan.step(c) == Signal::Error {
            break;
        }
    }
    match scan.end_of_input() {
        Signal::Error => Err(scan
            .error()
            .cloned()
            .unwrap_or(SyntaxError::UnexpectedEndOfInput {
                offset: scan.bytes_consumed(),
            })),
        _ => Ok(()),
    }
}

/// Reports whether `data` is a single valid JSON value
pub fn valid(data: &[u8]) -> bool {
    check_valid(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_signals(json: &str) -> (Vec<Signal>, Signal) {
        let mut scan = JsonScanner::new();
        let signals = json.bytes().map(|c| scan.step(c)).collect();
        (signals, scan.end_of_input())
    }

    #[test]
    fn valid_documents() {
        for json in [
            "null",
            "true",
            "false",
            "0",
            "-0",
            "123",
            "-123.456e+789",
            "0.5E2",
            r#""""#,
            r#""a\"b\\c\/d\b\f\n\r\t""#,
            r#""A뻯뻯""#,
            "[]",
            "{}",
            "[[[[[]]]]]",
            r#"{"a":1,"b":[true,false,null],"c":{"d":"e"}}"#,
            " \t\r\n [ 1 , 2 ] \n",
            r#"{ "a" : { } }"#,
        ] {
            assert!(valid(json.as_bytes()), "expected valid: {json}");
        }
    }

    #[test]
    fn invalid_documents_with_offsets() {
        // (input, expected message)
        let tests = [
            (
                "x",
                "invalid character 'x' looking for beginning of value at offset 1",
            ),
            (
                "{1:2}",
                "invalid character '1' looking for beginning of object key string at offset 2",
            ),
            (
                r#"{"a" 1}"#,
                "invalid character '1' after object key at offset 6",
            ),
            (
                r#"{"a":1 "b":2}"#,
                "invalid character '\\\"' after object key:value pair at offset 8",
            ),
            (
                "[1 2]",
                "invalid character '2' after array element at offset 4",
            ),
            ("[1}", "invalid character '}' after array element at offset 3"),
            (
                "123 x",
                "invalid character 'x' after top-level value at offset 5",
            ),
            (
                "\"a\tb\"",
                "invalid character '\\t' in string literal at offset 3",
            ),
            (
                r#""\x""#,
                "invalid character 'x' in string escape code at offset 3",
            ),
            (
                r#""\u12g4""#,
                "invalid character 'g' in \\u hexadecimal character escape at offset 6",
            ),
            ("-x", "invalid character 'x' in numeric literal at offset 2"),
            (
                "1.e5",
                "invalid character 'e' after decimal point in numeric literal at offset 3",
            ),
            (
                "1e+x",
                "invalid character 'x' in exponent of numeric literal at offset 4",
            ),
            ("tru0", "invalid character '0' in literal true at offset 4"),
            ("falze", "invalid character 'z' in literal false at offset 4"),
            ("nulo", "invalid character 'o' in literal null at offset 4"),
            // the second dot is treated as trailing data after the number 5.1
            (
                "5.1.2",
                "invalid character '.' after top-level value at offset 4",
            ),
        ];
        for (json, want) in tests {
            let err = check_valid(json.as_bytes()).expect_err(json);
            assert_eq!(want, err.to_string(), "for input: {json}");
        }
    }

    #[test]
    fn unexpected_end_of_input() {
        for json in ["", " ", "[", "[1,", "{", r#"{"a""#, r#"{"a":"#, "\"ab"] {
            let err = check_valid(json.as_bytes()).expect_err(json);
            assert_eq!(
                SyntaxError::UnexpectedEndOfInput {
                    offset: json.len() as u64
                },
                err,
                "for input: {json}"
            );
        }
    }

    #[test]
    fn end_of_input_inside_token() {
        // resolving the end of input feeds a synthetic space, so inputs
        // truncated in the middle of a token report it as the invalid byte
        let tests = [
            ("-", "invalid character ' ' in numeric literal at offset 1"),
            (
                "1e",
                "invalid character ' ' in exponent of numeric literal at offset 2",
            ),
            ("tru", "invalid character ' ' in literal true at offset 3"),
        ];
        for (json, want) in tests {
            let err = check_valid(json.as_bytes()).expect_err(json);
            assert_eq!(want, err.to_string(), "for input: {json}");
        }
    }

    #[test]
    fn number_end_implied_by_end_of_input() {
        // the boundary of these numbers is only implied by input exhaustion
        for json in ["1", "123", "-5", "1.5", "1e4", "1e+4", "0"] {
            assert!(valid(json.as_bytes()), "expected valid: {json}");
        }
    }

    #[test]
    fn delayed_end_signal() {
        // The end of the top-level value is reported one byte late: the signal
        // for the space reflects the value boundary before it
        let (signals, end) = scan_signals("123 ");
        assert_eq!(
            vec![
                Signal::BeginLiteral,
                Signal::Continue,
                Signal::Continue,
                Signal::End
            ],
            signals
        );
        assert_eq!(Signal::End, end);

        // Without a trailing byte the end is only resolved by end_of_input
        let (signals, end) = scan_signals("123");
        assert_eq!(
            vec![Signal::BeginLiteral, Signal::Continue, Signal::Continue],
            signals
        );
        assert_eq!(Signal::End, end);
    }

    #[test]
    fn signal_sequence_object() {
        let (signals, end) = scan_signals(r#"{"a":[1,2]}"#);
        assert_eq!(
            vec![
                Signal::BeginObject,  // {
                Signal::BeginLiteral, // "
                Signal::Continue,     // a
                Signal::Continue,     // "
                Signal::ObjectKey,    // :
                Signal::BeginArray,   // [
                Signal::BeginLiteral, // 1
                Signal::ArrayValue,   // ,
                Signal::BeginLiteral, // 2
                Signal::EndArray,     // ]
                Signal::EndObject,    // }
            ],
            signals
        );
        assert_eq!(Signal::End, end);
    }

    #[test]
    fn parse_frames() {
        let mut scan = JsonScanner::new();
        assert_eq!(None, scan.current_frame());
        for c in br#"{"a""#.iter() {
            scan.step(*c);
        }
        assert_eq!(Some(ParseFrame::ObjectKey), scan.current_frame());
        scan.step(b':');
        assert_eq!(Some(ParseFrame::ObjectValue), scan.current_frame());
        scan.step(b'[');
        assert_eq!(Some(ParseFrame::ArrayValue), scan.current_frame());
        assert_eq!(2, scan.depth());
    }

    #[test]
    fn max_depth_exceeded() {
        let input = vec![b'['; MAX_NESTING_DEPTH + 1];
        let err = check_valid(&input).expect_err("over-limit nesting");
        assert_eq!(
            SyntaxError::InvalidByte {
                byte: b'[',
                kind: SyntaxErrorKind::ExceededMaxDepth,
                offset: (MAX_NESTING_DEPTH + 1) as u64,
            },
            err
        );
        assert!(err.to_string().contains("exceeded max depth"));

        // exactly at the limit the input is merely incomplete, not too deep
        let input = vec![b'['; MAX_NESTING_DEPTH];
        assert_eq!(
            SyntaxError::UnexpectedEndOfInput {
                offset: MAX_NESTING_DEPTH as u64
            },
            check_valid(&input).expect_err("incomplete nesting")
        );
    }

    #[test]
    fn error_is_sticky() {
        let mut scan = JsonScanner::new();
        assert_eq!(Signal::Error, scan.step(b'x'));
        let err = scan.error().cloned().unwrap();
        // valid bytes after the error keep reporting the original error
        assert_eq!(Signal::Error, scan.step(b'1'));
        assert_eq!(Signal::Error, scan.end_of_input());
        assert_eq!(Some(&err), scan.error());

        // only reset clears it
        scan.reset();
        assert_eq!(None, scan.error());
        assert_eq!(Signal::BeginLiteral, scan.step(b'1'));
    }

    #[test]
    fn reset_keeps_byte_counter() {
        let mut scan = JsonScanner::new();
        for c in b"[1]" {
            scan.step(*c);
        }
        assert_eq!(3, scan.bytes_consumed());
        scan.reset();
        assert_eq!(3, scan.bytes_consumed());
        assert_eq!(false, scan.has_ended());
        assert_eq!(0, scan.depth());

        // offsets of follow-up errors are absolute
        assert_eq!(Signal::Error, scan.step(b'x'));
        assert_eq!(4, scan.error().unwrap().offset());
    }

    #[test]
    fn end_implies_empty_stack() {
        let mut scan = JsonScanner::new();
        for c in b"{\"a\":[1]} " {
            scan.step(*c);
        }
        assert_eq!(true, scan.has_ended());
        assert_eq!(0, scan.depth());
    }

    #[test]
    fn end_of_input_is_idempotent() {
        let mut scan = JsonScanner::new();
        for c in b"42" {
            scan.step(*c);
        }
        assert_eq!(Signal::End, scan.end_of_input());
        assert_eq!(Signal::End, scan.end_of_input());
    }
}
