//! Module for terminal color selection
//!
//! Provides abstract [`Color`] identifiers which resolve to ANSI foreground
//! escape sequences, and the [`ColorScheme`] lookup table which maps JSON token
//! classes to colors. This module only *names* colors; deciding whether the
//! output device supports them (terminal detection, `NO_COLOR`, ...) is the
//! caller's job.

use crate::scanner::ParseFrame;

/// Escape sequence which restores the terminal's default attributes
pub const RESET: &str = "\x1b[0m";

/// An ANSI terminal foreground color
///
/// The first eight variants are the standard colors (SGR 30 to 37), the
/// `Bright*` variants are the high-intensity colors (SGR 90 to 97).
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
#[allow(missing_docs)]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
}

impl Color {
    /// The escape sequence which switches the terminal to this foreground color
    pub const fn escape(self) -> &'static str {
        match self {
            Color::Black => "\x1b[30m",
            Color::Red => "\x1b[31m",
            Color::Green => "\x1b[32m",
            Color::Yellow => "\x1b[33m",
            Color::Blue => "\x1b[34m",
            Color::Magenta => "\x1b[35m",
            Color::Cyan => "\x1b[36m",
            Color::White => "\x1b[37m",
            Color::BrightBlack => "\x1b[90m",
            Color::BrightRed => "\x1b[91m",
            Color::BrightGreen => "\x1b[92m",
            Color::BrightYellow => "\x1b[93m",
            Color::BrightBlue => "\x1b[94m",
            Color::BrightMagenta => "\x1b[95m",
            Color::BrightCyan => "\x1b[96m",
            Color::BrightWhite => "\x1b[97m",
        }
    }
}

/// Colors to apply per JSON token class
///
/// Every slot is optional; `None` means the corresponding tokens are emitted
/// without any escape sequence. The default scheme has every slot empty, so
/// formatting with it produces byte-identical output to the color-free
/// functions.
///
/// Distinguishing object keys from string values, and `true` from `false`,
/// requires context the tokens themselves don't carry; the formatting layers
/// supply it from the scanner's parse stack.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
pub struct ColorScheme {
    /// Color for the `null` literal
    pub null: Option<Color>,
    /// Color for the `false` literal
    pub bool_false: Option<Color>,
    /// Color for the `true` literal
    pub bool_true: Option<Color>,
    /// Color for object keys (including their quotes)
    pub key: Option<Color>,
    /// Color for string values (including their quotes)
    pub string: Option<Color>,
    /// Color for numbers
    pub number: Option<Color>,
    /// Color for the structural bytes `{` `}` `[` `]` `:` `,`
    pub punctuation: Option<Color>,
}

impl ColorScheme {
    /// The default colored scheme
    pub const fn colored() -> Self {
        ColorScheme {
            null: Some(Color::Yellow),
            bool_false: Some(Color::Yellow),
            bool_true: Some(Color::Yellow),
            key: Some(Color::Blue),
            string: Some(Color::Green),
            number: Some(Color::Magenta),
            punctuation: Some(Color::Yellow),
        }
    }

    /// A scheme mimicking the default colors of the `jq` tool
    pub const fn jq() -> Self {
        ColorScheme {
            null: Some(Color::BrightBlack),
            bool_false: Some(Color::BrightWhite),
            bool_true: Some(Color::BrightWhite),
            key: Some(Color::Blue),
            string: Some(Color::Green),
            number: Some(Color::White),
            punctuation: Some(Color::White),
        }
    }

    /// Whether no slot is set at all
    pub fn is_plain(&self) -> bool {
        *self == ColorScheme::default()
    }

    /// Picks the color for a literal, given the enclosing parse frame and the
    /// literal's first byte
    ///
    /// Object keys always get the key color. For values the first byte is
    /// enough to classify the token (`"` string, `n` null, `t`/`f` boolean,
    /// anything else a number). Top-level literals have no enclosing frame
    /// and get no color.
    pub(crate) fn literal_color(&self, frame: Option<ParseFrame>, first_byte: u8) -> Option<Color> {
        match frame? {
            ParseFrame::ObjectKey => self.key,
            ParseFrame::ObjectValue | ParseFrame::ArrayValue => match first_byte {
                b'"' => self.string,
                b'n' => self.null,
                b't' => self.bool_true,
                b'f' => self.bool_false,
                _ => self.number,
            },
        }
    }
}
