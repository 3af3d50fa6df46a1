#![warn(missing_docs)]
#![forbid(unsafe_code)]
// Allow needless `return` because that makes it sometimes more obvious that
// an expression is the result of the function
#![allow(clippy::needless_return)]
// Allow `assert_eq!(true, ...)` because in some cases it is used to check a bool
// value and not a 'flag' / 'state', and `assert_eq!` makes that more explicit
#![allow(clippy::bool_assert_comparison)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]

//! Prettson re-serializes [RFC 8259](https://www.rfc-editor.org/rfc/rfc8259.html) JSON
//! into a normalized, human-readable form: consistent indentation and optional per-token
//! terminal colors, while preserving the semantic content of the input exactly.
//!
//! It is built for input far larger than memory: the JSON is never materialized as a
//! document tree. Instead a byte-driven scanner ([`scanner::JsonScanner`]) classifies
//! every input byte, and the formatting layers copy bytes through based on those
//! classifications, one top-level value at a time. It is *not* an object mapper and
//! does not expose parsed values; a dedicated library such as
//! [Serde](https://github.com/serde-rs/json) should be used for that.
//!
//! # Layers
//!
//! - [`scanner`]: the incremental grammar recognizer. Validates JSON and emits a
//!   [`Signal`](scanner::Signal) per byte; reports syntax errors at the exact
//!   offending byte offset.
//! - [`format`]: transcoders built on the scanner. [`Formatter`](format::Formatter)
//!   re-indents or compacts a whole in-memory buffer, or streams from any
//!   [`BufRead`](std::io::BufRead) source to a [`Write`](std::io::Write) sink with
//!   bounded memory.
//! - [`session`]: a multi-document reader. [`Session`](session::Session) extracts one
//!   complete top-level value at a time from a byte stream (values may be separated
//!   by any whitespace or by none at all) and yields each one formatted.
//! - [`color`]: abstract terminal colors and the [`ColorScheme`](color::ColorScheme)
//!   lookup used to annotate token classes. Terminal capability detection is out of
//!   scope; callers pass a pre-resolved scheme.
//!
//! # Usage examples
//!
//! ## Re-indenting a buffer
//!
//! ```
//! # use prettson::format::indent;
//! let mut out = Vec::new();
//! indent(&mut out, br#"{"a":1,"b":[true,null]}"#, "", "  ")?;
//! assert_eq!(
//!     "{\n  \"a\": 1,\n  \"b\": [\n    true,\n    null\n  ]\n}",
//!     String::from_utf8(out)?
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Formatting a stream of values
//!
//! ```
//! # use prettson::session::Session;
//! // In this example JSON data comes from a string;
//! // normally it would come from a file or a network connection
//! let json = "[1,2] [3,4]";
//! let mut session = Session::new(json.as_bytes());
//!
//! let mut out = Vec::new();
//! session.format_all(&mut out)?;
//! assert_eq!(
//!     "[\n    1,\n    2\n]\n[\n    3,\n    4\n]\n",
//!     String::from_utf8(out)?
//! );
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod color;
pub mod format;
pub mod scanner;
pub mod session;
