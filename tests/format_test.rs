//! Integration tests for the whole-buffer and streaming transcoders

use std::io::{BufReader, Read, Write};

use prettson::color::ColorScheme;
use prettson::format::{compact, indent, FormatError, Formatter};
use prettson::scanner::SyntaxError;
use serde_json::json;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn indent_str(formatter: &Formatter, json: &[u8], prefix: &str, unit: &str) -> Result<String, SyntaxError> {
    let mut out = Vec::new();
    formatter.indent(&mut out, json, prefix, unit)?;
    Ok(String::from_utf8(out).unwrap())
}

/// JSON documents covering all value types, nesting and escapes
fn corpus() -> Vec<String> {
    [
        json!(null),
        json!(true),
        json!(-123.456e7),
        json!("a \"quoted\" string with \\ and \u{1F600}"),
        json!([]),
        json!({}),
        json!([1, [2, [3, [4, []]]]]),
        json!({"a": 1, "b": [true, false, null], "c": {"d": {"e": "f"}}}),
        json!([{"empty_object": {}}, {"empty_array": []}, "x", 0.5]),
    ]
    .iter()
    .map(|v| serde_json::to_string(v).unwrap())
    .collect()
}

#[test]
fn indent_matches_serde_json_pretty() -> TestResult {
    // serde_json's pretty printer follows the same layout rules
    // (two-space indent, colon plus space, empty containers on one line)
    for json in corpus() {
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let expected = serde_json::to_string_pretty(&value)?;

        let mut out = Vec::new();
        indent(&mut out, json.as_bytes(), "", "  ")?;
        assert_eq!(expected, String::from_utf8(out)?, "for input: {json}");
    }
    Ok(())
}

#[test]
fn compact_restores_serde_json_output() -> TestResult {
    for json in corpus() {
        let value: serde_json::Value = serde_json::from_str(&json)?;
        let pretty = serde_json::to_string_pretty(&value)?;

        let mut out = Vec::new();
        compact(&mut out, pretty.as_bytes())?;
        assert_eq!(json, String::from_utf8(out)?);
    }
    Ok(())
}

#[test]
fn stream_matches_whole_buffer() -> TestResult {
    let schemes = [
        ColorScheme::default(),
        ColorScheme::colored(),
        ColorScheme::jq(),
    ];
    let layouts = [("", "  "), ("", "\t"), (">>", "    "), ("p", "")];

    for json in corpus() {
        for scheme in schemes {
            let formatter = Formatter::new(scheme);
            for (prefix, unit) in layouts {
                let expected = indent_str(&formatter, json.as_bytes(), prefix, unit)?;
                let mut out = Vec::new();
                formatter.indent_stream(&mut out, &mut json.as_bytes(), prefix, unit)?;
                assert_eq!(expected, String::from_utf8(out)?, "for input: {json}");
            }

            let mut expected = Vec::new();
            formatter.compact(&mut expected, json.as_bytes())?;
            let mut out = Vec::new();
            formatter.compact_stream(&mut out, &mut json.as_bytes())?;
            assert_eq!(expected, out, "for input: {json}");
        }
    }
    Ok(())
}

#[test]
fn indent_is_idempotent() -> TestResult {
    for json in corpus() {
        let formatter = Formatter::default();
        let once = indent_str(&formatter, json.as_bytes(), "", "    ")?;
        let twice = indent_str(&formatter, once.as_bytes(), "", "    ")?;
        assert_eq!(once, twice);
    }
    Ok(())
}

#[test]
fn colored_output_strips_back_to_plain() -> TestResult {
    // removing the escape sequences from colored output must yield
    // exactly the plain output
    for json in corpus() {
        let plain = indent_str(&Formatter::default(), json.as_bytes(), "", "  ")?;
        let colored = indent_str(
            &Formatter::new(ColorScheme::colored()),
            json.as_bytes(),
            "",
            "  ",
        )?;

        let mut stripped = String::new();
        let mut rest = colored.as_str();
        while let Some(start) = rest.find('\u{1b}') {
            stripped.push_str(&rest[..start]);
            let after = &rest[start..];
            let end = after.find('m').expect("unterminated escape");
            rest = &after[end + 1..];
        }
        stripped.push_str(rest);
        assert_eq!(plain, stripped, "for input: {json}");
    }
    Ok(())
}

#[test]
fn stream_multiple_documents() -> TestResult {
    let docs = corpus();
    let joined = docs.join("\n");
    let expected: Vec<String> = docs
        .iter()
        .map(|json| indent_str(&Formatter::default(), json.as_bytes(), "", "  "))
        .collect::<Result<_, _>>()?;

    let mut out = Vec::new();
    Formatter::default().indent_stream(&mut out, &mut joined.as_bytes(), "", "  ")?;
    assert_eq!(expected.join("\n"), String::from_utf8(out)?);
    Ok(())
}

/// Reader yielding some valid bytes and then an error
struct FailingReader {
    data: &'static [u8],
    pos: usize,
}

impl Read for FailingReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.pos >= self.data.len() {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "reader broke"));
        }
        let n = (self.data.len() - self.pos).min(buf.len());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }
}

#[test]
fn read_error_is_propagated() {
    let reader = FailingReader {
        data: b"[1, 2,",
        pos: 0,
    };
    let mut src = BufReader::new(reader);
    let mut out = Vec::new();
    let err = Formatter::default()
        .indent_stream(&mut out, &mut src, "", "  ")
        .unwrap_err();
    match err {
        FormatError::Io(e) => assert_eq!("reader broke", e.to_string()),
        other => panic!("unexpected error: {other:?}"),
    }
    // output produced so far was flushed, not discarded
    assert_eq!("[\n  1,\n  2,\n  ", String::from_utf8(out).unwrap());
}

#[test]
fn read_error_after_complete_value_is_tolerated() {
    // the value was fully recognized, so a read error in place of the
    // expected end of stream is treated like a clean end
    let reader = FailingReader {
        data: br#"{"a":[1]}"#,
        pos: 0,
    };
    let mut src = BufReader::new(reader);
    let mut out = Vec::new();
    Formatter::default()
        .indent_stream(&mut out, &mut src, "", "  ")
        .unwrap();
    assert_eq!(
        "{\n  \"a\": [\n    1\n  ]\n}",
        String::from_utf8(out).unwrap()
    );
}

#[test]
fn read_error_inside_literal_closes_color() {
    let reader = FailingReader {
        data: b"[1234",
        pos: 0,
    };
    let mut src = BufReader::new(reader);
    let mut out = Vec::new();
    let err = Formatter::new(ColorScheme::colored())
        .indent_stream(&mut out, &mut src, "", "  ")
        .unwrap_err();
    assert!(matches!(err, FormatError::Io(_)));
    // the number's color escape must not be left open
    let out = String::from_utf8(out).unwrap();
    assert!(out.ends_with("\u{1b}[0m"), "unterminated color in: {out:?}");
    assert!(out.contains("1234"));
}

#[test]
fn write_error_is_propagated() {
    /// Writer failing after a fixed number of bytes
    struct Failing {
        remaining: usize,
    }
    impl Write for Failing {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if self.remaining == 0 {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "writer broke"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }
        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut dst = Failing { remaining: 3 };
    let err = Formatter::default()
        .indent_stream(&mut dst, &mut &b"[1,2,3]"[..], "", "  ")
        .unwrap_err();
    match err {
        FormatError::Io(e) => assert_eq!("writer broke", e.to_string()),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn syntax_error_positions() -> TestResult {
    // (input, expected message)
    let tests = [
        (
            "[1, 2,,]",
            "invalid character ',' looking for beginning of value at offset 7",
        ),
        (
            r#"{"a": 1,}"#,
            "invalid character '}' looking for beginning of object key string at offset 9",
        ),
        (
            "[1 true]",
            "invalid character 't' after array element at offset 4",
        ),
        ("[1,2", "unexpected end of JSON input at offset 4"),
    ];
    for (json, expected) in tests {
        let mut out = Vec::new();
        let err = indent(&mut out, json.as_bytes(), "", "  ").expect_err(json);
        assert_eq!(expected, err.to_string(), "for input: {json}");
        assert_eq!(true, out.is_empty());

        // the streaming path reports the same position
        let mut out = Vec::new();
        let err = Formatter::default()
            .indent_stream(&mut out, &mut json.as_bytes(), "", "  ")
            .expect_err(json);
        assert_eq!(format!("syntax error: {expected}"), err.to_string());
    }
    Ok(())
}
