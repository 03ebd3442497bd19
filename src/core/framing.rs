//! Turning decoded response text into transcript increments.
//!
//! Two wire formats are understood:
//!
//! - [`WireFormat::Chunked`] treats every transport read as one candidate JSON
//!   document of the form `{"response": "..."}` and falls back to the raw text
//!   when the read does not parse on its own. A document split across reads
//!   therefore leaks its fragments into the transcript; backends that rely on
//!   this format send one small object per flush.
//! - [`WireFormat::Ndjson`] buffers text and splits on newlines, so a document
//!   is only parsed once its terminating `\n` has arrived.

use std::fmt;
use std::str::FromStr;

use memchr::memchr;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    #[default]
    Chunked,
    Ndjson,
}

impl WireFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            WireFormat::Chunked => "chunked",
            WireFormat::Ndjson => "ndjson",
        }
    }
}

impl fmt::Display for WireFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chunked" | "raw" => Ok(WireFormat::Chunked),
            "ndjson" | "jsonl" => Ok(WireFormat::Ndjson),
            other => Err(format!(
                "unknown wire format `{other}` (expected `chunked` or `ndjson`)"
            )),
        }
    }
}

/// Extract the increment carried by one decoded chunk.
///
/// A chunk that parses as a JSON object contributes its `response` field; a
/// chunk that does not parse contributes its raw text.
pub fn extract_increment(chunk: &str) -> String {
    parse_increment(chunk).unwrap_or_else(|| chunk.to_string())
}

/// `None` means "not a usable document, fall back to the raw text".
fn parse_increment(text: &str) -> Option<String> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map.get("response").map(response_text).unwrap_or_default()),
        // Reading a field off `null` is an error upstream, which lands in the
        // raw-text fallback.
        Ok(Value::Null) | Err(_) => None,
        Ok(_) => Some(String::new()),
    }
}

/// Falsy values contribute nothing; everything else contributes the text a
/// browser would append for it.
fn response_text(value: &Value) -> String {
    match value {
        Value::Null | Value::Bool(false) => String::new(),
        Value::Number(number) if number.as_f64() == Some(0.0) => String::new(),
        other => display_text(other),
    }
}

/// Arrays join their elements with `,` (null elements as empty) and objects
/// become `[object Object]`.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number
            .as_f64()
            .map(number_text)
            .unwrap_or_else(|| number.to_string()),
        Value::String(text) => text.clone(),
        Value::Array(items) => items.iter().map(display_text).collect::<Vec<_>>().join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Shortest round-trip digits; exponent form outside `[1e-6, 1e21)`.
fn number_text(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if (1e-6..1e21).contains(&value.abs()) {
        return value.to_string();
    }
    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => scientific,
    }
}

/// Converts decoded text into increments according to a [`WireFormat`].
#[derive(Debug)]
pub struct IncrementFramer {
    format: WireFormat,
    line_buffer: String,
}

impl IncrementFramer {
    pub fn new(format: WireFormat) -> Self {
        Self {
            format,
            line_buffer: String::new(),
        }
    }

    /// Feed the text decoded from one transport read.
    pub fn push(&mut self, decoded: &str) -> Vec<String> {
        match self.format {
            WireFormat::Chunked => vec![extract_increment(decoded)],
            WireFormat::Ndjson => {
                self.line_buffer.push_str(decoded);
                let mut increments = Vec::new();
                while let Some(newline_pos) = memchr(b'\n', self.line_buffer.as_bytes()) {
                    let line: String = self.line_buffer.drain(..=newline_pos).collect();
                    if let Some(increment) = line_increment(&line) {
                        increments.push(increment);
                    }
                }
                increments
            }
        }
    }

    /// Flush whatever is left at end of stream. `tail` is the decoder's own
    /// flush output.
    pub fn finish(&mut self, tail: &str) -> Vec<String> {
        match self.format {
            WireFormat::Chunked => {
                if tail.is_empty() {
                    Vec::new()
                } else {
                    vec![extract_increment(tail)]
                }
            }
            WireFormat::Ndjson => {
                self.line_buffer.push_str(tail);
                let rest = std::mem::take(&mut self.line_buffer);
                line_increment(&rest).into_iter().collect()
            }
        }
    }
}

fn line_increment(line: &str) -> Option<String> {
    let document = line.trim_end_matches(['\n', '\r']);
    if document.trim().is_empty() {
        return None;
    }
    Some(parse_increment(document).unwrap_or_else(|| line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_chunk_contributes_response_field() {
        assert_eq!(extract_increment(r#"{"response":"hello"}"#), "hello");
    }

    #[test]
    fn raw_chunk_contributes_itself() {
        assert_eq!(extract_increment("hello"), "hello");
        assert_eq!(extract_increment("  spaced "), "  spaced ");
    }

    #[test]
    fn missing_or_falsy_response_contributes_nothing() {
        assert_eq!(extract_increment(r#"{"done":true}"#), "");
        assert_eq!(extract_increment(r#"{"response":null}"#), "");
        assert_eq!(extract_increment(r#"{"response":""}"#), "");
        assert_eq!(extract_increment(r#"{"response":0}"#), "");
        assert_eq!(extract_increment(r#"{"response":false}"#), "");
    }

    #[test]
    fn truthy_scalars_contribute_their_text() {
        assert_eq!(extract_increment(r#"{"response":42}"#), "42");
        assert_eq!(extract_increment(r#"{"response":true}"#), "true");
    }

    #[test]
    fn numbers_use_browser_formatting() {
        assert_eq!(extract_increment(r#"{"response":1.0}"#), "1");
        assert_eq!(extract_increment(r#"{"response":1e2}"#), "100");
        assert_eq!(extract_increment(r#"{"response":-2.5}"#), "-2.5");
        assert_eq!(extract_increment(r#"{"response":1e21}"#), "1e+21");
        assert_eq!(extract_increment(r#"{"response":1.5e-7}"#), "1.5e-7");
        assert_eq!(extract_increment(r#"{"response":-0.0}"#), "");
    }

    #[test]
    fn arrays_and_objects_use_browser_formatting() {
        assert_eq!(extract_increment(r#"{"response":["a","b"]}"#), "a,b");
        assert_eq!(
            extract_increment(r#"{"response":[1,[2,null],{},true]}"#),
            "1,2,,[object Object],true"
        );
        assert_eq!(extract_increment(r#"{"response":{"k":1}}"#), "[object Object]");
        assert_eq!(extract_increment(r#"{"response":[]}"#), "");
    }

    #[test]
    fn non_object_documents() {
        assert_eq!(extract_increment("12"), "");
        assert_eq!(extract_increment(r#""quoted""#), "");
        assert_eq!(extract_increment("null"), "null");
    }

    #[test]
    fn split_json_object_leaks_fragments_in_chunked_mode() {
        let mut framer = IncrementFramer::new(WireFormat::Chunked);
        let mut text = String::new();
        for part in [r#"{"respo"#, r#"nse":"hi"}"#] {
            text.extend(framer.push(part));
        }
        assert_eq!(text, r#"{"response":"hi"}"#);
    }

    #[test]
    fn ndjson_reassembles_documents_across_reads() {
        let mut framer = IncrementFramer::new(WireFormat::Ndjson);
        let mut increments = Vec::new();
        for part in [r#"{"respo"#, "nse\":\"Hel\"}\n{\"response\"", ":\"lo\"}\n"] {
            increments.extend(framer.push(part));
        }
        increments.extend(framer.finish(""));
        assert_eq!(increments, vec!["Hel".to_string(), "lo".to_string()]);
    }

    #[test]
    fn ndjson_skips_blank_lines_and_flushes_unterminated_tail() {
        let mut framer = IncrementFramer::new(WireFormat::Ndjson);
        assert!(framer.push("\r\n\n").is_empty());
        assert!(framer.push(r#"{"response":"tail"}"#).is_empty());
        assert_eq!(framer.finish(""), vec!["tail".to_string()]);
    }

    #[test]
    fn ndjson_keeps_plain_text_lines_verbatim() {
        let mut framer = IncrementFramer::new(WireFormat::Ndjson);
        assert_eq!(framer.push("plain line\n"), vec!["plain line\n".to_string()]);
    }

    #[test]
    fn wire_format_parses_aliases() {
        assert_eq!("NDJSON".parse::<WireFormat>(), Ok(WireFormat::Ndjson));
        assert_eq!("raw".parse::<WireFormat>(), Ok(WireFormat::Chunked));
        assert!("sse".parse::<WireFormat>().is_err());
    }
}
