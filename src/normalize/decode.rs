//! Decode chain for string-encoded structured cells.
//!
//! A cell is tried as a literal first, then as strict JSON. Both failing is not an error; the
//! caller simply gets no structure back.

use log::debug;
use serde_json::Value;

use super::literal;

/// Which decoder accepted a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeSource {
    Literal,
    Json,
}

/// Decodes `s`, returning the value and the decoder that produced it.
pub fn decode_with_source(s: &str) -> Option<(Value, DecodeSource)> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }

    match literal::parse_literal(trimmed) {
        Ok(value) => return Some((value, DecodeSource::Literal)),
        Err(e) => debug!("literal decode failed, trying JSON: {}", e),
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) => Some((value, DecodeSource::Json)),
        Err(e) => {
            debug!("JSON decode failed: {}", e);
            None
        }
    }
}

/// Decodes `s` with the literal parser, falling back to JSON.
pub fn decode(s: &str) -> Option<Value> {
    decode_with_source(s).map(|(value, _)| value)
}

/// Like [`decode`] but only a list or mapping counts as success.
pub fn decode_structure(s: &str) -> Option<Value> {
    decode(s).filter(|value| value.is_array() || value.is_object())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn literal_wins_when_both_accept() {
        let (value, source) = decode_with_source("[1, 2, 3]").unwrap();
        assert_eq!(value, json!([1, 2, 3]));
        assert_eq!(source, DecodeSource::Literal);

        let (_, source) = decode_with_source(r#"{"a": 1}"#).unwrap();
        assert_eq!(source, DecodeSource::Literal);
    }

    #[test]
    fn json_only_syntax_falls_through() {
        let (value, source) = decode_with_source(r#"{"a": true, "b": null}"#).unwrap();
        assert_eq!(value, json!({"a": true, "b": null}));
        assert_eq!(source, DecodeSource::Json);
    }

    #[test]
    fn undecodable_yields_none() {
        assert_eq!(decode("{'a': }"), None);
        assert_eq!(decode("   "), None);
        assert_eq!(decode("Heavy"), None);
    }

    #[test]
    fn scalars_are_not_structure() {
        assert_eq!(decode("12"), Some(json!(12)));
        assert_eq!(decode_structure("12"), None);
        assert_eq!(decode_structure("'x'"), None);
        assert_eq!(decode_structure("[]"), Some(json!([])));
    }
}
