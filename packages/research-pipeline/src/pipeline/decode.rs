//! Defensive decoding of generative responses.
//!
//! Generative output is never assumed to match its schema. Every call site
//! decodes into a response struct whose fields all default, then resolves
//! that into a typed, fully-populated value. A payload is only handed to
//! `serde_json` once it is within the size cap and delimited as JSON.

use serde::de::DeserializeOwned;

use crate::error::MalformedResponse;
use crate::util::strip_code_blocks;

/// Decode a raw generative response into `T`.
pub fn decode_json<T: DeserializeOwned>(
    raw: &str,
    max_chars: usize,
) -> Result<T, MalformedResponse> {
    let len = raw.chars().count();
    if len > max_chars {
        return Err(MalformedResponse::Oversized {
            len,
            max: max_chars,
        });
    }

    let body = strip_code_blocks(raw);
    let delimited = (body.starts_with('{') && body.ends_with('}'))
        || (body.starts_with('[') && body.ends_with(']'));
    if !delimited {
        return Err(MalformedResponse::NotJson);
    }

    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Scores {
        #[serde(default)]
        a: Option<f64>,
        #[serde(default)]
        b: Vec<String>,
    }

    #[test]
    fn test_decodes_plain_and_fenced() {
        let plain: Scores = decode_json(r#"{"a": 0.4, "b": ["x"]}"#, 1000).unwrap();
        assert_eq!(plain.a, Some(0.4));

        let fenced: Scores = decode_json("```json\n{\"a\": 0.9}\n```", 1000).unwrap();
        assert_eq!(fenced.a, Some(0.9));
        assert!(fenced.b.is_empty());
    }

    #[test]
    fn test_missing_fields_default() {
        let empty: Scores = decode_json("{}", 1000).unwrap();
        assert_eq!(empty, Scores { a: None, b: vec![] });
    }

    #[test]
    fn test_rejects_prose() {
        let err = decode_json::<Scores>("Sure! Here is the JSON: {\"a\": 1}", 1000).unwrap_err();
        assert!(matches!(err, MalformedResponse::NotJson));
    }

    #[test]
    fn test_rejects_oversized_before_parsing() {
        let huge = format!("{{\"a\": 0.5, \"pad\": \"{}\"}}", "x".repeat(200));
        let err = decode_json::<Scores>(&huge, 100).unwrap_err();
        assert!(matches!(err, MalformedResponse::Oversized { max: 100, .. }));
    }

    #[test]
    fn test_rejects_wrong_shape() {
        let err = decode_json::<Scores>(r#"{"a": "very neutral"}"#, 1000).unwrap_err();
        assert!(matches!(err, MalformedResponse::Parse(_)));
    }
}
