//! Request payloads and response results.
//!
//! # Design
//! A response body is either structured JSON or raw text, and which one it is
//! depends only on whether the bytes parse. `ResponseBody` makes that split
//! explicit instead of handing back an untyped value. It serializes untagged,
//! so a `ResponseBody` written back out looks exactly like what the server
//! sent. It is not `Deserialize`: a JSON string and raw text serialize the same
//! way, so the variant cannot be recovered.

use serde::Serialize;
use serde_json::Value;

/// Payload for an outgoing request.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No payload; encodes to the empty string.
    #[default]
    Empty,
    /// Sent verbatim.
    Text(String),
    /// Serialized to JSON text before sending.
    Json(Value),
}

impl RequestBody {
    /// Wire representation of the payload.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        match self {
            RequestBody::Empty => Ok(String::new()),
            RequestBody::Text(text) => Ok(text.clone()),
            RequestBody::Json(value) => serde_json::to_string(value),
        }
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        RequestBody::Text(text.to_string())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        RequestBody::Text(text)
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        RequestBody::Json(value)
    }
}

/// Parsed response body: JSON when the text parses, the raw text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    /// Interpret accumulated response text. Never fails: anything that is not
    /// valid JSON comes back as `Text`, and an empty body as `Text("")`.
    pub fn parse(text: &str) -> Self {
        if text.is_empty() {
            return ResponseBody::Text(String::new());
        }
        match serde_json::from_str(text) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(text.to_string()),
        }
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// True for the empty-body result.
    pub fn is_empty(&self) -> bool {
        matches!(self, ResponseBody::Text(text) if text.is_empty())
    }

    /// Collapse into a `serde_json::Value`, with text becoming a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            ResponseBody::Json(value) => value,
            ResponseBody::Text(text) => Value::String(text),
        }
    }
}

impl Default for ResponseBody {
    fn default() -> Self {
        ResponseBody::Text(String::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_json_object() {
        let body = ResponseBody::parse(r#"{"error":"not found"}"#);
        assert_eq!(body, ResponseBody::Json(json!({"error": "not found"})));
    }

    #[test]
    fn parse_plain_text_falls_back_to_raw() {
        let body = ResponseBody::parse("hello world");
        assert_eq!(body.as_text(), Some("hello world"));
    }

    #[test]
    fn parse_quoted_string_is_json() {
        let body = ResponseBody::parse(r#""hello world""#);
        assert_eq!(body.as_json(), Some(&json!("hello world")));
    }

    #[test]
    fn parse_empty_is_empty_text() {
        let body = ResponseBody::parse("");
        assert!(body.is_empty());
        assert_eq!(body, ResponseBody::default());
    }

    #[test]
    fn parse_truncated_json_is_text() {
        let body = ResponseBody::parse(r#"{"a": 1"#);
        assert_eq!(body.as_text(), Some(r#"{"a": 1"#));
    }

    #[test]
    fn response_body_serializes_untagged() {
        let json = serde_json::to_string(&ResponseBody::Json(json!([1, 2]))).unwrap();
        assert_eq!(json, "[1,2]");
        let text = serde_json::to_string(&ResponseBody::Text("hi".to_string())).unwrap();
        assert_eq!(text, r#""hi""#);
    }

    #[test]
    fn json_string_and_text_serialize_alike() {
        let json = serde_json::to_value(ResponseBody::Json(json!("hi"))).unwrap();
        let text = serde_json::to_value(ResponseBody::Text("hi".to_string())).unwrap();
        assert_eq!(json, text);
    }

    #[test]
    fn request_body_encoding() {
        assert_eq!(RequestBody::Empty.encode().unwrap(), "");
        assert_eq!(RequestBody::from("raw").encode().unwrap(), "raw");
        assert_eq!(
            RequestBody::from(json!({"title": "Buy milk"})).encode().unwrap(),
            r#"{"title":"Buy milk"}"#
        );
    }
}
