//! Bracket-notation form encoding for request bodies and query strings
//!
//! The backend reconstructs repeated and nested keys from bracket notation:
//!
//! | Value | Encoded |
//! |-------|---------|
//! | `{"category": "x"}` | `category=x` |
//! | `{"tags": ["a", "b"]}` | `tags[]=a&tags[]=b` |
//! | `{"author": {"id": 7}}` | `author[id]=7` |
//! | `{"note": null}` | `note=` |
//!
//! Keys and values are form-urlencoded; the structural brackets stay literal.

use crate::error::ApiResult;
use crate::request::Body;
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

/// Content type of encoded structured bodies
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Encode a structured value as `key=value` pairs joined by `&`
///
/// Only objects produce output; any other top-level value encodes to an empty
/// string.
pub fn encode_query(value: &Value) -> String {
    let mut pairs = Vec::new();

    if let Value::Object(map) = value {
        for (key, value) in map {
            push_pairs(&mut pairs, &escape(key), value);
        }
    }

    pairs.join("&")
}

/// Encode an outgoing body
///
/// Structured bodies become bracket-notation forms; multipart payloads and
/// already-encoded forms pass through unchanged.
pub fn encode_body(body: Body) -> Body {
    match body {
        Body::Structured(value) => match encode_query(&value) {
            encoded if encoded.is_empty() => Body::Empty,
            encoded => Body::Form(encoded),
        },
        other => other,
    }
}

/// Serialize a filter into a query string
///
/// Returns `None` when the filter is empty so that callers omit the query
/// stage entirely.
pub fn query_from<T: Serialize + ?Sized>(filter: &T) -> ApiResult<Option<String>> {
    let value = serde_json::to_value(filter)?;
    let encoded = encode_query(&value);
    Ok((!encoded.is_empty()).then_some(encoded))
}

fn push_pairs(pairs: &mut Vec<String>, key: &str, value: &Value) {
    match value {
        Value::Null => pairs.push(format!("{key}=")),
        Value::Bool(flag) => pairs.push(format!("{key}={flag}")),
        Value::Number(number) => pairs.push(format!("{key}={number}")),
        Value::String(text) => pairs.push(format!("{key}={}", escape(text))),
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                push_pairs(pairs, &key, item);
            }
        }
        Value::Object(map) => {
            for (child, value) in map {
                push_pairs(pairs, &format!("{key}[{}]", escape(child)), value);
            }
        }
    }
}

fn escape(text: &str) -> String {
    form_urlencoded::byte_serialize(text.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_pairs() {
        assert_eq!(encode_query(&json!({"category": "x"})), "category=x");
        assert_eq!(
            encode_query(&json!({"page": 2, "published": true})),
            "page=2&published=true"
        );
        assert_eq!(encode_query(&json!({"note": null})), "note=");
    }

    #[test]
    fn test_arrays_use_brackets() {
        assert_eq!(
            encode_query(&json!({"tags": ["a", "b"]})),
            "tags[]=a&tags[]=b"
        );
        assert_eq!(encode_query(&json!({"tags": []})), "");
    }

    #[test]
    fn test_nested_objects() {
        assert_eq!(
            encode_query(&json!({"author": {"id": 7, "name": "Ana"}})),
            "author[id]=7&author[name]=Ana"
        );
        assert_eq!(
            encode_query(&json!({"steps": [{"order": 1}]})),
            "steps[][order]=1"
        );
    }

    #[test]
    fn test_escaping() {
        assert_eq!(
            encode_query(&json!({"q": "a=b", "title": "mac & cheese"})),
            "q=a%3Db&title=mac+%26+cheese"
        );
        assert_eq!(encode_query(&json!({"ké y": "v"})), "k%C3%A9+y=v");
    }

    #[test]
    fn test_non_object_encodes_to_empty() {
        assert_eq!(encode_query(&json!(null)), "");
        assert_eq!(encode_query(&json!(["a"])), "");
        assert_eq!(encode_query(&json!("text")), "");
    }

    #[test]
    fn test_encode_body() {
        let encoded = encode_body(Body::Structured(json!({"email": "a@b.c"})));
        assert!(matches!(encoded, Body::Form(ref form) if form == "email=a%40b.c"));

        assert!(matches!(encode_body(Body::Structured(json!({}))), Body::Empty));
        assert!(matches!(encode_body(Body::Empty), Body::Empty));

        let multipart = crate::request::MultipartPayload::new().text("title", "x");
        assert!(encode_body(Body::Multipart(multipart)).is_multipart());
    }

    #[test]
    fn test_query_from_empty_filter() {
        assert_eq!(query_from(&json!({})).unwrap(), None);
        assert_eq!(query_from(&json!(null)).unwrap(), None);
        assert_eq!(
            query_from(&json!({"category": "x"})).unwrap().as_deref(),
            Some("category=x")
        );
    }
}
