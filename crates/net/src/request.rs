//! Request descriptors and response bodies

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::{NetError, Result};

/// Called with the decoded body when a request succeeds
pub type SuccessCallback = Box<dyn FnOnce(&ResponseBody) + Send>;

/// Called with the failure when a request fails
pub type ErrorCallback = Box<dyn FnOnce(&NetError) + Send>;

/// How to decode a response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseType {
    #[default]
    Json,
    Text,
}

/// A decoded response body
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub(crate) fn decode(text: String, response_type: ResponseType) -> Result<Self> {
        Ok(match response_type {
            ResponseType::Json => ResponseBody::Json(serde_json::from_str(&text)?),
            ResponseType::Text => ResponseBody::Text(text),
        })
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
}

/// Everything `ajax` needs to issue one request
///
/// ```ignore
/// let request = RequestDescriptor::new("/api/items")
///     .method("post")
///     .field("name", "widget")
///     .header("Content-Type", "application/json")
///     .on_error(|e| eprintln!("{}", e));
/// ```
pub struct RequestDescriptor {
    pub(crate) url: String,
    pub(crate) method: String,
    pub(crate) data: Option<Map<String, Value>>,
    pub(crate) headers: Vec<(String, String)>,
    pub(crate) response_type: ResponseType,
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_error: Option<ErrorCallback>,
}

impl RequestDescriptor {
    /// A `GET` of `url` expecting JSON
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: "GET".to_string(),
            data: None,
            headers: Vec::new(),
            response_type: ResponseType::default(),
            on_success: None,
            on_error: None,
        }
    }

    /// HTTP method, upper-cased
    pub fn method(mut self, method: &str) -> Self {
        self.method = method.to_ascii_uppercase();
        self
    }

    /// Replace the payload
    pub fn data(mut self, data: Map<String, Value>) -> Self {
        self.data = Some(data);
        self
    }

    /// Add one payload field
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(name.into(), value.into());
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn response_type(mut self, response_type: ResponseType) -> Self {
        self.response_type = response_type;
        self
    }

    pub fn on_success(mut self, callback: impl FnOnce(&ResponseBody) + Send + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl FnOnce(&NetError) + Send + 'static) -> Self {
        self.on_error = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestDescriptor")
            .field("url", &self.url)
            .field("method", &self.method)
            .field("data", &self.data)
            .field("headers", &self.headers)
            .field("response_type", &self.response_type)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// String form of a payload value for URL encoding
///
/// Strings are verbatim, scalars use their display form, top-level null is
/// `"null"`, arrays join their items with commas (null items are empty)
/// and objects become JSON.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => stringify(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => value.to_string(),
    }
}

/// `application/x-www-form-urlencoded` encoding of a payload
pub(crate) fn encode_form(data: &Map<String, Value>) -> Result<String> {
    let pairs: Vec<(&str, String)> = data
        .iter()
        .map(|(key, value)| (key.as_str(), stringify(value)))
        .collect();
    Ok(serde_urlencoded::to_string(pairs)?)
}

/// Append an encoded query, joining with `&` when the URL already has one
pub(crate) fn append_query(url: &str, query: &str) -> String {
    if query.is_empty() {
        return url.to_string();
    }
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder() {
        let request = RequestDescriptor::new("/items")
            .method("post")
            .field("a", 1)
            .field("b", "x")
            .header("X-Token", "t")
            .response_type(ResponseType::Text);
        assert_eq!(request.method, "POST");
        assert_eq!(request.data.as_ref().map(|d| d.len()), Some(2));
        assert_eq!(request.headers, vec![("X-Token".to_string(), "t".to_string())]);
        assert_eq!(request.response_type, ResponseType::Text);
        assert!(format!("{:?}", request).contains("on_success: false"));
    }

    #[test]
    fn test_stringify_values() {
        assert_eq!(stringify(&json!("a b")), "a b");
        assert_eq!(stringify(&json!(2.5)), "2.5");
        assert_eq!(stringify(&json!(true)), "true");
        assert_eq!(stringify(&Value::Null), "null");
        assert_eq!(stringify(&json!([1, null, "x"])), "1,,x");
        assert_eq!(stringify(&json!({"k": 1})), r#"{"k":1}"#);
    }

    #[test]
    fn test_encode_form() {
        let data = json!({"q": "rust lang", "page": 2, "tags": ["a", "b"]});
        let encoded = encode_form(data.as_object().unwrap()).unwrap();
        assert_eq!(encoded, "q=rust+lang&page=2&tags=a%2Cb");

        let mut reversed = Map::new();
        reversed.insert("z".to_string(), json!(1));
        reversed.insert("a".to_string(), json!(2));
        assert_eq!(encode_form(&reversed).unwrap(), "z=1&a=2");
    }

    #[test]
    fn test_append_query() {
        assert_eq!(append_query("https://x.test/a", "b=1"), "https://x.test/a?b=1");
        assert_eq!(append_query("https://x.test/a?z=0", "b=1"), "https://x.test/a?z=0&b=1");
        assert_eq!(append_query("https://x.test/a", ""), "https://x.test/a");
    }

    #[test]
    fn test_decode_body() {
        let body = ResponseBody::decode(r#"{"ok":true}"#.to_string(), ResponseType::Json).unwrap();
        assert_eq!(body.as_json(), Some(&json!({"ok": true})));
        let text = ResponseBody::decode("plain".to_string(), ResponseType::Text).unwrap();
        assert_eq!(text.as_text(), Some("plain"));
        assert!(ResponseBody::decode("nope".to_string(), ResponseType::Json).is_err());
    }
}
