//! openapi::message
//!
//! Framework-neutral HTTP request and response values.
//!
//! The validator works on these rather than on axum types so that it can be
//! unit tested without a server and reused by the CLI.

use serde::de::DeserializeOwned;
use serde_json::Value;

/// An inbound request as seen by the validator.
#[derive(Debug, Clone, Default)]
pub struct ApiRequest {
    /// Uppercase HTTP method.
    pub method: String,
    /// Request path without query string.
    pub path: String,
    /// `Host` header value, used to build the full URL in messages.
    pub host: String,
    /// Query parameters in the order they appeared.
    pub query: Vec<(String, String)>,
    /// `Content-Type` header, if any.
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiRequest {
    pub fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_uppercase(),
            path: path.to_string(),
            host: "localhost".to_string(),
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_query(mut self, name: &str, value: &str) -> Self {
        self.query.push((name.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON body and set the content type accordingly.
    pub fn with_json(mut self, body: &Value) -> Self {
        self.content_type = Some("application/json".to_string());
        self.body = body.to_string().into_bytes();
        self
    }

    pub fn with_body(mut self, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        self.content_type = Some(content_type.to_string());
        self.body = body.into();
        self
    }

    /// Media type without parameters (`application/json; charset=utf-8`
    /// becomes `application/json`).
    pub fn media_type(&self) -> Option<String> {
        self.content_type.as_deref().map(media_type)
    }

    /// The absolute URL, including the query string.
    pub fn full_url(&self) -> String {
        let mut url = format!("http://{}{}", self.host, self.path);
        if !self.query.is_empty() {
            let query = self
                .query
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("&");
            url.push('?');
            url.push_str(&query);
        }
        url
    }
}

/// A request that passed validation.
#[derive(Debug, Clone, Default)]
pub struct ValidatedRequest {
    /// The unmarshalled JSON body, when one was sent.
    pub body: Option<Value>,
    /// Query parameters in the order they appeared.
    pub query: Vec<(String, String)>,
}

impl ValidatedRequest {
    /// All values of a query parameter, in order.
    pub fn query_values(&self, name: &str) -> Vec<String> {
        self.query
            .iter()
            .filter(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// Deserialize the body into a typed value.
    ///
    /// An absent body deserializes from `{}` so that all-optional request
    /// types work without a body.
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, String> {
        let value = self
            .body
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        serde_json::from_value(value).map_err(|e| e.to_string())
    }
}

/// An outbound response as seen by the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    /// Header name/value pairs; names are kept as given.
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// A JSON response.
    pub fn json(status: u16, body: &Value) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.to_string().into_bytes(),
        }
    }

    /// A `text/plain` response.
    pub fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
            body: message.into().into_bytes(),
        }
    }

    /// A binary response with the given content type.
    pub fn binary(status: u16, content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body,
        }
    }

    /// A 400 validation failure.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::text(400, message)
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Media type of the body, without parameters.
    pub fn media_type(&self) -> Option<String> {
        self.header("content-type").map(media_type)
    }

    /// The body as UTF-8 text, lossily.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

fn media_type(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[test]
    fn full_url_keeps_query_order() {
        let req = ApiRequest::new("get", "/v2/creator/schema")
            .with_host("example.test:8000")
            .with_query("command_path", "init")
            .with_query("command_path", "collection");

        assert_eq!(req.method, "GET");
        assert_eq!(
            req.full_url(),
            "http://example.test:8000/v2/creator/schema?command_path=init&command_path=collection"
        );
    }

    #[test]
    fn media_type_strips_parameters() {
        let req = ApiRequest::new("POST", "/x").with_body("Application/JSON; charset=utf-8", "{}");
        assert_eq!(req.media_type().as_deref(), Some("application/json"));
    }

    #[test]
    fn header_lookup_ignores_case() {
        let resp = ApiResponse::text(200, "hi").with_header("X-Creator-Message", "done");
        assert_eq!(resp.header("x-creator-message"), Some("done"));
        assert_eq!(resp.media_type().as_deref(), Some("text/plain"));
    }

    #[test]
    fn absent_body_deserializes_as_empty_object() {
        #[derive(Deserialize)]
        struct Optional {
            image: Option<String>,
        }

        let validated = ValidatedRequest::default();
        let parsed: Optional = validated.body_as().unwrap();
        assert!(parsed.image.is_none());

        let validated = ValidatedRequest {
            body: Some(json!({"image": "ubi"})),
            query: vec![],
        };
        let parsed: Optional = validated.body_as().unwrap();
        assert_eq!(parsed.image.as_deref(), Some("ubi"));
    }
}
