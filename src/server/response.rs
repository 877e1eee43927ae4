//! server::response
//!
//! Conversion of [`ApiResponse`] values into axum responses, plus the JSON
//! error shapes the endpoints share.

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::openapi::ApiResponse;

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = status;

        let headers = response.headers_mut();
        for (name, value) in self.headers {
            match (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(&value),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.append(name, value);
                }
                _ => tracing::warn!(header = %name, "dropping header that is not valid HTTP"),
            }
        }
        response
    }
}

/// `{"error": message}` with status 400.
pub fn error_json(message: impl Into<String>) -> ApiResponse {
    ApiResponse::json(400, &json!({ "error": message.into() }))
}

/// `{"status": "error", "message": ..., "logs": [...]}` with status 400.
pub fn scaffold_error(message: impl Into<String>, logs: &[String]) -> ApiResponse {
    ApiResponse::json(
        400,
        &json!({
            "status": "error",
            "message": message.into(),
            "logs": logs,
        }),
    )
}

/// `attachment; filename="<name>"`.
pub fn attachment(file_name: &str) -> String {
    format!("attachment; filename=\"{}\"", header_safe(file_name).replace('"', "'"))
}

/// Make a string usable as an HTTP header value.
///
/// Control characters become spaces and non-ASCII characters become
/// `\uXXXX` escapes (UTF-16), which keeps JSON text valid JSON.
pub fn header_safe(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if c == ' ' || c.is_ascii_graphic() {
            out.push(c);
        } else if c.is_control() {
            out.push(' ');
        } else {
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}
