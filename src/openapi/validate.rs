//! openapi::validate
//!
//! Request and response validation against a compiled [`OpenApi`] document.
//!
//! # Design
//!
//! Every violation is reported as a 400 `text/plain` [`ApiResponse`] whose
//! body is a single human-readable line. Validation never panics and never
//! returns an error type the caller has to map; the rejection *is* the
//! response.
//!
//! Request checks run in a fixed order and stop at the first failure:
//!
//! 1. path is declared
//! 2. method is declared on that path
//! 3. required query parameters are present and match their schemas
//! 4. a required body is present
//! 5. the content type is declared
//! 6. the body parses and matches its schema
//!
//! Response checks: declared status (exact, range, `default`), content type,
//! required headers, then body (JSON schema, or non-empty for binary).

use serde_json::Value;

use super::document::{CompiledSchema, OpenApi, Operation, ParamLocation};
use super::message::{ApiRequest, ApiResponse, ValidatedRequest};

impl OpenApi {
    /// Validate an inbound request.
    ///
    /// # Errors
    ///
    /// Returns a 400 `text/plain` response describing the first violation.
    pub fn validate_request(&self, req: &ApiRequest) -> Result<ValidatedRequest, ApiResponse> {
        self.check_request(req).map_err(|message| {
            tracing::debug!(method = %req.method, path = %req.path, %message, "request rejected");
            ApiResponse::bad_request(message)
        })
    }

    /// Validate an outbound response.
    ///
    /// A conforming response is returned unchanged; anything else is
    /// downgraded to a 400 `text/plain` response naming the violation.
    pub fn validate_response(&self, req: &ApiRequest, resp: ApiResponse) -> ApiResponse {
        match self.check_response(req, &resp) {
            Ok(()) => resp,
            Err(message) => {
                tracing::warn!(
                    method = %req.method,
                    path = %req.path,
                    status = resp.status,
                    %message,
                    "response failed validation"
                );
                ApiResponse::bad_request(message)
            }
        }
    }

    fn find_operation(&self, req: &ApiRequest) -> Result<&Operation, String> {
        let ops = self
            .path_item(&req.path)
            .ok_or_else(|| format!("Path not found for {}", req.full_url()))?;
        let method = req.method.to_lowercase();
        ops.get(&method)
            .ok_or_else(|| format!("Operation {} not found for {}", method, req.full_url()))
    }

    fn check_request(&self, req: &ApiRequest) -> Result<ValidatedRequest, String> {
        let op = self.find_operation(req)?;

        for param in op
            .parameters
            .iter()
            .filter(|p| p.location == ParamLocation::Query)
        {
            let values: Vec<&str> = req
                .query
                .iter()
                .filter(|(k, _)| *k == param.name)
                .map(|(_, v)| v.as_str())
                .collect();

            if values.is_empty() {
                if param.required {
                    return Err(format!("Missing required query parameter: {}", param.name));
                }
                continue;
            }

            if let Some(schema) = &param.schema {
                let value = coerce_query(schema, &values);
                schema.check(&value).map_err(|details| {
                    format!("Query parameter validation error: {}: {}", param.name, details)
                })?;
            }
        }

        let body = match &op.request_body {
            None => None,
            Some(spec) if req.body.is_empty() => {
                if spec.required {
                    return Err("Missing required request body".to_string());
                }
                None
            }
            Some(spec) => {
                let media = req.media_type().unwrap_or_default();
                let schema = spec.content.get(&media).ok_or_else(|| {
                    mimetype_not_found(&media, spec.content.keys())
                })?;
                if is_json(&media) {
                    let value: Value = serde_json::from_slice(&req.body).map_err(|e| {
                        format!("Request body validation error: invalid JSON: {}", e)
                    })?;
                    if let Some(schema) = schema {
                        schema
                            .check(&value)
                            .map_err(|details| format!("Request body validation error: {}", details))?;
                    }
                    Some(value)
                } else {
                    None
                }
            }
        };

        Ok(ValidatedRequest {
            body,
            query: req.query.clone(),
        })
    }

    fn check_response(&self, req: &ApiRequest, resp: &ApiResponse) -> Result<(), String> {
        let op = self.find_operation(req)?;
        let spec = op
            .response_for(resp.status)
            .ok_or_else(|| format!("Unknown response http status: {}", resp.status))?;

        if spec.content.is_empty() {
            return Ok(());
        }

        let media = resp.media_type().unwrap_or_default();
        let schema = spec
            .content
            .get(&media)
            .ok_or_else(|| mimetype_not_found(&media, spec.content.keys()))?;

        for name in &spec.required_headers {
            if resp.header(name).is_none() {
                return Err(format!("Missing required header: {}", name));
            }
        }

        let Some(schema) = schema else {
            return Ok(());
        };

        if is_json(&media) && schema.format() != Some("binary") {
            let value: Value = serde_json::from_slice(&resp.body)
                .map_err(|e| format!("Response data validation error: invalid JSON: {}", e))?;
            schema
                .check(&value)
                .map_err(|details| format!("Response data validation error: {}", details))
        } else if resp.body.is_empty() {
            Err("Missing response data".to_string())
        } else {
            Ok(())
        }
    }
}

/// Turn raw query strings into the JSON shape the parameter schema expects.
///
/// Array parameters collect every occurrence; scalars take the first one.
/// Values that do not parse as the declared type stay strings so the schema
/// check reports them.
fn coerce_query(schema: &CompiledSchema, values: &[&str]) -> Value {
    if schema.declared_type() == Some("array") {
        let item_type = schema
            .raw()
            .get("items")
            .and_then(|items| items.get("type"))
            .and_then(Value::as_str);
        Value::Array(values.iter().map(|v| coerce_scalar(item_type, v)).collect())
    } else {
        coerce_scalar(schema.declared_type(), values[0])
    }
}

fn coerce_scalar(declared: Option<&str>, raw: &str) -> Value {
    match declared {
        Some("integer") => raw
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("number") => raw
            .parse::<f64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(raw.to_string())),
        Some("boolean") => match raw {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(raw.to_string()),
        },
        _ => Value::String(raw.to_string()),
    }
}

fn is_json(media: &str) -> bool {
    media == "application/json" || media.ends_with("+json")
}

fn mimetype_not_found<'a>(media: &str, valid: impl Iterator<Item = &'a String>) -> String {
    let valid: Vec<&String> = valid.collect();
    let shown = if media.is_empty() { "<none>" } else { media };
    format!(
        "Content for the following mimetype not found: {}. Valid mimetypes: {:?}",
        shown, valid
    )
}
