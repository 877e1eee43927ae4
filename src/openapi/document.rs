//! openapi::document
//!
//! Loading and compiling the OpenAPI document.
//!
//! Only the subset of OpenAPI 3 used by this server is modeled: paths,
//! operations, query parameters, request bodies, responses with headers and
//! content. Local `$ref`s are inlined before schemas are compiled, since
//! the JSON-Schema validator only sees one schema at a time.

use std::collections::BTreeMap;
use std::fmt;

use jsonschema::JSONSchema;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// The bundled OpenAPI document served by `adt server`.
pub const BUNDLED_DOCUMENT: &str = include_str!("../../data/openapi.yaml");

/// Maximum `$ref` nesting before the document is considered cyclic.
const MAX_REF_DEPTH: usize = 32;

/// Errors from loading an OpenAPI document.
#[derive(Debug, Error)]
pub enum OpenApiError {
    #[error("failed to parse OpenAPI document: {0}")]
    Parse(String),

    #[error("unresolvable reference '{0}'")]
    UnresolvedRef(String),

    #[error("reference nesting too deep at '{0}' (cyclic document?)")]
    RefDepth(String),

    #[error("invalid schema at {location}: {message}")]
    InvalidSchema { location: String, message: String },
}

/// Where a parameter is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Query,
    Header,
    Path,
    Cookie,
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[allow(dead_code)]
    openapi: String,
    info: RawInfo,
    #[serde(default)]
    paths: BTreeMap<String, BTreeMap<String, RawOperation>>,
}

#[derive(Debug, Deserialize)]
struct RawInfo {
    title: String,
    version: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawOperation {
    operation_id: Option<String>,
    #[serde(default)]
    parameters: Vec<RawParameter>,
    request_body: Option<RawRequestBody>,
    #[serde(default)]
    responses: BTreeMap<String, RawResponse>,
}

#[derive(Debug, Deserialize)]
struct RawParameter {
    name: String,
    #[serde(rename = "in")]
    location: ParamLocation,
    #[serde(default)]
    required: bool,
    schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct RawRequestBody {
    #[serde(default)]
    required: bool,
    #[serde(default)]
    content: BTreeMap<String, RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawResponse {
    #[serde(default)]
    headers: BTreeMap<String, RawHeader>,
    #[serde(default)]
    content: BTreeMap<String, RawMedia>,
}

#[derive(Debug, Deserialize)]
struct RawHeader {
    #[serde(default)]
    required: bool,
}

#[derive(Debug, Deserialize)]
struct RawMedia {
    schema: Option<Value>,
}

/// A compiled JSON Schema together with its source.
pub struct CompiledSchema {
    raw: Value,
    compiled: JSONSchema,
}

impl CompiledSchema {
    fn compile(raw: Value, location: &str) -> Result<Self, OpenApiError> {
        let compiled = JSONSchema::compile(&raw).map_err(|e| OpenApiError::InvalidSchema {
            location: location.to_string(),
            message: e.to_string(),
        })?;
        Ok(Self { raw, compiled })
    }

    /// The schema as written in the document (after `$ref` inlining).
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Validate an instance, joining every violation into one message.
    pub fn check(&self, instance: &Value) -> Result<(), String> {
        match self.compiled.validate(instance) {
            Ok(()) => Ok(()),
            Err(errors) => Err(errors
                .map(|e| {
                    let pointer = e.instance_path.to_string();
                    if pointer.is_empty() {
                        e.to_string()
                    } else {
                        format!("{} (at {})", e, pointer)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ")),
        }
    }

    /// The declared `type` keyword, if it is a single string.
    pub fn declared_type(&self) -> Option<&str> {
        self.raw.get("type").and_then(Value::as_str)
    }

    /// The declared `format` keyword.
    pub fn format(&self) -> Option<&str> {
        self.raw.get("format").and_then(Value::as_str)
    }
}

impl fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("raw", &self.raw)
            .finish_non_exhaustive()
    }
}

/// A declared parameter.
#[derive(Debug)]
pub struct Parameter {
    pub name: String,
    pub location: ParamLocation,
    pub required: bool,
    pub schema: Option<CompiledSchema>,
}

/// A declared request body.
#[derive(Debug)]
pub struct RequestBody {
    pub required: bool,
    /// Media type → schema.
    pub content: BTreeMap<String, Option<CompiledSchema>>,
}

/// A declared response for one status code.
#[derive(Debug)]
pub struct ResponseSpec {
    /// Header names (lowercased) that must be present.
    pub required_headers: Vec<String>,
    /// Media type → schema.
    pub content: BTreeMap<String, Option<CompiledSchema>>,
}

/// One operation (method on a path).
#[derive(Debug)]
pub struct Operation {
    pub operation_id: Option<String>,
    pub parameters: Vec<Parameter>,
    pub request_body: Option<RequestBody>,
    /// Status key (`"201"`, `"4XX"`, `"default"`) → response.
    pub responses: BTreeMap<String, ResponseSpec>,
}

impl Operation {
    /// Find the response declared for a status code.
    ///
    /// Exact codes win over range keys (`4XX`), which win over `default`.
    pub fn response_for(&self, status: u16) -> Option<&ResponseSpec> {
        let exact = status.to_string();
        let range = format!("{}XX", status / 100);
        self.responses
            .get(&exact)
            .or_else(|| self.responses.get(&range))
            .or_else(|| self.responses.get("default"))
    }
}

/// A compiled OpenAPI document.
#[derive(Debug)]
pub struct OpenApi {
    title: String,
    version: String,
    /// Path → lowercase method → operation.
    paths: BTreeMap<String, BTreeMap<String, Operation>>,
}

impl OpenApi {
    /// Load the document bundled with the binary.
    pub fn bundled() -> Result<Self, OpenApiError> {
        Self::from_yaml(BUNDLED_DOCUMENT)
    }

    /// Parse and compile a YAML (or JSON) OpenAPI document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML, unresolvable `$ref`s, or schemas the
    /// JSON-Schema compiler rejects.
    pub fn from_yaml(source: &str) -> Result<Self, OpenApiError> {
        let value: Value =
            serde_yaml::from_str(source).map_err(|e| OpenApiError::Parse(e.to_string()))?;
        let inlined = inline_refs(&value, &value, 0)?;
        let raw: RawDocument =
            serde_json::from_value(inlined).map_err(|e| OpenApiError::Parse(e.to_string()))?;

        let mut paths = BTreeMap::new();
        for (path, methods) in raw.paths {
            let mut operations = BTreeMap::new();
            for (method, op) in methods {
                let location = format!("{} {}", method.to_uppercase(), path);
                operations.insert(method.to_lowercase(), compile_operation(op, &location)?);
            }
            paths.insert(path, operations);
        }

        Ok(Self {
            title: raw.info.title,
            version: raw.info.version,
            paths,
        })
    }

    /// Document title from `info.title`.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Document version from `info.version`.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared paths, sorted.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    /// Operations declared on a path, keyed by lowercase method.
    pub fn path_item(&self, path: &str) -> Option<&BTreeMap<String, Operation>> {
        self.paths.get(path)
    }

    /// Look up an operation by path and method (any case).
    pub fn operation(&self, path: &str, method: &str) -> Option<&Operation> {
        self.paths
            .get(path)
            .and_then(|ops| ops.get(&method.to_lowercase()))
    }
}

fn compile_operation(op: RawOperation, location: &str) -> Result<Operation, OpenApiError> {
    let parameters = op
        .parameters
        .into_iter()
        .map(|p| {
            let schema = p
                .schema
                .map(|s| CompiledSchema::compile(s, &format!("{} parameter {}", location, p.name)))
                .transpose()?;
            Ok(Parameter {
                name: p.name,
                location: p.location,
                required: p.required,
                schema,
            })
        })
        .collect::<Result<Vec<_>, OpenApiError>>()?;

    let request_body = op
        .request_body
        .map(|body| {
            Ok::<_, OpenApiError>(RequestBody {
                required: body.required,
                content: compile_content(body.content, &format!("{} requestBody", location))?,
            })
        })
        .transpose()?;

    let mut responses = BTreeMap::new();
    for (status, response) in op.responses {
        let required_headers = response
            .headers
            .into_iter()
            .filter(|(_, h)| h.required)
            .map(|(name, _)| name.to_lowercase())
            .collect();
        let content = compile_content(
            response.content,
            &format!("{} response {}", location, status),
        )?;
        let key = if status.eq_ignore_ascii_case("default") {
            "default".to_string()
        } else {
            status.to_uppercase()
        };
        responses.insert(
            key,
            ResponseSpec {
                required_headers,
                content,
            },
        );
    }

    Ok(Operation {
        operation_id: op.operation_id,
        parameters,
        request_body,
        responses,
    })
}

fn compile_content(
    content: BTreeMap<String, RawMedia>,
    location: &str,
) -> Result<BTreeMap<String, Option<CompiledSchema>>, OpenApiError> {
    content
        .into_iter()
        .map(|(media, spec)| {
            let schema = spec
                .schema
                .map(|s| CompiledSchema::compile(s, &format!("{} {}", location, media)))
                .transpose()?;
            Ok((media.to_lowercase(), schema))
        })
        .collect()
}

/// Replace every local `{"$ref": "#/..."}` with the referenced value.
fn inline_refs(value: &Value, root: &Value, depth: usize) -> Result<Value, OpenApiError> {
    match value {
        Value::Object(map) => {
            if let Some(Value::String(reference)) = map.get("$ref") {
                if depth >= MAX_REF_DEPTH {
                    return Err(OpenApiError::RefDepth(reference.clone()));
                }
                let pointer = reference
                    .strip_prefix('#')
                    .ok_or_else(|| OpenApiError::UnresolvedRef(reference.clone()))?;
                let target = root
                    .pointer(pointer)
                    .ok_or_else(|| OpenApiError::UnresolvedRef(reference.clone()))?;
                return inline_refs(target, root, depth + 1);
            }
            let mut out = serde_json::Map::with_capacity(map.len());
            for (key, child) in map {
                out.insert(key.clone(), inline_refs(child, root, depth)?);
            }
            Ok(Value::Object(out))
        }
        Value::Array(items) => items
            .iter()
            .map(|item| inline_refs(item, root, depth))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        other => Ok(other.clone()),
    }
}
