//! openapi
//!
//! OpenAPI-driven validation of HTTP requests and responses.
//!
//! The server treats its OpenAPI document as an oracle: every request is
//! checked before a handler sees it, and every successful response is checked
//! before it leaves. See [`validate`] for the exact rules.
//!
//! # Example
//!
//! ```
//! use adt::openapi::{ApiRequest, OpenApi};
//!
//! let api = OpenApi::bundled().unwrap();
//! let req = ApiRequest::new("GET", "/v2/creator/schema");
//! let rejected = api.validate_request(&req).unwrap_err();
//! assert_eq!(rejected.status, 400);
//! assert!(rejected.body_text().contains("command_path"));
//! ```

mod document;
mod message;
pub mod validate;

pub use document::{
    CompiledSchema, OpenApi, OpenApiError, Operation, ParamLocation, Parameter, RequestBody,
    ResponseSpec, BUNDLED_DOCUMENT,
};
pub use message::{ApiRequest, ApiResponse, ValidatedRequest};
