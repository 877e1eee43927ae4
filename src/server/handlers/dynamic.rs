//! server::handlers::dynamic
//!
//! Schema-driven endpoints that expose the whole capability tree:
//! `capabilities`, `schema` and `scaffold`.

use axum::extract::{Request, State};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::archive::Compression;
use crate::openapi::ApiResponse;
use crate::server::pipeline::{archive_result, run_backend, validated};
use crate::server::response::{error_json, scaffold_error};
use crate::server::state::AppState;

/// Body of `POST /v2/creator/scaffold`.
#[derive(Debug, Deserialize)]
struct ScaffoldRequest {
    #[serde(default)]
    command_path: Vec<String>,
    #[serde(default)]
    params: Map<String, Value>,
}

/// `GET /v2/creator/capabilities`
pub async fn capabilities(State(state): State<AppState>, req: Request) -> ApiResponse {
    let (api_req, _) = match validated(&state, req).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match serde_json::to_value(state.backend.capabilities()) {
        Ok(tree) => state
            .openapi
            .validate_response(&api_req, ApiResponse::json(200, &tree)),
        Err(e) => error_json(e.to_string()),
    }
}

/// `GET /v2/creator/schema?command_path=..&command_path=..`
pub async fn schema(State(state): State<AppState>, req: Request) -> ApiResponse {
    let (api_req, request) = match validated(&state, req).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let segments = request.query_values("command_path");
    if segments.is_empty() {
        return ApiResponse::bad_request("Missing required query parameter: command_path");
    }

    let node = match state.backend.schema_for(&segments) {
        Ok(node) => node,
        Err(e) => return error_json(e.to_string()),
    };
    match serde_json::to_value(node) {
        Ok(body) => state
            .openapi
            .validate_response(&api_req, ApiResponse::json(200, &body)),
        Err(e) => error_json(e.to_string()),
    }
}

/// `POST /v2/creator/scaffold`
pub async fn scaffold(State(state): State<AppState>, req: Request) -> ApiResponse {
    match run_scaffold(&state, req).await {
        Ok(resp) | Err(resp) => resp,
    }
}

async fn run_scaffold(state: &AppState, req: Request) -> Result<ApiResponse, ApiResponse> {
    let (api_req, request) = validated(state, req).await?;
    let body: ScaffoldRequest = request
        .body_as()
        .map_err(|e| ApiResponse::bad_request(format!("Request body validation error: {}", e)))?;

    if body.command_path.is_empty() {
        return Err(scaffold_error("Missing command_path", &[]));
    }

    let stem = body.command_path.join("_");
    let result = run_backend(state, body.command_path, body.params).await?;
    let archived = archive_result(result, stem, Compression::None).await?;

    Ok(state
        .openapi
        .validate_response(&api_req, archived.into_response_with_logs()))
}
