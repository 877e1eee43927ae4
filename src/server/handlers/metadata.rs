//! server::handlers::metadata
//!
//! `GET /metadata`: tool versions and the route table.

use axum::extract::{Request, State};
use serde_json::json;

use crate::openapi::ApiResponse;
use crate::server::pipeline::validated;
use crate::server::state::AppState;
use crate::server::api_groups;

pub async fn metadata(State(state): State<AppState>, req: Request) -> ApiResponse {
    let (api_req, _) = match validated(&state, req).await {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    let body = json!({
        "versions": &*state.versions,
        "apis": api_groups(),
    });
    state
        .openapi
        .validate_response(&api_req, ApiResponse::json(200, &body))
}
