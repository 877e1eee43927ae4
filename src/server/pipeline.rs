//! server::pipeline
//!
//! The per-request pipeline shared by every endpoint.
//!
//! # States
//!
//! ```text
//! Received -> Validated -> Executing -> Succeeded -> Archived -> ResponseValidated
//!                                    \-> Failed -> ErrorReported
//! ```
//!
//! Every path ends with the scaffold working directory removed. Backend calls
//! run on the blocking pool under a timeout; a call abandoned by the timeout
//! keeps ownership of its directory and removes it when it finishes.

use axum::body::to_bytes;
use axum::extract::{Query, Request};
use axum::http::header;
use serde_json::{Map, Value};

use crate::archive::{self, Compression};
use crate::openapi::{ApiRequest, ApiResponse, ValidatedRequest};
use crate::scaffold::{ScaffoldResult, ScaffoldStatus};

use super::response::{attachment, header_safe, scaffold_error};
use super::state::AppState;

/// Largest request body accepted.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Convert an axum request into the validator's view of it.
pub async fn api_request(req: Request) -> Result<ApiRequest, ApiResponse> {
    let (parts, body) = req.into_parts();

    let query = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri)
        .map(|Query(pairs)| pairs)
        .map_err(|e| ApiResponse::bad_request(format!("Invalid query string: {}", e)))?;

    let host = parts
        .headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| parts.uri.authority().map(|a| a.to_string()))
        .unwrap_or_else(|| "localhost".to_string());

    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let body = to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|e| ApiResponse::bad_request(format!("Failed to read request body: {}", e)))?;

    Ok(ApiRequest {
        method: parts.method.as_str().to_uppercase(),
        path: parts.uri.path().to_string(),
        host,
        query,
        content_type,
        body: body.to_vec(),
    })
}

/// Extract and validate a request in one step.
pub async fn validated(
    state: &AppState,
    req: Request,
) -> Result<(ApiRequest, ValidatedRequest), ApiResponse> {
    let api_req = api_request(req).await?;
    let validated = state.openapi.validate_request(&api_req)?;
    Ok((api_req, validated))
}

/// Run a backend command on the blocking pool, bounded by the configured
/// timeout.
///
/// # Errors
///
/// A 400 JSON error response when the call times out or the task panics.
pub async fn run_backend(
    state: &AppState,
    command_path: Vec<String>,
    params: Map<String, Value>,
) -> Result<ScaffoldResult, ApiResponse> {
    let backend = state.backend.clone();
    let limit = state.settings.scaffold_timeout;
    let label = command_path.join(" ");

    tracing::debug!(backend = backend.name(), command = %label, "running scaffold");
    let task = tokio::task::spawn_blocking(move || backend.run(&command_path, &params));

    match tokio::time::timeout(limit, task).await {
        Ok(Ok(result)) => {
            tracing::debug!(command = %label, status = ?result.status(), "scaffold finished");
            Ok(result)
        }
        Ok(Err(e)) => {
            tracing::error!(command = %label, error = %e, "scaffold task failed");
            Err(scaffold_error(format!("scaffold task failed: {}", e), &[]))
        }
        Err(_) => {
            tracing::warn!(command = %label, timeout_secs = limit.as_secs(), "scaffold timed out");
            Err(scaffold_error(
                format!("scaffold timed out after {}s", limit.as_secs()),
                &[],
            ))
        }
    }
}

/// A successfully archived scaffold.
#[derive(Debug)]
pub struct Archived {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub compression: Compression,
    pub message: String,
    pub logs: Vec<String>,
}

impl Archived {
    /// 201 response carrying the archive and its `Content-Disposition`.
    pub fn into_response(self) -> ApiResponse {
        ApiResponse::binary(201, self.compression.content_type(), self.bytes)
            .with_header("Content-Disposition", attachment(&self.file_name))
    }

    /// Like [`Archived::into_response`], plus the `X-Creator-*` headers.
    pub fn into_response_with_logs(self) -> ApiResponse {
        let logs = serde_json::to_string(&self.logs).unwrap_or_else(|_| "[]".to_string());
        let message = header_safe(&self.message);
        self.into_response()
            .with_header("X-Creator-Logs", header_safe(&logs))
            .with_header("X-Creator-Message", message)
    }
}

/// Turn a backend result into archive bytes, removing its directory.
///
/// # Errors
///
/// A 400 scaffold error response when the backend failed, produced no
/// output, or archiving failed. The working directory is removed in every
/// case.
pub async fn archive_result(
    result: ScaffoldResult,
    stem: String,
    compression: Compression,
) -> Result<Archived, ApiResponse> {
    let (status, message, logs, output) = result.into_parts();

    if status == ScaffoldStatus::Error {
        if let Some(partial) = output {
            if let Err(e) = partial.cleanup() {
                tracing::warn!(error = %e, "failed to remove partial scaffold output");
            }
        }
        return Err(scaffold_error(message, &logs));
    }

    let Some(output) = output else {
        return Err(scaffold_error("No output path", &logs));
    };

    let file_name = compression.file_name(&stem);
    let name = file_name.clone();
    let task = tokio::task::spawn_blocking(move || {
        let dest = output.workdir().join(&name);
        let bytes = archive::create_tar(output.path(), &dest, compression).and_then(|()| {
            std::fs::read(&dest).map_err(|source| archive::ArchiveError::Read {
                path: dest.clone(),
                source,
            })
        });
        if let Err(e) = output.cleanup() {
            tracing::warn!(error = %e, "failed to remove scaffold working directory");
        }
        bytes
    });

    match task.await {
        Ok(Ok(bytes)) => Ok(Archived {
            bytes,
            file_name,
            compression,
            message,
            logs,
        }),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "archiving failed");
            Err(scaffold_error(e.to_string(), &logs))
        }
        Err(e) => Err(scaffold_error(format!("archive task failed: {}", e), &logs)),
    }
}
