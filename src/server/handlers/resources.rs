//! server::handlers::resources
//!
//! Fixed-shape scaffold endpoints: `/v1/creator/*` (gzip) and
//! `/v2/creator/*` (plain tar).
//!
//! # Design
//!
//! Each endpoint has a typed body implementing [`ResourceSpec`], which maps
//! it onto a command path, backend parameters and an archive name. One
//! generic handler does the rest, so the fixed routes and the dynamic
//! `scaffold` route share the same backend, archive and cleanup path.

use axum::extract::{Request, State};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::archive::Compression;
use crate::openapi::ApiResponse;
use crate::server::pipeline::{archive_result, run_backend, validated};
use crate::server::state::AppState;

/// A request body that names one scaffold command.
pub trait ResourceSpec: DeserializeOwned + Send {
    fn command_path(&self) -> Vec<String>;
    fn params(&self) -> Map<String, Value>;
    /// Archive file name without extension.
    fn archive_stem(&self) -> String;
}

fn path(segments: &[&str]) -> Vec<String> {
    segments.iter().map(|s| s.to_string()).collect()
}

fn param_map<const N: usize>(pairs: [(&str, Option<&str>); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .filter_map(|(k, v)| v.map(|v| (k.to_string(), Value::from(v))))
        .collect()
}

/// `{collection, project}`: a new collection.
#[derive(Debug, Deserialize)]
pub struct CollectionBody {
    pub collection: String,
    pub project: String,
}

impl ResourceSpec for CollectionBody {
    fn command_path(&self) -> Vec<String> {
        path(&["init", "collection"])
    }

    fn params(&self) -> Map<String, Value> {
        param_map([
            ("collection", Some(self.collection.as_str())),
            ("project", Some(self.project.as_str())),
        ])
    }

    fn archive_stem(&self) -> String {
        self.collection.clone()
    }
}

/// `{project, scm_org, scm_project}`: a v1 playbook project.
#[derive(Debug, Deserialize)]
pub struct PlaybookV1Body {
    pub project: String,
    pub scm_org: String,
    pub scm_project: String,
}

impl ResourceSpec for PlaybookV1Body {
    fn command_path(&self) -> Vec<String> {
        path(&["init", "playbook"])
    }

    fn params(&self) -> Map<String, Value> {
        let fqcn = format!("{}.{}", self.scm_org, self.scm_project);
        param_map([
            ("collection", Some(fqcn.as_str())),
            ("project", Some(self.project.as_str())),
        ])
    }

    fn archive_stem(&self) -> String {
        format!("{}-{}", self.scm_org, self.scm_project)
    }
}

/// `{project, namespace, collection_name}`: a v2 playbook project.
#[derive(Debug, Deserialize)]
pub struct PlaybookV2Body {
    pub project: String,
    pub namespace: String,
    pub collection_name: String,
}

impl ResourceSpec for PlaybookV2Body {
    fn command_path(&self) -> Vec<String> {
        path(&["init", "playbook"])
    }

    fn params(&self) -> Map<String, Value> {
        let fqcn = format!("{}.{}", self.namespace, self.collection_name);
        param_map([
            ("collection", Some(fqcn.as_str())),
            ("project", Some(self.project.as_str())),
        ])
    }

    fn archive_stem(&self) -> String {
        format!("{}-{}", self.namespace, self.collection_name)
    }
}

/// Optional `{image}`; `project` and `collection` are accepted and ignored.
#[derive(Debug, Deserialize)]
pub struct DevfileBody {
    pub project: Option<String>,
    pub collection: Option<String>,
    pub image: Option<String>,
}

impl ResourceSpec for DevfileBody {
    fn command_path(&self) -> Vec<String> {
        path(&["add", "resource", "devfile"])
    }

    fn params(&self) -> Map<String, Value> {
        param_map([("image", self.image.as_deref())])
    }

    fn archive_stem(&self) -> String {
        "devfile".to_string()
    }
}

/// `{pattern_name}`: a pattern skeleton.
#[derive(Debug, Deserialize)]
pub struct PatternBody {
    pub pattern_name: String,
}

impl ResourceSpec for PatternBody {
    fn command_path(&self) -> Vec<String> {
        path(&["add", "resource", "pattern"])
    }

    fn params(&self) -> Map<String, Value> {
        param_map([("pattern_name", Some(self.pattern_name.as_str()))])
    }

    fn archive_stem(&self) -> String {
        self.pattern_name.clone()
    }
}

async fn scaffold_resource<T: ResourceSpec>(
    state: AppState,
    req: Request,
    compression: Compression,
) -> ApiResponse {
    let run = async {
        let (api_req, request) = validated(&state, req).await?;
        let body: T = request.body_as().map_err(|e| {
            ApiResponse::bad_request(format!("Request body validation error: {}", e))
        })?;

        let result = run_backend(&state, body.command_path(), body.params()).await?;
        let archived = archive_result(result, body.archive_stem(), compression).await?;
        Ok::<_, ApiResponse>(
            state
                .openapi
                .validate_response(&api_req, archived.into_response()),
        )
    };
    match run.await {
        Ok(resp) | Err(resp) => resp,
    }
}

/// `POST /v1/creator/playbook`
pub async fn v1_playbook(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<PlaybookV1Body>(state, req, Compression::Gzip).await
}

/// `POST /v1/creator/collection`
pub async fn v1_collection(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<CollectionBody>(state, req, Compression::Gzip).await
}

/// `POST /v2/creator/playbook`
pub async fn v2_playbook(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<PlaybookV2Body>(state, req, Compression::None).await
}

/// `POST /v2/creator/collection`
pub async fn v2_collection(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<CollectionBody>(state, req, Compression::None).await
}

/// `POST /v2/creator/devfile`
pub async fn v2_devfile(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<DevfileBody>(state, req, Compression::None).await
}

/// `POST /v2/creator/pattern`
pub async fn v2_pattern(State(state): State<AppState>, req: Request) -> ApiResponse {
    scaffold_resource::<PatternBody>(state, req, Compression::None).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn playbook_bodies_map_to_fqcn() {
        let v1: PlaybookV1Body = serde_json::from_value(serde_json::json!({
            "project": "ansible-project",
            "scm_org": "acme",
            "scm_project": "web",
        }))
        .unwrap();
        assert_eq!(v1.params()["collection"], "acme.web");
        assert_eq!(v1.archive_stem(), "acme-web");
        assert_eq!(v1.command_path(), vec!["init", "playbook"]);
    }

    #[test]
    fn devfile_params_omit_absent_image() {
        let body: DevfileBody = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(body.params().is_empty());

        let body: DevfileBody =
            serde_json::from_value(serde_json::json!({"image": "ubi9"})).unwrap();
        assert_eq!(body.params()["image"], "ubi9");
    }
}
