//! Integration tests for the HTTP server.
//!
//! Each test starts a real server on an ephemeral port and talks to it over
//! HTTP, so requests go through routing, validation, the backend, archiving
//! and response validation exactly as they do in production.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use adt::archive::{self, Compression};
use adt::openapi::OpenApi;
use adt::scaffold::mock::{FailOn, MockBackend};
use adt::scaffold::{ScaffoldBackend, TemplateBackend};
use adt::server::{serve_on, AppState, Settings};

// =============================================================================
// Test Fixtures
// =============================================================================

/// A running server and a client pointed at it.
struct TestServer {
    addr: SocketAddr,
    client: reqwest::Client,
    task: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn start(backend: Arc<dyn ScaffoldBackend>, timeout: Duration) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut versions = std::collections::BTreeMap::new();
        versions.insert("ansible-dev-tools".to_string(), "0.3.0".to_string());
        let state = AppState::new(
            OpenApi::bundled().unwrap(),
            backend,
            Settings::local(timeout),
            versions,
        );

        let task = tokio::spawn(async move {
            serve_on(listener, state).await.unwrap();
        });

        Self {
            addr,
            client: reqwest::Client::new(),
            task,
        }
    }

    async fn templates() -> Self {
        Self::start(Arc::new(TemplateBackend::new()), Duration::from_secs(30)).await
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    async fn scaffold(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/v2/creator/scaffold"))
            .json(&body)
            .send()
            .await
            .unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

fn header<'a>(resp: &'a reqwest::Response, name: &str) -> &'a str {
    resp.headers()
        .get(name)
        .unwrap_or_else(|| panic!("missing header {}", name))
        .to_str()
        .unwrap()
}

// =============================================================================
// Dynamic scaffold endpoint
// =============================================================================

#[tokio::test]
async fn init_collection_returns_tar_with_galaxy_yml() {
    let server = TestServer::templates().await;

    let resp = server
        .scaffold(json!({
            "command_path": ["init", "collection"],
            "params": {"collection": "acme.web"},
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar");
    assert!(header(&resp, "content-disposition").contains("init_collection.tar"));
    let logs: Vec<String> = serde_json::from_str(header(&resp, "x-creator-logs")).unwrap();
    assert!(!logs.is_empty());
    assert!(header(&resp, "x-creator-message").contains("acme.web"));

    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::None).unwrap();
    assert!(names.iter().all(|n| n.starts_with("./")), "{:?}", names);
    assert!(names.contains(&"./galaxy.yml".to_string()));
}

#[tokio::test]
async fn init_nonexistent_is_an_error_naming_the_segment() {
    let server = TestServer::templates().await;

    let resp = server
        .scaffold(json!({"command_path": ["init", "nonexistent"], "params": {}}))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("nonexistent"));
}

#[tokio::test]
async fn empty_command_path_is_rejected_with_empty_logs() {
    let server = TestServer::templates().await;

    let resp = server.scaffold(json!({"command_path": [], "params": {}})).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert_eq!(body["logs"], json!([]));
}

#[tokio::test]
async fn missing_command_path_is_rejected() {
    let server = TestServer::templates().await;

    let resp = server.scaffold(json!({"params": {}})).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("command_path"));
}

#[tokio::test]
async fn invalid_params_are_rejected() {
    let server = TestServer::templates().await;

    let resp = server
        .scaffold(json!({
            "command_path": ["init", "collection"],
            "params": {"collection": "not-an-fqcn"},
        }))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn non_json_body_is_rejected() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/scaffold"))
        .header("content-type", "text/plain")
        .body("init collection")
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("mimetype"));
}

// =============================================================================
// Capabilities and schema
// =============================================================================

#[tokio::test]
async fn capabilities_are_byte_identical_across_calls() {
    let server = TestServer::templates().await;
    let url = server.url("/v2/creator/capabilities");

    let first = server.client.get(&url).send().await.unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let first = first.bytes().await.unwrap();
    let second = server.client.get(&url).send().await.unwrap().bytes().await.unwrap();
    assert_eq!(first, second);

    let tree: Value = serde_json::from_slice(&first).unwrap();
    assert_eq!(tree["name"], "ansible-creator");
    assert!(tree["subcommands"]["init"]["subcommands"]["collection"].is_object());
}

#[tokio::test]
async fn schema_for_leaf_returns_parameters() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .get(server.url("/v2/creator/schema?command_path=init&command_path=collection"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["name"], "collection");
    assert!(body["parameters"]["properties"]["collection"].is_object());
}

#[tokio::test]
async fn schema_without_params_mentions_command_path() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .get(server.url("/v2/creator/schema"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("command_path"));
}

#[tokio::test]
async fn unresolvable_schema_path_is_error_json() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .get(server.url("/v2/creator/schema?command_path=init&command_path=bogus"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("bogus"));
}

// =============================================================================
// Fixed resource endpoints
// =============================================================================

#[tokio::test]
async fn v1_collection_is_gzipped() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v1/creator/collection"))
        .json(&json!({"collection": "acme.web", "project": "collection"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar+gzip");
    assert!(header(&resp, "content-disposition").contains("acme.web.tar.gz"));
    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::Gzip).unwrap();
    assert!(names.contains(&"./galaxy.yml".to_string()));
}

#[tokio::test]
async fn v2_playbook_is_plain_tar() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/playbook"))
        .json(&json!({
            "project": "ansible-project",
            "namespace": "acme",
            "collection_name": "web",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar");
    assert!(header(&resp, "content-disposition").contains("acme-web.tar"));
}

#[tokio::test]
async fn v2_devfile_accepts_empty_body() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/devfile"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::None).unwrap();
    assert!(names.iter().all(|n| n.starts_with("./")));
}

#[tokio::test]
async fn collection_body_missing_field_is_rejected() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/collection"))
        .json(&json!({"project": "collection"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_requiring_routes_reject_missing_body() {
    let server = TestServer::templates().await;

    for route in [
        "/v1/creator/playbook",
        "/v1/creator/collection",
        "/v2/creator/playbook",
        "/v2/creator/collection",
        "/v2/creator/pattern",
        "/v2/creator/scaffold",
    ] {
        let resp = server.client.post(server.url(route)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", route);
        assert_eq!(
            resp.text().await.unwrap(),
            "Missing required request body",
            "{}",
            route
        );
    }
}

#[tokio::test]
async fn v2_pattern_is_named_after_the_pattern() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/pattern"))
        .json(&json!({"pattern_name": "web"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar");
    assert!(header(&resp, "content-disposition").contains("filename=\"web.tar\""));
    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::None).unwrap();
    assert!(names.iter().any(|n| n.starts_with("./extensions/patterns/web/")), "{:?}", names);
}

#[tokio::test]
async fn v1_playbook_is_gzipped_and_named_after_scm() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v1/creator/playbook"))
        .json(&json!({
            "project": "ansible-project",
            "scm_org": "acme",
            "scm_project": "web",
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar+gzip");
    assert!(header(&resp, "content-disposition").contains("filename=\"acme-web.tar.gz\""));
    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::Gzip).unwrap();
    assert!(names.contains(&"./site.yml".to_string()), "{:?}", names);
}

#[tokio::test]
async fn v2_collection_is_plain_tar() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .post(server.url("/v2/creator/collection"))
        .json(&json!({"collection": "acme.web", "project": "collection"}))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(header(&resp, "content-type"), "application/tar");
    assert!(header(&resp, "content-disposition").contains("filename=\"acme.web.tar\""));
    let bytes = resp.bytes().await.unwrap();
    let names = archive::entry_names(&bytes, Compression::None).unwrap();
    assert!(names.contains(&"./galaxy.yml".to_string()));
}

// =============================================================================
// Metadata and routing
// =============================================================================

#[tokio::test]
async fn metadata_lists_versions_and_apis() {
    let server = TestServer::templates().await;

    let resp = server.client.get(server.url("/metadata")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["versions"]["ansible-dev-tools"], "0.3.0");
    let v2 = body["apis"]["v2"].as_array().unwrap();
    assert!(v2.contains(&json!("/v2/creator/scaffold")));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let server = TestServer::templates().await;

    let resp = server.client.get(server.url("/v3/nothing")).send().await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn capabilities_and_schema_reject_post() {
    let server = TestServer::templates().await;

    for (route, method) in [
        ("/v2/creator/capabilities", "post"),
        ("/v2/creator/schema?command_path=init&command_path=collection", "post"),
    ] {
        let resp = server.client.post(server.url(route)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", route);
        let text = resp.text().await.unwrap();
        assert!(text.contains(&format!("Operation {} not found for ", method)), "{}", text);
    }
}

#[tokio::test]
async fn wrong_method_is_rejected_by_validator() {
    let server = TestServer::templates().await;

    let resp = server
        .client
        .get(server.url("/v2/creator/scaffold"))
        .send()
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("Operation get not found for "));
}

// =============================================================================
// Backend failures, timeouts and cleanup
// =============================================================================

#[tokio::test]
async fn working_directories_are_removed_after_success() {
    let backend = Arc::new(MockBackend::new());
    let server = TestServer::start(backend.clone(), Duration::from_secs(30)).await;

    for _ in 0..3 {
        let resp = server
            .scaffold(json!({"command_path": ["init", "collection"], "params": {}}))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let workdirs = backend.workdirs();
    assert_eq!(workdirs.len(), 3);
    for dir in workdirs {
        assert!(!dir.exists(), "{} was left behind", dir.display());
    }
}

#[tokio::test]
async fn partial_output_is_removed_on_failure() {
    let backend = Arc::new(
        MockBackend::new().fail_on(FailOn::RunWithPartialOutput("template exploded".to_string())),
    );
    let server = TestServer::start(backend.clone(), Duration::from_secs(30)).await;

    let resp = server
        .scaffold(json!({"command_path": ["init", "collection"], "params": {}}))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "template exploded");
    assert!(body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .any(|l| l.as_str().unwrap().contains("template exploded")));
    for dir in backend.workdirs() {
        assert!(!dir.exists());
    }
}

#[tokio::test]
async fn slow_backend_times_out() {
    let backend = Arc::new(MockBackend::new().with_delay(Duration::from_millis(2500)));
    let server = TestServer::start(backend.clone(), Duration::from_secs(1)).await;

    let resp = server
        .scaffold(json!({"command_path": ["init", "collection"], "params": {}}))
        .await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().contains("timed out after 1s"));

    // The abandoned call still owns its directory and removes it on return.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    for dir in backend.workdirs() {
        assert!(!dir.exists());
    }
}

#[tokio::test]
async fn failures_are_not_sticky() {
    let backend = Arc::new(MockBackend::new().fail_on(FailOn::Run("boom".to_string())));
    let server = TestServer::start(backend.clone(), Duration::from_secs(30)).await;
    let body = json!({"command_path": ["init", "collection"], "params": {}});

    assert_eq!(server.scaffold(body.clone()).await.status(), StatusCode::BAD_REQUEST);
    backend.clear_fail_on();
    assert_eq!(server.scaffold(body).await.status(), StatusCode::CREATED);
    assert_eq!(backend.operations().len(), 2);
}
