//! server
//!
//! The HTTP endpoint layer behind `adt server`.
//!
//! # Design
//!
//! [`routes`] is the single route table: it feeds both the axum router and
//! the `apis` section of `/metadata`. Handlers are registered with `any()` so
//! that a wrong method still reaches the OpenAPI validator and is answered
//! with its 400 text rather than axum's 405. Unknown paths fall through to a
//! plain 404.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use adt::core::config::Config;
//! use adt::openapi::OpenApi;
//! use adt::scaffold::TemplateBackend;
//! use adt::server::{serve, AppState, ServerOverrides, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::init(&Config::load()?, &ServerOverrides::default())?;
//! let state = AppState::new(
//!     OpenApi::bundled()?,
//!     Arc::new(TemplateBackend::new()),
//!     settings,
//!     Default::default(),
//! );
//! serve(state).await?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! # });
//! ```

pub mod access_log;
pub mod handlers;
pub mod pipeline;
pub mod response;
pub mod settings;
pub mod state;

use std::collections::BTreeMap;
use std::io;

use axum::http::StatusCode;
use axum::routing::{any, MethodRouter};
use axum::{middleware, Router};
use tokio::net::TcpListener;

pub use settings::{ServerOverrides, Settings};
pub use state::AppState;

use handlers::{dynamic, metadata, resources};

/// Every route served, in registration order.
pub fn routes() -> Vec<(&'static str, MethodRouter<AppState>)> {
    vec![
        ("/metadata", any(metadata::metadata)),
        ("/v1/creator/playbook", any(resources::v1_playbook)),
        ("/v1/creator/collection", any(resources::v1_collection)),
        ("/v2/creator/playbook", any(resources::v2_playbook)),
        ("/v2/creator/collection", any(resources::v2_collection)),
        ("/v2/creator/devfile", any(resources::v2_devfile)),
        ("/v2/creator/pattern", any(resources::v2_pattern)),
        ("/v2/creator/capabilities", any(dynamic::capabilities)),
        ("/v2/creator/schema", any(dynamic::schema)),
        ("/v2/creator/scaffold", any(dynamic::scaffold)),
    ]
}

/// Route paths grouped by their first segment, e.g. `v2` → `[/v2/...]`.
pub fn api_groups() -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for (path, _) in routes() {
        let key = path
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default()
            .to_string();
        groups.entry(key).or_default().push(path.to_string());
    }
    groups
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Build the router for the given state.
pub fn router(state: AppState) -> Router {
    let mut router = Router::new();
    for (path, route) in routes() {
        router = router.route(path, route);
    }
    let mut router = router.fallback(not_found);
    if state.settings.debug {
        router = router.layer(middleware::from_fn(access_log::access_log));
    }
    router.with_state(state)
}

/// Bind to the configured address and serve until Ctrl-C.
pub async fn serve(state: AppState) -> io::Result<()> {
    let listener = TcpListener::bind(state.settings.addr).await?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener until Ctrl-C.
pub async fn serve_on(listener: TcpListener, state: AppState) -> io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        backend = state.backend.name(),
        debug = state.settings.debug,
        timeout_secs = state.settings.scaffold_timeout.as_secs(),
        "listening"
    );
    if state.settings.secret_key.is_generated() {
        tracing::debug!("SECRET_KEY not set; generated a key for this process");
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openapi::OpenApi;

    #[test]
    fn every_route_is_documented() {
        let api = OpenApi::bundled().unwrap();
        let documented: Vec<&str> = api.paths().collect();
        for (path, _) in routes() {
            assert!(documented.contains(&path), "{} missing from openapi.yaml", path);
        }
        assert_eq!(documented.len(), routes().len());
    }

    #[test]
    fn groups_split_on_first_segment() {
        let groups = api_groups();
        assert_eq!(groups["metadata"], vec!["/metadata"]);
        assert_eq!(groups["v1"].len(), 2);
        assert!(groups["v2"].contains(&"/v2/creator/scaffold".to_string()));
    }
}
