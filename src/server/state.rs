//! server::state
//!
//! Shared router state.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::openapi::OpenApi;
use crate::scaffold::ScaffoldBackend;

use super::settings::Settings;

/// Everything a handler needs; cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub openapi: Arc<OpenApi>,
    pub backend: Arc<dyn ScaffoldBackend>,
    pub settings: Arc<Settings>,
    /// Tool versions, probed once at startup.
    pub versions: Arc<BTreeMap<String, String>>,
}

impl AppState {
    pub fn new(
        openapi: OpenApi,
        backend: Arc<dyn ScaffoldBackend>,
        settings: Settings,
        versions: BTreeMap<String, String>,
    ) -> Self {
        Self {
            openapi: Arc::new(openapi),
            backend,
            settings: Arc::new(settings),
            versions: Arc::new(versions),
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("backend", &self.backend.name())
            .field("settings", &self.settings)
            .field("versions", &self.versions.len())
            .finish_non_exhaustive()
    }
}
