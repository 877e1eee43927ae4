//! scaffold::mock
//!
//! Mock scaffolding backend for deterministic testing.
//!
//! # Design
//!
//! The mock serves the built-in capability tree but writes a single marker
//! file instead of rendering templates. It records every call, can be told
//! to fail (with or without partial output left behind), and can be slowed
//! down to exercise timeouts. Working directories it hands out are recorded
//! so tests can assert they were removed.
//!
//! # Example
//!
//! ```
//! use adt::scaffold::mock::{FailOn, MockBackend};
//! use adt::scaffold::{ScaffoldBackend, ScaffoldStatus};
//! use serde_json::Map;
//!
//! let backend = MockBackend::new().fail_on(FailOn::Run("boom".into()));
//! let path = vec!["init".to_string(), "execution_env".to_string()];
//! let result = backend.run(&path, &Map::new());
//!
//! assert_eq!(result.status(), ScaffoldStatus::Error);
//! assert_eq!(backend.operations().len(), 1);
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use serde_json::{Map, Value};

use super::logs::LogBuffer;
use super::tree::{self, CapabilityNode};
use super::{workspace, ScaffoldBackend, ScaffoldOutput, ScaffoldResult};

/// Name of the file every successful mock run writes.
pub const MARKER_FILE: &str = "scaffolded.txt";

/// Mock backend for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share state.
#[derive(Debug, Clone)]
pub struct MockBackend {
    tree: Arc<CapabilityNode>,
    inner: Arc<Mutex<MockBackendInner>>,
}

#[derive(Debug, Default)]
struct MockBackendInner {
    fail_on: Option<FailOn>,
    delay: Option<Duration>,
    operations: Vec<MockOperation>,
    workdirs: Vec<PathBuf>,
}

/// Configuration for how `run` should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail before creating any output.
    Run(String),
    /// Fail after writing partial output into the working directory.
    RunWithPartialOutput(String),
}

/// Recorded call for test verification.
#[derive(Debug, Clone, PartialEq)]
pub enum MockOperation {
    Run {
        path: Vec<String>,
        params: Map<String, Value>,
    },
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            tree: Arc::new(tree::builtin()),
            inner: Arc::new(Mutex::new(MockBackendInner::default())),
        }
    }

    /// Configure a failure for subsequent runs.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// Sleep this long inside every run.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.lock().delay = Some(delay);
        self
    }

    pub fn clear_fail_on(&self) {
        self.lock().fail_on = None;
    }

    /// All recorded calls, oldest first.
    pub fn operations(&self) -> Vec<MockOperation> {
        self.lock().operations.clone()
    }

    /// Every working directory handed out so far.
    pub fn workdirs(&self) -> Vec<PathBuf> {
        self.lock().workdirs.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MockBackendInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaffoldBackend for MockBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn capabilities(&self) -> &CapabilityNode {
        &self.tree
    }

    fn run(&self, path: &[String], params: &Map<String, Value>) -> ScaffoldResult {
        let (fail_on, delay) = {
            let mut inner = self.lock();
            inner.operations.push(MockOperation::Run {
                path: path.to_vec(),
                params: params.clone(),
            });
            (inner.fail_on.clone(), inner.delay)
        };

        let mut logs = LogBuffer::new();
        if let Err(e) = self.tree.resolve(path) {
            logs.error(e.to_string());
            return ScaffoldResult::error(e.to_string(), logs.into_lines(), None);
        }

        if let Some(FailOn::Run(message)) = &fail_on {
            logs.error(message);
            return ScaffoldResult::error(message.clone(), logs.into_lines(), None);
        }

        let workdir = match workspace() {
            Ok(dir) => dir,
            Err(e) => return ScaffoldResult::error(e.to_string(), logs.into_lines(), None),
        };
        self.lock().workdirs.push(workdir.path().to_path_buf());
        let out = workdir.path().join("project");

        if let Some(delay) = delay {
            thread::sleep(delay);
        }

        if let Err(e) = fs::create_dir_all(&out)
            .and_then(|()| fs::write(out.join(MARKER_FILE), path.join(" ")))
        {
            logs.error(e.to_string());
            return ScaffoldResult::error(
                e.to_string(),
                logs.into_lines(),
                Some(ScaffoldOutput::new(workdir, out)),
            );
        }
        logs.debug(format!("wrote {}", MARKER_FILE));

        if let Some(FailOn::RunWithPartialOutput(message)) = &fail_on {
            logs.error(message);
            return ScaffoldResult::error(
                message.clone(),
                logs.into_lines(),
                Some(ScaffoldOutput::new(workdir, out)),
            );
        }

        logs.note("mock scaffold complete");
        ScaffoldResult::ok(
            "mock scaffold complete",
            logs.into_lines(),
            ScaffoldOutput::new(workdir, out),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::ScaffoldStatus;

    fn path(segments: &[&str]) -> Vec<String> {
        segments.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn successful_run_writes_marker() {
        let backend = MockBackend::new();
        let result = backend.run(&path(&["init", "collection"]), &Map::new());

        assert_eq!(result.status(), ScaffoldStatus::Ok);
        assert!(result.path().unwrap().join(MARKER_FILE).exists());
        assert_eq!(backend.workdirs().len(), 1);
    }

    #[test]
    fn operations_are_recorded() {
        let backend = MockBackend::new();
        let mut params = Map::new();
        params.insert("collection".into(), Value::from("ns.name"));
        let _ = backend.run(&path(&["init", "collection"]), &params);

        assert_eq!(
            backend.operations(),
            vec![MockOperation::Run {
                path: path(&["init", "collection"]),
                params,
            }]
        );
    }

    #[test]
    fn partial_failure_keeps_output_until_dropped() {
        let backend = MockBackend::new().fail_on(FailOn::RunWithPartialOutput("half done".into()));
        let result = backend.run(&path(&["init", "playbook"]), &Map::new());

        assert_eq!(result.status(), ScaffoldStatus::Error);
        assert_eq!(result.message(), "half done");
        let workdir = result.workdir().unwrap().to_path_buf();
        assert!(workdir.exists());

        drop(result);
        assert!(!workdir.exists());
    }

    #[test]
    fn unknown_path_fails_without_workdir() {
        let backend = MockBackend::new();
        let result = backend.run(&path(&["init", "nonexistent"]), &Map::new());
        assert_eq!(result.status(), ScaffoldStatus::Error);
        assert!(backend.workdirs().is_empty());
    }

    #[test]
    fn clones_share_state() {
        let backend = MockBackend::new();
        let clone = backend.clone();
        let _ = clone.run(&path(&["add", "resource", "devfile"]), &Map::new());
        assert_eq!(backend.operations().len(), 1);

        let backend = backend.fail_on(FailOn::Run("x".into()));
        backend.clear_fail_on();
        assert!(clone.run(&path(&["add", "resource", "devfile"]), &Map::new()).is_ok());
    }
}
