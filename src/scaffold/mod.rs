//! scaffold
//!
//! The scaffolding backend: capability discovery, per-command parameter
//! schemas, and execution of commands into a fresh temporary directory.
//!
//! # Design
//!
//! [`ScaffoldBackend`] is synchronous; the server runs each call on the
//! blocking pool.
//!
//! A [`ScaffoldResult`] owns the temporary directory its output lives in.
//! Whoever holds the result decides when the directory goes away: either
//! explicitly through [`ScaffoldOutput::cleanup`], or implicitly on drop,
//! which also covers a call abandoned by a timeout.
//!
//! `run` never returns `Err`: bad paths, bad parameters and render failures
//! all come back as a result with `status == Error` and the log lines
//! collected up to the failure.
//!
//! # Example
//!
//! ```
//! use adt::scaffold::{ScaffoldBackend, ScaffoldStatus, TemplateBackend};
//! use serde_json::{json, Map};
//!
//! let backend = TemplateBackend::new();
//! let mut params = Map::new();
//! params.insert("collection".into(), json!("acme.tools"));
//!
//! let path = vec!["init".to_string(), "collection".to_string()];
//! let result = backend.run(&path, &params);
//! assert_eq!(result.status(), ScaffoldStatus::Ok);
//! assert!(result.path().unwrap().join("galaxy.yml").exists());
//! ```

pub mod command;
pub mod logs;
pub mod mock;
pub mod templates;
pub mod tree;

use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tempfile::TempDir;
use thiserror::Error;

pub use command::{Command, PluginKind};
pub use logs::LogBuffer;
pub use templates::TemplateBackend;
pub use tree::CapabilityNode;

/// The root of a capability tree.
pub type CapabilityTree = CapabilityNode;

/// Errors from resolving or executing a command.
#[derive(Debug, Error)]
pub enum ScaffoldError {
    /// No command path was given.
    #[error("Missing command_path")]
    EmptyPath,

    /// A path segment does not exist in the capability tree.
    #[error("unknown command '{segment}' in path '{path}'")]
    UnknownCommand { segment: String, path: String },

    /// The path names a command group rather than a command.
    #[error("'{path}' is a command group; choose one of: {}", .available.join(", "))]
    NotALeaf {
        path: String,
        available: Vec<String>,
    },

    /// Parameters do not match the command's schema.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// The tree knows the command but this backend cannot run it.
    #[error("command '{0}' is not supported by this backend")]
    Unsupported(String),

    /// The temporary working directory could not be prepared.
    #[error("failed to prepare workspace: {0}")]
    Workspace(#[from] io::Error),

    /// Writing the generated content failed.
    #[error("failed to render templates: {0}")]
    Render(String),
}

/// Outcome of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScaffoldStatus {
    Ok,
    Error,
}

/// Generated content and the temporary directory that holds it.
///
/// Dropping this removes the directory.
#[derive(Debug)]
pub struct ScaffoldOutput {
    workdir: TempDir,
    path: PathBuf,
}

impl ScaffoldOutput {
    /// Wrap a working directory; `path` must lie inside it.
    pub fn new(workdir: TempDir, path: PathBuf) -> Self {
        Self { workdir, path }
    }

    /// The directory holding the generated project.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The temporary directory owning all generated files.
    pub fn workdir(&self) -> &Path {
        self.workdir.path()
    }

    /// Remove the working directory, reporting failures.
    pub fn cleanup(self) -> io::Result<()> {
        self.workdir.close()
    }
}

/// The record returned by [`ScaffoldBackend::run`].
#[derive(Debug)]
pub struct ScaffoldResult {
    status: ScaffoldStatus,
    message: String,
    logs: Vec<String>,
    output: Option<ScaffoldOutput>,
}

impl ScaffoldResult {
    pub fn ok(message: impl Into<String>, logs: Vec<String>, output: ScaffoldOutput) -> Self {
        Self {
            status: ScaffoldStatus::Ok,
            message: message.into(),
            logs,
            output: Some(output),
        }
    }

    /// A failed call, possibly with partial output that still needs removal.
    pub fn error(
        message: impl Into<String>,
        logs: Vec<String>,
        partial: Option<ScaffoldOutput>,
    ) -> Self {
        Self {
            status: ScaffoldStatus::Error,
            message: message.into(),
            logs,
            output: partial,
        }
    }

    pub fn status(&self) -> ScaffoldStatus {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status == ScaffoldStatus::Ok
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    /// Output directory, present on success and on partial failure.
    pub fn path(&self) -> Option<&Path> {
        self.output.as_ref().map(ScaffoldOutput::path)
    }

    /// The temporary directory backing this result.
    pub fn workdir(&self) -> Option<&Path> {
        self.output.as_ref().map(ScaffoldOutput::workdir)
    }

    pub fn into_parts(self) -> (ScaffoldStatus, String, Vec<String>, Option<ScaffoldOutput>) {
        (self.status, self.message, self.logs, self.output)
    }
}

/// A scaffolding engine.
pub trait ScaffoldBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// The full capability tree.
    fn capabilities(&self) -> &CapabilityTree;

    /// The leaf node for a command path.
    ///
    /// # Errors
    ///
    /// `EmptyPath`, `UnknownCommand` or `NotALeaf`.
    fn schema_for(&self, path: &[String]) -> Result<&CapabilityNode, ScaffoldError> {
        self.capabilities().resolve(path)
    }

    /// Execute a command into a fresh temporary directory.
    fn run(&self, path: &[String], params: &Map<String, Value>) -> ScaffoldResult;
}

/// Create a fresh working directory for one backend call.
pub fn workspace() -> Result<TempDir, ScaffoldError> {
    Ok(tempfile::Builder::new().prefix("adt-scaffold-").tempdir()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropping_a_result_removes_its_directory() {
        let dir = workspace().unwrap();
        let root = dir.path().to_path_buf();
        let out = root.join("project");
        std::fs::create_dir(&out).unwrap();

        let result = ScaffoldResult::ok("done", vec![], ScaffoldOutput::new(dir, out.clone()));
        assert_eq!(result.path(), Some(out.as_path()));
        assert!(root.exists());

        drop(result);
        assert!(!root.exists());
    }

    #[test]
    fn cleanup_is_explicit_and_reported() {
        let dir = workspace().unwrap();
        let root = dir.path().to_path_buf();
        let output = ScaffoldOutput::new(dir, root.clone());

        output.cleanup().unwrap();
        assert!(!root.exists());
    }

    #[test]
    fn error_messages_name_the_problem() {
        let err = ScaffoldError::UnknownCommand {
            segment: "nonexistent".into(),
            path: "init nonexistent".into(),
        };
        assert!(err.to_string().contains("'nonexistent'"));

        let err = ScaffoldError::NotALeaf {
            path: "add".into(),
            available: vec!["plugin".into(), "resource".into()],
        };
        assert!(err.to_string().ends_with("plugin, resource"));
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ScaffoldStatus::Error).unwrap(), "\"error\"");
    }
}
