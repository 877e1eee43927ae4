//! core::versions
//!
//! Discovery of installed tool versions.
//!
//! # Design
//!
//! Each known tool is probed by running its executable with `--version` and
//! taking the first token that looks like a version number. Probing goes
//! through the [`VersionProbe`] trait so tests can substitute fixed answers.
//! This crate reports itself under the `ansible-dev-tools` name with its own
//! package version.
//!
//! # Example
//!
//! ```
//! use adt::core::versions::{collect, render_table, StaticProbe};
//!
//! let probe = StaticProbe::new(&[("molecule", "24.2.0")]);
//! let table = render_table(&collect(&probe));
//! assert!(table.lines().any(|l| l.starts_with("molecule") && l.ends_with("24.2.0")));
//! assert!(table.contains("not installed"));
//! ```

use std::collections::BTreeMap;
use std::process::{Command, Stdio};

/// Name this crate reports itself under.
pub const SELF_NAME: &str = "ansible-dev-tools";

/// Placeholder for a tool that could not be found.
pub const NOT_INSTALLED: &str = "not installed";

/// Width of the name column in the version table.
const NAME_WIDTH: usize = 40;

/// Known tools: report name and the executable that answers `--version`.
pub const TOOLS: &[(&str, &str)] = &[
    ("ansible-builder", "ansible-builder"),
    ("ansible-core", "ansible"),
    ("ansible-creator", "ansible-creator"),
    ("ansible-dev-environment", "ade"),
    ("ansible-lint", "ansible-lint"),
    ("ansible-navigator", "ansible-navigator"),
    ("ansible-sign", "ansible-sign"),
    ("molecule", "molecule"),
];

/// A tool and its version, if installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolVersion {
    pub name: String,
    pub version: Option<String>,
}

impl ToolVersion {
    /// The version, or `not installed`.
    pub fn display_version(&self) -> &str {
        self.version.as_deref().unwrap_or(NOT_INSTALLED)
    }
}

/// Source of version strings for a tool.
pub trait VersionProbe {
    /// Version of `executable`, or `None` if it cannot be found.
    fn version(&self, executable: &str) -> Option<String>;
}

/// Probe that runs `<executable> --version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandProbe;

impl VersionProbe for CommandProbe {
    fn version(&self, executable: &str) -> Option<String> {
        let output = Command::new(executable)
            .arg("--version")
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output()
            .ok()?;
        if !output.status.success() {
            tracing::debug!(executable, status = ?output.status, "version probe failed");
            return None;
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        extract_version(&stdout)
    }
}

/// Probe with fixed answers, keyed by executable name.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    versions: BTreeMap<String, String>,
}

impl StaticProbe {
    pub fn new(entries: &[(&str, &str)]) -> Self {
        Self {
            versions: entries
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

impl VersionProbe for StaticProbe {
    fn version(&self, executable: &str) -> Option<String> {
        self.versions.get(executable).cloned()
    }
}

/// Pull the first version-looking token out of `--version` output.
///
/// Handles `ansible [core 2.16.3]`, `ansible-lint 24.2.0 using ...` and
/// `v1.2.3`.
pub fn extract_version(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .map(|token| {
            token
                .trim_matches(|c: char| matches!(c, '[' | ']' | '(' | ')' | ',' | ':'))
                .trim_start_matches('v')
        })
        .find(|token| token.starts_with(|c: char| c.is_ascii_digit()) && token.contains('.'))
        .map(str::to_string)
}

/// Probe every known tool, plus this crate, sorted by name.
pub fn collect(probe: &dyn VersionProbe) -> Vec<ToolVersion> {
    let mut versions: Vec<ToolVersion> = TOOLS
        .iter()
        .map(|(name, executable)| ToolVersion {
            name: name.to_string(),
            version: probe.version(executable),
        })
        .collect();
    versions.push(ToolVersion {
        name: SELF_NAME.to_string(),
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    });
    versions.sort_by(|a, b| a.name.cmp(&b.name));
    versions
}

/// One line per tool: name padded to 40 columns, a space, the version.
pub fn render_table(versions: &[ToolVersion]) -> String {
    versions
        .iter()
        .map(|v| format!("{:<width$} {}", v.name, v.display_version(), width = NAME_WIDTH))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Name → version map, as served by `/metadata`.
pub fn as_map(versions: &[ToolVersion]) -> BTreeMap<String, String> {
    versions
        .iter()
        .map(|v| (v.name.clone(), v.display_version().to_string()))
        .collect()
}
