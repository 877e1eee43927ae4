//! scaffold::command
//!
//! Typed resolution of command paths.
//!
//! The capability tree is data; this enum is what the template backend
//! actually dispatches on. A path the tree accepts but no backend arm
//! implements resolves to [`Command::Unknown`] instead of panicking.

use std::fmt;

/// Plugin flavors supported by `add plugin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Filter,
    Lookup,
    Module,
}

impl PluginKind {
    /// Directory name under `plugins/`.
    pub fn dir_name(self) -> &'static str {
        match self {
            PluginKind::Filter => "filter",
            PluginKind::Lookup => "lookup",
            PluginKind::Module => "modules",
        }
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PluginKind::Filter => "filter",
            PluginKind::Lookup => "lookup",
            PluginKind::Module => "module",
        };
        f.write_str(name)
    }
}

/// A resolved scaffolding command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    InitCollection,
    InitPlaybook,
    InitExecutionEnv,
    AddDevfile,
    AddDevcontainer,
    AddExecutionEnvironment,
    AddPattern,
    AddPlugin(PluginKind),
    /// A path with no backend implementation.
    Unknown(Vec<String>),
}

impl Command {
    pub fn from_path(path: &[String]) -> Self {
        let segments: Vec<&str> = path.iter().map(String::as_str).collect();
        match segments.as_slice() {
            ["init", "collection"] => Command::InitCollection,
            ["init", "playbook"] => Command::InitPlaybook,
            ["init", "execution_env"] => Command::InitExecutionEnv,
            ["add", "resource", "devfile"] => Command::AddDevfile,
            ["add", "resource", "devcontainer"] => Command::AddDevcontainer,
            ["add", "resource", "execution-environment"] => Command::AddExecutionEnvironment,
            ["add", "resource", "pattern"] => Command::AddPattern,
            ["add", "plugin", "filter"] => Command::AddPlugin(PluginKind::Filter),
            ["add", "plugin", "lookup"] => Command::AddPlugin(PluginKind::Lookup),
            ["add", "plugin", "module"] => Command::AddPlugin(PluginKind::Module),
            _ => Command::Unknown(path.to_vec()),
        }
    }
}
