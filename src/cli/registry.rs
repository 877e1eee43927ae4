//! cli::registry
//!
//! The table of subcommands, built once at startup.
//!
//! # Design
//!
//! Every subcommand the parser knows has an entry, whether or not this build
//! can run it. A subcommand whose feature was compiled out is registered as
//! [`Entry::Missing`] so that invoking it fails with a typed
//! [`DispatchError::MissingDependency`] instead of an unknown-command error.

use std::collections::BTreeMap;

use anyhow::Result;
use thiserror::Error;

use super::args::Command;
use super::commands;
use super::Context;

/// A command handler.
pub type Handler = fn(Command, &Context) -> Result<()>;

/// Errors resolving a subcommand.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("unknown subcommand: {0}")]
    Unknown(String),

    #[error("'{command}' is not available: this build was compiled without the '{feature}' feature")]
    MissingDependency {
        command: String,
        feature: &'static str,
    },

    #[error("handler for '{expected}' received '{actual}'")]
    Mismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

/// How a registered subcommand is run.
#[derive(Clone, Copy)]
pub enum Entry {
    Available(Handler),
    Missing { feature: &'static str },
}

impl std::fmt::Debug for Entry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Entry::Available(_) => f.write_str("Available"),
            Entry::Missing { feature } => write!(f, "Missing({})", feature),
        }
    }
}

/// Subcommand name → entry.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, Entry>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry for this build.
    pub fn builtin() -> Self {
        let mut registry = Self::new()
            .register("creator", Entry::Available(commands::creator))
            .register("completion", Entry::Available(commands::completion));

        #[cfg(feature = "server")]
        {
            registry = registry.register("server", Entry::Available(commands::server));
        }
        #[cfg(not(feature = "server"))]
        {
            registry = registry.register("server", Entry::Missing { feature: "server" });
        }

        registry
    }

    /// Add or replace an entry.
    pub fn register(mut self, name: &'static str, entry: Entry) -> Self {
        self.entries.insert(name, entry);
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    /// The handler for `name`.
    ///
    /// # Errors
    ///
    /// `Unknown` for an unregistered name, `MissingDependency` for a
    /// subcommand compiled out of this build.
    pub fn lookup(&self, name: &str) -> Result<Handler, DispatchError> {
        match self.entries.get(name) {
            Some(Entry::Available(handler)) => Ok(*handler),
            Some(Entry::Missing { feature }) => Err(DispatchError::MissingDependency {
                command: name.to_string(),
                feature,
            }),
            None => Err(DispatchError::Unknown(name.to_string())),
        }
    }

    /// Run `command` through its registered handler.
    pub fn dispatch(&self, command: Command, ctx: &Context) -> Result<()> {
        let handler = self.lookup(command.name())?;
        handler(command, ctx)
    }
}
