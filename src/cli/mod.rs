//! cli
//!
//! Command-line interface layer for adt.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the subcommand through the [`registry`]
//! - Print user-facing output through [`crate::ui::output`]
//!
//! # Architecture
//!
//! The CLI layer is thin. `adt server` hands off to [`crate::server`];
//! `adt creator` drives the scaffold backend in-process.

pub mod args;
pub mod commands;
pub mod registry;

pub use args::{Cli, Command, Shell};
pub use registry::{DispatchError, Registry};

use crate::ui::output::{self, Verbosity};
use anyhow::Result;
use clap::CommandFactory;

/// Flags shared by every command handler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Context {
    pub debug: bool,
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let ctx = Context {
        debug: cli.debug,
        quiet: cli.quiet,
    };

    if cli.version {
        return commands::version(&ctx);
    }

    match cli.command {
        Some(command) => {
            let registry = Registry::builtin();
            output::debug(format!("dispatching '{}'", command.name()), ctx.verbosity());
            registry.dispatch(command, &ctx)
        }
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}
