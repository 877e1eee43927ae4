//! core
//!
//! Ambient services shared by the CLI and the server.
//!
//! # Modules
//!
//! - [`config`] - Configuration schema and loading
//! - [`versions`] - Installed tool version discovery
//! - [`logging`] - Tracing subscriber setup
//! - [`secret`] - The server secret key

pub mod config;
pub mod logging;
pub mod secret;
pub mod versions;
