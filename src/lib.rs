//! adt - Ansible developer tools
//!
//! A single binary that reports the versions of the installed developer
//! tools and serves the project scaffolding backend over HTTP.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, dispatches through a registry)
//! - [`server`] - HTTP endpoint layer (axum), behind the `server` feature
//! - [`openapi`] - Request/response validation against the bundled OpenAPI document
//! - [`scaffold`] - Capability tree and scaffold backends
//! - [`archive`] - Tar archive builder
//! - [`core`] - Configuration, logging, secret key and tool versions
//! - [`ui`] - User-facing output
//!
//! # Request Flow
//!
//! ```text
//! request -> openapi (validate request) -> server handler -> scaffold backend
//!         -> archive -> openapi (validate response) -> response
//! ```
//!
//! Every scaffold call runs in its own temporary directory, which is removed
//! once the archive has been read back into memory.

pub mod archive;
pub mod cli;
pub mod core;
pub mod openapi;
pub mod scaffold;
#[cfg(feature = "server")]
pub mod server;
pub mod ui;
