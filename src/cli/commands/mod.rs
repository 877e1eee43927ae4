//! cli::commands
//!
//! Command handlers.
//!
//! Each handler has the registry's [`Handler`] signature: it takes the
//! parsed [`Command`], checks that it is the variant it serves and runs it.
//!
//! # Async Commands
//!
//! `server` is async because it owns the listener. The handler builds a
//! tokio runtime and blocks on it; everything else is synchronous.
//!
//! [`Handler`]: super::registry::Handler

mod completion;
mod creator;
#[cfg(feature = "server")]
mod server;
mod version;

pub use completion::completion;
pub use creator::creator;
#[cfg(feature = "server")]
pub use server::server;
pub use version::version;

use super::args::Command;
use super::registry::DispatchError;

/// Error for a handler given a command it does not serve.
pub(crate) fn mismatch(expected: &'static str, actual: &Command) -> anyhow::Error {
    DispatchError::Mismatch {
        expected,
        actual: actual.name(),
    }
    .into()
}
