//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All CLI output goes through this module so that `--quiet` and `--debug`
//! behave the same in every command. Server logs go through `tracing`
//! instead.

pub mod output;
