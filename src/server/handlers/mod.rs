//! server::handlers
//!
//! Route handlers. Each takes the shared state and the raw request, runs it
//! through the validation pipeline and returns an [`ApiResponse`].
//!
//! [`ApiResponse`]: crate::openapi::ApiResponse

pub mod dynamic;
pub mod metadata;
pub mod resources;
