//! Request lifecycle: per-request cancellation and the in-flight registry.

pub mod registry;
pub mod request_context;
