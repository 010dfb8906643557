//! LLM provider abstractions for Parley.
//!
//! - `LlmProvider`: RPITIT trait for concrete provider implementations
//! - `BoxLlmProvider`: shared type-erased handle with cancellable completion

pub mod box_provider;
pub mod provider;
