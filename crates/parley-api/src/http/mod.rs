//! HTTP layer for Parley.
//!
//! Axum router with cookie sessions, HTML login/registration forms, and the
//! JSON envelope response format for everything else.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod pages;
pub mod response;
pub mod router;
pub mod session;
