//! Business logic and repository trait definitions for Parley.
//!
//! This crate defines the "ports" (repository and provider traits) that the
//! infrastructure layer implements, plus the services built on top of them:
//! authentication, the chat service, the completion gateway, and request
//! lifecycle tracking. It depends only on `parley-types` -- never on
//! `parley-infra` or any database/IO crate.

pub mod auth;
pub mod chat;
pub mod gateway;
pub mod lifecycle;
pub mod llm;
pub mod repository;

#[cfg(test)]
pub(crate) mod testing;
