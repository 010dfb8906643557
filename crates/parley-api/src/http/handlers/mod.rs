//! HTTP request handlers.

pub mod auth;
pub mod chat;
pub mod health;
pub mod style;
