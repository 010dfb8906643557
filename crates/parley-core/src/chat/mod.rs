//! Chat persistence, the chat-list cache, and the chat service.
//!
//! This module defines the `ChatRepository` trait that the infrastructure
//! layer implements, and `ChatService`, which combines it with the
//! completion gateway.

pub mod cache;
pub mod repository;
pub mod service;
