//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`:
//! SQLite storage (users, chats, messages), the OpenAI-compatible completion
//! client, Argon2 password hashing, and the configuration loader.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
