//! SQLite storage layer.
//!
//! Repository implementations backed by SQLite with WAL mode and split
//! read/write connection pools. Schema lives in `migrations/`.

pub mod chat;
pub mod pool;
pub mod user;
