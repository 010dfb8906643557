//! Cryptographic operations for Parley.
//!
//! - `password`: Argon2id password hashing for user accounts
//! - `secret`: random key material for cookie signing

pub mod password;
pub mod secret;
