//! Password hashing port. The Argon2 implementation lives in parley-infra.

use parley_types::error::AuthError;

/// Salted one-way password hashing.
pub trait CredentialHasher: Send + Sync {
    /// Hash a plaintext password into a self-describing (PHC) string.
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;

    /// Check a plaintext password against a stored hash. Malformed hashes
    /// never verify.
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}
