//! Random key material.

use argon2::password_hash::rand_core::{OsRng, RngCore};
use secrecy::SecretString;

/// Generate a random 64-byte secret, hex-encoded, for signing session
/// cookies when no `SESSION_SECRET` is configured.
pub fn generate_session_secret() -> SecretString {
    let mut bytes = [0u8; 64];
    OsRng.fill_bytes(&mut bytes);
    let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    SecretString::from(hex)
}
