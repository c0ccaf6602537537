//! Admin password hashing and verification
//!
//! # Algorithm
//!
//! - Salt: 16 random bytes, stored as 32 hex characters
//! - Hash: SHA-256 over `salt || password`, re-hashed `HASH_ROUNDS` times,
//!   stored as 64 hex characters
//! - Verification compares in constant time
//!
//! # Pure Functions
//!
//! This module contains ONLY pure functions. Storage of the salt/hash pair
//! and HTTP session handling live in the server crate.

use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of SHA-256 rounds applied to every password
pub const HASH_ROUNDS: u32 = 10_000;

/// Generate a fresh random salt (hex)
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    to_hex(&bytes)
}

/// Hash a password with the given salt
///
/// # Examples
///
/// ```
/// use xicon_common::api::auth::hash_password;
///
/// let hash = hash_password("hunter2", "00112233445566778899aabbccddeeff");
/// assert_eq!(hash.len(), 64); // SHA-256 is 64 hex chars
/// ```
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    let mut digest = hasher.finalize();

    for _ in 1..HASH_ROUNDS {
        let mut hasher = Sha256::new();
        hasher.update(salt.as_bytes());
        hasher.update(digest);
        digest = hasher.finalize();
    }

    to_hex(&digest)
}

/// Check a password against a stored salt/hash pair
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let calculated = hash_password(password, salt);
    constant_time_eq(calculated.as_bytes(), expected_hash.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
