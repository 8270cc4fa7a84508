//! Password hashing in the `pbkdf2_sha256$<iterations>$<salt>$<hash>` format,
//! with base64 salt and derived key.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use pbkdf2::pbkdf2_hmac;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use thiserror::Error;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_SIZE: usize = 16;
const KEY_SIZE: usize = 32;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordError {
    #[error("Unsupported password hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Malformed password hash")]
    Malformed,
}

/// Hash a password with a fresh random salt
pub fn hash_password(password: &str, iterations: u32) -> String {
    let mut salt = [0u8; SALT_SIZE];
    OsRng.fill_bytes(&mut salt);

    let mut derived_key = [0u8; KEY_SIZE];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived_key);

    format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        BASE64.encode(salt),
        BASE64.encode(derived_key)
    )
}

/// Check a password against a stored hash
pub fn verify_password(password: &str, encoded: &str) -> Result<bool, PasswordError> {
    let mut parts = encoded.splitn(4, '$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(PasswordError::Malformed);
    };

    if algorithm != ALGORITHM {
        return Err(PasswordError::UnsupportedAlgorithm(algorithm.to_string()));
    }

    let iterations: u32 = iterations.parse().map_err(|_| PasswordError::Malformed)?;
    let salt = BASE64.decode(salt).map_err(|_| PasswordError::Malformed)?;
    let expected = BASE64.decode(expected).map_err(|_| PasswordError::Malformed)?;
    if iterations == 0 || expected.is_empty() {
        return Err(PasswordError::Malformed);
    }

    let mut derived_key = vec![0u8; expected.len()];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), &salt, iterations, &mut derived_key);

    Ok(constant_time_eq(&derived_key, &expected))
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
