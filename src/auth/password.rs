use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use sha2::{Digest, Sha256};
use tracing::error;

/// Salted Argon2id hash in PHC string format.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "argon2 hash_password error");
            anyhow::anyhow!(e.to_string())
        })?
        .to_string();
    Ok(hash)
}

/// Checks `plain` against a stored hash. Accepts Argon2 PHC strings and the
/// unsalted base64 SHA-256 digests written by earlier deployments.
pub fn verify_password(plain: &str, hash: &str) -> anyhow::Result<bool> {
    if is_legacy_hash(hash) {
        return Ok(legacy_hash(plain) == hash);
    }
    let parsed = PasswordHash::new(hash).map_err(|e| {
        error!(error = %e, "argon2 parse hash error");
        anyhow::anyhow!(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

lazy_static! {
    static ref DUMMY_HASH: Option<String> = hash_password("dummy-password").ok();
}

/// Runs one Argon2 verification against a throwaway hash, so a login for an
/// unknown email costs about as much as one with a wrong password.
pub fn verify_dummy(plain: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
}

/// Legacy hashes should be replaced with an Argon2 hash after a successful login.
pub fn needs_rehash(hash: &str) -> bool {
    is_legacy_hash(hash)
}

fn is_legacy_hash(hash: &str) -> bool {
    !hash.starts_with('$')
}

fn legacy_hash(plain: &str) -> String {
    STANDARD.encode(Sha256::digest(plain.as_bytes()))
}
