//! Password hashing and verification using Argon2id.

use anyhow::Result;
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::config::SecurityConfig;

fn hasher(config: &SecurityConfig) -> Result<Argon2<'static>> {
    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hash a plaintext password into a salted PHC-format digest.
///
/// CPU-intensive; callers on the async runtime should wrap this in
/// `spawn_blocking`.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher(config)?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored digest.
///
/// Fails closed: a malformed stored digest is treated as a non-match
/// rather than an error.
#[must_use]
pub fn verify_password(password: &str, stored_hash: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(stored_hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> SecurityConfig {
        // Cheap params to keep tests fast
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
        }
    }

    #[test]
    fn correct_password_matches() {
        let hash = hash_password("hunter2", &test_config()).unwrap();
        assert!(verify_password("hunter2", &hash));
    }

    #[test]
    fn wrong_password_does_not_match() {
        let hash = hash_password("hunter2", &test_config()).unwrap();
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn malformed_hash_fails_closed() {
        assert!(!verify_password("hunter2", "not-a-phc-hash"));
        assert!(!verify_password("hunter2", ""));
    }

    #[test]
    fn hashes_are_salted() {
        let config = test_config();
        let h1 = hash_password("hunter2", &config).unwrap();
        let h2 = hash_password("hunter2", &config).unwrap();
        assert_ne!(h1, h2);
    }
}
