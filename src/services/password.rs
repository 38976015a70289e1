// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! One-way password hashing (PBKDF2-HMAC-SHA256).
//!
//! Encoded form: `pbkdf2-sha256$<iterations>$<salt>$<hash>` with base64 parts,
//! so the iteration count can be raised without invalidating stored hashes.

use crate::error::AppError;
use base64::{engine::general_purpose::STANDARD_NO_PAD as BASE64, Engine as _};
use ring::rand::{SecureRandom, SystemRandom};
use ring::{digest, pbkdf2};
use std::num::NonZeroU32;

const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// Default work factor for production.
pub const DEFAULT_ITERATIONS: u32 = 100_000;

#[derive(Clone)]
pub struct PasswordHasher {
    iterations: NonZeroU32,
    rng: SystemRandom,
}

impl PasswordHasher {
    pub fn new(iterations: u32) -> Self {
        Self {
            iterations: NonZeroU32::new(iterations).unwrap_or(NonZeroU32::MIN),
            rng: SystemRandom::new(),
        }
    }

    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let mut salt = [0u8; SALT_LEN];
        self.rng
            .fill(&mut salt)
            .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG unavailable")))?;

        let mut credential = [0u8; CREDENTIAL_LEN];
        pbkdf2::derive(
            ALGORITHM,
            self.iterations,
            &salt,
            password.as_bytes(),
            &mut credential,
        );

        Ok(format!(
            "{}${}${}${}",
            SCHEME,
            self.iterations,
            BASE64.encode(salt),
            BASE64.encode(credential)
        ))
    }

    /// Constant-time check of `password` against an encoded hash.
    /// Malformed hashes never verify.
    pub fn verify(&self, password: &str, encoded: &str) -> bool {
        let parts: Vec<&str> = encoded.split('$').collect();
        let [scheme, iterations, salt, credential] = parts.as_slice() else {
            return false;
        };
        if *scheme != SCHEME {
            return false;
        }

        let Some(iterations) = iterations.parse::<u32>().ok().and_then(NonZeroU32::new) else {
            return false;
        };
        let (Ok(salt), Ok(credential)) = (BASE64.decode(salt), BASE64.decode(credential)) else {
            return false;
        };

        pbkdf2::verify(
            ALGORITHM,
            iterations,
            &salt,
            password.as_bytes(),
            &credential,
        )
        .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_verifies_and_hides_password() {
        let hasher = PasswordHasher::new(1_000);
        let hash = hasher.hash("correct horse").unwrap();

        assert!(!hash.contains("correct horse"));
        assert!(hash.starts_with("pbkdf2-sha256$1000$"));
        assert!(hasher.verify("correct horse", &hash));
        assert!(!hasher.verify("wrong horse", &hash));
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new(1_000);
        assert_ne!(hasher.hash("same").unwrap(), hasher.hash("same").unwrap());
    }

    #[test]
    fn test_verify_uses_stored_iterations() {
        let weak = PasswordHasher::new(500);
        let hash = weak.hash("secret-pass").unwrap();

        assert!(PasswordHasher::new(2_000).verify("secret-pass", &hash));
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        let hasher = PasswordHasher::new(1_000);
        assert!(!hasher.verify("x", ""));
        assert!(!hasher.verify("x", "plain-text"));
        assert!(!hasher.verify("x", "pbkdf2-sha256$0$AAAA$AAAA"));
        assert!(!hasher.verify("x", "bcrypt$10$AAAA$AAAA"));
    }
}
