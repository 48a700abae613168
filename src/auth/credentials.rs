// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Password hashing and email verification codes.
//!
//! bcrypt is CPU-bound, so hashing and comparison run on the blocking pool.

use chrono::{DateTime, Duration, Utc};
use ring::rand::{SecureRandom, SystemRandom};

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

/// How long an emailed verification code stays valid.
pub const VERIFICATION_CODE_TTL: Duration = Duration::minutes(10);

#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("system random number generator failed")]
    Random,
}

pub async fn hash_password(password: &str) -> Result<String, CredentialError> {
    let password = password.to_string();
    let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, BCRYPT_COST)).await??;
    Ok(hash)
}

pub async fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    let password = password.to_string();
    let hash = hash.to_string();
    let matches = tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash)).await??;
    Ok(matches)
}

/// Burn roughly the same time as a real comparison.
///
/// Called when the account does not exist so the response time does not
/// reveal whether the identifier is registered.
pub async fn equalize_failed_lookup(password: &str) {
    if let Err(e) = hash_password(password).await {
        tracing::debug!(error = %e, "dummy hash failed");
    }
}

/// A fresh 6-digit code (100000..=999999) and its expiry.
pub fn generate_verification_code() -> Result<(String, DateTime<Utc>), CredentialError> {
    let mut buf = [0u8; 4];
    SystemRandom::new()
        .fill(&mut buf)
        .map_err(|_| CredentialError::Random)?;
    let code = u32::from_be_bytes(buf) % 900_000 + 100_000;
    Ok((code.to_string(), Utc::now() + VERIFICATION_CODE_TTL))
}
