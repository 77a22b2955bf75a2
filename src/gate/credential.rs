//! Password verification against a configured SHA-256 digest.

use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// SHA-256 of the password the application ships with (`123456`).
///
/// Only used to warn the operator on the login page.
pub const DEFAULT_PASSWORD_DIGEST: &str =
    "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("password digest must be 64 hexadecimal characters")]
    InvalidDigest,
}

/// Lower-case hex SHA-256 of a submitted password.
#[must_use]
pub fn digest_password(candidate: &str) -> String {
    format!("{:x}", Sha256::digest(candidate.as_bytes()))
}

/// Constant-time equality; does not stop at the first differing byte.
#[must_use]
pub fn constant_time_eq(expected: &str, candidate: &str) -> bool {
    bool::from(expected.as_bytes().ct_eq(candidate.as_bytes()))
}

/// A stored digest is expected to be a 32-byte hex string.
#[must_use]
pub fn valid_digest(digest: &str) -> bool {
    Regex::new(r"^[0-9a-fA-F]{64}$").is_ok_and(|re| re.is_match(digest))
}

pub trait CredentialVerifier: Send + Sync {
    fn expected_digest(&self) -> &str;

    fn digest_equals(&self, expected: &str, candidate_digest: &str) -> bool {
        constant_time_eq(expected, candidate_digest)
    }

    fn verify(&self, candidate: &str) -> bool {
        self.digest_equals(self.expected_digest(), &digest_password(candidate))
    }

    fn uses_default_password(&self) -> bool {
        self.digest_equals(self.expected_digest(), DEFAULT_PASSWORD_DIGEST)
    }
}

pub struct Sha256Verifier {
    expected: SecretString,
}

impl Sha256Verifier {
    /// # Errors
    /// Returns [`CredentialError::InvalidDigest`] if `digest` is not 64 hex characters.
    pub fn new(digest: &SecretString) -> Result<Self, CredentialError> {
        let digest = digest.expose_secret().trim();
        if !valid_digest(digest) {
            return Err(CredentialError::InvalidDigest);
        }
        Ok(Self {
            expected: SecretString::from(digest.to_ascii_lowercase()),
        })
    }

    /// Convenience for tests and tooling that start from a clear-text password.
    #[must_use]
    pub fn from_password(password: &str) -> Self {
        Self {
            expected: SecretString::from(digest_password(password)),
        }
    }
}

impl CredentialVerifier for Sha256Verifier {
    fn expected_digest(&self) -> &str {
        self.expected.expose_secret()
    }
}

impl std::fmt::Debug for Sha256Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sha256Verifier")
            .field("expected", &"***")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_digest_matches_default_password() {
        assert_eq!(digest_password("123456"), DEFAULT_PASSWORD_DIGEST);
    }

    #[test]
    fn verify_accepts_only_matching_password() {
        let verifier = Sha256Verifier::from_password("hunter2");
        assert!(verifier.verify("hunter2"));
        assert!(!verifier.verify("hunter3"));
        assert!(!verifier.verify(""));
        assert!(!verifier.uses_default_password());
    }

    #[test]
    fn new_normalizes_upper_case_digest() -> Result<(), CredentialError> {
        let upper = SecretString::from(DEFAULT_PASSWORD_DIGEST.to_ascii_uppercase());
        let verifier = Sha256Verifier::new(&upper)?;
        assert!(verifier.verify("123456"));
        assert!(verifier.uses_default_password());
        Ok(())
    }

    #[test]
    fn new_rejects_malformed_digest() {
        for digest in ["", "abc", "zz69eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"] {
            assert_eq!(
                Sha256Verifier::new(&SecretString::from(digest.to_string())).err(),
                Some(CredentialError::InvalidDigest)
            );
        }
    }

    #[test]
    fn constant_time_eq_compares_whole_value() {
        assert!(constant_time_eq("abcd", "abcd"));
        assert!(!constant_time_eq("abcd", "abce"));
        assert!(!constant_time_eq("abcd", "xbcd"));
        assert!(!constant_time_eq("abcd", "abc"));
        assert!(!constant_time_eq("", "a"));
    }

    #[test]
    fn debug_redacts_digest() {
        let verifier = Sha256Verifier::from_password("123456");
        let rendered = format!("{verifier:?}");
        assert!(!rendered.contains(DEFAULT_PASSWORD_DIGEST));
        assert!(rendered.contains("***"));
    }
}
