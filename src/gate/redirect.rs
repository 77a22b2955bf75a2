//! Validation of the externally supplied `next` destination.
//!
//! The `next` query parameter is base64 encoded and fully attacker controlled.
//! It only ever leaves this module as a [`SafePath`]: a rooted, same-origin
//! path drawn from a small character allow-list. Anything else collapses to
//! the configured default path.

use base64ct::{Base64, Encoding};
use std::fmt;
use thiserror::Error;

/// Landing page used when `next` is absent or rejected.
pub const DEFAULT_REDIRECT: &str = "/devices.php";

/// Why a `next` value was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("next value is not strict base64 or not UTF-8")]
    Decode,
    #[error("decoded next value is not a safe local path: {0}")]
    Path(PathViolation),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PathViolation {
    #[error("path does not start with '/'")]
    NotRooted,
    #[error("path starts with '//'")]
    NetworkPath,
    #[error("path contains '://'")]
    SchemeSeparator,
    #[error("path contains forbidden character {0:?}")]
    ForbiddenChar(char),
}

/// A path that is safe to place verbatim into a `Location` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SafePath(String);

impl SafePath {
    /// Run the allow-list checks against an already decoded candidate.
    ///
    /// # Errors
    /// Returns the first [`PathViolation`] found.
    pub fn parse(candidate: &str) -> Result<Self, PathViolation> {
        check_local_path(candidate)?;
        Ok(Self(candidate.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SafePath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SafePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Characters a redirect path may contain.
#[must_use]
pub const fn is_allowed_char(c: char) -> bool {
    matches!(
        c,
        'a'..='z' | 'A'..='Z' | '0'..='9' | '_' | '-' | '.' | '/' | '?' | '=' | '&' | ':' | '%' | '#'
    )
}

#[must_use]
pub fn is_rooted(path: &str) -> bool {
    path.starts_with('/')
}

/// Protocol-relative references (`//host/...`) leave the origin.
#[must_use]
pub fn has_network_prefix(path: &str) -> bool {
    path.starts_with("//")
}

#[must_use]
pub fn has_scheme_separator(path: &str) -> bool {
    path.contains("://")
}

#[must_use]
pub fn first_forbidden_char(path: &str) -> Option<char> {
    path.chars().find(|c| !is_allowed_char(*c))
}

/// Structural and character-class checks, in a fixed order.
///
/// # Errors
/// Returns the first violated rule.
pub fn check_local_path(path: &str) -> Result<(), PathViolation> {
    if !is_rooted(path) {
        return Err(PathViolation::NotRooted);
    }
    if has_network_prefix(path) {
        return Err(PathViolation::NetworkPath);
    }
    if has_scheme_separator(path) {
        return Err(PathViolation::SchemeSeparator);
    }
    if let Some(c) = first_forbidden_char(path) {
        return Err(PathViolation::ForbiddenChar(c));
    }
    Ok(())
}

/// Decodes and validates `next` values, falling back to a fixed default.
#[derive(Debug, Clone)]
pub struct PathValidator {
    default_path: SafePath,
}

impl PathValidator {
    #[must_use]
    pub fn new(default_path: SafePath) -> Self {
        Self { default_path }
    }

    #[must_use]
    pub fn default_path(&self) -> &SafePath {
        &self.default_path
    }

    /// Strict decode plus allow-list check, reporting why a value was refused.
    ///
    /// # Errors
    /// Returns a [`RejectReason`] for undecodable or unsafe values.
    pub fn try_decode(encoded: &str) -> Result<SafePath, RejectReason> {
        let bytes = Base64::decode_vec(encoded).map_err(|_| RejectReason::Decode)?;
        let decoded = String::from_utf8(bytes).map_err(|_| RejectReason::Decode)?;
        SafePath::parse(&decoded).map_err(RejectReason::Path)
    }

    /// Resolve `next` into a safe path. Never fails.
    #[must_use]
    pub fn validate(&self, encoded: Option<&str>) -> SafePath {
        let Some(encoded) = encoded.filter(|value| !value.is_empty()) else {
            return self.default_path.clone();
        };

        match Self::try_decode(encoded) {
            Ok(path) => path,
            Err(reason) => {
                // Never log the raw value, it is attacker controlled.
                tracing::debug!(%reason, "rejected next parameter, using default path");
                self.default_path.clone()
            }
        }
    }
}

impl Default for PathValidator {
    fn default() -> Self {
        Self::new(SafePath(DEFAULT_REDIRECT.to_string()))
    }
}

/// Encode a path the way clients build the `next` parameter.
#[must_use]
pub fn encode_next(path: &str) -> String {
    Base64::encode_string(path.as_bytes())
}
