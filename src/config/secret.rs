//! Masked wrapper for credential-like configuration values
//!
//! Provider API keys must never leak through logs, error reports, or
//! serialized responses. `SecretString` renders as a fixed mask everywhere
//! except the explicit [`SecretString::reveal`] accessor.

use serde::{Serialize, Serializer};

/// Fixed placeholder emitted by every default rendering of a secret.
pub const SECRET_MASK: &str = "**********";

/// An immutable credential string with masked `Display`/`Debug` output.
///
/// An unset secret is represented as `Option<SecretString>::None`; a secret
/// that was explicitly set to the empty string is `Some` and non-equal to
/// unset.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretString(String);

impl SecretString {
    /// Wrap a raw credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Return the underlying credential characters.
    ///
    /// This is the only way to obtain the raw value; call it at the last
    /// possible moment (e.g. when building an outbound request header).
    pub fn reveal(&self) -> &str {
        &self.0
    }

    /// Whether the wrapped value is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(SECRET_MASK)
    }
}

impl std::fmt::Debug for SecretString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretString({})", SECRET_MASK)
    }
}

// Serializing a snapshot must not round-trip the credential either.
impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(SECRET_MASK)
    }
}
