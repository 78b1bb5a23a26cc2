//! Basic credential checks against a static allow-list.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::collections::HashSet;

/// Identity reported when the token is not valid base64 / UTF-8.
pub const INVALID_IDENTITY: &str = "invalid";

/// Outcome of checking one Basic token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    pub ok: bool,
    /// The decoded `username:secret` pair, or [`INVALID_IDENTITY`].
    pub identity: String,
}

/// Immutable allow-list of `username:secret` pairs.
#[derive(Debug, Clone, Default)]
pub struct CredentialValidator {
    allowed: HashSet<String>,
}

impl CredentialValidator {
    pub fn new<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { allowed: pairs.into_iter().map(Into::into).collect() }
    }

    /// Decode a base64 Basic token and check the whole decoded pair against the allow-list.
    pub fn validate(&self, encoded: &str) -> AuthOutcome {
        let decoded = match STANDARD.decode(encoded.trim()).map(String::from_utf8) {
            Ok(Ok(pair)) => pair,
            _ => return AuthOutcome { ok: false, identity: INVALID_IDENTITY.to_string() },
        };
        AuthOutcome { ok: self.allowed.contains(&decoded), identity: decoded }
    }
}
