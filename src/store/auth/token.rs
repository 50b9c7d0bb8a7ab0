//! Bearer credential wrapper.

use serde::{Deserialize, Serialize};

/// Opaque bearer token that never shows up in logs.
///
/// The inner value is never exposed via Debug or Display traits.
/// Use `expose()` to access the actual value when building the
/// `Authorization` header or persisting the session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BearerToken(String);

impl BearerToken {
    /// Accept a raw token. Blank strings are not tokens.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(Self(trimmed.to_string()))
    }

    /// Expose the inner value.
    ///
    /// Use sparingly and only when actually sending or storing it.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for BearerToken {
    type Error = &'static str;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(raw).ok_or("bearer token must not be blank")
    }
}

impl From<BearerToken> for String {
    fn from(token: BearerToken) -> Self {
        token.0
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BearerToken(••••••••)")
    }
}

impl std::fmt::Display for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "••••••••")
    }
}
