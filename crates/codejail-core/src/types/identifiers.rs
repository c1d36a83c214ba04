//! Strongly-typed identifiers.

use crate::error::SecurityError;
use crate::id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a session directory under `.sessions/`.
///
/// Construction always validates, so a `SessionId` can be joined onto the
/// sessions root without escaping it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionId(String);

impl SessionId {
    /// Mint a fresh server-side session ID.
    pub fn generate() -> Self {
        Self(id::session_id())
    }

    /// Validate a caller-supplied ID.
    pub fn parse(raw: impl Into<String>) -> Result<Self, SecurityError> {
        let raw = raw.into();
        if id::is_valid_session_id(&raw) {
            Ok(Self(raw))
        } else {
            Err(SecurityError::InvalidSessionId(raw))
        }
    }

    /// Use the given ID, or mint one when it is absent or empty.
    pub fn parse_or_generate(raw: Option<&str>) -> Result<Self, SecurityError> {
        match raw {
            Some(raw) if !raw.is_empty() => Self::parse(raw),
            _ => Ok(Self::generate()),
        }
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for SessionId {
    type Error = SecurityError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(s)
    }
}

impl From<SessionId> for String {
    fn from(id: SessionId) -> Self {
        id.0
    }
}

impl AsRef<str> for SessionId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
