//! # Identifier Newtypes
//!
//! Newtype wrappers for the identifiers that cross component boundaries,
//! so a wizard session id cannot be passed where the back office's
//! created-record id is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one wizard session in logs. Regenerated on restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Generate a new random session identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "session:{}", self.0)
    }
}

/// Identifier the submission sink assigns to a created KYC record.
///
/// Opaque: the back office decides the format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionId(pub String);

impl SubmissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn session_display_is_prefixed() {
        let id = SessionId::new();
        assert_eq!(id.to_string(), format!("session:{}", id.as_uuid()));
    }

    #[test]
    fn submission_id_is_transparent_on_the_wire() {
        let id = SubmissionId::new("kyc-42");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"kyc-42\"");
    }
}
