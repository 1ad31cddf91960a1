//! Authenticated caller identity.

use serde::{Deserialize, Serialize};

/// The identity produced by a successful credential validation.
///
/// A principal carries no ownership semantics: items are not scoped by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    subject: String,
}

impl Principal {
    /// Creates a principal for the given subject claim.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// Returns the subject claim.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "user:{}", self.subject)
    }
}
