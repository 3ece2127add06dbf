//! Strongly-typed migration identifier.

use crate::digest::migration_hash;
use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;
use std::path::Path;

/// Identifier of one migration, derived from its file stem.
///
/// Ids travel through whitespace-separated `depends:` lists, so they may
/// never be empty or contain whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MigrationId(String);

impl MigrationId {
    /// Try to create a new `MigrationId`, returning `None` for empty or
    /// whitespace-carrying input.
    pub fn try_new(id: impl Into<String>) -> Option<Self> {
        let s = id.into();
        if s.is_empty() || s.chars().any(char::is_whitespace) {
            None
        } else {
            Some(Self(s))
        }
    }

    /// Derive the id from a migration file path (the file stem).
    pub fn from_path(path: &Path) -> CoreResult<Self> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();
        Self::try_new(stem).ok_or_else(|| CoreError::InvalidMigrationId {
            id: stem.to_string(),
            reason: format!(
                "derived from '{}', must be non-empty without whitespace",
                path.display()
            ),
        })
    }

    /// Digest stored as the ledger primary key.
    pub fn hash(&self) -> String {
        migration_hash(&self.0)
    }

    /// Return the underlying id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the inner `String`.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for MigrationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Deref for MigrationId {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MigrationId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for MigrationId {
    type Error = String;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::try_new(s.clone()).ok_or_else(|| format!("invalid migration id '{s}'"))
    }
}

impl From<MigrationId> for String {
    fn from(id: MigrationId) -> Self {
        id.0
    }
}

impl PartialEq<str> for MigrationId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for MigrationId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
