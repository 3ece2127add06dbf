//! SHA-256 digest used as the ledger key for a migration.

use sha2::{Digest, Sha256};

/// Hex SHA-256 of a migration id.
///
/// The digest covers the id only, never the file content, so editing a
/// migration body does not orphan its ledger row.
pub fn migration_hash(id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_bytes());
    format!("{:x}", hasher.finalize())
}
