//! Restart persistence for the fingerprint map.
//!
//! The dedupe store is an in-memory, single-instance authority. To
//! survive process restarts it can be exported to and restored from a
//! versioned JSON snapshot. The format is a convenience, not a contract:
//! nothing outside this crate should parse it.

use crate::Result;
use crate::models::ProductStateRecord;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Current snapshot format version.
///
/// Imports of any other version fail closed.
pub const SNAPSHOT_VERSION: u32 = 1;

/// A point-in-time export of a dedupe store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DedupeSnapshot {
    /// Snapshot format version.
    pub version: u32,
    /// Unix timestamp of the export.
    pub exported_at: u64,
    /// Lifetime admission counter at export time.
    pub total_admitted: u64,
    /// Lifetime limited-edition admission counter at export time.
    pub limited_admitted: u64,
    /// All tracked records.
    pub records: Vec<ProductStateRecord>,
}

impl DedupeSnapshot {
    /// An empty snapshot at the current version.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: 0,
            total_admitted: 0,
            limited_admitted: 0,
            records: Vec::new(),
        }
    }

    /// Writes the snapshot to a file as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OperationFailed`] if encoding or writing
    /// fails.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| crate::Error::OperationFailed {
            operation: "encode_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        std::fs::write(path, json).map_err(|e| crate::Error::OperationFailed {
            operation: "write_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        tracing::info!(path = %path.display(), records = self.records.len(), "Saved dedupe snapshot");
        Ok(())
    }

    /// Reads a snapshot from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::OperationFailed`] if reading or decoding
    /// fails. Version validation happens at import time, not here.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
            operation: "read_snapshot".to_string(),
            cause: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| crate::Error::OperationFailed {
            operation: "decode_snapshot".to_string(),
            cause: e.to_string(),
        })
    }
}

impl Default for DedupeSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}
