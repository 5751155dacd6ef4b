//! Binary export and import of production sites.
//!
//! An export is a bitcode-encoded [`SitesSnapshot`]: a versioned header
//! followed by the sites. The header is validated before any site is
//! handed back.

use std::path::Path;

use serde::{Deserialize, Serialize};

use flowplan_core::site::ProductionSite;

use crate::StoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a site export.
pub const SNAPSHOT_MAGIC: u32 = 0xF10F_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur while reading an export.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("export from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Milliseconds since the Unix epoch at export time.
    pub exported_at: u64,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    pub fn new(exported_at: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            exported_at,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Everything written by [`export_sites`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SitesSnapshot {
    pub header: SnapshotHeader,
    pub sites: Vec<ProductionSite>,
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

/// Encode `sites` with a header stamped `exported_at`.
pub fn export_sites(sites: &[ProductionSite], exported_at: u64) -> Result<Vec<u8>, StoreError> {
    let snapshot = SitesSnapshot {
        header: SnapshotHeader::new(exported_at),
        sites: sites.to_vec(),
    };
    bitcode::serialize(&snapshot).map_err(|e| StoreError::Encode(e.to_string()))
}

/// Decode an export, validating its header.
pub fn import_sites(data: &[u8]) -> Result<SitesSnapshot, DeserializeError> {
    // bitcode has no partial decoding, so the header is checked after the
    // whole snapshot is read.
    let snapshot: SitesSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    snapshot.header.validate()?;
    Ok(snapshot)
}

/// Write an export of `sites` to `path`.
pub fn export_to_file(path: &Path, sites: &[ProductionSite]) -> Result<(), StoreError> {
    let data = export_sites(sites, crate::now_millis())?;
    std::fs::write(path, &data)?;
    tracing::info!(file = %path.display(), sites = sites.len(), bytes = data.len(), "exported sites");
    Ok(())
}

/// Read an export from `path`.
pub fn import_from_file(path: &Path) -> Result<Vec<ProductionSite>, StoreError> {
    let data = std::fs::read(path)?;
    let snapshot = import_sites(&data)?;
    tracing::info!(
        file = %path.display(),
        sites = snapshot.sites.len(),
        exported_at = snapshot.header.exported_at,
        "imported sites"
    );
    Ok(snapshot.sites)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
