//! Persistence for production sites.
//!
//! Sites are addressed by index. Editing follows value semantics: a caller
//! reads a site, produces an edited copy with
//! [`SiteEditor`](flowplan_core::site::SiteEditor), and hands the copy back
//! through [`SiteStore::save`]. Changes become durable on
//! [`SiteStore::commit`].
//!
//! ```ignore
//! let mut store = JsonFileStore::open("flowplan-sites.json", "productionSites");
//! let index = store.create(ProductionSite::untitled(&mut ids, now_millis()));
//! let edited = editor.apply(store.get(index)?, SiteEdit::RenameSite { name })?;
//! store.save(index, edited)?;
//! store.commit()?;
//! ```

pub mod json_file;
pub mod memory;
pub mod snapshot;

use std::time::{SystemTime, UNIX_EPOCH};

use flowplan_core::site::ProductionSite;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use snapshot::{DeserializeError, export_sites, import_sites};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("production site {0} not found")]
    SiteNotFound(usize),
    #[error("site encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Deserialize(#[from] DeserializeError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Durable list of production sites, keyed by index.
pub trait SiteStore {
    /// Every stored site, in index order.
    fn load(&self) -> &[ProductionSite];

    fn get(&self, index: usize) -> Result<&ProductionSite, StoreError> {
        self.load()
            .get(index)
            .ok_or(StoreError::SiteNotFound(index))
    }

    /// Replace the site at `index`, stamping its last edit time.
    fn save(&mut self, index: usize, site: ProductionSite) -> Result<(), StoreError>;

    /// Append `site`, returning its index.
    fn create(&mut self, site: ProductionSite) -> usize;

    /// Remove the site at `index`; later sites shift down by one.
    fn delete(&mut self, index: usize) -> Result<ProductionSite, StoreError>;

    /// Flush to durable storage.
    fn commit(&mut self) -> Result<(), StoreError>;

    fn len(&self) -> usize {
        self.load().len()
    }

    fn is_empty(&self) -> bool {
        self.load().is_empty()
    }
}

/// Milliseconds since the Unix epoch; 0 if the clock is before it.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
