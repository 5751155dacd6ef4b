//! Site store backed by a JSON object file.
//!
//! Sites live as an array under a storage key (`productionSites` by
//! default). Other keys in the file are preserved on commit. Loading is
//! tolerant: a missing, unreadable, or malformed file yields an empty store
//! instead of an error.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use flowplan_core::site::ProductionSite;
use flowplan_data::StoreConfig;

use crate::{MemoryStore, SiteStore, StoreError};

#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    storage_key: String,
    sites: MemoryStore,
    /// Entries under other keys, written back untouched.
    other: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store at `path`, reading any sites already saved there.
    pub fn open(path: impl Into<PathBuf>, storage_key: impl Into<String>) -> Self {
        let path = path.into();
        let storage_key = storage_key.into();
        let (other, sites) = read_store_file(&path, &storage_key);
        tracing::debug!(file = %path.display(), key = %storage_key, sites = sites.len(), "opened site store");
        Self {
            path,
            storage_key,
            sites: MemoryStore::with_sites(sites),
            other,
        }
    }

    /// Open the store described by `config`, relative to `base_dir`.
    pub fn from_config(config: &StoreConfig, base_dir: &Path) -> Self {
        Self::open(base_dir.join(&config.path), config.storage_key.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }
}

impl SiteStore for JsonFileStore {
    fn load(&self) -> &[ProductionSite] {
        self.sites.load()
    }

    fn save(&mut self, index: usize, site: ProductionSite) -> Result<(), StoreError> {
        self.sites.save(index, site)
    }

    fn create(&mut self, site: ProductionSite) -> usize {
        self.sites.create(site)
    }

    fn delete(&mut self, index: usize) -> Result<ProductionSite, StoreError> {
        self.sites.delete(index)
    }

    /// Write the file atomically: the new content goes to a sibling temp
    /// file which then replaces the store file.
    fn commit(&mut self) -> Result<(), StoreError> {
        let mut root = self.other.clone();
        root.insert(
            self.storage_key.clone(),
            serde_json::to_value(self.sites.load())?,
        );
        let content = serde_json::to_string_pretty(&Value::Object(root))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(&self.path);
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;

        tracing::info!(file = %self.path.display(), sites = self.sites.len(), "committed site store");
        Ok(())
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn read_store_file(path: &Path, storage_key: &str) -> (Map<String, Value>, Vec<ProductionSite>) {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(file = %path.display(), "no site store yet, starting empty");
            return (Map::new(), Vec::new());
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "site store unreadable, starting empty");
            return (Map::new(), Vec::new());
        }
    };

    let mut root = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(root)) => root,
        Ok(_) => {
            tracing::warn!(file = %path.display(), "site store is not a JSON object, starting empty");
            return (Map::new(), Vec::new());
        }
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "site store is corrupted, starting empty");
            return (Map::new(), Vec::new());
        }
    };

    let sites = match root.remove(storage_key) {
        None => Vec::new(),
        Some(value) => match serde_json::from_value::<Vec<ProductionSite>>(value) {
            Ok(sites) => sites,
            Err(e) => {
                tracing::warn!(
                    file = %path.display(),
                    key = storage_key,
                    error = %e,
                    "stored sites are malformed, starting empty"
                );
                Vec::new()
            }
        },
    };
    (root, sites)
}
