//! In-memory site store. Nothing outlives the process.

use flowplan_core::site::ProductionSite;

use crate::{SiteStore, StoreError, now_millis};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryStore {
    sites: Vec<ProductionSite>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sites(sites: Vec<ProductionSite>) -> Self {
        Self { sites }
    }

    pub fn into_sites(self) -> Vec<ProductionSite> {
        self.sites
    }
}

impl SiteStore for MemoryStore {
    fn load(&self) -> &[ProductionSite] {
        &self.sites
    }

    fn save(&mut self, index: usize, mut site: ProductionSite) -> Result<(), StoreError> {
        let slot = self
            .sites
            .get_mut(index)
            .ok_or(StoreError::SiteNotFound(index))?;
        site.last_edit_time = now_millis();
        *slot = site;
        Ok(())
    }

    fn create(&mut self, site: ProductionSite) -> usize {
        self.sites.push(site);
        self.sites.len() - 1
    }

    fn delete(&mut self, index: usize) -> Result<ProductionSite, StoreError> {
        if index >= self.sites.len() {
            return Err(StoreError::SiteNotFound(index));
        }
        Ok(self.sites.remove(index))
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        Ok(())
    }
}
