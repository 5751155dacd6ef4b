//! Planner configuration: catalog source, site store location, id length,
//! and clock speed limits.
//!
//! Every field is optional in the file; missing fields take their defaults.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use flowplan_core::catalog::{Catalog, MachineTemplate};
use flowplan_core::id::{DEFAULT_ID_LENGTH, IdGenerator};
use flowplan_core::machine::MachineInstance;
use flowplan_core::pipeline::ProductionStage;
use flowplan_core::site::{ClockSpeedLimits, ProductionSite, SiteEditor};

use crate::catalog::{builtin_catalog, load_catalog};
use crate::loader::{DataLoadError, deserialize_file, find_data_file};

/// Base name of the configuration file inside a config directory.
pub const CONFIG_BASE_NAME: &str = "planner";

/// Where and under which key production sites are persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub path: PathBuf,
    pub storage_key: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("flowplan-sites.json"),
            storage_key: "productionSites".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Catalog file. The built-in catalog is used when absent.
    pub catalog: Option<PathBuf>,
    pub store: StoreConfig,
    pub id_length: usize,
    pub clock_speed: ClockSpeedLimits,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            catalog: None,
            store: StoreConfig::default(),
            id_length: DEFAULT_ID_LENGTH,
            clock_speed: ClockSpeedLimits::default(),
        }
    }
}

impl PlannerConfig {
    /// Load the configured catalog. A relative catalog path is resolved
    /// against `base_dir`.
    pub fn load_catalog(&self, base_dir: &Path) -> Result<Catalog, DataLoadError> {
        match &self.catalog {
            Some(path) => load_catalog(&base_dir.join(path)),
            None => {
                tracing::debug!("using built-in machine catalog");
                builtin_catalog()
            }
        }
    }

    /// Resolve the store file against `base_dir`.
    pub fn store_path(&self, base_dir: &Path) -> PathBuf {
        base_dir.join(&self.store.path)
    }

    pub fn editor(&self) -> SiteEditor {
        SiteEditor::new(self.clock_speed)
    }

    /// Check value ranges serde cannot express: a non-zero id length and
    /// clock speed limits with `0 <= min <= max`.
    pub fn validate(&self, file: &Path) -> Result<(), DataLoadError> {
        let invalid = |detail: String| DataLoadError::InvalidConfig {
            file: file.to_path_buf(),
            detail,
        };
        if self.id_length == 0 {
            return Err(invalid("id_length must be at least 1".to_string()));
        }
        self.clock_speed
            .validate()
            .map_err(|e| invalid(e.to_string()))
    }

    /// An empty site whose name suffix has the configured id length.
    pub fn untitled_site(&self, ids: &mut dyn IdGenerator, now: u64) -> ProductionSite {
        ProductionSite::untitled_with_id_length(ids, self.id_length, now)
    }

    /// An empty stage whose name suffix has the configured id length.
    pub fn untitled_stage(&self, ids: &mut dyn IdGenerator) -> ProductionStage {
        ProductionStage::untitled_with_id_length(ids, self.id_length)
    }

    /// Instantiate `template` with an id of the configured length.
    pub fn instantiate(
        &self,
        template: Arc<MachineTemplate>,
        ids: &mut dyn IdGenerator,
    ) -> MachineInstance {
        MachineInstance::create_with_id_length(template, ids, self.id_length)
    }
}

/// Load a configuration file (`.ron`, `.json`, or `.toml`).
pub fn load_config(path: &Path) -> Result<PlannerConfig, DataLoadError> {
    let config: PlannerConfig = deserialize_file(path)?;
    config.validate(path)?;
    tracing::info!(file = %path.display(), "loaded planner configuration");
    Ok(config)
}

/// Load `planner.{ron,json,toml}` from `dir`, falling back to defaults when
/// no such file exists.
pub fn load_config_dir(dir: &Path) -> Result<PlannerConfig, DataLoadError> {
    match find_data_file(dir, CONFIG_BASE_NAME)? {
        Some(path) => load_config(&path),
        None => {
            tracing::info!(dir = %dir.display(), "no planner configuration found, using defaults");
            Ok(PlannerConfig::default())
        }
    }
}
