//! Data-driven configuration for the planner.
//!
//! Machine catalogs and planner settings are read from RON, JSON, or TOML
//! files. Catalog entries name resources by key (`"ironOre"`); names are
//! resolved and validated before a [`Catalog`](flowplan_core::catalog::Catalog)
//! is built.

pub mod catalog;
pub mod config;
pub mod loader;
pub mod schema;

pub use catalog::{builtin_catalog, load_catalog, parse_catalog};
pub use config::{PlannerConfig, StoreConfig, load_config, load_config_dir};
pub use loader::{DataLoadError, Format};
