//! Flowplan Core -- the production-flow calculation engine.
//!
//! Models production sites made of pipelines, each an ordered list of stages
//! holding configured machines, and computes how much of its nominal
//! throughput every machine can actually sustain.
//!
//! # Calculation
//!
//! [`pipeline::compute_pipeline`] carries a resource pool through the stages:
//!
//! 1. **Rank** -- machines in a stage are visited by descending priority.
//! 2. **Ration** -- each machine runs at the bottleneck ratio of the pool
//!    against its input, and its consumption is reserved immediately.
//! 3. **Publish** -- the stage's outputs join the pool for the next stage.
//!
//! # Editing
//!
//! Sites are values. Mutations are expressed as [`site::SiteEdit`] commands
//! and applied by [`site::SiteEditor`], which returns a new site:
//!
//! ```rust,ignore
//! let editor = SiteEditor::default();
//! let site = editor.apply(&site, SiteEdit::SetPriority { id, priority: 3 })?;
//! store.save(index, site)?;
//! ```
//!
//! # Key Types
//!
//! - [`flow::ResourceFlow`] -- resource type to per-minute rate, with the
//!   add / subtract / scale / divide algebra.
//! - [`catalog::Catalog`] -- immutable machine template lookup.
//! - [`machine::MachineInstance`] and [`machine::CalculatedMachineInstance`].
//! - [`pipeline::CalculatedProductionPipeline`] -- propagator output.
//! - [`report::PipelineReport`] -- power and bill-of-materials summary.

pub mod catalog;
pub mod flow;
pub mod id;
pub mod machine;
pub mod pipeline;
pub mod report;
pub mod resource;
pub mod site;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
