//! Production sites and the edit commands that produce new site values.
//!
//! Sites are never edited in place. A [`SiteEdit`] is applied to a snapshot
//! by [`SiteEditor::apply`], which returns a new [`ProductionSite`] that the
//! caller then hands to the persistence gateway. Pipelines and stages are
//! addressed by index, machines only by their [`MachineId`].

use serde::{Deserialize, Serialize};

use crate::id::{DEFAULT_ID_LENGTH, IdGenerator, MachineId};
use crate::machine::MachineInstance;
use crate::pipeline::{ProductionPipeline, ProductionStage};

// ---------------------------------------------------------------------------
// Site
// ---------------------------------------------------------------------------

/// Top-level persisted unit: a named collection of pipelines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSite {
    pub name: String,
    /// Milliseconds since the Unix epoch.
    pub last_edit_time: u64,
    pub pipelines: Vec<ProductionPipeline>,
}

/// Where a machine lives inside a site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineLocation {
    pub pipeline: usize,
    pub stage: usize,
    pub index: usize,
}

impl ProductionSite {
    pub fn new(name: &str, last_edit_time: u64) -> Self {
        Self {
            name: name.to_string(),
            last_edit_time,
            pipelines: Vec::new(),
        }
    }

    /// An empty site named `New Production Site #xxxxxx`.
    pub fn untitled(ids: &mut dyn IdGenerator, now: u64) -> Self {
        Self::untitled_with_id_length(ids, DEFAULT_ID_LENGTH, now)
    }

    /// Like [`ProductionSite::untitled`], with a name suffix of `id_length`
    /// characters.
    pub fn untitled_with_id_length(ids: &mut dyn IdGenerator, id_length: usize, now: u64) -> Self {
        Self::new(&format!("New Production Site #{}", ids.new_id(id_length)), now)
    }

    pub fn with_pipeline(mut self, pipeline: ProductionPipeline) -> Self {
        self.pipelines.push(pipeline);
        self
    }

    pub fn locate_machine(&self, id: &MachineId) -> Option<MachineLocation> {
        self.pipelines.iter().enumerate().find_map(|(p, pipeline)| {
            pipeline.stages.iter().enumerate().find_map(|(s, stage)| {
                stage
                    .machines
                    .iter()
                    .position(|m| &m.id == id)
                    .map(|index| MachineLocation {
                        pipeline: p,
                        stage: s,
                        index,
                    })
            })
        })
    }

    pub fn find_machine(&self, id: &MachineId) -> Option<&MachineInstance> {
        self.locate_machine(id)
            .map(|loc| &self.pipelines[loc.pipeline].stages[loc.stage].machines[loc.index])
    }

    pub fn machine_count(&self) -> usize {
        self.pipelines
            .iter()
            .flat_map(|p| p.stages.iter())
            .map(|s| s.machines.len())
            .sum()
    }
}

// ---------------------------------------------------------------------------
// Edit commands
// ---------------------------------------------------------------------------

/// A single mutation requested by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum SiteEdit {
    RenameSite { name: String },
    AddPipeline { name: String },
    RenamePipeline { pipeline: usize, name: String },
    RemovePipeline { pipeline: usize },
    AddStage { pipeline: usize, stage: ProductionStage },
    RenameStage { pipeline: usize, stage: usize, name: String },
    RemoveStage { pipeline: usize, stage: usize },
    AddMachine { pipeline: usize, stage: usize, machine: MachineInstance },
    RemoveMachine { id: MachineId },
    RenameMachine { id: MachineId, name: String },
    SetClockSpeed { id: MachineId, clock_speed: f64 },
    SetPriority { id: MachineId, priority: i32 },
}

/// Accepted clock speed range for edits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockSpeedLimits {
    pub min: f64,
    pub max: f64,
}

impl Default for ClockSpeedLimits {
    fn default() -> Self {
        Self { min: 0.01, max: 2.5 }
    }
}

impl ClockSpeedLimits {
    /// Bounds must be finite with `0 <= min <= max`.
    pub fn validate(&self) -> Result<(), EditError> {
        let ordered = self.min.is_finite()
            && self.max.is_finite()
            && self.min >= 0.0
            && self.min <= self.max;
        if !ordered {
            return Err(EditError::InvalidClockSpeedLimits {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Clamp `clock_speed` into range. NaN has no sensible clamp and is rejected.
    pub fn clamp(&self, clock_speed: f64) -> Result<f64, EditError> {
        self.validate()?;
        if clock_speed.is_nan() {
            return Err(EditError::InvalidClockSpeed(clock_speed));
        }
        Ok(clock_speed.clamp(self.min, self.max))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EditError {
    #[error("pipeline {0} not found")]
    PipelineNotFound(usize),
    #[error("stage {stage} not found in pipeline {pipeline}")]
    StageNotFound { pipeline: usize, stage: usize },
    #[error("machine {0} not found")]
    MachineNotFound(MachineId),
    #[error("machine id {0} already exists in this site")]
    DuplicateMachineId(MachineId),
    #[error("invalid clock speed: {0}")]
    InvalidClockSpeed(f64),
    #[error("invalid clock speed limits: min {min}, max {max}")]
    InvalidClockSpeedLimits { min: f64, max: f64 },
}

/// Applies [`SiteEdit`]s to site snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct SiteEditor {
    limits: ClockSpeedLimits,
}

impl SiteEditor {
    pub fn new(limits: ClockSpeedLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> ClockSpeedLimits {
        self.limits
    }

    /// Apply `edit` to `site`, returning the edited copy. `site` is untouched.
    pub fn apply(&self, site: &ProductionSite, edit: SiteEdit) -> Result<ProductionSite, EditError> {
        let mut next = site.clone();
        self.apply_in_place(&mut next, edit)?;
        Ok(next)
    }

    /// Apply a batch. If any edit fails, none of them take effect.
    pub fn apply_all(
        &self,
        site: &ProductionSite,
        edits: impl IntoIterator<Item = SiteEdit>,
    ) -> Result<ProductionSite, EditError> {
        let mut next = site.clone();
        for edit in edits {
            self.apply_in_place(&mut next, edit)?;
        }
        Ok(next)
    }

    fn apply_in_place(&self, site: &mut ProductionSite, edit: SiteEdit) -> Result<(), EditError> {
        match edit {
            SiteEdit::RenameSite { name } => site.name = name,
            SiteEdit::AddPipeline { name } => site.pipelines.push(ProductionPipeline::new(&name)),
            SiteEdit::RenamePipeline { pipeline, name } => {
                pipeline_mut(site, pipeline)?.name = name;
            }
            SiteEdit::RemovePipeline { pipeline } => {
                pipeline_mut(site, pipeline)?;
                site.pipelines.remove(pipeline);
            }
            SiteEdit::AddStage { pipeline, mut stage } => {
                for (i, machine) in stage.machines.iter().enumerate() {
                    let repeated = stage.machines[..i].iter().any(|m| m.id == machine.id);
                    if repeated || site.locate_machine(&machine.id).is_some() {
                        return Err(EditError::DuplicateMachineId(machine.id.clone()));
                    }
                }
                for machine in &mut stage.machines {
                    machine.clock_speed = self.limits.clamp(machine.clock_speed)?;
                }
                pipeline_mut(site, pipeline)?.stages.push(stage);
            }
            SiteEdit::RenameStage {
                pipeline,
                stage,
                name,
            } => {
                stage_mut(site, pipeline, stage)?.name = name;
            }
            SiteEdit::RemoveStage { pipeline, stage } => {
                stage_mut(site, pipeline, stage)?;
                site.pipelines[pipeline].stages.remove(stage);
            }
            SiteEdit::AddMachine {
                pipeline,
                stage,
                mut machine,
            } => {
                if site.locate_machine(&machine.id).is_some() {
                    return Err(EditError::DuplicateMachineId(machine.id));
                }
                machine.clock_speed = self.limits.clamp(machine.clock_speed)?;
                stage_mut(site, pipeline, stage)?.machines.push(machine);
            }
            SiteEdit::RemoveMachine { id } => {
                let loc = locate(site, &id)?;
                site.pipelines[loc.pipeline].stages[loc.stage]
                    .machines
                    .remove(loc.index);
            }
            SiteEdit::RenameMachine { id, name } => {
                machine_mut(site, &id)?.name = name;
            }
            SiteEdit::SetClockSpeed { id, clock_speed } => {
                let clock_speed = self.limits.clamp(clock_speed)?;
                machine_mut(site, &id)?.clock_speed = clock_speed;
            }
            SiteEdit::SetPriority { id, priority } => {
                machine_mut(site, &id)?.priority = priority;
            }
        }
        Ok(())
    }
}

fn pipeline_mut(site: &mut ProductionSite, pipeline: usize) -> Result<&mut ProductionPipeline, EditError> {
    site.pipelines
        .get_mut(pipeline)
        .ok_or(EditError::PipelineNotFound(pipeline))
}

fn stage_mut(
    site: &mut ProductionSite,
    pipeline: usize,
    stage: usize,
) -> Result<&mut ProductionStage, EditError> {
    pipeline_mut(site, pipeline)?
        .stages
        .get_mut(stage)
        .ok_or(EditError::StageNotFound { pipeline, stage })
}

fn locate(site: &ProductionSite, id: &MachineId) -> Result<MachineLocation, EditError> {
    site.locate_machine(id)
        .ok_or_else(|| EditError::MachineNotFound(id.clone()))
}

fn machine_mut<'a>(
    site: &'a mut ProductionSite,
    id: &MachineId,
) -> Result<&'a mut MachineInstance, EditError> {
    let loc = locate(site, id)?;
    Ok(&mut site.pipelines[loc.pipeline].stages[loc.stage].machines[loc.index])
}
