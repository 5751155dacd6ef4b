//! Production stages, pipelines, and the flow propagator.
//!
//! [`compute_pipeline`] walks a pipeline's stages in order while carrying a
//! running resource pool:
//!
//! 1. Machines in a stage are visited by descending priority; equal
//!    priorities keep their stored order.
//! 2. Each machine's utility is the bottleneck ratio of the pool against its
//!    nominal input, and its actual input is reserved from the pool at once.
//! 3. Once every machine in the stage has been evaluated, their actual
//!    outputs are added to the pool for the next stage. A stage never feeds
//!    itself.
//!
//! The pool left after the last stage is the pipeline's surplus.

use serde::{Deserialize, Serialize};

use crate::flow::{self, ResourceFlow};
use crate::id::{DEFAULT_ID_LENGTH, IdGenerator, MachineId};
use crate::machine::{CalculatedMachineInstance, MachineInstance, input_flow};

/// One step of a pipeline, e.g. "smelting".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionStage {
    pub name: String,
    pub machines: Vec<MachineInstance>,
}

impl ProductionStage {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            machines: Vec::new(),
        }
    }

    /// An empty stage named `New stage #xxxxxx`.
    pub fn untitled(ids: &mut dyn IdGenerator) -> Self {
        Self::untitled_with_id_length(ids, DEFAULT_ID_LENGTH)
    }

    /// Like [`ProductionStage::untitled`], with a name suffix of `id_length`
    /// characters.
    pub fn untitled_with_id_length(ids: &mut dyn IdGenerator, id_length: usize) -> Self {
        Self::new(&format!("New stage #{}", ids.new_id(id_length)))
    }

    pub fn with_machine(mut self, machine: MachineInstance) -> Self {
        self.machines.push(machine);
        self
    }

    pub fn machine(&self, id: &MachineId) -> Option<&MachineInstance> {
        self.machines.iter().find(|m| &m.id == id)
    }
}

/// An ordered sequence of stages; stage `i` feeds stage `i + 1`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionPipeline {
    pub name: String,
    pub stages: Vec<ProductionStage>,
}

impl ProductionPipeline {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            stages: Vec::new(),
        }
    }

    pub fn with_stage(mut self, stage: ProductionStage) -> Self {
        self.stages.push(stage);
        self
    }
}

/// A stage whose machines carry computed utility rates, in stored order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedProductionStage {
    pub name: String,
    pub machines: Vec<CalculatedMachineInstance>,
}

impl CalculatedProductionStage {
    /// Whether any machine in the stage runs below full capacity.
    pub fn has_shortage(&self) -> bool {
        self.machines.iter().any(|m| m.is_running_short())
    }

    pub fn machine(&self, id: &MachineId) -> Option<&CalculatedMachineInstance> {
        self.machines.iter().find(|m| &m.instance.id == id)
    }
}

/// Result of [`compute_pipeline`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedProductionPipeline {
    pub name: String,
    pub stages: Vec<CalculatedProductionStage>,
    /// Resources left in the pool after the final stage.
    pub surplus: ResourceFlow,
}

impl CalculatedProductionPipeline {
    pub fn new(pipeline: &ProductionPipeline) -> Self {
        compute_pipeline(pipeline)
    }

    pub fn machines(&self) -> impl Iterator<Item = &CalculatedMachineInstance> {
        self.stages.iter().flat_map(|s| s.machines.iter())
    }

    pub fn machine(&self, id: &MachineId) -> Option<&CalculatedMachineInstance> {
        self.stages.iter().find_map(|s| s.machine(id))
    }
}

/// Propagate resource availability through `pipeline` and compute every
/// machine's utility rate.
pub fn compute_pipeline(pipeline: &ProductionPipeline) -> CalculatedProductionPipeline {
    let mut pool = ResourceFlow::new();
    let mut stages = Vec::with_capacity(pipeline.stages.len());

    for stage in &pipeline.stages {
        let machines = compute_stage(stage, &mut pool);
        stages.push(CalculatedProductionStage {
            name: stage.name.clone(),
            machines,
        });
    }

    CalculatedProductionPipeline {
        name: pipeline.name.clone(),
        stages,
        surplus: pool,
    }
}

fn compute_stage(
    stage: &ProductionStage,
    pool: &mut ResourceFlow,
) -> Vec<CalculatedMachineInstance> {
    // Stable sort: equal priorities stay in stored order.
    let mut order: Vec<usize> = (0..stage.machines.len()).collect();
    order.sort_by(|&a, &b| stage.machines[b].priority.cmp(&stage.machines[a].priority));

    let mut calculated: Vec<Option<CalculatedMachineInstance>> = vec![None; stage.machines.len()];
    for index in order {
        let machine = &stage.machines[index];
        let ratio = flow::divide(pool, &input_flow(machine));
        let calc = CalculatedMachineInstance::new(machine.clone(), ratio);
        flow::subtract(pool, &calc.input_resource_flow());
        calculated[index] = Some(calc);
    }

    let calculated: Vec<CalculatedMachineInstance> = calculated.into_iter().flatten().collect();
    for machine in &calculated {
        flow::add(pool, &machine.output_resource_flow());
    }
    calculated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType::*;
    use crate::test_utils::*;

    #[test]
    fn empty_pipeline_has_no_stages_and_no_surplus() {
        let calc = compute_pipeline(&ProductionPipeline::new("empty"));
        assert_eq!(calc.name, "empty");
        assert!(calc.stages.is_empty());
        assert!(calc.surplus.is_empty());
    }

    #[test]
    fn empty_stage_passes_pool_through() {
        let mut ids = SequentialIdGenerator::new();
        let pipeline = ProductionPipeline::new("p")
            .with_stage(ProductionStage::new("mine").with_machine(miner(&mut ids, IronOre, 60.0)))
            .with_stage(ProductionStage::new("nothing"))
            .with_stage(
                ProductionStage::new("smelt")
                    .with_machine(converter(&mut ids, IronOre, 30.0, IronIngot, 30.0)),
            );
        let calc = compute_pipeline(&pipeline);
        assert_eq!(calc.stages[1].machines.len(), 0);
        assert_eq!(calc.stages[2].machines[0].utility_rate(), 1.0);
        assert_eq!(calc.surplus.get(IronOre), 30.0);
        assert_eq!(calc.surplus.get(IronIngot), 30.0);
    }

    #[test]
    fn first_stage_consumers_stall() {
        let mut ids = SequentialIdGenerator::new();
        let pipeline = ProductionPipeline::new("p").with_stage(
            ProductionStage::new("smelt")
                .with_machine(converter(&mut ids, IronOre, 30.0, IronIngot, 30.0)),
        );
        let calc = compute_pipeline(&pipeline);
        let m = &calc.stages[0].machines[0];
        assert!(m.is_stalled());
        assert!(calc.surplus.get(IronIngot).abs() < 1e-12);
    }

    #[test]
    fn output_keeps_stored_order_despite_priority() {
        let mut ids = SequentialIdGenerator::new();
        let low = converter(&mut ids, IronOre, 30.0, IronIngot, 30.0).with_priority(1);
        let high = converter(&mut ids, IronOre, 30.0, IronIngot, 30.0).with_priority(5);
        let low_id = low.id.clone();
        let high_id = high.id.clone();

        let pipeline = ProductionPipeline::new("p")
            .with_stage(ProductionStage::new("mine").with_machine(miner(&mut ids, IronOre, 30.0)))
            .with_stage(ProductionStage::new("smelt").with_machine(low).with_machine(high));
        let calc = compute_pipeline(&pipeline);

        let stage = &calc.stages[1];
        assert_eq!(stage.machines[0].instance.id, low_id);
        assert_eq!(stage.machines[1].instance.id, high_id);
        assert!(stage.machines[0].is_stalled());
        assert_eq!(stage.machines[1].utility_rate(), 1.0);
        assert!(stage.has_shortage());
    }

    #[test]
    fn stage_cannot_feed_itself() {
        let mut ids = SequentialIdGenerator::new();
        // Producer listed after the consumer but in the same stage.
        let pipeline = ProductionPipeline::new("p").with_stage(
            ProductionStage::new("mixed")
                .with_machine(converter(&mut ids, IronOre, 30.0, IronIngot, 30.0).with_priority(9))
                .with_machine(miner(&mut ids, IronOre, 60.0)),
        );
        let calc = compute_pipeline(&pipeline);
        assert!(calc.stages[0].machines[0].is_stalled());
        assert_eq!(calc.surplus.get(IronOre), 60.0);
    }

    #[test]
    fn input_is_not_mutated() {
        let mut ids = SequentialIdGenerator::new();
        let pipeline = ProductionPipeline::new("p")
            .with_stage(ProductionStage::new("mine").with_machine(miner(&mut ids, IronOre, 30.0)))
            .with_stage(
                ProductionStage::new("smelt")
                    .with_machine(converter(&mut ids, IronOre, 30.0, IronIngot, 30.0)),
            );
        let before = pipeline.clone();
        let _ = compute_pipeline(&pipeline);
        assert_eq!(pipeline, before);
    }

    #[test]
    fn lookup_calculated_machine_by_id() {
        let mut ids = SequentialIdGenerator::new();
        let m = miner(&mut ids, Coal, 45.0);
        let id = m.id.clone();
        let calc = compute_pipeline(
            &ProductionPipeline::new("p").with_stage(ProductionStage::new("mine").with_machine(m)),
        );
        assert_eq!(calc.machine(&id).unwrap().utility_rate(), 1.0);
        assert!(calc.machine(&MachineId::new("missing")).is_none());
        assert_eq!(calc.machines().count(), 1);
    }

    #[test]
    fn untitled_stage_name() {
        let mut ids = SequentialIdGenerator::new();
        let stage = ProductionStage::untitled(&mut ids);
        assert!(stage.name.starts_with("New stage #"), "got: {}", stage.name);
        assert!(stage.machines.is_empty());
    }

    #[test]
    fn untitled_stage_with_id_length() {
        let mut ids = SequentialIdGenerator::new();
        let stage = ProductionStage::untitled_with_id_length(&mut ids, 3);
        assert_eq!(stage.name, "New stage #001");
    }
}
