//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use std::sync::Arc;

use crate::catalog::MachineTemplate;
use crate::id::IdGenerator;
use crate::machine::MachineInstance;
use crate::pipeline::{ProductionPipeline, ProductionStage};
use crate::resource::{ResourceAmount, ResourceRate, ResourceType};

// ===========================================================================
// Identifiers
// ===========================================================================

/// Yields zero-padded hex counters: `000001`, `000002`, ...
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn new_id(&mut self, len: usize) -> String {
        self.next += 1;
        let id = format!("{:0width$x}", self.next, width = len);
        id[id.len() - len..].to_string()
    }
}

// ===========================================================================
// Templates
// ===========================================================================

/// A machine with no input that produces `rate` of `output` per minute.
/// Draws 5 MW.
pub fn source_template(output: ResourceType, rate: f64) -> Arc<MachineTemplate> {
    Arc::new(
        MachineTemplate::new(&format!("Miner ({output})"))
            .with_output(ResourceRate::new(output, rate))
            .with_power(5.0)
            .with_cost(ResourceAmount::new(ResourceType::PortableMiner, 1))
            .with_cost(ResourceAmount::new(ResourceType::IronPlate, 10)),
    )
}

/// A one-input, one-output machine. Draws 4 MW.
pub fn converter_template(
    input: ResourceType,
    input_rate: f64,
    output: ResourceType,
    output_rate: f64,
) -> Arc<MachineTemplate> {
    Arc::new(
        MachineTemplate::new(&format!("Converter ({input} -> {output})"))
            .with_input(ResourceRate::new(input, input_rate))
            .with_output(ResourceRate::new(output, output_rate))
            .with_power(4.0)
            .with_cost(ResourceAmount::new(ResourceType::IronRod, 5))
            .with_cost(ResourceAmount::new(ResourceType::Wire, 8)),
    )
}

// ===========================================================================
// Instances
// ===========================================================================

pub fn miner(ids: &mut dyn IdGenerator, output: ResourceType, rate: f64) -> MachineInstance {
    MachineInstance::create(source_template(output, rate), ids)
}

pub fn converter(
    ids: &mut dyn IdGenerator,
    input: ResourceType,
    input_rate: f64,
    output: ResourceType,
    output_rate: f64,
) -> MachineInstance {
    MachineInstance::create(
        converter_template(input, input_rate, output, output_rate),
        ids,
    )
}

// ===========================================================================
// Pipelines
// ===========================================================================

/// A linear chain: one mining stage, then `stages` stages of `width`
/// converters each passing iron ore along at 30/min.
pub fn build_chain_pipeline(stages: usize, width: usize) -> ProductionPipeline {
    let mut ids = SequentialIdGenerator::new();
    let mut pipeline = ProductionPipeline::new("chain");

    let mut mining = ProductionStage::new("mining");
    for _ in 0..width {
        mining.machines.push(miner(&mut ids, ResourceType::IronOre, 30.0));
    }
    pipeline.stages.push(mining);

    for s in 0..stages {
        let mut stage = ProductionStage::new(&format!("stage {s}"));
        for w in 0..width {
            stage.machines.push(
                converter(
                    &mut ids,
                    ResourceType::IronOre,
                    30.0,
                    ResourceType::IronOre,
                    30.0,
                )
                .with_priority((w % 3) as i32),
            );
        }
        pipeline.stages.push(stage);
    }
    pipeline
}
