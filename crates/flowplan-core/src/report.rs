//! Power and bill-of-materials summaries over calculated pipelines.

use std::collections::BTreeMap;

use crate::flow::{self, ResourceFlow};
use crate::machine::power_draw;
use crate::pipeline::{CalculatedProductionPipeline, compute_pipeline};
use crate::resource::{ResourceAmount, ResourceType};
use crate::site::ProductionSite;

/// Summary of one calculated pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub name: String,
    pub machine_count: usize,
    pub running_short: usize,
    pub stalled: usize,
    /// Total power draw in MW at configured clock speeds.
    pub power: f64,
    /// Build cost of every machine, ordered by resource.
    pub bill_of_materials: Vec<ResourceAmount>,
    pub surplus: ResourceFlow,
}

impl PipelineReport {
    pub fn new(calculated: &CalculatedProductionPipeline) -> Self {
        let mut report = Self {
            name: calculated.name.clone(),
            machine_count: 0,
            running_short: 0,
            stalled: 0,
            power: 0.0,
            bill_of_materials: Vec::new(),
            surplus: calculated.surplus.clone(),
        };

        let mut materials: BTreeMap<ResourceType, u32> = BTreeMap::new();
        for machine in calculated.machines() {
            report.machine_count += 1;
            if machine.is_running_short() {
                report.running_short += 1;
            }
            if machine.is_stalled() {
                report.stalled += 1;
            }
            report.power += power_draw(&machine.instance);
            for amount in &machine.instance.template.cost {
                let total = materials.entry(amount.resource).or_insert(0);
                *total = total.saturating_add(amount.quantity);
            }
        }
        report.bill_of_materials = into_amounts(materials);
        report
    }

    /// Whether every machine runs at full capacity.
    pub fn is_balanced(&self) -> bool {
        self.running_short == 0
    }
}

/// Summary of a whole site: one report per pipeline plus totals.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteReport {
    pub name: String,
    pub pipelines: Vec<PipelineReport>,
    pub power: f64,
    pub bill_of_materials: Vec<ResourceAmount>,
    /// Sum of every pipeline's surplus.
    pub surplus: ResourceFlow,
}

impl SiteReport {
    pub fn new(site: &ProductionSite) -> Self {
        let pipelines: Vec<PipelineReport> = site
            .pipelines
            .iter()
            .map(|p| PipelineReport::new(&compute_pipeline(p)))
            .collect();

        let mut materials: BTreeMap<ResourceType, u32> = BTreeMap::new();
        let mut surplus = ResourceFlow::new();
        let mut power = 0.0;
        for report in &pipelines {
            power += report.power;
            flow::add(&mut surplus, &report.surplus);
            for amount in &report.bill_of_materials {
                let total = materials.entry(amount.resource).or_insert(0);
                *total = total.saturating_add(amount.quantity);
            }
        }

        Self {
            name: site.name.clone(),
            pipelines,
            power,
            bill_of_materials: into_amounts(materials),
            surplus,
        }
    }
}

fn into_amounts(materials: BTreeMap<ResourceType, u32>) -> Vec<ResourceAmount> {
    materials
        .into_iter()
        .map(|(resource, quantity)| ResourceAmount::new(resource, quantity))
        .collect()
}
