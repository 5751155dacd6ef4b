use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::resource::{ResourceAmount, ResourceRate};

/// An immutable machine definition: what it consumes and produces per minute
/// at 100% clock, how much power it draws, and what it costs to build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineTemplate {
    pub name: String,
    pub input: Vec<ResourceRate>,
    pub output: Vec<ResourceRate>,
    /// Power draw in MW at 100% clock.
    pub power: f64,
    pub cost: Vec<ResourceAmount>,
}

impl MachineTemplate {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            input: Vec::new(),
            output: Vec::new(),
            power: 0.0,
            cost: Vec::new(),
        }
    }

    pub fn with_input(mut self, rate: ResourceRate) -> Self {
        self.input.push(rate);
        self
    }

    pub fn with_output(mut self, rate: ResourceRate) -> Self {
        self.output.push(rate);
        self
    }

    pub fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    pub fn with_cost(mut self, amount: ResourceAmount) -> Self {
        self.cost.push(amount);
        self
    }
}

/// Builder for an immutable [`Catalog`].
#[derive(Debug, Default)]
pub struct CatalogBuilder {
    templates: Vec<Arc<MachineTemplate>>,
    name_to_index: HashMap<String, usize>,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template. Names must be unique.
    pub fn register(&mut self, template: MachineTemplate) -> Result<(), CatalogError> {
        if self.name_to_index.contains_key(&template.name) {
            return Err(CatalogError::DuplicateName(template.name));
        }
        self.name_to_index
            .insert(template.name.clone(), self.templates.len());
        self.templates.push(Arc::new(template));
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.name_to_index.contains_key(name)
    }

    /// Finalize the catalog. Rates must be finite and non-negative.
    pub fn build(self) -> Result<Catalog, CatalogError> {
        for template in &self.templates {
            let rates = template.input.iter().chain(template.output.iter());
            for rate in rates {
                if !rate.quantity_per_minute.is_finite() || rate.quantity_per_minute < 0.0 {
                    return Err(CatalogError::InvalidRate {
                        template: template.name.clone(),
                        rate: rate.quantity_per_minute,
                    });
                }
            }
            if !template.power.is_finite() {
                return Err(CatalogError::InvalidPower {
                    template: template.name.clone(),
                    power: template.power,
                });
            }
        }

        Ok(Catalog {
            templates: self.templates,
            name_to_index: self.name_to_index,
        })
    }
}

/// Immutable template lookup table. Frozen after [`CatalogBuilder::build`].
#[derive(Debug, Clone)]
pub struct Catalog {
    templates: Vec<Arc<MachineTemplate>>,
    name_to_index: HashMap<String, usize>,
}

impl Catalog {
    pub fn lookup(&self, name: &str) -> Option<Arc<MachineTemplate>> {
        self.name_to_index
            .get(name)
            .map(|&index| Arc::clone(&self.templates[index]))
    }

    /// Like [`Catalog::lookup`], but a missing name is an error.
    pub fn get(&self, name: &str) -> Result<Arc<MachineTemplate>, CatalogError> {
        self.lookup(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    /// Templates in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<MachineTemplate>> {
        self.templates.iter()
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("machine template not found: {0}")]
    NotFound(String),
    #[error("duplicate machine template name: {0}")]
    DuplicateName(String),
    #[error("template '{template}' has invalid rate {rate}")]
    InvalidRate { template: String, rate: f64 },
    #[error("template '{template}' has invalid power draw {power}")]
    InvalidPower { template: String, power: f64 },
}
