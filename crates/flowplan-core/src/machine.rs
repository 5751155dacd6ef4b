use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::MachineTemplate;
use crate::flow::{self, ResourceFlow};
use crate::id::{DEFAULT_ID_LENGTH, IdGenerator, MachineId};

/// Exponent of the overclock power curve: draw = base * clock^(1/1.3).
const POWER_CURVE_EXPONENT: f64 = 1.0 / 1.3;

/// A configured machine placed in a production stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineInstance {
    pub id: MachineId,
    pub name: String,
    pub template: Arc<MachineTemplate>,
    /// Multiplier on nominal rates. 1.0 is 100%.
    pub clock_speed: f64,
    /// Higher priorities are served first when supply is short.
    pub priority: i32,
}

impl MachineInstance {
    /// Instantiate `template` with a fresh id, its template name, 100% clock
    /// and priority 1.
    pub fn create(template: Arc<MachineTemplate>, ids: &mut dyn IdGenerator) -> Self {
        Self::create_with_id_length(template, ids, DEFAULT_ID_LENGTH)
    }

    /// Like [`MachineInstance::create`], with an id of `id_length` characters.
    pub fn create_with_id_length(
        template: Arc<MachineTemplate>,
        ids: &mut dyn IdGenerator,
        id_length: usize,
    ) -> Self {
        Self {
            id: MachineId(ids.new_id(id_length)),
            name: template.name.clone(),
            template,
            clock_speed: 1.0,
            priority: 1,
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_clock_speed(mut self, clock_speed: f64) -> Self {
        self.clock_speed = clock_speed;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Nominal input flow: template input rates times clock speed.
pub fn input_flow(instance: &MachineInstance) -> ResourceFlow {
    ResourceFlow::from_rates(&instance.template.input).scaled(instance.clock_speed)
}

/// Nominal output flow: template output rates times clock speed.
pub fn output_flow(instance: &MachineInstance) -> ResourceFlow {
    ResourceFlow::from_rates(&instance.template.output).scaled(instance.clock_speed)
}

/// Power draw in MW at the instance's clock speed.
pub fn power_draw(instance: &MachineInstance) -> f64 {
    let clock = flow::sanitize_factor(instance.clock_speed);
    instance.template.power * clock.powf(POWER_CURVE_EXPONENT)
}

/// A machine instance annotated with the fraction of its nominal throughput
/// it can sustain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatedMachineInstance {
    pub instance: MachineInstance,
    utility_rate: f64,
}

impl CalculatedMachineInstance {
    /// Wrap `instance` with `raw_utility_rate` clamped to [0, 1]. NaN clamps to 0.
    pub fn new(instance: MachineInstance, raw_utility_rate: f64) -> Self {
        let utility_rate = if raw_utility_rate.is_nan() {
            0.0
        } else {
            raw_utility_rate.clamp(0.0, 1.0)
        };
        Self {
            instance,
            utility_rate,
        }
    }

    pub fn utility_rate(&self) -> f64 {
        self.utility_rate
    }

    /// Input actually consumed: nominal input scaled by utility.
    pub fn input_resource_flow(&self) -> ResourceFlow {
        input_flow(&self.instance).scaled(self.utility_rate)
    }

    /// Output actually produced: nominal output scaled by utility.
    pub fn output_resource_flow(&self) -> ResourceFlow {
        output_flow(&self.instance).scaled(self.utility_rate)
    }

    pub fn is_running_short(&self) -> bool {
        self.utility_rate < 1.0
    }

    pub fn is_stalled(&self) -> bool {
        self.utility_rate == 0.0
    }
}
