use serde::de::{self, IntoDeserializer, value::StrDeserializer};
use serde::{Deserialize, Serialize};

/// A distinct material kind flowing between machines.
///
/// Declaration order is the canonical order used when listing resources in
/// reports. `Nothing` is the sentinel shown for machines without inputs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum ResourceType {
    Nothing,
    // Natural resources
    IronOre,
    CopperOre,
    Coal,
    Water,
    Sulfur,
    Limestone,
    // Gen 0
    IronIngot,
    CopperIngot,
    Concrete,
    // Gen 1
    IronPlate,
    IronRod,
    Wire,
    // Gen 2
    PortableMiner,
    Screw,
}

impl ResourceType {
    /// Every resource type, in canonical order.
    pub const ALL: [ResourceType; 15] = [
        ResourceType::Nothing,
        ResourceType::IronOre,
        ResourceType::CopperOre,
        ResourceType::Coal,
        ResourceType::Water,
        ResourceType::Sulfur,
        ResourceType::Limestone,
        ResourceType::IronIngot,
        ResourceType::CopperIngot,
        ResourceType::Concrete,
        ResourceType::IronPlate,
        ResourceType::IronRod,
        ResourceType::Wire,
        ResourceType::PortableMiner,
        ResourceType::Screw,
    ];

    /// Stable key used in data files and persisted sites, e.g. `"ironOre"`.
    /// Matches the serde name of the variant.
    pub fn key(self) -> &'static str {
        match self {
            ResourceType::Nothing => "nothing",
            ResourceType::IronOre => "ironOre",
            ResourceType::CopperOre => "copperOre",
            ResourceType::Coal => "coal",
            ResourceType::Water => "water",
            ResourceType::Sulfur => "sulfur",
            ResourceType::Limestone => "limestone",
            ResourceType::IronIngot => "ironIngot",
            ResourceType::CopperIngot => "copperIngot",
            ResourceType::Concrete => "concrete",
            ResourceType::IronPlate => "ironPlate",
            ResourceType::IronRod => "ironRod",
            ResourceType::Wire => "wire",
            ResourceType::PortableMiner => "portableMiner",
            ResourceType::Screw => "screw",
        }
    }

    /// Parse a key through the same serde names used for persistence.
    pub fn from_key(key: &str) -> Option<ResourceType> {
        let de: StrDeserializer<'_, de::value::Error> = key.into_deserializer();
        ResourceType::deserialize(de).ok()
    }

    /// Human-readable name for display.
    pub fn friendly_name(self) -> &'static str {
        match self {
            ResourceType::Nothing => "(Nothing)",
            ResourceType::IronOre => "Iron ore",
            ResourceType::CopperOre => "Copper ore",
            ResourceType::Coal => "Coal",
            ResourceType::Water => "Water",
            ResourceType::Sulfur => "Sulfur",
            ResourceType::Limestone => "Limestone",
            ResourceType::IronIngot => "Iron ingot",
            ResourceType::CopperIngot => "Copper ingot",
            ResourceType::Concrete => "Concrete",
            ResourceType::IronPlate => "Iron plate",
            ResourceType::IronRod => "Iron rod",
            ResourceType::Wire => "Wire",
            ResourceType::PortableMiner => "Portable Miner",
            ResourceType::Screw => "Screw",
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.friendly_name())
    }
}

/// A per-minute rate of one resource, as listed on a machine template.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceRate {
    pub resource: ResourceType,
    pub quantity_per_minute: f64,
}

impl ResourceRate {
    pub fn new(resource: ResourceType, quantity_per_minute: f64) -> Self {
        Self {
            resource,
            quantity_per_minute,
        }
    }
}

/// A whole quantity of one resource (build costs, bills of materials).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    pub resource: ResourceType,
    pub quantity: u32,
}

impl ResourceAmount {
    pub fn new(resource: ResourceType, quantity: u32) -> Self {
        Self { resource, quantity }
    }
}

/// Render a rate the way the planner displays it: `"Iron ore x 30 / min"`.
///
/// The rate is floored to a whole number; the engine itself never rounds.
pub fn describe_rate(resource: ResourceType, per_minute: f64) -> String {
    format!("{} x {} / min", resource.friendly_name(), per_minute.floor())
}
