//! Serde data file structs for the machine catalog.
//!
//! Resources are referenced by key (`"ironOre"`) and resolved into
//! [`ResourceType`](flowplan_core::resource::ResourceType) by the catalog
//! loader, so an unknown name is reported with the file it came from.

use serde::Deserialize;

/// A machine template as written in a catalog file.
///
/// Rates are `(resource, per_minute)` pairs, costs `(resource, quantity)`.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplateData {
    pub name: String,
    #[serde(default)]
    pub input: Vec<(String, f64)>,
    #[serde(default)]
    pub output: Vec<(String, f64)>,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub cost: Vec<(String, u32)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_template_ron() {
        let input = r#"(
            name: "Smelter",
            input: [("ironOre", 30.0)],
            output: [("ironIngot", 30.0)],
            power: 4.0,
            cost: [("ironRod", 5), ("wire", 8)],
        )"#;
        let t: TemplateData = ron::from_str(input).unwrap();
        assert_eq!(t.name, "Smelter");
        assert_eq!(t.input, vec![("ironOre".to_string(), 30.0)]);
        assert_eq!(t.cost.len(), 2);
        assert_eq!(t.power, 4.0);
    }

    #[test]
    fn deserialize_template_json_defaults() {
        let t: TemplateData = serde_json::from_str(r#"{"name": "Nop"}"#).unwrap();
        assert!(t.input.is_empty());
        assert!(t.output.is_empty());
        assert!(t.cost.is_empty());
        assert_eq!(t.power, 0.0);
    }

    #[test]
    fn deserialize_template_toml() {
        let input = r#"
            name = "Miner"
            output = [["ironOre", 60.0]]
            power = 5.0
            cost = [["portableMiner", 1]]
        "#;
        let t: TemplateData = toml::from_str(input).unwrap();
        assert_eq!(t.output, vec![("ironOre".to_string(), 60.0)]);
        assert_eq!(t.cost, vec![("portableMiner".to_string(), 1)]);
    }
}
