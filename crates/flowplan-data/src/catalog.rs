//! Machine catalog loading: data files and the built-in default catalog.

use std::path::Path;

use flowplan_core::catalog::{Catalog, CatalogBuilder, MachineTemplate};
use flowplan_core::resource::{ResourceAmount, ResourceRate, ResourceType};

use crate::loader::{DataLoadError, Format, deserialize_list, deserialize_list_str};
use crate::schema::TemplateData;

/// TOML catalogs list templates under `[[machines]]`.
pub const TOML_KEY: &str = "machines";

const BUILTIN_CATALOG: &str = include_str!("../data/catalog.ron");

/// The catalog shipped with the planner.
pub fn builtin_catalog() -> Result<Catalog, DataLoadError> {
    let file = Path::new("<builtin>/catalog.ron");
    let templates: Vec<TemplateData> =
        deserialize_list_str(BUILTIN_CATALOG, Format::Ron, file, TOML_KEY)?;
    build_catalog(templates, file)
}

/// Load a catalog file (`.ron`, `.json`, or `.toml`).
pub fn load_catalog(path: &Path) -> Result<Catalog, DataLoadError> {
    let templates: Vec<TemplateData> = deserialize_list(path, TOML_KEY)?;
    let catalog = build_catalog(templates, path)?;
    tracing::info!(file = %path.display(), templates = catalog.len(), "loaded machine catalog");
    Ok(catalog)
}

/// Parse catalog text already in memory.
pub fn parse_catalog(content: &str, format: Format) -> Result<Catalog, DataLoadError> {
    let file = Path::new("<inline>");
    let templates: Vec<TemplateData> = deserialize_list_str(content, format, file, TOML_KEY)?;
    build_catalog(templates, file)
}

fn build_catalog(templates: Vec<TemplateData>, file: &Path) -> Result<Catalog, DataLoadError> {
    let mut builder = CatalogBuilder::new();
    for data in templates {
        let template = resolve_template(data, file)?;
        builder
            .register(template)
            .map_err(|source| DataLoadError::Catalog {
                file: file.to_path_buf(),
                source,
            })?;
    }
    builder.build().map_err(|source| DataLoadError::Catalog {
        file: file.to_path_buf(),
        source,
    })
}

fn resolve_template(data: TemplateData, file: &Path) -> Result<MachineTemplate, DataLoadError> {
    let mut template = MachineTemplate::new(&data.name).with_power(data.power);
    for (name, rate) in &data.input {
        template
            .input
            .push(ResourceRate::new(resolve_resource(name, file)?, *rate));
    }
    for (name, rate) in &data.output {
        template
            .output
            .push(ResourceRate::new(resolve_resource(name, file)?, *rate));
    }
    for (name, quantity) in &data.cost {
        template
            .cost
            .push(ResourceAmount::new(resolve_resource(name, file)?, *quantity));
    }
    Ok(template)
}

fn resolve_resource(name: &str, file: &Path) -> Result<ResourceType, DataLoadError> {
    ResourceType::from_key(name).ok_or_else(|| DataLoadError::UnknownResource {
        file: file.to_path_buf(),
        name: name.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowplan_core::catalog::CatalogError;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = builtin_catalog().unwrap();
        assert!(catalog.len() >= 10);
        let nop = catalog.lookup("Nop").unwrap();
        assert!(nop.input.is_empty() && nop.output.is_empty());
        assert_eq!(nop.power, 0.0);
    }

    #[test]
    fn builtin_smelter_rates() {
        let catalog = builtin_catalog().unwrap();
        let smelter = catalog.get("Smelter (Iron Ingot)").unwrap();
        assert_eq!(smelter.input, vec![ResourceRate::new(ResourceType::IronOre, 30.0)]);
        assert_eq!(smelter.output, vec![ResourceRate::new(ResourceType::IronIngot, 30.0)]);
        assert_eq!(smelter.power, 4.0);
    }

    #[test]
    fn parse_json_catalog() {
        let json = r#"[
            {"name": "Miner", "output": [["ironOre", 60.0]], "power": 5.0},
            {"name": "Smelter", "input": [["ironOre", 30.0]], "output": [["ironIngot", 30.0]]}
        ]"#;
        let catalog = parse_catalog(json, Format::Json).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("Miner").unwrap().power, 5.0);
    }

    #[test]
    fn parse_toml_catalog() {
        let toml_src = r#"
            [[machines]]
            name = "Miner"
            output = [["coal", 60.0]]

            [[machines]]
            name = "Nop"
        "#;
        let catalog = parse_catalog(toml_src, Format::Toml).unwrap();
        let names: Vec<_> = catalog.iter().map(|t| t.name.clone()).collect();
        assert_eq!(names, vec!["Miner", "Nop"]);
    }

    #[test]
    fn unknown_resource_rejected() {
        let json = r#"[{"name": "Bad", "output": [["unobtainium", 1.0]]}]"#;
        match parse_catalog(json, Format::Json) {
            Err(DataLoadError::UnknownResource { name, .. }) => assert_eq!(name, "unobtainium"),
            other => panic!("expected UnknownResource, got: {other:?}"),
        }
    }

    #[test]
    fn duplicate_template_rejected() {
        let json = r#"[{"name": "Nop"}, {"name": "Nop"}]"#;
        let result = parse_catalog(json, Format::Json);
        assert!(matches!(
            result,
            Err(DataLoadError::Catalog {
                source: CatalogError::DuplicateName(_),
                ..
            })
        ));
    }

    #[test]
    fn negative_rate_rejected() {
        let json = r#"[{"name": "Bad", "input": [["coal", -3.0]]}]"#;
        let result = parse_catalog(json, Format::Json);
        assert!(matches!(
            result,
            Err(DataLoadError::Catalog {
                source: CatalogError::InvalidRate { .. },
                ..
            })
        ));
    }
}
