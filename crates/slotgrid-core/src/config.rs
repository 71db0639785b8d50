//! slotgrid.toml layout parser.
//!
//! A layout declares the containers of a pool and the units inside
//! each one, in the order they should be provisioned:
//!
//! ```toml
//! strategy = "first-match"
//!
//! [[containers]]
//! id = "Level1"
//!
//! [[containers.units]]
//! id = "A1"
//! class = "compact"
//! cost = 10
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{CapacityClass, ContainerId, UnitSpec};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Name of the initial allocation strategy. Parsed by the engine.
    pub strategy: Option<String>,
    #[serde(default)]
    pub containers: Vec<ContainerConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerConfig {
    pub id: ContainerId,
    #[serde(default)]
    pub units: Vec<UnitSpec>,
}

impl LayoutConfig {
    pub fn from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Parse and validate a layout from TOML text.
    pub fn parse(content: &str) -> CoreResult<Self> {
        let config: LayoutConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> CoreResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject layouts with blank identifiers or a unit id declared twice.
    ///
    /// A container id may appear in several sections; its units are
    /// appended in order, matching provisioning semantics.
    pub fn validate(&self) -> CoreResult<()> {
        let mut seen = HashSet::new();
        for container in &self.containers {
            if container.id.trim().is_empty() {
                return Err(CoreError::Invalid("container id must not be empty".into()));
            }
            for unit in &container.units {
                if unit.id.trim().is_empty() {
                    return Err(CoreError::Invalid(format!(
                        "unit in container {} has an empty id",
                        container.id
                    )));
                }
                if !seen.insert(unit.id.as_str()) {
                    return Err(CoreError::Invalid(format!(
                        "unit id {} declared more than once",
                        unit.id
                    )));
                }
            }
        }
        Ok(())
    }

    /// Total number of declared units.
    pub fn unit_count(&self) -> usize {
        self.containers.iter().map(|c| c.units.len()).sum()
    }

    /// Scaffold the two-level demo lot.
    pub fn scaffold() -> Self {
        LayoutConfig {
            strategy: Some("first-match".to_string()),
            containers: vec![
                ContainerConfig {
                    id: "Level1".to_string(),
                    units: vec![
                        UnitSpec::new("A1", CapacityClass::Compact, 10),
                        UnitSpec::new("A2", CapacityClass::Large, 5),
                        UnitSpec::new("A3", CapacityClass::Motorcycle, 15),
                    ],
                },
                ContainerConfig {
                    id: "Level2".to_string(),
                    units: vec![
                        UnitSpec::new("B1", CapacityClass::Compact, 20),
                        UnitSpec::new("B2", CapacityClass::Large, 25),
                    ],
                },
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaffold() {
        let config = LayoutConfig::scaffold();
        let toml_str = config.to_toml_string().unwrap();
        assert!(toml_str.contains("Level1"));
        assert!(toml_str.contains("motorcycle"));

        let reparsed = LayoutConfig::parse(&toml_str).unwrap();
        assert_eq!(reparsed, config);
        assert_eq!(reparsed.unit_count(), 5);
    }

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
[[containers]]
id = "L1"

[[containers.units]]
id = "S1"
class = "large"
cost = 3
"#;
        let config = LayoutConfig::parse(toml_str).unwrap();
        assert_eq!(config.strategy, None);
        assert_eq!(config.containers.len(), 1);
        assert_eq!(config.containers[0].units[0].class, CapacityClass::Large);
    }

    #[test]
    fn empty_layout_is_valid() {
        let config = LayoutConfig::parse("").unwrap();
        assert!(config.containers.is_empty());
        assert_eq!(config.unit_count(), 0);
    }

    #[test]
    fn rejects_unknown_class() {
        let toml_str = r#"
[[containers]]
id = "L1"
units = [{ id = "S1", class = "huge", cost = 1 }]
"#;
        assert!(matches!(LayoutConfig::parse(toml_str), Err(CoreError::Parse(_))));
    }

    #[test]
    fn rejects_duplicate_unit_ids_across_containers() {
        let toml_str = r#"
[[containers]]
id = "L1"
units = [{ id = "S1", class = "compact", cost = 1 }]

[[containers]]
id = "L2"
units = [{ id = "S1", class = "large", cost = 2 }]
"#;
        let err = LayoutConfig::parse(toml_str).unwrap_err();
        assert!(matches!(err, CoreError::Invalid(msg) if msg.contains("S1")));
    }

    #[test]
    fn rejects_blank_container_id() {
        let toml_str = r#"
[[containers]]
id = "  "
"#;
        assert!(matches!(LayoutConfig::parse(toml_str), Err(CoreError::Invalid(_))));
    }

    #[test]
    fn from_file_reads_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slotgrid.toml");
        std::fs::write(&path, LayoutConfig::scaffold().to_toml_string().unwrap()).unwrap();

        let config = LayoutConfig::from_file(&path).unwrap();
        assert_eq!(config.containers[1].id, "Level2");
    }

    #[test]
    fn from_file_missing_reports_path() {
        let err = LayoutConfig::from_file(Path::new("/nonexistent/slotgrid.toml")).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/slotgrid.toml"));
    }
}
