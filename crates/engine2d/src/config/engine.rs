//! Engine-wide settings: physics stepping and the ECS dependency tables

use super::{Config, ConfigError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collision engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Detection + correction passes run per physics update
    pub passes: u32,

    /// Fire each handler at most once per partner per update instead of once per pass
    pub dedupe_handler_calls: bool,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            passes: 2,
            dedupe_handler_calls: false,
        }
    }
}

/// Top-level engine configuration
///
/// ```toml
/// [physics]
/// passes = 2
///
/// [component_dependencies]
/// sprite = ["transform"]
///
/// [system_requirements]
/// sprite_renderer = ["sprite"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Collision engine settings
    pub physics: PhysicsConfig,

    /// Component type -> component types that must already be attached
    pub component_dependencies: BTreeMap<String, Vec<String>>,

    /// System name -> component types an entity needs before it may subscribe.
    /// Checked in addition to what the system itself declares.
    pub system_requirements: BTreeMap<String, Vec<String>>,
}

impl Config for EngineConfig {}

impl EngineConfig {
    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics.passes == 0 {
            return Err(ConfigError::Invalid(
                "physics.passes must be at least 1".to_string(),
            ));
        }
        for (component, requires) in &self.component_dependencies {
            if requires.iter().any(|r| r == component) {
                return Err(ConfigError::Invalid(format!(
                    "component '{component}' lists itself as a dependency"
                )));
            }
        }
        Ok(())
    }

    /// Builder pattern: declare that `component` needs `requires` attached first
    pub fn with_component_dependency(
        mut self,
        component: impl Into<String>,
        requires: impl Into<String>,
    ) -> Self {
        self.component_dependencies
            .entry(component.into())
            .or_default()
            .push(requires.into());
        self
    }

    /// Builder pattern: declare an extra component requirement for a system
    pub fn with_system_requirement(
        mut self,
        system: impl Into<String>,
        component: impl Into<String>,
    ) -> Self {
        self.system_requirements
            .entry(system.into())
            .or_default()
            .push(component.into());
        self
    }

    /// Builder pattern: set the number of physics passes
    pub fn with_physics_passes(mut self, passes: u32) -> Self {
        self.physics.passes = passes;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.physics.passes, 2);
        assert!(!config.physics.dedupe_handler_calls);
        assert!(config.component_dependencies.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let text = r#"
            [physics]
            passes = 3

            [component_dependencies]
            circle = ["transform"]
        "#;
        let config = EngineConfig::from_str_as(text, ConfigFormat::Toml).unwrap();
        assert_eq!(config.physics.passes, 3);
        assert!(!config.physics.dedupe_handler_calls);
        assert_eq!(config.component_dependencies["circle"], vec!["transform".to_string()]);
    }

    #[test]
    fn test_ron_roundtrip() {
        let config = EngineConfig::default()
            .with_component_dependency("collider", "transform")
            .with_system_requirement("renderer", "sprite");
        let text = config.to_string_as(ConfigFormat::Ron).unwrap();
        let parsed = EngineConfig::from_str_as(&text, ConfigFormat::Ron).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_validate_rejects_zero_passes() {
        let config = EngineConfig::default().with_physics_passes(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_validate_rejects_self_dependency() {
        let config = EngineConfig::default().with_component_dependency("circle", "circle");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_unsupported_extension() {
        let err = EngineConfig::load_from_file("settings.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }
}
