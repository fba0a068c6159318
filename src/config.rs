use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::joints::SideSelection;
use crate::template::{TemplateConfig, TemplateSet};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub side: SideSelection,
    pub tick_interval_ms: u64,
    pub templates: Vec<TemplateConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            side: SideSelection::Left,
            tick_interval_ms: 1000,
            templates: vec![
                TemplateConfig::new(
                    "Wallsquat",
                    15.0,
                    [("knee", 90.0), ("hip", 90.0), ("shoulder", 90.0)],
                ),
                TemplateConfig::new(
                    "Plank",
                    15.0,
                    [("elbow", 90.0), ("shoulder", 90.0), ("hip", 180.0), ("knee", 180.0)],
                ),
            ],
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Validate the configured templates.
    pub fn templates(&self) -> Result<TemplateSet, ConfigError> {
        Ok(TemplateSet::from_configs(&self.templates)?)
    }

    pub fn tick_interval(&self) -> Result<Duration, ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::TickInterval);
        }
        Ok(Duration::from_millis(self.tick_interval_ms))
    }

    /// Full check, as done once at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.tick_interval()?;
        self.templates()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TemplateError;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.templates().unwrap().len(), 2);
    }

    #[test]
    fn test_parses_templates() {
        let config = Config::from_toml_str(
            r#"
            side = "auto"
            tick_interval_ms = 250

            [[templates]]
            name = "Wallsquat"
            tolerance = 10.0
            min_confidence = 0.3

            [templates.joint_targets]
            knee = 90.0
            hip = 95.0
            "#,
        )
        .unwrap();

        assert_eq!(config.side, SideSelection::Auto);
        assert_eq!(config.tick_interval().unwrap(), Duration::from_millis(250));

        let templates = config.templates().unwrap();
        let squat = templates.get("Wallsquat").unwrap();
        assert_eq!(squat.tolerance(), 10.0);
        assert!((squat.min_confidence() - 0.3).abs() < 1e-6);
        assert_eq!(squat.targets().len(), 2);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let config = Config::from_toml_str("side = \"right\"").unwrap();

        assert_eq!(config.side, SideSelection::Right);
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.templates, Config::default().templates);
    }

    #[test]
    fn test_unknown_joint_is_invalid_template() {
        let config = Config::from_toml_str(
            r#"
            [[templates]]
            name = "Lunge"
            tolerance = 15.0
            joint_targets = { ankle = 80.0 }
            "#,
        )
        .unwrap();

        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidTemplate(TemplateError::UnknownJoint { .. })
        ));
        assert!(err.to_string().contains("invalid template 'Lunge'"));
    }

    #[test]
    fn test_zero_tick_interval_is_rejected() {
        let config = Config {
            tick_interval_ms: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::TickInterval)));
    }

    #[test]
    fn test_misspelled_keys_are_rejected() {
        let section_typo = r#"
            [[template]]
            name = "Lunge"
            tolerance = 15.0
            joint_targets = { knee = 90.0 }
            "#;
        assert!(matches!(
            Config::from_toml_str(section_typo),
            Err(ConfigError::Parse(_))
        ));

        let field_typo = r#"
            [[templates]]
            name = "Lunge"
            tolerance = 15.0
            min_confidance = 0.6
            joint_targets = { knee = 90.0 }
            "#;
        let err = Config::from_toml_str(field_typo).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("min_confidance"), "{err}");
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            Config::from_toml_str("templates = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
