use glam::Vec3;
use serde::{Deserialize, Serialize};
use vrkit_rule::{ConfigError, RuleConfig};

use crate::locator::SurfaceLocator;

#[derive(Debug, thiserror::Error)]
pub enum LocatorConfigError {
    #[error("maximum distance must be positive, got {0}")]
    InvalidDistance(f32),
    #[error("rule error: {0}")]
    Rule(#[from] ConfigError),
}

/// Serializable settings for a [`SurfaceLocator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceLocatorConfig {
    pub destination_offset: Vec3,
    pub maximum_distance: f32,
    pub must_change_position: bool,
    pub target_validity: RuleConfig,
    pub target_point_validity: RuleConfig,
    pub locator_termination: RuleConfig,
}

impl Default for SurfaceLocatorConfig {
    fn default() -> Self {
        Self {
            destination_offset: Vec3::ZERO,
            maximum_distance: 50.0,
            must_change_position: true,
            target_validity: RuleConfig::None,
            target_point_validity: RuleConfig::None,
            locator_termination: RuleConfig::None,
        }
    }
}

impl SurfaceLocatorConfig {
    pub fn validate(&self) -> Result<(), LocatorConfigError> {
        if self.maximum_distance.is_nan() || self.maximum_distance <= 0.0 {
            return Err(LocatorConfigError::InvalidDistance(self.maximum_distance));
        }
        Ok(())
    }
}

impl SurfaceLocator {
    /// Build an unaimed locator from configuration.
    pub fn from_config(config: &SurfaceLocatorConfig) -> Result<Self, LocatorConfigError> {
        config.validate()?;
        let mut locator = Self::new();
        locator.destination_offset = config.destination_offset;
        locator.maximum_distance = config.maximum_distance;
        locator.must_change_position = config.must_change_position;
        locator.target_validity = config.target_validity.build()?;
        locator.target_point_validity = config.target_point_validity.build()?;
        locator.locator_termination = config.locator_termination.build()?;
        Ok(locator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_new_locator() {
        let locator = SurfaceLocator::from_config(&SurfaceLocatorConfig::default())
            .expect("valid defaults");
        assert_eq!(locator.maximum_distance, 50.0);
        assert!(locator.must_change_position);
        assert!(!locator.target_validity.is_set());
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let yaml = r#"
maximum_distance: 12.5
target_validity:
  kind: tag
  tags: [Floor]
locator_termination:
  kind: layer
  layers: [8]
"#;
        let config: SurfaceLocatorConfig = serde_yaml::from_str(yaml).expect("valid yaml");
        assert_eq!(config.destination_offset, Vec3::ZERO);
        assert!(config.must_change_position);

        let locator = SurfaceLocator::from_config(&config).expect("valid config");
        assert_eq!(locator.maximum_distance, 12.5);
        assert!(locator.target_validity.is_set());
        assert!(locator.locator_termination.is_set());
        assert!(!locator.target_point_validity.is_set());
    }

    #[test]
    fn non_positive_distance_is_rejected() {
        let config = SurfaceLocatorConfig {
            maximum_distance: 0.0,
            ..SurfaceLocatorConfig::default()
        };
        assert!(matches!(
            SurfaceLocator::from_config(&config),
            Err(LocatorConfigError::InvalidDistance(_))
        ));
    }

    #[test]
    fn rule_errors_propagate() {
        let config = SurfaceLocatorConfig {
            target_validity: RuleConfig::Layer {
                layers: vec![99],
                reject_inactive: true,
            },
            ..SurfaceLocatorConfig::default()
        };
        assert!(matches!(
            SurfaceLocator::from_config(&config),
            Err(LocatorConfigError::Rule(ConfigError::InvalidLayer(99)))
        ));
    }
}
