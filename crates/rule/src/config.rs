//! Data-driven rule configuration.
//!
//! Rule trees are described as YAML or JSON and built into
//! [`RuleContainer`]s. Example:
//!
//! ```yaml
//! kind: all
//! rules:
//!   - kind: tag
//!     tags: [Interactable]
//!   - kind: not
//!     rule:
//!       kind: layer
//!       layers: [5]
//! ```

use std::path::Path;

use glam::Vec3;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use vrkit_common::{EntityId, LayerMask};

use crate::composite::{AllRule, AnyRule, NotRule};
use crate::leaf::{ComponentRule, LayerRule, ListContainsRule, TagRule, VectorEqualityRule};
use crate::matcher::{RulesMatcher, RulesMatcherElement};
use crate::rule::RuleContainer;

/// Errors from loading or building configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("layer {0} is outside 0..=31")]
    InvalidLayer(u8),
    #[error("tolerance must be a non-negative number, got {0}")]
    InvalidTolerance(f32),
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Load a configuration file. `.json` files are parsed as JSON, anything
/// else as YAML.
pub fn load_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let value = if is_json {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    tracing::debug!(path = %path.display(), "configuration loaded");
    Ok(value)
}

fn default_true() -> bool {
    true
}

fn default_tolerance() -> f32 {
    f32::EPSILON
}

/// Description of a rule tree.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleConfig {
    /// An empty container: accepts everything.
    #[default]
    None,
    Tag {
        tags: Vec<String>,
        #[serde(default = "default_true")]
        reject_inactive: bool,
    },
    Layer {
        layers: Vec<u8>,
        #[serde(default = "default_true")]
        reject_inactive: bool,
    },
    Component {
        components: Vec<String>,
        #[serde(default = "default_true")]
        reject_inactive: bool,
    },
    List {
        objects: Vec<EntityId>,
        #[serde(default = "default_true")]
        reject_inactive: bool,
    },
    Vector {
        value: Vec3,
        #[serde(default = "default_tolerance")]
        tolerance: f32,
    },
    Not {
        rule: Box<RuleConfig>,
    },
    Any {
        rules: Vec<RuleConfig>,
    },
    All {
        rules: Vec<RuleConfig>,
    },
}

impl RuleConfig {
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Build the described rule tree.
    pub fn build(&self) -> Result<RuleContainer, ConfigError> {
        let container = match self {
            Self::None => RuleContainer::empty(),
            Self::Tag {
                tags,
                reject_inactive,
            } => {
                let mut rule = TagRule::new(tags.iter().cloned());
                rule.reject_inactive = *reject_inactive;
                RuleContainer::new(rule)
            }
            Self::Layer {
                layers,
                reject_inactive,
            } => {
                if let Some(&layer) = layers.iter().find(|&&l| l > LayerMask::MAX_LAYER) {
                    return Err(ConfigError::InvalidLayer(layer));
                }
                let mut rule = LayerRule::new(LayerMask::from_layers(layers.iter().copied()));
                rule.reject_inactive = *reject_inactive;
                RuleContainer::new(rule)
            }
            Self::Component {
                components,
                reject_inactive,
            } => {
                let mut rule = ComponentRule::new(components.iter().cloned());
                rule.reject_inactive = *reject_inactive;
                RuleContainer::new(rule)
            }
            Self::List {
                objects,
                reject_inactive,
            } => {
                let mut rule = ListContainsRule::new(objects.iter().copied());
                rule.reject_inactive = *reject_inactive;
                RuleContainer::new(rule)
            }
            Self::Vector { value, tolerance } => {
                if tolerance.is_nan() || *tolerance < 0.0 {
                    return Err(ConfigError::InvalidTolerance(*tolerance));
                }
                RuleContainer::new(VectorEqualityRule::new(*value).with_tolerance(*tolerance))
            }
            Self::Not { rule } => RuleContainer::new(NotRule::new(rule.build()?)),
            Self::Any { rules } => RuleContainer::new(AnyRule::new(build_all(rules)?)),
            Self::All { rules } => RuleContainer::new(AllRule::new(build_all(rules)?)),
        };
        Ok(container)
    }
}

fn build_all(rules: &[RuleConfig]) -> Result<Vec<RuleContainer>, ConfigError> {
    rules.iter().map(RuleConfig::build).collect()
}

/// One named element of a [`MatcherConfig`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatcherElementConfig {
    pub name: String,
    #[serde(default)]
    pub rule: RuleConfig,
}

/// Description of a [`RulesMatcher`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
    pub elements: Vec<MatcherElementConfig>,
}

impl MatcherConfig {
    pub fn build<S: std::any::Any>(&self) -> Result<RulesMatcher<S>, ConfigError> {
        let mut matcher = RulesMatcher::new();
        for element in &self.elements {
            if element.name.trim().is_empty() {
                return Err(ConfigError::Invalid("matcher element without a name".into()));
            }
            matcher.add_element(RulesMatcherElement::new(
                element.name.clone(),
                element.rule.build()?,
            ));
        }
        Ok(matcher)
    }
}
