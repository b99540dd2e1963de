//! Rules: pure predicates over opaque, possibly-null object references.
//!
//! # Invariants
//! - Acceptance is a total function: no rule panics or errors on any input.
//! - Leaf rules never accept a null target.
//! - An empty [`RuleContainer`] accepts everything, null included.

mod composite;
mod config;
mod leaf;
mod matcher;
mod rule;

pub use composite::{AllRule, AnyRule, NotRule};
pub use config::{ConfigError, MatcherConfig, MatcherElementConfig, RuleConfig, load_config};
pub use leaf::{ComponentRule, LayerRule, ListContainsRule, TagRule, VectorEqualityRule};
pub use matcher::{RulesMatcher, RulesMatcherElement};
pub use rule::{Rule, RuleContainer, as_target};

pub fn crate_info() -> &'static str {
    "vrkit-rule v0.1.0"
}
