//! Configuration management system for StreamBoost.
//!
//! Statically typed configuration with validation, a fluent builder, file
//! (JSON/TOML) and environment loading, and the weak learner selection.

pub mod core;
pub mod learner;

pub use self::core::{Config, ConfigBuilder};
pub use self::learner::{BaseLearnerConfig, DEFAULT_SGD_LEARNING_RATE};

/// Default configuration file name
pub const DEFAULT_CONFIG_FILE: &str = "streamboost.toml";
