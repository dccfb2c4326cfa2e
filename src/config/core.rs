//! Core configuration structures and implementation for StreamBoost.
//!
//! This module provides the main configuration structure and builder pattern
//! for setting up the online boosting ensemble: round count, shrinkage,
//! subspace sampling, objective, pseudo-labelling flags and the base learner.

use crate::config::learner::BaseLearnerConfig;
use crate::core::constants::*;
use crate::core::error::{Result, StreamBoostError};
use crate::core::types::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main configuration structure for the online boosting ensemble.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // Core boosting parameters
    /// Number of boosting rounds
    pub num_rounds: usize,
    /// Shrinkage applied to every committee's output, in [0, 1]
    pub learning_rate: f64,
    /// Subspace size as a percentage of the features (negative = complement)
    pub subspace_size: i32,
    /// Loss driving the boosting recurrence
    pub objective: ObjectiveType,

    // Derivative flags
    /// Use `prediction - truth` as the gradient instead of `truth - prediction`
    pub negate_residual: bool,
    /// Clip probabilities to [1e-4, 0.9999] before computing derivatives
    pub clip_predictions: bool,

    // Pseudo-labelling
    /// Train weak learners on `gradient / hessian` with Hessian weights
    pub use_gradient_over_hessian_labels: bool,
    /// Round pseudo-label weights up to the next integer
    pub use_ceiling_for_weights: bool,
    /// Multiply the Hessian by 10 before taking the ceiling
    pub multiply_hessian_by_10_for_ceiling: bool,
    /// Retrain each learner `ceil(hessian * multiplier)` times (1 = once)
    pub hessian_iteration_multiplier: u32,
    /// Use a weight of one for every pseudo-labelled sub-instance
    pub use_weight_of_one: bool,

    // Skipping
    /// Skip training when the round-0 loss is 3 sd below its running mean
    pub skip_on_loss_below_3sd: bool,
    /// Skip each training call with probability 1/N (1 = never)
    pub skip_training_roughly: u32,

    // Subspace encoding
    /// One-hot encode nominal subspace attributes with more than two values
    pub one_hot_encoding: bool,

    // Semi-supervision
    /// Weight of the self-predicted target for unlabelled instances (0 = off)
    pub semi_supervised_weight: f64,

    // Loss change estimation
    /// Confidence parameter of the loss change estimator
    pub loss_estimator_delta: f64,

    // Reproducibility and resources
    /// Random seed for subspaces, learner choice and skips
    pub random_seed: u64,
    /// Number of threads (0 = rayon global pool)
    pub num_threads: usize,

    // Learners
    /// Draw each round's learner from `base_learner_pool` (requires pseudo-labelling)
    pub heterogeneous_ensemble: bool,
    /// Weak learner prototype
    pub base_learner: BaseLearnerConfig,
    /// Candidate prototypes for heterogeneous ensembles
    pub base_learner_pool: Vec<BaseLearnerConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            num_rounds: DEFAULT_NUM_ROUNDS,
            learning_rate: DEFAULT_LEARNING_RATE,
            subspace_size: DEFAULT_SUBSPACE_SIZE,
            objective: DEFAULT_OBJECTIVE,

            negate_residual: false,
            clip_predictions: false,

            use_gradient_over_hessian_labels: false,
            use_ceiling_for_weights: false,
            multiply_hessian_by_10_for_ceiling: false,
            hessian_iteration_multiplier: DEFAULT_HESSIAN_ITERATION_MULTIPLIER,
            use_weight_of_one: false,

            skip_on_loss_below_3sd: false,
            skip_training_roughly: DEFAULT_SKIP_TRAINING_ROUGHLY,

            one_hot_encoding: false,

            semi_supervised_weight: 0.0,

            loss_estimator_delta: DEFAULT_LOSS_ESTIMATOR_DELTA,

            random_seed: DEFAULT_RANDOM_SEED,
            num_threads: DEFAULT_NUM_THREADS,

            heterogeneous_ensemble: false,
            base_learner: BaseLearnerConfig::default(),
            base_learner_pool: vec![
                BaseLearnerConfig::default(),
                BaseLearnerConfig::TargetMean,
            ],
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_rounds < 1 {
            return Err(StreamBoostError::invalid_parameter(
                "num_rounds",
                self.num_rounds.to_string(),
                "must be at least 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(StreamBoostError::invalid_parameter(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }

        if !(-100..=100).contains(&self.subspace_size) {
            return Err(StreamBoostError::invalid_parameter(
                "subspace_size",
                self.subspace_size.to_string(),
                "must be a percentage in range [-100, 100]",
            ));
        }

        if !(1..=MAX_HESSIAN_ITERATION_MULTIPLIER).contains(&self.hessian_iteration_multiplier) {
            return Err(StreamBoostError::invalid_parameter(
                "hessian_iteration_multiplier",
                self.hessian_iteration_multiplier.to_string(),
                format!("must be in range [1, {}]", MAX_HESSIAN_ITERATION_MULTIPLIER),
            ));
        }

        if self.skip_training_roughly < 1 {
            return Err(StreamBoostError::invalid_parameter(
                "skip_training_roughly",
                self.skip_training_roughly.to_string(),
                "must be at least 1",
            ));
        }

        if !(0.0..=1.0).contains(&self.semi_supervised_weight) {
            return Err(StreamBoostError::invalid_parameter(
                "semi_supervised_weight",
                self.semi_supervised_weight.to_string(),
                "must be in range [0.0, 1.0]",
            ));
        }

        if !(self.loss_estimator_delta > 0.0 && self.loss_estimator_delta < 1.0) {
            return Err(StreamBoostError::invalid_parameter(
                "loss_estimator_delta",
                self.loss_estimator_delta.to_string(),
                "must be in range (0.0, 1.0)",
            ));
        }

        self.base_learner.validate()?;

        if self.heterogeneous_ensemble {
            if self.base_learner_pool.is_empty() {
                return Err(StreamBoostError::invalid_parameter(
                    "base_learner_pool",
                    "[]",
                    "must not be empty when heterogeneous_ensemble is set",
                ));
            }
            for learner in &self.base_learner_pool {
                learner.validate()?;
            }
            if !self.use_gradient_over_hessian_labels {
                log::warn!(
                    "heterogeneous_ensemble has no effect without use_gradient_over_hessian_labels"
                );
            }
        }

        if self.num_threads > num_cpus::get() * 2 {
            log::warn!(
                "num_threads ({}) is much larger than available cores ({})",
                self.num_threads,
                num_cpus::get()
            );
        }

        Ok(())
    }

    /// Load configuration from a `.json` or `.toml` file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| StreamBoostError::config(format!("Failed to read config file: {}", e)))?;

        let config: Config = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::from_str(&content).map_err(|e| {
                StreamBoostError::config(format!("Failed to parse JSON config: {}", e))
            })?,
            Some("toml") => toml::from_str(&content).map_err(|e| {
                StreamBoostError::config(format!("Failed to parse TOML config: {}", e))
            })?,
            _ => {
                return Err(StreamBoostError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("json") => serde_json::to_string_pretty(self).map_err(|e| {
                StreamBoostError::config(format!("Failed to serialize to JSON: {}", e))
            })?,
            Some("toml") => toml::to_string_pretty(self).map_err(|e| {
                StreamBoostError::config(format!("Failed to serialize to TOML: {}", e))
            })?,
            _ => {
                return Err(StreamBoostError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)
            .map_err(|e| StreamBoostError::config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    /// Load configuration from `STREAMBOOST_*` environment variables
    pub fn load_from_environment() -> Result<Self> {
        let mut config = Config::default();
        config.apply_environment_overrides()?;
        Ok(config)
    }

    /// Apply `STREAMBOOST_*` environment variables on top of this configuration
    pub fn apply_environment_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("STREAMBOOST_NUM_ROUNDS") {
            self.num_rounds = val
                .parse()
                .map_err(|_| StreamBoostError::config("Invalid STREAMBOOST_NUM_ROUNDS"))?;
        }

        if let Ok(val) = std::env::var("STREAMBOOST_LEARNING_RATE") {
            self.learning_rate = val
                .parse()
                .map_err(|_| StreamBoostError::config("Invalid STREAMBOOST_LEARNING_RATE"))?;
        }

        if let Ok(val) = std::env::var("STREAMBOOST_SUBSPACE_SIZE") {
            self.subspace_size = val
                .parse()
                .map_err(|_| StreamBoostError::config("Invalid STREAMBOOST_SUBSPACE_SIZE"))?;
        }

        if let Ok(val) = std::env::var("STREAMBOOST_OBJECTIVE") {
            self.objective = val
                .parse()
                .map_err(|_| StreamBoostError::config("Invalid STREAMBOOST_OBJECTIVE"))?;
        }

        if let Ok(val) = std::env::var("STREAMBOOST_RANDOM_SEED") {
            self.random_seed = val
                .parse()
                .map_err(|_| StreamBoostError::config("Invalid STREAMBOOST_RANDOM_SEED"))?;
        }

        self.validate()
    }

    /// Whether weak learners are trained on Newton-step pseudo-labels
    pub fn uses_pseudo_labels(&self) -> bool {
        self.use_gradient_over_hessian_labels
    }

    /// Whether each round draws its learner from the pool
    pub fn uses_heterogeneous_pool(&self) -> bool {
        self.use_gradient_over_hessian_labels && self.heterogeneous_ensemble
    }

    /// Whether unlabelled instances contribute to training
    pub fn is_semi_supervised(&self) -> bool {
        self.semi_supervised_weight > 0.0
    }

    /// Get configuration as a parameter map (for logging)
    pub fn as_parameter_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();

        map.insert("num_rounds".to_string(), self.num_rounds.to_string());
        map.insert("learning_rate".to_string(), self.learning_rate.to_string());
        map.insert("subspace_size".to_string(), self.subspace_size.to_string());
        map.insert("objective".to_string(), self.objective.to_string());
        map.insert(
            "use_gradient_over_hessian_labels".to_string(),
            self.use_gradient_over_hessian_labels.to_string(),
        );
        map.insert(
            "skip_on_loss_below_3sd".to_string(),
            self.skip_on_loss_below_3sd.to_string(),
        );
        map.insert(
            "skip_training_roughly".to_string(),
            self.skip_training_roughly.to_string(),
        );
        map.insert("base_learner".to_string(), self.base_learner.to_string());
        map.insert("random_seed".to_string(), self.random_seed.to_string());
        map.insert("num_threads".to_string(), self.num_threads.to_string());

        map
    }
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    config: Config,
    validation_errors: Vec<String>,
}

impl ConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ConfigBuilder {
            config: Config::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the number of boosting rounds
    pub fn num_rounds(mut self, rounds: usize) -> Self {
        if rounds < 1 {
            self.validation_errors
                .push("num_rounds must be at least 1".to_string());
        }
        self.config.num_rounds = rounds;
        self
    }

    /// Set the learning rate
    pub fn learning_rate(mut self, rate: f64) -> Self {
        if !(0.0..=1.0).contains(&rate) {
            self.validation_errors
                .push("learning_rate must be in range [0.0, 1.0]".to_string());
        }
        self.config.learning_rate = rate;
        self
    }

    /// Set the subspace size percentage
    pub fn subspace_size(mut self, size: i32) -> Self {
        self.config.subspace_size = size;
        self
    }

    /// Set the objective function
    pub fn objective(mut self, objective: ObjectiveType) -> Self {
        self.config.objective = objective;
        self
    }

    /// Negate the residual used as gradient
    pub fn negate_residual(mut self, negate: bool) -> Self {
        self.config.negate_residual = negate;
        self
    }

    /// Clip predicted probabilities before computing derivatives
    pub fn clip_predictions(mut self, clip: bool) -> Self {
        self.config.clip_predictions = clip;
        self
    }

    /// Train on gradient-over-Hessian pseudo-labels
    pub fn use_gradient_over_hessian_labels(mut self, enabled: bool) -> Self {
        self.config.use_gradient_over_hessian_labels = enabled;
        self
    }

    /// Round pseudo-label weights up, optionally after multiplying by 10
    pub fn use_ceiling_for_weights(mut self, enabled: bool, multiply_by_10: bool) -> Self {
        self.config.use_ceiling_for_weights = enabled;
        self.config.multiply_hessian_by_10_for_ceiling = multiply_by_10;
        self
    }

    /// Set the Hessian iteration multiplier
    pub fn hessian_iteration_multiplier(mut self, multiplier: u32) -> Self {
        if !(1..=MAX_HESSIAN_ITERATION_MULTIPLIER).contains(&multiplier) {
            self.validation_errors.push(format!(
                "hessian_iteration_multiplier must be in range [1, {}]",
                MAX_HESSIAN_ITERATION_MULTIPLIER
            ));
        }
        self.config.hessian_iteration_multiplier = multiplier;
        self
    }

    /// Use a weight of one for pseudo-labelled sub-instances
    pub fn use_weight_of_one(mut self, enabled: bool) -> Self {
        self.config.use_weight_of_one = enabled;
        self
    }

    /// Skip training on anomalously low round-0 loss
    pub fn skip_on_loss_below_3sd(mut self, enabled: bool) -> Self {
        self.config.skip_on_loss_below_3sd = enabled;
        self
    }

    /// Skip each training call with probability 1/N
    pub fn skip_training_roughly(mut self, n: u32) -> Self {
        if n < 1 {
            self.validation_errors
                .push("skip_training_roughly must be at least 1".to_string());
        }
        self.config.skip_training_roughly = n;
        self
    }

    /// One-hot encode multi-valued nominal subspace attributes
    pub fn one_hot_encoding(mut self, enabled: bool) -> Self {
        self.config.one_hot_encoding = enabled;
        self
    }

    /// Set the semi-supervised weight
    pub fn semi_supervised_weight(mut self, weight: f64) -> Self {
        if !(0.0..=1.0).contains(&weight) {
            self.validation_errors
                .push("semi_supervised_weight must be in range [0.0, 1.0]".to_string());
        }
        self.config.semi_supervised_weight = weight;
        self
    }

    /// Set the loss change estimator confidence
    pub fn loss_estimator_delta(mut self, delta: f64) -> Self {
        self.config.loss_estimator_delta = delta;
        self
    }

    /// Set random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.config.random_seed = seed;
        self
    }

    /// Set number of threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Set the weak learner prototype
    pub fn base_learner(mut self, learner: BaseLearnerConfig) -> Self {
        self.config.base_learner = learner;
        self
    }

    /// Enable heterogeneous ensembles drawn from `pool`
    pub fn heterogeneous_ensemble(mut self, pool: Vec<BaseLearnerConfig>) -> Self {
        if pool.is_empty() {
            self.validation_errors
                .push("base_learner_pool must not be empty".to_string());
        }
        self.config.heterogeneous_ensemble = true;
        self.config.base_learner_pool = pool;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<Config> {
        if !self.validation_errors.is_empty() {
            return Err(StreamBoostError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
