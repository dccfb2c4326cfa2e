//! Base learner configuration.
//!
//! Each variant names one concrete incremental learner together with its
//! hyperparameters. The variant is resolved to a learner exactly once, when
//! the ensemble allocates its committees.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::error::{Result, StreamBoostError};
use crate::core::traits::BaseLearner;
use crate::learner::{SgdLinearRegressor, TargetMean};

/// Default step size of [`BaseLearnerConfig::SgdLinear`].
pub const DEFAULT_SGD_LEARNING_RATE: f64 = 0.01;

/// Configuration of a weak learner prototype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaseLearnerConfig {
    /// Weighted running mean of the target
    TargetMean,
    /// Linear model trained by stochastic gradient descent on squared error
    SgdLinear {
        /// SGD step size
        learning_rate: f64,
        /// L2 penalty on the weights
        l2: f64,
    },
}

impl Default for BaseLearnerConfig {
    fn default() -> Self {
        BaseLearnerConfig::SgdLinear {
            learning_rate: DEFAULT_SGD_LEARNING_RATE,
            l2: 0.0,
        }
    }
}

impl fmt::Display for BaseLearnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BaseLearnerConfig::TargetMean => write!(f, "target_mean"),
            BaseLearnerConfig::SgdLinear { learning_rate, l2 } => {
                write!(f, "sgd_linear(lr={}, l2={})", learning_rate, l2)
            }
        }
    }
}

impl BaseLearnerConfig {
    /// Validate the learner hyperparameters
    pub fn validate(&self) -> Result<()> {
        if let BaseLearnerConfig::SgdLinear { learning_rate, l2 } = *self {
            if !(learning_rate > 0.0 && learning_rate.is_finite()) {
                return Err(StreamBoostError::invalid_parameter(
                    "base_learner.learning_rate",
                    learning_rate.to_string(),
                    "must be positive and finite",
                ));
            }
            if !(l2 >= 0.0 && l2.is_finite()) {
                return Err(StreamBoostError::invalid_parameter(
                    "base_learner.l2",
                    l2.to_string(),
                    "must be non-negative and finite",
                ));
            }
        }
        Ok(())
    }

    /// Instantiate an untrained learner of this configuration.
    pub fn build(&self) -> Box<dyn BaseLearner> {
        match *self {
            BaseLearnerConfig::TargetMean => Box::new(TargetMean::new()),
            BaseLearnerConfig::SgdLinear { learning_rate, l2 } => {
                Box::new(SgdLinearRegressor::new(learning_rate, l2))
            }
        }
    }
}
