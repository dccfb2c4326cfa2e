//! Weighted running mean of the target.

use crate::core::traits::BaseLearner;
use crate::core::types::Score;
use crate::dataset::Instance;
use crate::learner::training_target;

/// Predicts the weighted mean of every label seen so far, ignoring features.
#[derive(Debug, Clone, Default)]
pub struct TargetMean {
    sum_weights: f64,
    sum_weighted_labels: f64,
    num_updates: u64,
}

impl TargetMean {
    /// Create an untrained learner
    pub fn new() -> Self {
        Self::default()
    }

    /// Total weight of the instances trained on
    pub fn sum_weights(&self) -> f64 {
        self.sum_weights
    }
}

impl BaseLearner for TargetMean {
    fn fresh_copy(&self) -> Box<dyn BaseLearner> {
        Box::new(TargetMean::new())
    }

    fn train(&mut self, instance: &Instance) {
        if let Some((label, weight)) = training_target(instance) {
            self.sum_weights += weight;
            self.sum_weighted_labels += weight * label;
            self.num_updates += 1;
        }
    }

    fn predict(&self, _instance: &Instance) -> Score {
        if self.sum_weights > 0.0 {
            self.sum_weighted_labels / self.sum_weights
        } else {
            0.0
        }
    }

    fn kind(&self) -> &'static str {
        "target_mean"
    }

    fn num_updates(&self) -> u64 {
        self.num_updates
    }

    fn model_size(&self) -> usize {
        1
    }
}
