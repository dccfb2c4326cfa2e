//! Linear regressor trained by weighted stochastic gradient descent.

use crate::core::traits::BaseLearner;
use crate::core::types::Score;
use crate::dataset::Instance;
use crate::learner::training_target;

/// Linear model `bias + w·x` updated by one SGD step per instance on the
/// weighted squared error, with an optional L2 penalty on `w`.
///
/// The weight vector is sized from the first instance it sees. Missing
/// (`NaN`) inputs contribute nothing to the prediction or the update.
#[derive(Debug, Clone)]
pub struct SgdLinearRegressor {
    learning_rate: f64,
    l2: f64,
    weights: Vec<f64>,
    bias: f64,
    num_updates: u64,
}

impl SgdLinearRegressor {
    /// Create an untrained regressor
    pub fn new(learning_rate: f64, l2: f64) -> Self {
        SgdLinearRegressor {
            learning_rate,
            l2,
            weights: Vec::new(),
            bias: 0.0,
            num_updates: 0,
        }
    }

    /// Learned feature weights
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Learned intercept
    pub fn bias(&self) -> f64 {
        self.bias
    }

    fn score(&self, values: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(values)
            .filter(|(_, x)| !x.is_nan())
            .fold(self.bias, |acc, (w, x)| acc + w * x)
    }
}

impl BaseLearner for SgdLinearRegressor {
    fn fresh_copy(&self) -> Box<dyn BaseLearner> {
        Box::new(SgdLinearRegressor::new(self.learning_rate, self.l2))
    }

    fn train(&mut self, instance: &Instance) {
        let Some((label, weight)) = training_target(instance) else {
            return;
        };
        let values = instance.values();
        if self.weights.len() < values.len() {
            self.weights.resize(values.len(), 0.0);
        }

        let error = label - self.score(values);
        let step = self.learning_rate * weight;
        for (w, &x) in self.weights.iter_mut().zip(values) {
            let x = if x.is_nan() { 0.0 } else { x };
            *w += step * (error * x - self.l2 * *w);
        }
        self.bias += step * error;
        self.num_updates += 1;
    }

    fn predict(&self, instance: &Instance) -> Score {
        self.score(instance.values())
    }

    fn kind(&self) -> &'static str {
        "sgd_linear"
    }

    fn num_updates(&self) -> u64 {
        self.num_updates
    }

    fn model_size(&self) -> usize {
        self.weights.len() + 1
    }
}
