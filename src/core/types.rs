//! Core data types for StreamBoost.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::core::error::StreamBoostError;

/// Raw ensemble score and gradient value type.
pub type Score = f64;

/// Index of an input feature within an instance header.
pub type FeatureIndex = usize;

/// Index of a boosting round within the ensemble.
pub type RoundIndex = usize;

/// First and second order derivative of the loss for one ensemble output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradHess {
    /// Gradient (or residual, depending on the sign convention)
    pub gradient: Score,
    /// Hessian
    pub hessian: Score,
}

impl GradHess {
    /// Create a gradient/Hessian pair
    pub fn new(gradient: Score, hessian: Score) -> Self {
        GradHess { gradient, hessian }
    }

    /// Newton step target `gradient / hessian`
    pub fn newton_step(&self) -> Score {
        self.gradient / self.hessian
    }
}

/// Loss functions driving the boosting recurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectiveType {
    /// Softmax with an implicit reference class, cross-entropy loss
    SoftmaxCrossEntropy,
    /// Squared error
    SquaredError,
}

impl Default for ObjectiveType {
    fn default() -> Self {
        ObjectiveType::SoftmaxCrossEntropy
    }
}

impl fmt::Display for ObjectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectiveType::SoftmaxCrossEntropy => write!(f, "softmax_cross_entropy"),
            ObjectiveType::SquaredError => write!(f, "squared_error"),
        }
    }
}

impl FromStr for ObjectiveType {
    type Err = StreamBoostError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "softmax_cross_entropy" | "softmax" | "cross_entropy" => {
                Ok(ObjectiveType::SoftmaxCrossEntropy)
            }
            "squared_error" | "squared" | "l2" => Ok(ObjectiveType::SquaredError),
            other => Err(StreamBoostError::invalid_parameter(
                "objective",
                other,
                "expected softmax_cross_entropy or squared_error",
            )),
        }
    }
}

/// Kind of target attribute an instance stream carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// Nominal target with the given number of values
    Nominal(usize),
    /// Numeric (regression) target
    Numeric,
}

impl TargetKind {
    /// Number of ensemble outputs needed for this target.
    ///
    /// A nominal target with `c` values uses `c - 1` outputs, the last class
    /// being the implicit reference class of the transfer function.
    pub fn committee_size(&self) -> usize {
        match self {
            TargetKind::Nominal(num_values) => num_values.saturating_sub(1),
            TargetKind::Numeric => 1,
        }
    }

    /// Whether the target is nominal
    pub fn is_nominal(&self) -> bool {
        matches!(self, TargetKind::Nominal(_))
    }
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::Nominal(n) => write!(f, "nominal({})", n),
            TargetKind::Numeric => write!(f, "numeric"),
        }
    }
}
