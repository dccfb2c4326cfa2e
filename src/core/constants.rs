//! System constants and configuration defaults for StreamBoost.

use crate::core::types::ObjectiveType;

/// Library version
pub const STREAMBOOST_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of boosting rounds.
pub const DEFAULT_NUM_ROUNDS: usize = 10;

/// Default learning rate (shrinkage) applied to every committee's output.
pub const DEFAULT_LEARNING_RATE: f64 = 1.0;

/// Default subspace size, as a percentage of the input features.
/// Negative values select the complement (`100 + value` percent).
pub const DEFAULT_SUBSPACE_SIZE: i32 = 100;

/// Default objective.
pub const DEFAULT_OBJECTIVE: ObjectiveType = ObjectiveType::SoftmaxCrossEntropy;

/// Default multiplier for repeated training by Hessian ceiling (1 = disabled).
pub const DEFAULT_HESSIAN_ITERATION_MULTIPLIER: u32 = 1;

/// Upper bound for the Hessian iteration multiplier.
pub const MAX_HESSIAN_ITERATION_MULTIPLIER: u32 = 100;

/// Default skip-training-roughly period (1 = never skip).
pub const DEFAULT_SKIP_TRAINING_ROUGHLY: u32 = 1;

/// Default random seed.
pub const DEFAULT_RANDOM_SEED: u64 = 1;

/// Default confidence for the loss change estimator.
pub const DEFAULT_LOSS_ESTIMATOR_DELTA: f64 = 1.0e-3;

/// Default number of threads (0 = rayon global pool).
pub const DEFAULT_NUM_THREADS: usize = 0;

/// Lower clip bound for predicted probabilities.
pub const PREDICTION_CLIP_MIN: f64 = 1.0e-4;

/// Upper clip bound for predicted probabilities.
pub const PREDICTION_CLIP_MAX: f64 = 0.9999;

/// Feature count at or below which all k-combinations are enumerated.
pub const LOW_DIMENSIONALITY_THRESHOLD: usize = 20;

/// Hessian scale used by the `multiply_hessian_by_10_for_ceiling` flag.
pub const HESSIAN_CEILING_MULTIPLIER: f64 = 10.0;

/// Number of standard deviations below the mean loss that triggers a skip.
pub const SKIP_LOSS_SIGMAS: f64 = 3.0;

/// Name given to the numeric target of pseudo-labelled sub-instances.
pub const PSEUDO_TARGET_NAME: &str = "pseudo_residual";
