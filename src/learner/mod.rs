//! Incremental weak learners for StreamBoost.
//!
//! Every learner implements [`BaseLearner`](crate::core::traits::BaseLearner)
//! and predicts a single raw score. Learners are created from a
//! [`BaseLearnerConfig`](crate::config::BaseLearnerConfig) through its
//! `build()` method.

pub mod linear;
pub mod target_mean;

pub use linear::SgdLinearRegressor;
pub use target_mean::TargetMean;

use crate::dataset::Instance;

/// Label and weight of an instance usable for a training update.
///
/// Instances without a label, or with a weight that is not strictly
/// positive, do not update a learner.
pub(crate) fn training_target(instance: &Instance) -> Option<(f64, f64)> {
    let label = instance.label()?;
    let weight = instance.weight();
    if weight > 0.0 && label.is_finite() {
        Some((label, weight))
    } else {
        None
    }
}
