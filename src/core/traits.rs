//! Core trait abstractions for StreamBoost.
//!
//! The boosting core only ever talks to weak learners through
//! [`BaseLearner`]; which concrete learner sits behind it is decided once,
//! when the configuration is turned into learners.

use std::fmt::Debug;

use crate::core::types::{GradHess, Score};
use crate::dataset::Instance;

/// Incremental single-output predictor used as a boosting weak learner.
///
/// Implementations must be cheap to update one instance at a time and must
/// not share mutable state between copies, since committees train their
/// members concurrently.
pub trait BaseLearner: Send + Sync + Debug {
    /// Returns a learner with the same configuration and no learned state.
    fn fresh_copy(&self) -> Box<dyn BaseLearner>;

    /// Incrementally updates the learner with one weighted, labelled instance.
    ///
    /// Instances without a label are ignored.
    fn train(&mut self, instance: &Instance);

    /// Updates the learner from the loss derivatives of its output.
    ///
    /// The default trains on the Newton step `gradient / hessian`, weighted
    /// by the instance weight times the Hessian.
    fn train_on_derivatives(&mut self, instance: &Instance, grad_hess: GradHess) {
        let target = instance.with_label_and_weight(
            Some(grad_hess.newton_step()),
            instance.weight() * grad_hess.hessian,
        );
        self.train(&target);
    }

    /// Raw score for the learner's single output dimension.
    fn predict(&self, instance: &Instance) -> Score;

    /// Short name of the learner variant.
    fn kind(&self) -> &'static str;

    /// Number of training updates applied so far.
    fn num_updates(&self) -> u64;

    /// Number of learned parameters (nodes, weights, ...).
    fn model_size(&self) -> usize;
}
