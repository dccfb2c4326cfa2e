//! Loss functions and their derivatives for online boosting.
//!
//! An objective maps the ground truth and the accumulated raw ensemble score
//! of one instance to a (gradient, Hessian) pair per ensemble output, plus
//! the instance's total loss. Both variants share the same transfer
//! function: a softmax over the raw scores extended with an implicit
//! reference logit of 0.

use ndarray::{Array1, ArrayView1};
use std::fmt::Debug;

use crate::core::constants::{PREDICTION_CLIP_MAX, PREDICTION_CLIP_MIN};
use crate::core::error::{Result, StreamBoostError};
pub use crate::core::types::GradHess;
use crate::core::types::ObjectiveType;

/// Result of one derivative computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Derivatives {
    /// One pair per ensemble output
    pub grad_hess: Vec<GradHess>,
    /// Loss summed over the explicit outputs
    pub total_loss: f64,
}

/// Objective function trait for pluggable loss functions
pub trait Objective: Send + Sync + Debug {
    /// Get the objective function name
    fn name(&self) -> &'static str;

    /// Objective variant
    fn objective_type(&self) -> ObjectiveType;

    /// Map `K` raw scores to `K + 1` probabilities.
    fn transfer(&self, raw: ArrayView1<'_, f64>) -> Array1<f64> {
        softmax_with_reference(raw)
    }

    /// Compute derivatives for every output of `raw`.
    ///
    /// `ground_truth` must hold at least `raw.len()` entries; entries past
    /// `raw.len()` (the reference class) are not used.
    fn compute_derivatives(
        &self,
        ground_truth: ArrayView1<'_, f64>,
        raw: ArrayView1<'_, f64>,
        negate_residual: bool,
        clip_predictions: bool,
    ) -> Result<Derivatives>;
}

/// Softmax over `raw` extended with a trailing logit of 0.
pub fn softmax_with_reference(raw: ArrayView1<'_, f64>) -> Array1<f64> {
    let mut result = Array1::zeros(raw.len() + 1);
    result.slice_mut(ndarray::s![..raw.len()]).assign(&raw);

    let max = result.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    result.mapv_inplace(|v| (v - max).exp());
    let sum = result.sum();
    result /= sum;
    result
}

fn check_dimensions(ground_truth: ArrayView1<'_, f64>, raw: ArrayView1<'_, f64>) -> Result<()> {
    if ground_truth.len() < raw.len() {
        return Err(StreamBoostError::dimension_mismatch(
            format!("at least {} ground truth values", raw.len()),
            format!("{} ground truth values", ground_truth.len()),
        ));
    }
    Ok(())
}

/// Cross-entropy over a softmax with an implicit reference class.
#[derive(Debug, Clone, Copy, Default)]
pub struct SoftmaxCrossEntropy;

impl Objective for SoftmaxCrossEntropy {
    fn name(&self) -> &'static str {
        "softmax_cross_entropy"
    }

    fn objective_type(&self) -> ObjectiveType {
        ObjectiveType::SoftmaxCrossEntropy
    }

    fn compute_derivatives(
        &self,
        ground_truth: ArrayView1<'_, f64>,
        raw: ArrayView1<'_, f64>,
        negate_residual: bool,
        clip_predictions: bool,
    ) -> Result<Derivatives> {
        check_dimensions(ground_truth, raw)?;
        let predictions = self.transfer(raw);

        let mut total_loss = 0.0;
        let grad_hess = (0..raw.len())
            .map(|i| {
                let mut p = predictions[i];
                if clip_predictions {
                    p = p.clamp(PREDICTION_CLIP_MIN, PREDICTION_CLIP_MAX);
                }
                let gradient = if negate_residual {
                    p - ground_truth[i]
                } else {
                    ground_truth[i] - p
                };
                // The reference class term is not part of the sum.
                total_loss += -ground_truth[i] * p.ln();
                GradHess::new(gradient, p * (1.0 - p))
            })
            .collect();

        Ok(Derivatives {
            grad_hess,
            total_loss,
        })
    }
}

/// Squared error with unit Hessian.
///
/// The residual is taken against the raw score when negated and against the
/// softmax transfer of the raw score otherwise. The reported loss is half
/// the sum of squared residuals.
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredError;

impl Objective for SquaredError {
    fn name(&self) -> &'static str {
        "squared_error"
    }

    fn objective_type(&self) -> ObjectiveType {
        ObjectiveType::SquaredError
    }

    fn compute_derivatives(
        &self,
        ground_truth: ArrayView1<'_, f64>,
        raw: ArrayView1<'_, f64>,
        negate_residual: bool,
        _clip_predictions: bool,
    ) -> Result<Derivatives> {
        check_dimensions(ground_truth, raw)?;
        let transferred = if negate_residual {
            None
        } else {
            Some(self.transfer(raw))
        };

        let grad_hess: Vec<GradHess> = (0..raw.len())
            .map(|i| {
                let gradient = match &transferred {
                    None => raw[i] - ground_truth[i],
                    Some(t) => ground_truth[i] - t[i],
                };
                GradHess::new(gradient, 1.0)
            })
            .collect();
        let total_loss = 0.5 * grad_hess.iter().map(|gh| gh.gradient * gh.gradient).sum::<f64>();

        Ok(Derivatives {
            grad_hess,
            total_loss,
        })
    }
}

/// Create the objective for an [`ObjectiveType`].
pub fn create_objective(objective_type: ObjectiveType) -> Box<dyn Objective> {
    match objective_type {
        ObjectiveType::SoftmaxCrossEntropy => Box::new(SoftmaxCrossEntropy),
        ObjectiveType::SquaredError => Box::new(SquaredError),
    }
}
