//! Prequential evaluation for StreamBoost.
//!
//! Every instance is first used to test the ensemble and then to train it,
//! so the reported metrics always describe predictions on unseen data.

use serde::{Deserialize, Serialize};

use crate::boosting::ensemble::{BoostingEnsemble, EnsembleMeasurements};
use crate::core::constants::PREDICTION_CLIP_MIN;
use crate::core::error::{Result, StreamBoostError};
use crate::core::types::TargetKind;
use crate::dataset::Instance;

/// Running classification metrics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationMetrics {
    /// Confusion counts, `confusion[true][predicted]`
    pub confusion: Vec<Vec<u64>>,
    /// Instances evaluated
    pub total: u64,
    /// Correct predictions
    pub correct: u64,
    /// Sum of the log loss of the true class
    pub log_loss_sum: f64,
}

impl ClassificationMetrics {
    /// Empty metrics over `num_classes` classes
    pub fn new(num_classes: usize) -> Self {
        ClassificationMetrics {
            confusion: vec![vec![0; num_classes]; num_classes],
            ..Default::default()
        }
    }

    /// Record one prediction.
    ///
    /// `probabilities` are the class probabilities; the predicted class is
    /// their argmax.
    pub fn update(&mut self, true_class: usize, probabilities: &[f64]) {
        let predicted = argmax(probabilities);
        let num_classes = self.confusion.len().max(true_class + 1).max(predicted + 1);
        if num_classes > self.confusion.len() {
            for row in &mut self.confusion {
                row.resize(num_classes, 0);
            }
            self.confusion.resize(num_classes, vec![0; num_classes]);
        }

        self.confusion[true_class][predicted] += 1;
        self.total += 1;
        if predicted == true_class {
            self.correct += 1;
        }
        let p = probabilities.get(true_class).copied().unwrap_or(0.0);
        self.log_loss_sum -= p.max(PREDICTION_CLIP_MIN).ln();
    }

    /// Fraction of correct predictions
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Mean log loss of the true class
    pub fn mean_log_loss(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.log_loss_sum / self.total as f64
        }
    }

    /// Cohen's kappa of the confusion matrix
    pub fn kappa(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        let n = self.total as f64;
        let observed = self.accuracy();
        let expected: f64 = (0..self.confusion.len())
            .map(|c| {
                let row: u64 = self.confusion[c].iter().sum();
                let column: u64 = self.confusion.iter().map(|r| r[c]).sum();
                (row as f64 / n) * (column as f64 / n)
            })
            .sum();
        if (1.0 - expected).abs() < f64::EPSILON {
            0.0
        } else {
            (observed - expected) / (1.0 - expected)
        }
    }
}

fn argmax(values: &[f64]) -> usize {
    values
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) })
        .0
}

/// Result of a prequential run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrequentialReport {
    /// Labelled instances tested
    pub instances_evaluated: u64,
    /// Test-then-train accuracy
    pub accuracy: f64,
    /// Mean log loss of the true class
    pub mean_log_loss: f64,
    /// Cohen's kappa
    pub kappa: f64,
    /// Training calls skipped on low loss
    pub skip_count: u64,
    /// Accumulated metrics
    pub metrics: ClassificationMetrics,
    /// Ensemble statistics after the run
    pub measurements: EnsembleMeasurements,
}

/// Test-then-train over a stream of instances with a nominal target.
///
/// Unlabelled instances are not tested but are still passed to training.
/// Progress is logged every `report_every` instances (0 disables it).
pub fn evaluate_prequential<'a, I>(
    ensemble: &mut BoostingEnsemble,
    instances: I,
    report_every: usize,
) -> Result<PrequentialReport>
where
    I: IntoIterator<Item = &'a Instance>,
{
    let mut metrics: Option<ClassificationMetrics> = None;
    let mut seen = 0usize;

    for instance in instances {
        if metrics.is_none() {
            metrics = Some(match instance.header().target_kind() {
                TargetKind::Nominal(num_classes) => ClassificationMetrics::new(num_classes),
                TargetKind::Numeric => {
                    return Err(StreamBoostError::unsupported_target(format!(
                        "prequential classification needs a nominal target, '{}' is numeric",
                        instance.header().target.name
                    )))
                }
            });
        }
        let Some(current) = metrics.as_mut() else {
            continue;
        };

        if let Some(label) = instance.label() {
            let probabilities = ensemble.predict(instance)?.to_vec();
            current.update(label as usize, &probabilities);
        }
        ensemble.train_on_instance(instance)?;

        seen += 1;
        if report_every > 0 && seen % report_every == 0 {
            log::info!(
                "Prequential: {} instances, accuracy {:.4}, log loss {:.4}, kappa {:.4}",
                seen,
                current.accuracy(),
                current.mean_log_loss(),
                current.kappa()
            );
        }
    }

    let metrics = metrics.unwrap_or_default();
    Ok(PrequentialReport {
        instances_evaluated: metrics.total,
        accuracy: metrics.accuracy(),
        mean_log_loss: metrics.mean_log_loss(),
        kappa: metrics.kappa(),
        skip_count: ensemble.skip_count(),
        metrics,
        measurements: ensemble.measurements(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_accuracy_and_log_loss() {
        let mut metrics = ClassificationMetrics::new(2);
        metrics.update(0, &[0.8, 0.2]);
        metrics.update(1, &[0.6, 0.4]);
        assert_eq!(metrics.total, 2);
        assert_abs_diff_eq!(metrics.accuracy(), 0.5);
        assert_abs_diff_eq!(
            metrics.mean_log_loss(),
            -(0.8f64.ln() + 0.4f64.ln()) / 2.0,
            epsilon = 1e-12
        );
        assert_eq!(metrics.confusion, vec![vec![1, 0], vec![1, 0]]);
    }

    #[test]
    fn test_kappa() {
        let mut metrics = ClassificationMetrics::new(2);
        for _ in 0..5 {
            metrics.update(0, &[0.9, 0.1]);
            metrics.update(1, &[0.1, 0.9]);
        }
        assert_abs_diff_eq!(metrics.kappa(), 1.0, epsilon = 1e-12);

        let empty = ClassificationMetrics::default();
        assert_eq!(empty.kappa(), 0.0);
        assert_eq!(empty.accuracy(), 0.0);
    }

    #[test]
    fn test_zero_probability_is_clipped() {
        let mut metrics = ClassificationMetrics::new(2);
        metrics.update(1, &[1.0, 0.0]);
        assert!(metrics.mean_log_loss().is_finite());
    }

    #[test]
    fn test_confusion_grows_for_unseen_classes() {
        let mut metrics = ClassificationMetrics::default();
        metrics.update(2, &[0.1, 0.2, 0.7]);
        assert_eq!(metrics.confusion.len(), 3);
        assert_eq!(metrics.confusion[2][2], 1);
    }
}
