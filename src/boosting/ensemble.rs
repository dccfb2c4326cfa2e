//! Online boosting ensemble.
//!
//! [`BoostingEnsemble`] owns one (subspace, committee) pair per boosting
//! round and trains them with a Newton-boosting recurrence, one instance at a
//! time: round `m` is fitted to the derivatives of the loss at the score
//! accumulated by rounds `0..m`. Rounds are therefore trained strictly in
//! order; prediction has no such dependency and runs the rounds in parallel.

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::boosting::committee::WeakLearnerCommittee;
use crate::boosting::loss_estimator::LossChangeEstimator;
use crate::boosting::objective::{create_objective, Objective};
use crate::boosting::projector::{InstanceProjector, WeightShaping};
use crate::boosting::subspace::{FeatureSubspaceSampler, Subspace};
use crate::config::Config;
use crate::core::constants::SKIP_LOSS_SIGMAS;
use crate::core::error::{Result, StreamBoostError};
use crate::core::traits::BaseLearner;
use crate::core::types::{ObjectiveType, Score, TargetKind};
use crate::dataset::{Instance, InstanceHeader};

/// What a training call did with its instance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrainOutcome {
    /// Every round was updated
    Trained {
        /// Loss summed over all rounds
        total_loss: f64,
    },
    /// Round-0 loss was anomalously low; no round was updated
    SkippedOnLoss {
        /// Loss of round 0
        round_zero_loss: f64,
    },
    /// Skipped by the random skip-training-roughly draw
    SkippedRoughly,
    /// The instance had no label and semi-supervision is off
    MissingLabel,
}

impl TrainOutcome {
    /// Whether any round was updated
    pub fn is_trained(&self) -> bool {
        matches!(self, TrainOutcome::Trained { .. })
    }
}

/// Snapshot of ensemble statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnsembleMeasurements {
    /// Training calls received
    pub instances_seen: u64,
    /// Training calls that updated the rounds
    pub instances_trained: u64,
    /// Calls skipped on anomalously low loss
    pub skip_count: u64,
    /// Calls skipped by the random skip-training-roughly draw
    pub rough_skip_count: u64,
    /// Number of boosting rounds (0 when uninitialized)
    pub num_rounds: usize,
    /// Outputs per round (0 when uninitialized)
    pub committee_size: usize,
    /// Mean of the windowed per-instance loss
    pub loss_mean: f64,
    /// Variance of the windowed per-instance loss
    pub loss_variance: f64,
    /// Observations in the loss window
    pub loss_window_width: u64,
    /// Changes detected by the loss estimator
    pub loss_changes: u64,
    /// Average learned parameters per base learner, over committees
    pub avg_model_size: f64,
    /// Average training updates per committee
    pub avg_updates_per_committee: f64,
}

/// One boosting round: a subspace projector and its committee.
#[derive(Debug)]
pub struct EnsembleRound {
    projector: InstanceProjector,
    committee: WeakLearnerCommittee,
}

impl EnsembleRound {
    /// Subspace of this round
    pub fn subspace(&self) -> &Subspace {
        self.projector.subspace()
    }

    /// Projector of this round
    pub fn projector(&self) -> &InstanceProjector {
        &self.projector
    }

    /// Committee of this round
    pub fn committee(&self) -> &WeakLearnerCommittee {
        &self.committee
    }

    fn score(&self, instance: &Instance, learning_rate: f64) -> Result<Array1<Score>> {
        let sub_instance = self.projector.project(instance)?;
        Ok(self.committee.predict(&sub_instance) * learning_rate)
    }
}

#[derive(Debug)]
struct EnsembleState {
    rounds: Vec<EnsembleRound>,
    committee_size: usize,
    target_kind: TargetKind,
    objective: Box<dyn Objective>,
    loss_estimator: LossChangeEstimator,
}

/// Online gradient boosting ensemble over an instance stream.
#[derive(Debug)]
pub struct BoostingEnsemble {
    config: Config,
    rng: StdRng,
    thread_pool: Option<Arc<rayon::ThreadPool>>,
    state: Option<EnsembleState>,
    instances_seen: u64,
    instances_trained: u64,
    skip_count: u64,
    rough_skip_count: u64,
}

static_assertions::assert_impl_all!(BoostingEnsemble: Send, Sync);

impl BoostingEnsemble {
    /// Create an uninitialized ensemble.
    ///
    /// The configuration is validated; with `num_threads > 0` a dedicated
    /// thread pool is built for the parallel sections.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let thread_pool = if config.num_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.num_threads)
                .build()
                .map_err(|e| StreamBoostError::config(format!("Failed to create thread pool: {}", e)))?;
            Some(Arc::new(pool))
        } else {
            None
        };

        Ok(BoostingEnsemble {
            rng: StdRng::seed_from_u64(config.random_seed),
            config,
            thread_pool,
            state: None,
            instances_seen: 0,
            instances_trained: 0,
            skip_count: 0,
            rough_skip_count: 0,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Whether the ensemble has been initialized by a training call
    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Boosting rounds, empty when uninitialized
    pub fn rounds(&self) -> &[EnsembleRound] {
        self.state.as_ref().map(|s| s.rounds.as_slice()).unwrap_or(&[])
    }

    /// Outputs per round, once initialized
    pub fn committee_size(&self) -> Option<usize> {
        self.state.as_ref().map(|s| s.committee_size)
    }

    /// Objective in use, once initialized
    pub fn objective_type(&self) -> Option<ObjectiveType> {
        self.state.as_ref().map(|s| s.objective.objective_type())
    }

    /// Loss change estimator, once initialized
    pub fn loss_estimator(&self) -> Option<&LossChangeEstimator> {
        self.state.as_ref().map(|s| &s.loss_estimator)
    }

    /// Calls skipped on anomalously low loss
    pub fn skip_count(&self) -> u64 {
        self.skip_count
    }

    fn install<R: Send>(&self, f: impl FnOnce() -> R + Send) -> R {
        match &self.thread_pool {
            Some(pool) => pool.install(f),
            None => f(),
        }
    }

    /// Materialize the rounds from the first instance's header.
    ///
    /// Fails with [`StreamBoostError::UnsupportedTarget`] for a numeric
    /// target with the cross-entropy objective, or a nominal target with
    /// fewer than two values.
    pub fn initialize(&mut self, instance: &Instance) -> Result<()> {
        let header: &InstanceHeader = instance.header();
        let target_kind = header.target_kind();
        let objective = create_objective(self.config.objective);

        match target_kind {
            TargetKind::Numeric if self.config.objective != ObjectiveType::SquaredError => {
                return Err(StreamBoostError::unsupported_target(format!(
                    "numeric target '{}' requires the squared_error objective, got {}",
                    header.target.name, self.config.objective
                )));
            }
            TargetKind::Nominal(n) if n < 2 => {
                return Err(StreamBoostError::unsupported_target(format!(
                    "nominal target '{}' has {} values, at least 2 are required",
                    header.target.name, n
                )));
            }
            _ => {}
        }
        let committee_size = target_kind.committee_size();
        let num_rounds = self.config.num_rounds;

        let prototypes: Vec<Box<dyn BaseLearner>> = if self.config.uses_heterogeneous_pool() {
            let pool = &self.config.base_learner_pool;
            (0..num_rounds)
                .map(|_| pool[self.rng.gen_range(0..pool.len())].build())
                .collect()
        } else {
            let prototype = self.config.base_learner.build();
            (0..num_rounds).map(|_| prototype.fresh_copy()).collect()
        };

        let subspaces = FeatureSubspaceSampler::generate(
            self.config.subspace_size,
            header.num_features(),
            num_rounds,
            &mut self.rng,
        );

        let rounds = subspaces
            .into_iter()
            .zip(prototypes)
            .map(|(subspace, prototype)| -> Result<EnsembleRound> {
                Ok(EnsembleRound {
                    projector: InstanceProjector::new(
                        header,
                        subspace,
                        self.config.one_hot_encoding,
                        self.config.uses_pseudo_labels(),
                    )?,
                    committee: WeakLearnerCommittee::new(prototype.as_ref(), committee_size),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Initializing ensemble: objective {}, target {}, committee size {}, {} rounds, subspace size {} of {} features",
            objective.name(),
            target_kind,
            committee_size,
            rounds.len(),
            rounds.first().map(|r| r.subspace().len()).unwrap_or(0),
            header.num_features()
        );

        self.state = Some(EnsembleState {
            rounds,
            committee_size,
            target_kind,
            objective,
            loss_estimator: LossChangeEstimator::new(self.config.loss_estimator_delta),
        });
        Ok(())
    }

    /// Discard all rounds; the next training call re-initializes.
    pub fn reset(&mut self) {
        if self.state.take().is_some() {
            log::info!(
                "Resetting ensemble after {} instances ({} trained)",
                self.instances_seen,
                self.instances_trained
            );
        }
    }

    fn ground_truth(&self, instance: &Instance) -> Result<Option<Array1<f64>>> {
        let Some(state) = &self.state else {
            return Ok(None);
        };
        match instance.label() {
            Some(label) => Ok(Some(match state.target_kind {
                TargetKind::Nominal(num_classes) => {
                    let class = label as usize;
                    crate::ensure!(
                        label >= 0.0 && class < num_classes,
                        crate::training_error!("label {} outside the {} target classes", label, num_classes)
                    );
                    let mut truth = Array1::zeros(num_classes);
                    truth[class] = 1.0;
                    truth
                }
                TargetKind::Numeric => Array1::from(vec![label]),
            })),
            None if self.config.is_semi_supervised() => {
                let raw = self.predict_raw(instance)?;
                Ok(Some(state.objective.transfer(raw.view()) * self.config.semi_supervised_weight))
            }
            None => Ok(None),
        }
    }

    /// Train on one instance.
    ///
    /// Unlabelled instances are ignored unless semi-supervision is enabled.
    pub fn train_on_instance(&mut self, instance: &Instance) -> Result<TrainOutcome> {
        self.instances_seen += 1;

        let skip_roughly = self.config.skip_training_roughly;
        if skip_roughly > 1 && self.rng.gen_range(0..skip_roughly) == 0 {
            self.rough_skip_count += 1;
            return Ok(TrainOutcome::SkippedRoughly);
        }

        if instance.label_is_missing() && !self.config.is_semi_supervised() {
            return Ok(TrainOutcome::MissingLabel);
        }

        if self.state.is_none() {
            self.initialize(instance)?;
        }
        let Some(ground_truth) = self.ground_truth(instance)? else {
            return Ok(TrainOutcome::MissingLabel);
        };

        let config = &self.config;
        let shaping = WeightShaping {
            use_weight_of_one: config.use_weight_of_one,
            use_ceiling: config.use_ceiling_for_weights,
            multiply_by_10: config.multiply_hessian_by_10_for_ceiling,
        };
        let Some(state) = self.state.as_mut() else {
            return Err(StreamBoostError::internal("ensemble state missing after initialization"));
        };
        let pool = self.thread_pool.as_deref();

        let mut run = || -> Result<(f64, Option<f64>)> {
            let mut raw = Array1::<Score>::zeros(state.committee_size);
            let mut total_loss = 0.0;

            for (m, round) in state.rounds.iter_mut().enumerate() {
                let derivatives = state.objective.compute_derivatives(
                    ground_truth.view(),
                    raw.view(),
                    config.negate_residual,
                    config.clip_predictions,
                )?;
                total_loss += derivatives.total_loss;

                if config.skip_on_loss_below_3sd && m == 0 {
                    let mean = state.loss_estimator.mean();
                    let sd = state.loss_estimator.std_dev();
                    if is_unusually_low_loss(derivatives.total_loss, mean, sd) {
                        log::debug!(
                            "Skipping training: round-0 loss {:.6}, estimated mean {:.6}, sd {:.6}",
                            derivatives.total_loss,
                            mean,
                            sd
                        );
                        state.loss_estimator.observe(total_loss);
                        return Ok((total_loss, Some(derivatives.total_loss)));
                    }
                }

                let sub_instance = round.projector.project(instance)?;
                if config.uses_pseudo_labels() {
                    let sub_instances =
                        round
                            .projector
                            .pseudo_labelled(&sub_instance, &derivatives.grad_hess, shaping);
                    round.committee.train(
                        &sub_instances,
                        &derivatives.grad_hess,
                        config.hessian_iteration_multiplier,
                    )?;
                } else {
                    round
                        .committee
                        .train_on_derivatives(&sub_instance, &derivatives.grad_hess)?;
                }

                let current = round.committee.predict(&sub_instance) * config.learning_rate;
                raw += &current;
            }

            state.loss_estimator.observe(total_loss);
            Ok((total_loss, None))
        };

        let (total_loss, skipped_on) = match pool {
            Some(pool) => pool.install(run)?,
            None => run()?,
        };

        Ok(match skipped_on {
            Some(round_zero_loss) => {
                self.skip_count += 1;
                TrainOutcome::SkippedOnLoss { round_zero_loss }
            }
            None => {
                self.instances_trained += 1;
                TrainOutcome::Trained { total_loss }
            }
        })
    }

    /// Sum of the learning-rate scaled scores of every round.
    ///
    /// An uninitialized ensemble scores 0 for every output implied by the
    /// instance's target.
    pub fn predict_raw(&self, instance: &Instance) -> Result<Array1<Score>> {
        let Some(state) = &self.state else {
            let size = instance.header().target_kind().committee_size();
            return Ok(Array1::zeros(size));
        };

        let learning_rate = self.config.learning_rate;
        let per_round: Vec<Array1<Score>> = self.install(|| {
            state
                .rounds
                .par_iter()
                .map(|round| round.score(instance, learning_rate))
                .collect::<Result<Vec<_>>>()
        })?;

        // summed in round order so the result does not depend on scheduling
        let mut raw = Array1::zeros(state.committee_size);
        for score in &per_round {
            raw += score;
        }
        Ok(raw)
    }

    /// Class probabilities (or transferred scores), `committee_size + 1` long.
    pub fn predict(&self, instance: &Instance) -> Result<Array1<f64>> {
        let raw = self.predict_raw(instance)?;
        Ok(match &self.state {
            Some(state) => state.objective.transfer(raw.view()),
            None => create_objective(self.config.objective).transfer(raw.view()),
        })
    }

    /// Index of the most probable class.
    pub fn predict_class(&self, instance: &Instance) -> Result<usize> {
        let probabilities = self.predict(instance)?;
        let (best, _) = probabilities
            .iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |(bi, bv), (i, &v)| if v > bv { (i, v) } else { (bi, bv) });
        Ok(best)
    }

    /// Current statistics.
    pub fn measurements(&self) -> EnsembleMeasurements {
        let mut m = EnsembleMeasurements {
            instances_seen: self.instances_seen,
            instances_trained: self.instances_trained,
            skip_count: self.skip_count,
            rough_skip_count: self.rough_skip_count,
            ..Default::default()
        };

        if let Some(state) = &self.state {
            let num_rounds = state.rounds.len();
            m.num_rounds = num_rounds;
            m.committee_size = state.committee_size;
            m.loss_mean = state.loss_estimator.mean();
            m.loss_variance = state.loss_estimator.variance();
            m.loss_window_width = state.loss_estimator.width();
            m.loss_changes = state.loss_estimator.num_changes();
            if num_rounds > 0 {
                let rounds = num_rounds as f64;
                m.avg_model_size = state
                    .rounds
                    .iter()
                    .map(|r| r.committee.average_model_size())
                    .sum::<f64>()
                    / rounds;
                m.avg_updates_per_committee = state
                    .rounds
                    .iter()
                    .map(|r| r.committee.total_updates() as f64)
                    .sum::<f64>()
                    / rounds;
            }
        }
        m
    }
}

/// Whether a round-0 loss lies strictly below the estimated mean minus
/// `SKIP_LOSS_SIGMAS` standard deviations.
fn is_unusually_low_loss(loss: f64, mean: f64, sd: f64) -> bool {
    loss < mean - SKIP_LOSS_SIGMAS * sd
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boosting::objective::softmax_with_reference;
    use crate::config::{BaseLearnerConfig, ConfigBuilder};
    use crate::dataset::Attribute;
    use approx::assert_abs_diff_eq;

    fn header(num_classes: usize) -> Arc<InstanceHeader> {
        let classes: Vec<String> = (0..num_classes).map(|c| format!("c{}", c)).collect();
        Arc::new(InstanceHeader::new(
            "test",
            vec![Attribute::numeric("a"), Attribute::numeric("b"), Attribute::numeric("c")],
            Attribute::nominal("class", classes),
        ))
    }

    fn instance(header: &Arc<InstanceHeader>, values: [f64; 3], label: Option<f64>) -> Instance {
        Instance::new(Arc::clone(header), values.to_vec(), label).unwrap()
    }

    fn target_mean_config(rounds: usize) -> ConfigBuilder {
        ConfigBuilder::new()
            .num_rounds(rounds)
            .base_learner(BaseLearnerConfig::TargetMean)
            .use_gradient_over_hessian_labels(true)
    }

    #[test]
    fn test_uninitialized_predict_is_uniform() {
        let ensemble = BoostingEnsemble::new(Config::default()).unwrap();
        let h = header(3);
        let p = ensemble.predict(&instance(&h, [0.0; 3], None)).unwrap();
        assert_eq!(p.len(), 3);
        for v in p.iter() {
            assert_abs_diff_eq!(*v, 1.0 / 3.0, epsilon = 1e-12);
        }
        assert!(!ensemble.is_initialized());
    }

    #[test]
    fn test_first_train_initializes() {
        let mut ensemble = BoostingEnsemble::new(target_mean_config(4).build().unwrap()).unwrap();
        let h = header(3);
        let outcome = ensemble.train_on_instance(&instance(&h, [1.0, 2.0, 3.0], Some(0.0))).unwrap();
        assert!(outcome.is_trained());
        assert_eq!(ensemble.committee_size(), Some(2));
        assert_eq!(ensemble.rounds().len(), 4);
        assert!(ensemble.rounds().iter().all(|r| r.committee().size() == 2));
    }

    #[test]
    fn test_single_round_worked_example() {
        let config = target_mean_config(1).learning_rate(1.0).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(3);
        let inst = instance(&h, [0.0; 3], Some(0.0));

        match ensemble.train_on_instance(&inst).unwrap() {
            TrainOutcome::Trained { total_loss } => {
                assert_abs_diff_eq!(total_loss, 3.0f64.ln(), epsilon = 1e-12)
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        // Newton steps (2/3)/(2/9) = 3 and (-1/3)/(2/9) = -1.5
        let raw = ensemble.predict_raw(&inst).unwrap();
        assert_abs_diff_eq!(raw[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(raw[1], -1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_second_round_fits_derivatives_after_first() {
        let config = target_mean_config(2).learning_rate(1.0).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(3);
        let inst = instance(&h, [0.0; 3], Some(0.0));

        // round 1 sees the score left by round 0, not zero
        let p = softmax_with_reference(Array1::from(vec![3.0, -1.5]).view());
        let step0 = (1.0 - p[0]) / (p[0] * (1.0 - p[0]));
        let step1 = -p[1] / (p[1] * (1.0 - p[1]));

        match ensemble.train_on_instance(&inst).unwrap() {
            TrainOutcome::Trained { total_loss } => {
                assert_abs_diff_eq!(total_loss, 3.0f64.ln() - p[0].ln(), epsilon = 1e-12);
                assert_abs_diff_eq!(total_loss, 1.157726, epsilon = 1e-6);
            }
            other => panic!("unexpected outcome {:?}", other),
        }
        let raw = ensemble.predict_raw(&inst).unwrap();
        assert_abs_diff_eq!(raw[0], 3.0 + step0, epsilon = 1e-9);
        assert_abs_diff_eq!(raw[1], -1.5 + step1, epsilon = 1e-9);
        assert_abs_diff_eq!(raw[0], 4.060896, epsilon = 1e-6);
        assert_abs_diff_eq!(raw[1], -2.510582, epsilon = 1e-6);
    }

    #[test]
    fn test_learning_rate_scales_prediction() {
        let config = target_mean_config(1).learning_rate(0.5).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(3);
        let inst = instance(&h, [0.0; 3], Some(0.0));
        ensemble.train_on_instance(&inst).unwrap();
        assert_abs_diff_eq!(ensemble.predict_raw(&inst).unwrap()[0], 1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_missing_label_is_a_no_op() {
        let mut ensemble = BoostingEnsemble::new(Config::default()).unwrap();
        let h = header(2);
        let outcome = ensemble.train_on_instance(&instance(&h, [0.0; 3], None)).unwrap();
        assert_eq!(outcome, TrainOutcome::MissingLabel);
        assert!(!ensemble.is_initialized());
    }

    #[test]
    fn test_semi_supervised_trains_unlabelled() {
        let config = target_mean_config(2).semi_supervised_weight(0.5).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(2);
        let outcome = ensemble.train_on_instance(&instance(&h, [0.0; 3], None)).unwrap();
        assert!(outcome.is_trained());
        assert_eq!(ensemble.measurements().instances_trained, 1);
    }

    #[test]
    fn test_numeric_target_requires_squared_error() {
        let h = Arc::new(InstanceHeader::new(
            "reg",
            vec![Attribute::numeric("x")],
            Attribute::numeric("y"),
        ));
        let inst = Instance::new(Arc::clone(&h), vec![1.0], Some(2.0)).unwrap();

        let mut ensemble = BoostingEnsemble::new(Config::default()).unwrap();
        let err = ensemble.train_on_instance(&inst).unwrap_err();
        assert!(matches!(err, StreamBoostError::UnsupportedTarget { .. }));
        assert!(!err.is_recoverable());
        assert!(!ensemble.is_initialized());

        let config = ConfigBuilder::new()
            .objective(ObjectiveType::SquaredError)
            .negate_residual(true)
            .build()
            .unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        assert!(ensemble.train_on_instance(&inst).unwrap().is_trained());
        assert_eq!(ensemble.committee_size(), Some(1));
    }

    #[test]
    fn test_out_of_range_label_is_recoverable() {
        let mut ensemble = BoostingEnsemble::new(target_mean_config(2).build().unwrap()).unwrap();
        let h = header(3);
        let good = instance(&h, [0.0; 3], Some(1.0));
        ensemble.train_on_instance(&good).unwrap();

        let bad = good.with_label_and_weight(Some(7.0), 1.0);
        let err = ensemble.train_on_instance(&bad).unwrap_err();
        assert!(err.is_recoverable());
        assert!(ensemble.train_on_instance(&good).unwrap().is_trained());
    }

    #[test]
    fn test_single_class_target_is_rejected() {
        let mut ensemble = BoostingEnsemble::new(Config::default()).unwrap();
        let h = header(1);
        let err = ensemble.train_on_instance(&instance(&h, [0.0; 3], Some(0.0))).unwrap_err();
        assert!(matches!(err, StreamBoostError::UnsupportedTarget { .. }));
    }

    #[test]
    fn test_reset_discards_state() {
        let mut ensemble = BoostingEnsemble::new(target_mean_config(2).build().unwrap()).unwrap();
        let h = header(3);
        let inst = instance(&h, [1.0, 0.0, 0.0], Some(1.0));
        ensemble.train_on_instance(&inst).unwrap();
        assert!(ensemble.is_initialized());

        ensemble.reset();
        assert!(!ensemble.is_initialized());
        assert!(ensemble.rounds().is_empty());
        let p = ensemble.predict(&inst).unwrap();
        assert_abs_diff_eq!(p[0], 1.0 / 3.0, epsilon = 1e-12);

        ensemble.train_on_instance(&inst).unwrap();
        assert!(ensemble.is_initialized());
    }

    #[test]
    fn test_low_loss_threshold_is_strict() {
        // mean 1.0, sd 0.25: the threshold is 0.25
        assert!(!is_unusually_low_loss(0.25, 1.0, 0.25));
        assert!(is_unusually_low_loss(0.25 - 1e-9, 1.0, 0.25));
        assert!(!is_unusually_low_loss(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_loss_equal_to_threshold_trains() {
        let config = target_mean_config(1).skip_on_loss_below_3sd(true).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(2);
        // reference-class instances have round-0 loss 0, equal to the
        // threshold of an estimator that has only seen zeros
        for _ in 0..5 {
            let outcome = ensemble.train_on_instance(&instance(&h, [0.0; 3], Some(1.0))).unwrap();
            assert_eq!(outcome, TrainOutcome::Trained { total_loss: 0.0 });
        }
        assert_eq!(ensemble.skip_count(), 0);
        assert_eq!(ensemble.loss_estimator().map(|e| e.width()), Some(5));
    }

    #[test]
    fn test_skip_training_roughly() {
        let config = target_mean_config(1).skip_training_roughly(2).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(2);
        for i in 0..200 {
            ensemble
                .train_on_instance(&instance(&h, [0.0; 3], Some((i % 2) as f64)))
                .unwrap();
        }
        let m = ensemble.measurements();
        assert_eq!(m.instances_seen, 200);
        assert_eq!(m.instances_trained + m.rough_skip_count, 200);
        assert!(m.rough_skip_count > 50 && m.rough_skip_count < 150);
    }

    #[test]
    fn test_heterogeneous_pool() {
        let config = target_mean_config(6)
            .heterogeneous_ensemble(vec![
                BaseLearnerConfig::TargetMean,
                BaseLearnerConfig::default(),
            ])
            .build()
            .unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(2);
        ensemble.train_on_instance(&instance(&h, [1.0; 3], Some(1.0))).unwrap();
        let kinds: Vec<&str> = ensemble.rounds().iter().map(|r| r.committee().kind()).collect();
        assert!(kinds.iter().all(|k| *k == "target_mean" || *k == "sgd_linear"));
    }

    #[test]
    fn test_dedicated_thread_pool() {
        let config = target_mean_config(3).num_threads(2).build().unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        let h = header(4);
        let inst = instance(&h, [0.5, 0.5, 0.5], Some(3.0));
        assert!(ensemble.train_on_instance(&inst).unwrap().is_trained());
        assert_eq!(ensemble.predict(&inst).unwrap().len(), 4);
    }

    #[test]
    fn test_measurements() {
        let mut ensemble = BoostingEnsemble::new(target_mean_config(2).build().unwrap()).unwrap();
        assert_eq!(ensemble.measurements(), EnsembleMeasurements::default());

        let h = header(3);
        for label in [0.0, 1.0, 2.0] {
            ensemble.train_on_instance(&instance(&h, [0.0; 3], Some(label))).unwrap();
        }
        let m = ensemble.measurements();
        assert_eq!(m.num_rounds, 2);
        assert_eq!(m.committee_size, 2);
        assert_eq!(m.loss_window_width, 3);
        assert_eq!(m.avg_model_size, 1.0);
        assert_eq!(m.avg_updates_per_committee, 6.0);
    }
}
