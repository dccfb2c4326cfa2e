//! Online gradient boosting for StreamBoost.
//!
//! The ensemble trains one [`WeakLearnerCommittee`] per boosting round, each
//! on its own feature [`Subspace`]. Supporting pieces:
//!
//! - [`objective`]: losses and their derivatives
//! - [`subspace`]: per-round feature subspace sampling
//! - [`projector`]: instance projection and pseudo-labelling
//! - [`loss_estimator`]: adaptive windowed loss statistics

pub mod committee;
pub mod ensemble;
pub mod loss_estimator;
pub mod objective;
pub mod projector;
pub mod subspace;

pub use committee::{training_repetitions, WeakLearnerCommittee};
pub use ensemble::{BoostingEnsemble, EnsembleMeasurements, EnsembleRound, TrainOutcome};
pub use loss_estimator::LossChangeEstimator;
pub use objective::{
    create_objective, softmax_with_reference, Derivatives, GradHess, Objective, SoftmaxCrossEntropy,
    SquaredError,
};
pub use projector::{InstanceProjector, WeightShaping};
pub use subspace::{
    all_k_combinations, random_k_combinations, resolve_subspace_size, FeatureSubspaceSampler, Subspace,
};
