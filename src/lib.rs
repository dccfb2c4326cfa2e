//! # StreamBoost
//!
//! Online gradient boosting over a stream of instances, built in safe Rust.
//!
//! A [`BoostingEnsemble`] holds a fixed number of boosting rounds. Every
//! round owns a random feature subspace and a committee of incremental base
//! learners, one per ensemble output. Each labelled instance updates the
//! rounds in order with a Newton step on the loss at the score accumulated
//! by the earlier rounds, so the ensemble learns in a single pass with
//! constant memory per round.
//!
//! ## Features
//!
//! - **Objectives**: softmax cross-entropy with an implicit reference class,
//!   and squared error.
//! - **Random subspaces**: each round sees a percentage of the features,
//!   enumerated exhaustively for low-dimensional streams.
//! - **Pseudo-residual training**: base learners can be fitted to
//!   gradient/Hessian labels with Hessian-shaped weights.
//! - **Adaptive skipping**: instances whose round-0 loss is anomalously low
//!   against an ADWIN window of recent losses can be skipped.
//! - **Parallel committees**: outputs train and predict in parallel with
//!   Rayon; results do not depend on scheduling.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use streamboost::{Attribute, BoostingEnsemble, ConfigBuilder, Instance, InstanceHeader};
//!
//! # fn main() -> streamboost::Result<()> {
//! let header = Arc::new(InstanceHeader::new(
//!     "toy",
//!     vec![Attribute::numeric("x"), Attribute::numeric("y")],
//!     Attribute::nominal("class", ["neg", "pos"]),
//! ));
//!
//! let config = ConfigBuilder::new()
//!     .num_rounds(5)
//!     .learning_rate(0.5)
//!     .use_gradient_over_hessian_labels(true)
//!     .build()?;
//! let mut ensemble = BoostingEnsemble::new(config)?;
//!
//! for i in 0..100 {
//!     let x = (i % 10) as f64;
//!     let label = if x > 4.0 { 1.0 } else { 0.0 };
//!     let instance = Instance::new(Arc::clone(&header), vec![x, 1.0], Some(label))?;
//!     ensemble.train_on_instance(&instance)?;
//! }
//!
//! let query = Instance::new(Arc::clone(&header), vec![8.0, 1.0], None)?;
//! let probabilities = ensemble.predict(&query)?;
//! assert_eq!(probabilities.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result`] with a [`StreamBoostError`].
//! Configuration and target errors are fatal; per-instance training and
//! prediction errors are recoverable and leave the ensemble usable.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(
    missing_debug_implementations,
    rust_2018_idioms,
    non_snake_case,
    non_upper_case_globals
)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Instances, headers and stream loading
pub mod dataset;

// Incremental base learners
pub mod learner;

// Online boosting
pub mod boosting;

// Prequential evaluation
pub mod metrics_eval;

pub use self::core::{
    error::{Result, StreamBoostError},
    traits::BaseLearner,
    types::{FeatureIndex, GradHess, ObjectiveType, RoundIndex, Score, TargetKind},
};

pub use config::{BaseLearnerConfig, Config, ConfigBuilder};

pub use dataset::{Attribute, AttributeKind, Instance, InstanceHeader};

#[cfg(feature = "csv")]
pub use dataset::{CsvStreamConfig, CsvStreamLoader, InstanceStream};

pub use learner::{SgdLinearRegressor, TargetMean};

pub use boosting::{
    BoostingEnsemble, EnsembleMeasurements, LossChangeEstimator, Objective, Subspace, TrainOutcome,
};

pub use metrics_eval::{evaluate_prequential, ClassificationMetrics, PrequentialReport};

pub use self::core::constants::STREAMBOOST_VERSION as VERSION;

/// Initialize the library.
///
/// Installs `env_logger` unless the application already set a logger.
/// Calling it is optional and idempotent.
///
/// # Examples
///
/// ```rust
/// fn main() -> streamboost::Result<()> {
///     streamboost::init()?;
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    core::initialize_core()
}

/// Check if the library has been initialized.
pub fn is_initialized() -> bool {
    core::is_core_initialized()
}
