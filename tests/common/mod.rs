//! Common test utilities for StreamBoost integration tests.

#![allow(dead_code)]

use rand::prelude::*;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use streamboost::*;

/// Header with `num_features` numeric features and a nominal target
pub fn numeric_header(num_features: usize, num_classes: usize) -> Arc<InstanceHeader> {
    let features = (0..num_features)
        .map(|j| Attribute::numeric(format!("feature_{}", j)))
        .collect();
    let classes: Vec<String> = (0..num_classes).map(|c| format!("class_{}", c)).collect();
    Arc::new(InstanceHeader::new("synthetic", features, Attribute::nominal("class", classes)))
}

/// Binary stream labelled by the sign of `x0 + x1`
pub fn hyperplane_stream(num_instances: usize, num_features: usize, seed: u64) -> Vec<Instance> {
    assert!(num_features >= 2);
    let header = numeric_header(num_features, 2);
    let mut rng = StdRng::seed_from_u64(seed);

    (0..num_instances)
        .map(|_| {
            let values: Vec<f64> = (0..num_features).map(|_| rng.gen_range(-1.0..1.0)).collect();
            let label = if values[0] + values[1] > 0.0 { 1.0 } else { 0.0 };
            Instance::new(Arc::clone(&header), values, Some(label)).unwrap()
        })
        .collect()
}

/// Stream whose label follows `label_of(i)` with uniform random features
pub fn patterned_stream<F>(
    num_instances: usize,
    num_features: usize,
    num_classes: usize,
    seed: u64,
    label_of: F,
) -> Vec<Instance>
where
    F: Fn(usize) -> Option<f64>,
{
    let header = numeric_header(num_features, num_classes);
    let mut rng = StdRng::seed_from_u64(seed);

    (0..num_instances)
        .map(|i| {
            let values: Vec<f64> = (0..num_features).map(|_| rng.gen_range(0.0..1.0)).collect();
            Instance::new(Arc::clone(&header), values, label_of(i)).unwrap()
        })
        .collect()
}

/// Header with a numeric target
pub fn regression_header(num_features: usize) -> Arc<InstanceHeader> {
    let features = (0..num_features)
        .map(|j| Attribute::numeric(format!("x{}", j)))
        .collect();
    Arc::new(InstanceHeader::new("regression", features, Attribute::numeric("y")))
}

/// Write `rows` to a CSV file with the given header line
pub fn write_csv(path: &Path, header: &str, rows: &[String]) -> std::io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    writeln!(file, "{}", header)?;
    for row in rows {
        writeln!(file, "{}", row)?;
    }
    Ok(())
}

/// Small prediction-friendly configuration
pub fn pseudo_label_config(num_rounds: usize, base_learner: BaseLearnerConfig) -> ConfigBuilder {
    ConfigBuilder::new()
        .num_rounds(num_rounds)
        .use_gradient_over_hessian_labels(true)
        .base_learner(base_learner)
}
