//! End-to-end tests of online boosting over synthetic streams.

use approx::assert_abs_diff_eq;
use std::sync::Arc;
use streamboost::*;

mod common;
use common::*;

#[test]
fn test_learns_hyperplane_prequentially() {
    assert!(streamboost::init().is_ok());

    let stream = hyperplane_stream(3000, 4, 42);
    let config = ConfigBuilder::new()
        .num_rounds(5)
        .learning_rate(0.5)
        .use_gradient_over_hessian_labels(true)
        .random_seed(3)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();

    let report = evaluate_prequential(&mut ensemble, &stream, 1000).unwrap();
    assert_eq!(report.instances_evaluated, 3000);
    assert!(report.accuracy > 0.75, "accuracy {}", report.accuracy);
    assert!(report.mean_log_loss < 2.0f64.ln());
    assert_eq!(report.measurements.instances_trained, 3000);
    assert_eq!(report.measurements.num_rounds, 5);
    assert_eq!(report.measurements.committee_size, 1);
}

#[test]
fn test_direct_derivative_training_learns() {
    let stream = hyperplane_stream(3000, 3, 7);
    let config = ConfigBuilder::new().num_rounds(3).learning_rate(0.5).build().unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();

    let report = evaluate_prequential(&mut ensemble, &stream, 0).unwrap();
    assert!(report.accuracy > 0.75, "accuracy {}", report.accuracy);
}

#[test]
fn test_worked_example_single_round() {
    let header = numeric_header(2, 3);
    let instance = Instance::new(Arc::clone(&header), vec![0.3, 0.7], Some(0.0)).unwrap();
    let config = pseudo_label_config(1, BaseLearnerConfig::TargetMean)
        .learning_rate(1.0)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();

    let before = ensemble.predict(&instance).unwrap();
    assert_eq!(before.len(), 3);
    assert!(!ensemble.is_initialized());

    match ensemble.train_on_instance(&instance).unwrap() {
        TrainOutcome::Trained { total_loss } => assert_abs_diff_eq!(total_loss, 3.0f64.ln(), epsilon = 1e-12),
        other => panic!("unexpected outcome {:?}", other),
    }
    let raw = ensemble.predict_raw(&instance).unwrap();
    assert_abs_diff_eq!(raw[0], 3.0, epsilon = 1e-12);
    assert_abs_diff_eq!(raw[1], -1.5, epsilon = 1e-12);
}

#[test]
fn test_constant_class_raises_its_probability() {
    let stream = patterned_stream(50, 3, 3, 11, |_| Some(0.0));
    let config = pseudo_label_config(3, BaseLearnerConfig::TargetMean).build().unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();

    for instance in &stream {
        ensemble.train_on_instance(instance).unwrap();
    }
    let p = ensemble.predict(&stream[0]).unwrap();
    assert!(p[0] > 1.0 / 3.0, "p0 = {}", p[0]);
    assert_abs_diff_eq!(p.sum(), 1.0, epsilon = 1e-9);
    assert_eq!(ensemble.predict_class(&stream[0]).unwrap(), 0);
}

#[test]
fn test_same_seed_is_deterministic() {
    let stream = hyperplane_stream(400, 6, 5);
    let build = |threads: usize| {
        let config = ConfigBuilder::new()
            .num_rounds(5)
            .subspace_size(50)
            .use_gradient_over_hessian_labels(true)
            .random_seed(99)
            .num_threads(threads)
            .build()
            .unwrap();
        let mut ensemble = BoostingEnsemble::new(config).unwrap();
        for instance in &stream {
            ensemble.train_on_instance(instance).unwrap();
        }
        ensemble
    };

    let a = build(0);
    let b = build(0);
    let c = build(1);

    let subspaces = |e: &BoostingEnsemble| -> Vec<Vec<usize>> {
        e.rounds().iter().map(|r| r.subspace().indices().to_vec()).collect()
    };
    assert_eq!(subspaces(&a), subspaces(&b));
    assert_eq!(subspaces(&a), subspaces(&c));
    assert!(a.rounds().iter().all(|r| r.subspace().len() == 3));

    for instance in stream.iter().take(50) {
        let pa = a.predict(instance).unwrap().to_vec();
        assert_eq!(pa, b.predict(instance).unwrap().to_vec());
        assert_eq!(pa, c.predict(instance).unwrap().to_vec());
    }
}

#[test]
fn test_low_loss_instances_are_skipped() {
    // Every 20th instance is the reference class, whose round-0 loss is 0.
    let stream = patterned_stream(200, 2, 2, 3, |i| Some(if i % 20 == 19 { 1.0 } else { 0.0 }));
    let config = pseudo_label_config(2, BaseLearnerConfig::TargetMean)
        .skip_on_loss_below_3sd(true)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();

    let mut skipped = 0;
    for instance in &stream {
        if let TrainOutcome::SkippedOnLoss { round_zero_loss } = ensemble.train_on_instance(instance).unwrap() {
            assert_eq!(round_zero_loss, 0.0);
            skipped += 1;
        }
    }
    assert_eq!(skipped, 10);
    let m = ensemble.measurements();
    assert_eq!(m.skip_count, 10);
    assert_eq!(m.instances_trained, 190);
    // skipped instances still feed the loss estimator
    assert!(m.loss_window_width > 190);

    let config = pseudo_label_config(2, BaseLearnerConfig::TargetMean).build().unwrap();
    let mut baseline = BoostingEnsemble::new(config).unwrap();
    for instance in &stream {
        baseline.train_on_instance(instance).unwrap();
    }
    assert_eq!(baseline.skip_count(), 0);
}

#[test]
fn test_unlabelled_instances() {
    let stream = patterned_stream(20, 2, 2, 1, |i| if i % 2 == 0 { Some(0.0) } else { None });

    let config = pseudo_label_config(2, BaseLearnerConfig::TargetMean).build().unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();
    let report = evaluate_prequential(&mut ensemble, &stream, 0).unwrap();
    assert_eq!(report.instances_evaluated, 10);
    assert_eq!(report.measurements.instances_seen, 20);
    assert_eq!(report.measurements.instances_trained, 10);

    let config = pseudo_label_config(2, BaseLearnerConfig::TargetMean)
        .semi_supervised_weight(0.5)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();
    let report = evaluate_prequential(&mut ensemble, &stream, 0).unwrap();
    assert_eq!(report.measurements.instances_trained, 20);
}

#[test]
fn test_numeric_target() {
    let header = regression_header(2);
    let stream: Vec<Instance> = (0..100)
        .map(|i| Instance::new(Arc::clone(&header), vec![i as f64 / 100.0, 1.0], Some(0.8)).unwrap())
        .collect();

    let mut rejected = BoostingEnsemble::new(Config::default()).unwrap();
    let err = rejected.train_on_instance(&stream[0]).unwrap_err();
    assert_eq!(err.category(), "unsupported_target");
    assert!(evaluate_prequential(&mut rejected, &stream, 0).is_err());

    let config = pseudo_label_config(5, BaseLearnerConfig::TargetMean)
        .objective(ObjectiveType::SquaredError)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();
    for instance in &stream {
        assert!(ensemble.train_on_instance(instance).unwrap().is_trained());
    }
    // the residual is taken against the transferred score
    let p = ensemble.predict(&stream[0]).unwrap();
    assert_eq!(p.len(), 2);
    assert!(p[0] > 0.6 && p[0] < 0.8, "p0 = {}", p[0]);
}

#[test]
fn test_one_hot_nominal_features() {
    let header = Arc::new(InstanceHeader::new(
        "nominal",
        vec![
            Attribute::nominal("color", ["red", "green", "blue"]),
            Attribute::numeric("size"),
        ],
        Attribute::nominal("class", ["a", "b"]),
    ));
    let stream: Vec<Instance> = (0..600)
        .map(|i| {
            let color = (i % 3) as f64;
            let label = if color == 1.0 { 1.0 } else { 0.0 };
            Instance::new(Arc::clone(&header), vec![color, 0.5], Some(label)).unwrap()
        })
        .collect();

    let config = ConfigBuilder::new()
        .num_rounds(3)
        .one_hot_encoding(true)
        .use_gradient_over_hessian_labels(true)
        .base_learner(BaseLearnerConfig::SgdLinear {
            learning_rate: 0.1,
            l2: 0.0,
        })
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();
    for instance in &stream {
        ensemble.train_on_instance(instance).unwrap();
    }

    assert_eq!(ensemble.rounds()[0].projector().header().num_features(), 4);
    assert_eq!(ensemble.predict_class(&stream[1]).unwrap(), 1);
    assert_eq!(ensemble.predict_class(&stream[0]).unwrap(), 0);
    assert_eq!(ensemble.predict_class(&stream[2]).unwrap(), 0);
}

#[test]
fn test_reset_reinitializes_with_new_subspaces() {
    let stream = hyperplane_stream(10, 8, 2);
    let config = ConfigBuilder::new()
        .num_rounds(4)
        .subspace_size(25)
        .build()
        .unwrap();
    let mut ensemble = BoostingEnsemble::new(config).unwrap();
    ensemble.train_on_instance(&stream[0]).unwrap();
    assert!(ensemble.rounds().iter().all(|r| r.subspace().len() == 2));

    ensemble.reset();
    assert!(!ensemble.is_initialized());
    ensemble.train_on_instance(&stream[1]).unwrap();
    assert_eq!(ensemble.rounds().len(), 4);
    assert_eq!(ensemble.measurements().instances_seen, 2);
}
