//! Multi-output weak learner committees.
//!
//! A committee holds one independent base learner per ensemble output. The
//! members never share state, so training and prediction fan out over the
//! outputs with rayon and join before returning.

use ndarray::Array1;
use rayon::prelude::*;

use crate::core::error::{Result, StreamBoostError};
use crate::core::traits::BaseLearner;
use crate::core::types::{GradHess, Score};
use crate::dataset::Instance;

/// Number of training repetitions for an output with the given Hessian.
///
/// With a multiplier of 1 every learner is trained once; above 1 the
/// learner is trained `ceil(hessian * multiplier)` times.
pub fn training_repetitions(hessian_multiplier: u32, hessian: f64) -> usize {
    if hessian_multiplier > 1 {
        (hessian * f64::from(hessian_multiplier)).ceil().max(0.0) as usize
    } else {
        1
    }
}

/// Fixed-size group of base learners, one per ensemble output.
#[derive(Debug)]
pub struct WeakLearnerCommittee {
    members: Vec<Box<dyn BaseLearner>>,
}

impl WeakLearnerCommittee {
    /// Create a committee of `size` untrained copies of `prototype`.
    pub fn new(prototype: &dyn BaseLearner, size: usize) -> Self {
        WeakLearnerCommittee {
            members: (0..size).map(|_| prototype.fresh_copy()).collect(),
        }
    }

    /// Number of members (ensemble outputs)
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Members in output order
    pub fn members(&self) -> &[Box<dyn BaseLearner>] {
        &self.members
    }

    /// Kind of the member learners
    pub fn kind(&self) -> &'static str {
        self.members.first().map(|m| m.kind()).unwrap_or("empty")
    }

    /// Committee with the same configuration and no learned state
    pub fn fresh_copy(&self) -> Self {
        WeakLearnerCommittee {
            members: self.members.iter().map(|m| m.fresh_copy()).collect(),
        }
    }

    fn check_len(&self, what: &str, len: usize) -> Result<()> {
        if len != self.members.len() {
            return Err(StreamBoostError::dimension_mismatch(
                format!("{} {}", self.members.len(), what),
                format!("{} {}", len, what),
            ));
        }
        Ok(())
    }

    /// Train member `i` on `sub_instances[i]`.
    ///
    /// With a multiplier above 1, member `i` is trained repeatedly on the
    /// same sub-instance according to [`training_repetitions`].
    pub fn train(
        &mut self,
        sub_instances: &[Instance],
        grad_hess: &[GradHess],
        hessian_multiplier: u32,
    ) -> Result<()> {
        self.check_len("sub-instances", sub_instances.len())?;
        self.check_len("derivatives", grad_hess.len())?;

        let update = |(member, (instance, gh)): (&mut Box<dyn BaseLearner>, (&Instance, &GradHess))| {
            for _ in 0..training_repetitions(hessian_multiplier, gh.hessian) {
                member.train(instance);
            }
        };

        if self.members.len() > 1 {
            self.members
                .par_iter_mut()
                .zip(sub_instances.par_iter().zip(grad_hess.par_iter()))
                .for_each(update);
        } else {
            self.members
                .iter_mut()
                .zip(sub_instances.iter().zip(grad_hess.iter()))
                .for_each(update);
        }
        Ok(())
    }

    /// Train every member on the same sub-instance from its own derivatives.
    pub fn train_on_derivatives(&mut self, sub_instance: &Instance, grad_hess: &[GradHess]) -> Result<()> {
        self.check_len("derivatives", grad_hess.len())?;

        if self.members.len() > 1 {
            self.members
                .par_iter_mut()
                .zip(grad_hess.par_iter())
                .for_each(|(member, gh)| member.train_on_derivatives(sub_instance, *gh));
        } else {
            self.members
                .iter_mut()
                .zip(grad_hess.iter())
                .for_each(|(member, gh)| member.train_on_derivatives(sub_instance, *gh));
        }
        Ok(())
    }

    /// Raw score of every member for `instance`.
    pub fn predict(&self, instance: &Instance) -> Array1<Score> {
        let scores: Vec<Score> = if self.members.len() > 1 {
            self.members.par_iter().map(|m| m.predict(instance)).collect()
        } else {
            self.members.iter().map(|m| m.predict(instance)).collect()
        };
        Array1::from(scores)
    }

    /// Average number of learned parameters per member
    pub fn average_model_size(&self) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|m| m.model_size()).sum::<usize>() as f64 / self.members.len() as f64
    }

    /// Total number of training updates across members
    pub fn total_updates(&self) -> u64 {
        self.members.iter().map(|m| m.num_updates()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Attribute, InstanceHeader};
    use crate::learner::TargetMean;
    use approx::assert_abs_diff_eq;
    use std::sync::Arc;

    fn instance(label: Option<f64>, weight: f64) -> Instance {
        let header = Arc::new(InstanceHeader::new(
            "t",
            vec![Attribute::numeric("x")],
            Attribute::numeric("y"),
        ));
        Instance::new(header, vec![1.0], label).unwrap().with_weight(weight)
    }

    #[test]
    fn test_training_repetitions() {
        assert_eq!(training_repetitions(1, 0.9), 1);
        assert_eq!(training_repetitions(10, 0.22), 3);
        assert_eq!(training_repetitions(100, 0.25), 25);
        assert_eq!(training_repetitions(10, 0.0), 0);
    }

    #[test]
    fn test_members_train_independently() {
        let mut committee = WeakLearnerCommittee::new(&TargetMean::new(), 2);
        let subs = vec![instance(Some(1.0), 1.0), instance(Some(-2.0), 1.0)];
        let gh = [GradHess::new(0.0, 0.5), GradHess::new(0.0, 0.5)];
        committee.train(&subs, &gh, 1).unwrap();

        let scores = committee.predict(&instance(None, 1.0));
        assert_eq!(scores.to_vec(), vec![1.0, -2.0]);
        assert_eq!(committee.total_updates(), 2);
        assert!(committee.members().iter().all(|m| m.num_updates() == 1));
    }

    #[test]
    fn test_hessian_multiplier_repeats_training() {
        let mut committee = WeakLearnerCommittee::new(&TargetMean::new(), 1);
        let subs = vec![instance(Some(1.0), 1.0)];
        committee.train(&subs, &[GradHess::new(0.0, 0.25)], 10).unwrap();
        assert_eq!(committee.total_updates(), 3);
    }

    #[test]
    fn test_train_on_derivatives_uses_newton_step() {
        let mut committee = WeakLearnerCommittee::new(&TargetMean::new(), 2);
        let sub = instance(Some(0.0), 1.0);
        let gh = [GradHess::new(2.0 / 3.0, 2.0 / 9.0), GradHess::new(-1.0 / 3.0, 2.0 / 9.0)];
        committee.train_on_derivatives(&sub, &gh).unwrap();
        let scores = committee.predict(&sub);
        assert_abs_diff_eq!(scores[0], 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(scores[1], -1.5, epsilon = 1e-12);
    }

    #[test]
    fn test_length_mismatch() {
        let mut committee = WeakLearnerCommittee::new(&TargetMean::new(), 2);
        let subs = vec![instance(Some(1.0), 1.0)];
        let gh = [GradHess::new(0.0, 1.0)];
        assert!(committee.train(&subs, &gh, 1).is_err());
    }

    #[test]
    fn test_fresh_copy() {
        let mut committee = WeakLearnerCommittee::new(&TargetMean::new(), 3);
        let subs = vec![instance(Some(1.0), 1.0); 3];
        committee.train(&subs, &[GradHess::new(0.0, 1.0); 3], 1).unwrap();
        let copy = committee.fresh_copy();
        assert_eq!(copy.size(), 3);
        assert_eq!(copy.total_updates(), 0);
        assert_eq!(copy.kind(), "target_mean");
        assert_eq!(copy.average_model_size(), 1.0);
    }
}
