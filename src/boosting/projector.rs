//! Projection of instances onto boosting-round subspaces.
//!
//! A projector is built once per round from the stream header and the
//! round's [`Subspace`]. It precomputes the projected header (optionally
//! one-hot encoding multi-valued nominal attributes) and then maps every
//! instance onto it, relabelling with pseudo-residuals when requested.

use std::sync::Arc;

use crate::boosting::subspace::Subspace;
use crate::core::constants::{HESSIAN_CEILING_MULTIPLIER, PSEUDO_TARGET_NAME};
use crate::core::error::{Result, StreamBoostError};
use crate::core::types::GradHess;
use crate::dataset::{Attribute, AttributeKind, Instance, InstanceHeader};

/// How a projected column is filled from the source instance.
#[derive(Debug, Clone, PartialEq)]
enum Column {
    /// Copy the source value
    Copy(usize),
    /// Expand the source nominal value into this many 0/1 columns
    OneHot(usize, usize),
}

/// Weight given to pseudo-labelled sub-instances.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeightShaping {
    /// Every sub-instance gets weight 1
    pub use_weight_of_one: bool,
    /// Round the Hessian weight up
    pub use_ceiling: bool,
    /// Scale the Hessian by 10 before rounding up
    pub multiply_by_10: bool,
}

impl WeightShaping {
    /// Weight for a sub-instance whose output has the given Hessian.
    pub fn weight_for(&self, hessian: f64) -> f64 {
        if self.use_weight_of_one {
            1.0
        } else if self.use_ceiling {
            let scaled = if self.multiply_by_10 {
                hessian * HESSIAN_CEILING_MULTIPLIER
            } else {
                hessian
            };
            scaled.ceil()
        } else {
            hessian
        }
    }
}

/// Maps full instances onto one round's subspace.
#[derive(Debug, Clone)]
pub struct InstanceProjector {
    subspace: Subspace,
    columns: Vec<Column>,
    header: Arc<InstanceHeader>,
    source_num_features: usize,
    pseudo_labels: bool,
}

impl InstanceProjector {
    /// Build a projector for `subspace` over `source`.
    ///
    /// With `one_hot_encoding`, nominal attributes with more than two values
    /// expand into one numeric column per value. With `pseudo_labels`, the
    /// projected target is numeric and projected instances carry no label
    /// until relabelled.
    pub fn new(
        source: &InstanceHeader,
        subspace: Subspace,
        one_hot_encoding: bool,
        pseudo_labels: bool,
    ) -> Result<Self> {
        let mut columns = Vec::with_capacity(subspace.len());
        let mut attributes = Vec::with_capacity(subspace.len());

        for &index in subspace.iter() {
            let attribute = source.feature(index)?;
            match &attribute.kind {
                AttributeKind::Nominal { values } if one_hot_encoding && values.len() > 2 => {
                    columns.push(Column::OneHot(index, values.len()));
                    attributes.extend(
                        values
                            .iter()
                            .map(|v| Attribute::numeric(format!("{}={}", attribute.name, v))),
                    );
                }
                _ => {
                    columns.push(Column::Copy(index));
                    attributes.push(attribute.clone());
                }
            }
        }

        let target = if pseudo_labels {
            Attribute::numeric(PSEUDO_TARGET_NAME)
        } else {
            source.target.clone()
        };
        let header = Arc::new(InstanceHeader::new(
            format!("{} subspace", source.relation),
            attributes,
            target,
        ));

        Ok(InstanceProjector {
            subspace,
            columns,
            header,
            source_num_features: source.num_features(),
            pseudo_labels,
        })
    }

    /// Subspace this projector selects
    pub fn subspace(&self) -> &Subspace {
        &self.subspace
    }

    /// Header of projected instances
    pub fn header(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    /// Whether projected instances are meant to be pseudo-labelled
    pub fn uses_pseudo_labels(&self) -> bool {
        self.pseudo_labels
    }

    /// Project an instance, keeping its weight.
    ///
    /// The label is the source label, or none in pseudo-label mode.
    pub fn project(&self, instance: &Instance) -> Result<Instance> {
        if instance.num_features() != self.source_num_features {
            return Err(StreamBoostError::dimension_mismatch(
                format!("{} features", self.source_num_features),
                format!("{} features", instance.num_features()),
            ));
        }

        let mut values = Vec::with_capacity(self.header.num_features());
        for column in &self.columns {
            match *column {
                Column::Copy(index) => values.push(instance.value(index)),
                Column::OneHot(index, num_values) => {
                    let start = values.len();
                    values.resize(start + num_values, 0.0);
                    let value = instance.value(index);
                    if value >= 0.0 && value.fract() == 0.0 && (value as usize) < num_values {
                        values[start + value as usize] = 1.0;
                    }
                }
            }
        }

        let label = if self.pseudo_labels {
            None
        } else {
            instance.label()
        };
        Ok(Instance::from_parts(
            Arc::clone(&self.header),
            values,
            label,
            instance.weight(),
        ))
    }

    /// One pseudo-labelled copy of `projected` per ensemble output.
    ///
    /// Copy `i` is labelled with the Newton step of output `i` and weighted
    /// according to `shaping`.
    pub fn pseudo_labelled(
        &self,
        projected: &Instance,
        grad_hess: &[GradHess],
        shaping: WeightShaping,
    ) -> Vec<Instance> {
        grad_hess
            .iter()
            .map(|gh| {
                projected.with_label_and_weight(Some(gh.newton_step()), shaping.weight_for(gh.hessian))
            })
            .collect()
    }
}
