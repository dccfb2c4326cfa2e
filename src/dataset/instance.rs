//! Instance and attribute metadata for streaming learners.
//!
//! An [`Instance`] carries its feature values, an optional label, a weight and
//! a shared [`InstanceHeader`] describing what each value means. Headers are
//! reference counted so that every instance of a stream (and every projected
//! sub-instance of a boosting round) can point at the same metadata.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::core::error::{Result, StreamBoostError};
use crate::core::types::{FeatureIndex, TargetKind};

/// Value domain of an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeKind {
    /// Real-valued attribute
    Numeric,
    /// Attribute taking one of a fixed set of labelled values, encoded as
    /// the value's index
    Nominal {
        /// Value labels, in index order
        values: Vec<String>,
    },
}

/// Named attribute of an instance header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute name
    pub name: String,
    /// Value domain
    pub kind: AttributeKind,
}

impl Attribute {
    /// Creates a numeric attribute.
    pub fn numeric<S: Into<String>>(name: S) -> Self {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Numeric,
        }
    }

    /// Creates a nominal attribute over the given values.
    pub fn nominal<S, I, V>(name: S, values: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Attribute {
            name: name.into(),
            kind: AttributeKind::Nominal {
                values: values.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Whether the attribute is nominal
    pub fn is_nominal(&self) -> bool {
        matches!(self.kind, AttributeKind::Nominal { .. })
    }

    /// Number of nominal values, 0 for numeric attributes.
    pub fn num_values(&self) -> usize {
        match &self.kind {
            AttributeKind::Nominal { values } => values.len(),
            AttributeKind::Numeric => 0,
        }
    }
}

/// Schema shared by all instances of a stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstanceHeader {
    /// Name of the relation (stream) the instances belong to
    pub relation: String,
    /// Input attributes, in value order
    pub features: Vec<Attribute>,
    /// Target attribute
    pub target: Attribute,
}

impl InstanceHeader {
    /// Creates a header.
    pub fn new<S: Into<String>>(relation: S, features: Vec<Attribute>, target: Attribute) -> Self {
        InstanceHeader {
            relation: relation.into(),
            features,
            target,
        }
    }

    /// Number of input features.
    pub fn num_features(&self) -> usize {
        self.features.len()
    }

    /// Number of target classes; 1 for a numeric target.
    pub fn num_classes(&self) -> usize {
        match self.target.kind {
            AttributeKind::Nominal { ref values } => values.len(),
            AttributeKind::Numeric => 1,
        }
    }

    /// Kind of target.
    pub fn target_kind(&self) -> TargetKind {
        match self.target.kind {
            AttributeKind::Nominal { ref values } => TargetKind::Nominal(values.len()),
            AttributeKind::Numeric => TargetKind::Numeric,
        }
    }

    /// Attribute at `index`.
    pub fn feature(&self, index: FeatureIndex) -> Result<&Attribute> {
        self.features.get(index).ok_or_else(|| {
            StreamBoostError::dataset(format!(
                "feature index {} out of range for {} features",
                index,
                self.features.len()
            ))
        })
    }
}

/// One labelled (or unlabelled) example of a stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    header: Arc<InstanceHeader>,
    values: Vec<f64>,
    label: Option<f64>,
    weight: f64,
}

impl Instance {
    /// Creates an instance with weight 1.0.
    ///
    /// Fails when the number of values does not match the header, or when
    /// a nominal value or label is not an index into its attribute's values.
    /// NaN marks a missing feature value.
    pub fn new(header: Arc<InstanceHeader>, values: Vec<f64>, label: Option<f64>) -> Result<Self> {
        if values.len() != header.num_features() {
            return Err(StreamBoostError::dimension_mismatch(
                format!("{} feature values", header.num_features()),
                format!("{} feature values", values.len()),
            ));
        }
        for (attribute, &value) in header.features.iter().zip(&values) {
            if let AttributeKind::Nominal { values: domain } = &attribute.kind {
                if !value.is_nan() && !is_index_into(value, domain.len()) {
                    return Err(StreamBoostError::dataset(format!(
                        "value {} of feature '{}' is not a valid index into {} values",
                        value,
                        attribute.name,
                        domain.len()
                    )));
                }
            }
        }
        if let (Some(label), AttributeKind::Nominal { values: classes }) = (label, &header.target.kind) {
            if !is_index_into(label, classes.len()) {
                return Err(StreamBoostError::dataset(format!(
                    "label {} is not a valid index into {} classes",
                    label,
                    classes.len()
                )));
            }
        }
        Ok(Instance {
            header,
            values,
            label,
            weight: 1.0,
        })
    }

    /// Sets the instance weight.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Builds an instance over an already validated header and value layout.
    pub(crate) fn from_parts(
        header: Arc<InstanceHeader>,
        values: Vec<f64>,
        label: Option<f64>,
        weight: f64,
    ) -> Self {
        debug_assert_eq!(values.len(), header.num_features());
        Instance {
            header,
            values,
            label,
            weight,
        }
    }

    /// Copy of this instance with a new label and weight.
    pub fn with_label_and_weight(&self, label: Option<f64>, weight: f64) -> Self {
        Instance {
            header: Arc::clone(&self.header),
            values: self.values.clone(),
            label,
            weight,
        }
    }

    /// Shared header.
    pub fn header(&self) -> &Arc<InstanceHeader> {
        &self.header
    }

    /// Feature values; missing values are `NaN`.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value of feature `index`.
    pub fn value(&self, index: FeatureIndex) -> f64 {
        self.values[index]
    }

    /// Number of input features.
    pub fn num_features(&self) -> usize {
        self.values.len()
    }

    /// Label, if present.
    pub fn label(&self) -> Option<f64> {
        self.label
    }

    /// Whether the label is missing.
    pub fn label_is_missing(&self) -> bool {
        self.label.is_none()
    }

    /// Instance weight.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Sets the instance weight in place.
    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }
}

fn is_index_into(value: f64, len: usize) -> bool {
    value >= 0.0 && value.fract() == 0.0 && (value as usize) < len
}
