//! Instance stream module for StreamBoost.
//!
//! Streams are sequences of [`Instance`]s sharing one [`InstanceHeader`].
//! The boosting core consumes instances one at a time and never needs the
//! whole stream; [`InstanceStream`] exists for replaying finite sources such
//! as CSV files through the prequential evaluator.

#[cfg(feature = "csv")]
pub mod csv_stream;
pub mod instance;

#[cfg(feature = "csv")]
pub use csv_stream::{CsvStreamConfig, CsvStreamLoader, InstanceStream};
pub use instance::{Attribute, AttributeKind, Instance, InstanceHeader};
