//! Error handling and error types for StreamBoost.
//!
//! Every fallible operation in the crate returns [`Result`], so errors
//! propagate with `?` from the instance loaders up through the boosting
//! loop to the caller.

use std::io;
use thiserror::Error;

/// Main error type for the StreamBoost library.
#[derive(Error, Debug)]
pub enum StreamBoostError {
    /// Configuration and validation errors
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        /// Parameter name
        parameter: String,
        /// Rejected value
        value: String,
        /// Why the value was rejected
        reason: String,
    },

    /// The target attribute cannot be learned by the configured ensemble
    #[error("Unsupported target: {message}")]
    UnsupportedTarget {
        /// Description of the target problem
        message: String,
    },

    /// Dimension mismatch errors
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected shape
        expected: String,
        /// Shape received
        actual: String,
    },

    /// Instance and header related errors
    #[error("Dataset error: {message}")]
    Dataset {
        /// Description of the problem
        message: String,
    },

    /// Training-related errors
    #[error("Training error: {message}")]
    Training {
        /// Description of the problem
        message: String,
    },

    /// Prediction errors
    #[error("Prediction error: {message}")]
    Prediction {
        /// Description of the problem
        message: String,
    },

    /// File I/O errors
    #[error("I/O error: {source}")]
    IO {
        /// Underlying I/O error
        #[from]
        source: io::Error,
    },

    /// CSV parsing errors
    #[cfg(feature = "csv")]
    #[error("CSV parsing error: {source}")]
    Csv {
        /// Underlying CSV error
        #[from]
        source: csv::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        /// Underlying JSON error
        #[from]
        source: serde_json::Error,
    },

    /// Internal library errors (should not occur in normal usage)
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the problem
        message: String,
    },
}

/// Type alias for Results using StreamBoostError
pub type Result<T> = std::result::Result<T, StreamBoostError>;

impl StreamBoostError {
    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        StreamBoostError::Config {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        StreamBoostError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported target error
    pub fn unsupported_target<S: Into<String>>(message: S) -> Self {
        StreamBoostError::UnsupportedTarget {
            message: message.into(),
        }
    }

    /// Create a dimension mismatch error
    pub fn dimension_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<String>,
        A: Into<String>,
    {
        StreamBoostError::DimensionMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        StreamBoostError::Dataset {
            message: message.into(),
        }
    }

    /// Create a training error
    pub fn training<S: Into<String>>(message: S) -> Self {
        StreamBoostError::Training {
            message: message.into(),
        }
    }

    /// Create a prediction error
    pub fn prediction<S: Into<String>>(message: S) -> Self {
        StreamBoostError::Prediction {
            message: message.into(),
        }
    }

    /// Create an internal error (should be used sparingly)
    pub fn internal<S: Into<String>>(message: S) -> Self {
        StreamBoostError::Internal {
            message: message.into(),
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            StreamBoostError::Config { .. } => false,
            StreamBoostError::InvalidParameter { .. } => false,
            StreamBoostError::UnsupportedTarget { .. } => false,
            StreamBoostError::DimensionMismatch { .. } => false,
            StreamBoostError::Dataset { .. } => true,
            StreamBoostError::Training { .. } => true,
            StreamBoostError::Prediction { .. } => true,
            StreamBoostError::IO { .. } => false,
            #[cfg(feature = "csv")]
            StreamBoostError::Csv { .. } => false,
            StreamBoostError::Json { .. } => false,
            StreamBoostError::Internal { .. } => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            StreamBoostError::Config { .. } => "config",
            StreamBoostError::InvalidParameter { .. } => "invalid_parameter",
            StreamBoostError::UnsupportedTarget { .. } => "unsupported_target",
            StreamBoostError::DimensionMismatch { .. } => "dimension_mismatch",
            StreamBoostError::Dataset { .. } => "dataset",
            StreamBoostError::Training { .. } => "training",
            StreamBoostError::Prediction { .. } => "prediction",
            StreamBoostError::IO { .. } => "io",
            #[cfg(feature = "csv")]
            StreamBoostError::Csv { .. } => "csv",
            StreamBoostError::Json { .. } => "json",
            StreamBoostError::Internal { .. } => "internal",
        }
    }
}

/// Convenience macros for error creation
#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::core::error::StreamBoostError::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::StreamBoostError::config(format!($fmt, $($arg)*))
    };
}

/// Creates a [`StreamBoostError::Dataset`] from a format string.
#[macro_export]
macro_rules! dataset_error {
    ($msg:expr) => {
        $crate::core::error::StreamBoostError::dataset($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::StreamBoostError::dataset(format!($fmt, $($arg)*))
    };
}

/// Creates a [`StreamBoostError::Training`] from a format string.
#[macro_export]
macro_rules! training_error {
    ($msg:expr) => {
        $crate::core::error::StreamBoostError::training($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::core::error::StreamBoostError::training(format!($fmt, $($arg)*))
    };
}

/// Returns early with the given error when the condition does not hold.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $err:expr) => {
        if !($cond) {
            return Err($err.into());
        }
    };
}
