//! Error types for histogram construction and reporting.

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

use strata_core::CommError;

use crate::histogram::Phase;

/// Errors from a [`DistributedHistogram`](crate::DistributedHistogram)
/// lifecycle call.
#[derive(Debug)]
pub enum HistogramError {
    /// An operation was called in a phase that does not permit it.
    OutOfOrder {
        /// The operation that was attempted.
        operation: &'static str,
        /// The phase the histogram was in.
        phase: Phase,
    },
    /// A ghost mask whose length differs from the value array.
    MaskLengthMismatch {
        /// Number of values.
        values: usize,
        /// Number of mask entries.
        mask: usize,
    },
    /// Zero bins requested.
    InvalidBinCount,
    /// Results were requested before any range was frozen.
    NotComputed,
    /// The global range is empty or inverted at report time.
    DegenerateRange {
        /// Reduced minimum.
        min: f64,
        /// Reduced maximum.
        max: f64,
    },
    /// The histogram report could not be written.
    Output {
        /// Destination that failed.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A collective operation failed.
    Comm(CommError),
}

impl fmt::Display for HistogramError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfOrder { operation, phase } => {
                write!(f, "{operation} is not allowed in phase {phase}")
            }
            Self::MaskLengthMismatch { values, mask } => {
                write!(f, "ghost mask has {mask} entries for {values} values")
            }
            Self::InvalidBinCount => write!(f, "histogram needs at least one bin"),
            Self::NotComputed => write!(f, "histogram range has not been computed"),
            Self::DegenerateRange { min, max } => {
                write!(f, "invalid histogram range [{min}, {max}]")
            }
            Self::Output { path, source } => {
                write!(f, "failed to write {}: {source}", path.display())
            }
            Self::Comm(e) => write!(f, "collective failed: {e}"),
        }
    }
}

impl Error for HistogramError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Output { source, .. } => Some(source),
            Self::Comm(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommError> for HistogramError {
    fn from(e: CommError) -> Self {
        Self::Comm(e)
    }
}

/// Errors from validating a [`HistogramConfig`](crate::HistogramConfig).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required field was never set on the builder.
    MissingField {
        /// Name of the missing field.
        field: &'static str,
    },
    /// A mesh or array name that cannot be used in an output file name.
    InvalidName {
        /// Which name was rejected.
        field: &'static str,
        /// The rejected value.
        value: String,
    },
    /// Zero bins.
    InvalidBinCount,
    /// A file output target with an empty base path.
    EmptyOutputPath,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { field } => write!(f, "missing required field '{field}'"),
            Self::InvalidName { field, value } => {
                write!(f, "invalid {field} {value:?}: must be non-empty without path separators")
            }
            Self::InvalidBinCount => write!(f, "bin count must be at least 1"),
            Self::EmptyOutputPath => write!(f, "output file base path is empty"),
        }
    }
}

impl Error for ConfigError {}
