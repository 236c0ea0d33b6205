//! Error types for extent partitioning.

use std::fmt;

/// Errors arising from partitioner configuration or grid construction.
#[derive(Clone, Debug, PartialEq)]
pub enum PartitionError {
    /// The requested partition count is zero.
    InvalidPartitionCount {
        /// The rejected count.
        requested: usize,
    },
    /// Exclusive splitting cannot produce more partitions than there are nodes.
    TooManyPartitions {
        /// Requested partition count.
        requested: usize,
        /// Nodes in the global extent.
        nodes: u64,
    },
    /// A uniform grid definition is unusable.
    InvalidGrid {
        /// What went wrong.
        reason: String,
    },
}

impl fmt::Display for PartitionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidPartitionCount { requested } => {
                write!(f, "partition count must be at least 1, got {requested}")
            }
            Self::TooManyPartitions { requested, nodes } => write!(
                f,
                "cannot split {nodes} nodes into {requested} non-overlapping partitions"
            ),
            Self::InvalidGrid { reason } => write!(f, "invalid grid: {reason}"),
        }
    }
}

impl std::error::Error for PartitionError {}
