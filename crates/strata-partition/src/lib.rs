//! Structured extent partitioning for strata.
//!
//! # Partitioners
//!
//! - [`ExtentPartitioner`]: recursive coordinate bisection of an index
//!   extent into N node-balanced sub-extents, with shared or exclusive split
//!   boundaries and unclamped ghost-layer growth
//! - [`GridPartitioner`]: decomposition of a [`UniformGrid`] into
//!   [`GridBlock`]s with clamped ghost halos and per-node ghost masks

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod grid;
pub mod rcb;

pub use error::PartitionError;
pub use grid::{GridBlock, GridPartitioner, UniformGrid};
pub use rcb::{split_extent, ExtentPartitioner};
