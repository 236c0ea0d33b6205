//! Distributed fixed-bin histograms for in-situ analysis.
//!
//! [`DistributedHistogram`] bins the values of one scalar array spread over
//! the ranks of a [`Collective`](strata_core::Collective) group: ranks
//! accumulate a local range, agree on a global one, bin their own values,
//! and sum the counts onto the root, which writes a [`HistogramReport`].
//! [`HistogramAnalysis`] drives that lifecycle once per simulation step
//! from a [`HistogramConfig`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod config;
pub mod error;
pub mod format;
pub mod histogram;
pub mod report;

pub use analysis::{DataBlock, HistogramAnalysis};
pub use config::{Association, HistogramConfig, HistogramConfigBuilder, DEFAULT_BINS};
pub use error::{ConfigError, HistogramError};
pub use histogram::{
    DistributedHistogram, HistogramSnapshot, Phase, Validity, ABORT_DEGENERATE_RANGE,
    ABORT_INVALID_INPUT, ABORT_OUTPUT_FAILED,
};
pub use report::{HistogramReport, ReportTarget};
