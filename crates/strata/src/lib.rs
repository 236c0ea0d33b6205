//! Strata: structured extent partitioning and distributed histograms for
//! in-situ analysis of simulation data.
//!
//! This is the top-level facade crate that re-exports the public API from
//! all strata sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // Split a 10x10 grid over four ranks with one ghost layer.
//! let grid = UniformGrid::new([0.0; 3], [1.0; 3], Extent::new([0, 9, 0, 9, 0, 0])).unwrap();
//! let blocks = GridPartitioner::new(4).with_ghost_layers(1).partition(&grid).unwrap();
//!
//! let config = HistogramConfig::builder()
//!     .mesh_name("mesh")
//!     .array_name("x")
//!     .bins(5)
//!     .output(ReportTarget::Silent)
//!     .build()
//!     .unwrap();
//!
//! // Each rank histograms the x coordinate of its block.
//! let results = ThreadGroup::run(4, |comm| {
//!     let block = &blocks[comm.rank()];
//!     let e = block.extent();
//!     let mut values = Vec::with_capacity(block.num_points());
//!     for k in e[4]..=e[5] {
//!         for j in e[2]..=e[3] {
//!             for i in e[0]..=e[1] {
//!                 values.push(block.point(i, j, k)[0]);
//!             }
//!         }
//!     }
//!     let mut analysis = HistogramAnalysis::new(config.clone()).unwrap();
//!     let data = DataBlock::new(&values).with_ghosts(block.ghost_mask());
//!     analysis.execute(&comm, &[data], 0, 0.0).unwrap();
//!     analysis.histogram(&comm).unwrap()
//! });
//!
//! let root = results.into_iter().next().unwrap().unwrap().unwrap();
//! assert_eq!(root.counts, vec![20, 20, 20, 20, 20]);
//! ```
//!
//! # Modules
//!
//! Each module corresponds to a sub-crate. Use them for types not in the prelude:
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`types`] | `strata-core` | Extents, data descriptions, `ScalarArray`, `Collective` |
//! | [`partition`] | `strata-partition` | Recursive coordinate bisection and grid blocks |
//! | [`comm`] | `strata-comm` | Single-rank, threaded and fail-fast collectives |
//! | [`histogram`] | `strata-histogram` | Distributed histogram, analysis driver, reports |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core types and traits (`strata-core`).
///
/// Contains [`types::Extent`], [`types::DataDescription`], and the traits
/// every other crate is written against: [`types::ScalarArray`] and
/// [`types::Collective`].
pub use strata_core as types;

/// Extent partitioning (`strata-partition`).
///
/// [`partition::ExtentPartitioner`] splits an index extent by recursive
/// coordinate bisection; [`partition::GridPartitioner`] turns the pieces
/// into [`partition::GridBlock`]s with ghost masks.
pub use strata_partition as partition;

/// Collective backends (`strata-comm`).
///
/// [`comm::SelfComm`] for serial runs, [`comm::ThreadGroup`] for one
/// thread per rank, [`comm::ExitOnAbort`] to terminate on abort.
pub use strata_comm as comm;

/// Distributed histograms (`strata-histogram`).
///
/// [`histogram::DistributedHistogram`] is the per-array state machine;
/// [`histogram::HistogramAnalysis`] runs it once per step.
pub use strata_histogram as histogram;

/// Common imports for typical usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Core types
    pub use strata_core::{Axis, Collective, CommError, DataDescription, Extent, ScalarArray};

    // Partitioning
    pub use strata_partition::{
        ExtentPartitioner, GridBlock, GridPartitioner, PartitionError, UniformGrid,
    };

    // Collectives
    pub use strata_comm::{ExitOnAbort, SelfComm, ThreadComm, ThreadGroup};

    // Histograms
    pub use strata_histogram::{
        Association, ConfigError, DataBlock, DistributedHistogram, HistogramAnalysis,
        HistogramConfig, HistogramError, HistogramReport, HistogramSnapshot, Phase, ReportTarget,
        Validity,
    };
}
