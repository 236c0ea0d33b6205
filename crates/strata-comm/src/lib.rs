//! Collective communication backends for strata.
//!
//! Implementations of [`strata_core::Collective`]:
//!
//! - [`SelfComm`]: a single-rank group for serial runs
//! - [`ThreadGroup`] / [`ThreadComm`]: an in-process group with one thread
//!   per rank, connected by crossbeam channels
//! - [`ExitOnAbort`]: wraps any backend so that an abort terminates the
//!   process, for fail-fast batch jobs

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod abort;
pub mod local;
pub mod thread;

pub use abort::ExitOnAbort;
pub use local::SelfComm;
pub use thread::{ThreadComm, ThreadGroup};
