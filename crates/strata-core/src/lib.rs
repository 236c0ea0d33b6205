//! Core types and traits for the strata workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! structured index [`Extent`] and its [`DataDescription`], the
//! [`ScalarArray`] element-access trait, and the [`Collective`] trait through
//! which distributed reductions flow.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod extent;
pub mod traits;

pub use error::CommError;
pub use extent::{Axis, DataDescription, Extent};
pub use traits::{Collective, ScalarArray, ROOT_RANK};
