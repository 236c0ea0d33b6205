//! Benchmark profiles for the strata crates.
//!
//! - [`reference_grid`]: 128x128x64 uniform grid (~1M nodes)
//! - [`slab_grid`]: 1024x1024 single-plane grid for 2D workloads
//! - [`grid_field`]: deterministic scalar field over every node of a grid

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use strata_core::Extent;
use strata_partition::{PartitionError, UniformGrid};
use strata_test_utils::fixtures::random_field;

/// Build a 128x128x64 uniform grid with unit spacing.
pub fn reference_grid() -> Result<UniformGrid, PartitionError> {
    UniformGrid::new([0.0; 3], [1.0; 3], Extent::new([0, 127, 0, 127, 0, 63]))
}

/// Build a 1024x1024 XY-plane grid with unit spacing.
pub fn slab_grid() -> Result<UniformGrid, PartitionError> {
    UniformGrid::new([0.0; 3], [1.0; 3], Extent::new([0, 1023, 0, 1023, 0, 0]))
}

/// One value per node of `grid`, uniform in `[0, 1)`, reproducible from `seed`.
pub fn grid_field(grid: &UniformGrid, seed: u64) -> Vec<f64> {
    random_field(seed, grid.extent().num_nodes() as usize, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_build() {
        let grid = reference_grid().unwrap();
        assert_eq!(grid.extent().num_nodes(), 128 * 128 * 64);
        let slab = slab_grid().unwrap();
        assert_eq!(grid_field(&slab, 1).len(), 1024 * 1024);
    }
}
