//! Recursive coordinate bisection of a structured extent.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use strata_core::{Axis, DataDescription, Extent};
use tracing::{debug, trace};

use crate::error::PartitionError;

/// Splits a global extent into a fixed number of node-balanced sub-extents.
///
/// The largest remaining extent is always split next, along its longest
/// axis. Adjacent halves either share their boundary node layer
/// (`duplicate_nodes`, the default, suited to point data) or split it
/// exclusively (suited to distinct ownership). Final extents may be grown
/// by ghost layers along the active axes of the global extent; that growth
/// is not clamped, so ghosted extents can reach past the global bounds.
///
/// # Examples
///
/// ```
/// use strata_core::Extent;
/// use strata_partition::ExtentPartitioner;
///
/// let mut rcb = ExtentPartitioner::new(Extent::new([0, 9, 0, 0, 0, 0]), 4)
///     .with_duplicate_nodes(false);
/// rcb.partition().unwrap();
///
/// let mut ranges: Vec<_> = rcb.extents().iter().map(|e| (e[0], e[1])).collect();
/// ranges.sort();
/// assert_eq!(ranges, vec![(0, 2), (3, 4), (5, 7), (8, 9)]);
/// ```
#[derive(Clone, Debug)]
pub struct ExtentPartitioner {
    global_extent: Extent,
    num_partitions: usize,
    ghost_layers: u32,
    duplicate_nodes: bool,
    extents: Vec<Extent>,
    partitioned: bool,
}

impl ExtentPartitioner {
    /// Create a partitioner for `global_extent` targeting `num_partitions`
    /// extents, with no ghost layers and duplicated boundary nodes.
    pub fn new(global_extent: Extent, num_partitions: usize) -> Self {
        Self {
            global_extent,
            num_partitions,
            ghost_layers: 0,
            duplicate_nodes: true,
            extents: Vec::new(),
            partitioned: false,
        }
    }

    /// Builder form of [`set_number_of_ghost_layers`](Self::set_number_of_ghost_layers).
    pub fn with_ghost_layers(mut self, layers: u32) -> Self {
        self.set_number_of_ghost_layers(layers);
        self
    }

    /// Builder form of [`set_duplicate_nodes`](Self::set_duplicate_nodes).
    pub fn with_duplicate_nodes(mut self, duplicate: bool) -> Self {
        self.set_duplicate_nodes(duplicate);
        self
    }

    /// Replace the extent to partition. Discards any previous result.
    pub fn set_global_extent(&mut self, extent: Extent) {
        self.global_extent = extent;
        self.invalidate();
    }

    /// Replace the target partition count. Discards any previous result.
    pub fn set_number_of_partitions(&mut self, n: usize) {
        self.num_partitions = n;
        self.invalidate();
    }

    /// Replace the ghost layer count. Discards any previous result.
    pub fn set_number_of_ghost_layers(&mut self, layers: u32) {
        self.ghost_layers = layers;
        self.invalidate();
    }

    /// Choose shared (`true`) or exclusive (`false`) split boundaries.
    /// Discards any previous result.
    pub fn set_duplicate_nodes(&mut self, duplicate: bool) {
        self.duplicate_nodes = duplicate;
        self.invalidate();
    }

    fn invalidate(&mut self) {
        self.partitioned = false;
        self.extents.clear();
    }

    /// Extent being partitioned.
    pub fn global_extent(&self) -> Extent {
        self.global_extent
    }

    /// Target partition count.
    pub fn number_of_partitions(&self) -> usize {
        self.num_partitions
    }

    /// Ghost layers added around every final extent.
    pub fn ghost_layers(&self) -> u32 {
        self.ghost_layers
    }

    /// Whether split boundaries are shared between neighbours.
    pub fn duplicate_nodes(&self) -> bool {
        self.duplicate_nodes
    }

    /// Whether [`partition`](Self::partition) has run for the current configuration.
    pub fn is_partitioned(&self) -> bool {
        self.partitioned
    }

    /// Run the bisection. A no-op when already partitioned.
    ///
    /// An empty or single-point global extent cannot be split: the result is
    /// the global extent alone, and the partition-count postcondition panics
    /// unless exactly one partition was requested.
    ///
    /// # Errors
    ///
    /// - [`PartitionError::InvalidPartitionCount`] when the target is zero.
    /// - [`PartitionError::TooManyPartitions`] when exclusive splitting is
    ///   asked for more partitions than the global extent has nodes.
    pub fn partition(&mut self) -> Result<(), PartitionError> {
        if self.partitioned {
            return Ok(());
        }
        let n = self.num_partitions;
        if n == 0 {
            return Err(PartitionError::InvalidPartitionCount { requested: n });
        }

        let description = self.global_extent.description();
        self.extents.clear();
        debug!(
            global = %self.global_extent,
            partitions = n,
            ghost_layers = self.ghost_layers,
            duplicate_nodes = self.duplicate_nodes,
            ?description,
            "partitioning extent"
        );

        if matches!(
            description,
            DataDescription::Empty | DataDescription::SinglePoint
        ) {
            self.extents.push(self.global_extent);
        } else {
            let nodes = self.global_extent.num_nodes();
            if !self.duplicate_nodes && n as u64 > nodes {
                return Err(PartitionError::TooManyPartitions {
                    requested: n,
                    nodes,
                });
            }
            self.bisect(n);
            if self.ghost_layers > 0 {
                let axes = description.active_axes();
                let layers = i32::try_from(self.ghost_layers).unwrap_or(i32::MAX);
                for ext in &mut self.extents {
                    *ext = ext.grow(&axes, layers);
                }
            }
        }

        assert_eq!(
            self.extents.len(),
            n,
            "partitioning {} produced {} extents, expected {}",
            self.global_extent,
            self.extents.len(),
            n
        );
        self.partitioned = true;
        Ok(())
    }

    /// Split until `n` extents exist. Ties on node count go to the lower slot.
    fn bisect(&mut self, n: usize) {
        let mut queue: BinaryHeap<(u64, Reverse<usize>)> = BinaryHeap::with_capacity(2 * n);
        self.extents.push(self.global_extent);
        queue.push((self.global_extent.num_nodes(), Reverse(0)));

        while self.extents.len() < n {
            let Some((_, Reverse(slot))) = queue.pop() else {
                break;
            };
            let parent = self.extents[slot];
            let axis = parent.longest_axis();
            let (first, second) = split_extent(&parent, axis, self.duplicate_nodes);
            trace!(%parent, %axis, %first, %second, "split");

            self.extents[slot] = first;
            self.extents.push(second);
            queue.push((first.num_nodes(), Reverse(slot)));
            queue.push((second.num_nodes(), Reverse(self.extents.len() - 1)));
        }
    }

    /// The `idx`-th extent.
    ///
    /// # Panics
    ///
    /// Panics when `idx` is not below [`number_of_total_extents`](Self::number_of_total_extents).
    pub fn partition_extent(&self, idx: usize) -> Extent {
        assert!(
            idx < self.extents.len(),
            "extent index {idx} out of range (0..{})",
            self.extents.len()
        );
        self.extents[idx]
    }

    /// All extents currently held.
    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    /// Number of extents currently held.
    pub fn number_of_total_extents(&self) -> usize {
        self.extents.len()
    }
}

/// Split `parent` in two along `axis`.
///
/// With `h = floor(nodes / 2)` along the axis, the first half keeps
/// `[min, max - h]`. The second half is `[max - h + 1, max]`, or
/// `[max - h, max]` when `duplicate_nodes` shares the boundary layer.
pub fn split_extent(parent: &Extent, axis: Axis, duplicate_nodes: bool) -> (Extent, Extent) {
    let (min, max) = parent.range(axis);
    let half = i32::try_from(parent.nodes_along(axis) / 2).unwrap_or(i32::MAX);
    let split = max - half;

    let mut first = *parent;
    first.set_range(axis, min, split);
    let mut second = *parent;
    let start = if duplicate_nodes { split } else { split + 1 };
    second.set_range(axis, start, max);
    (first, second)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted_i_ranges(rcb: &ExtentPartitioner) -> Vec<(i32, i32)> {
        let mut ranges: Vec<_> = rcb.extents().iter().map(|e| (e[0], e[1])).collect();
        ranges.sort();
        ranges
    }

    #[test]
    fn line_of_ten_into_four_exclusive() {
        let mut rcb =
            ExtentPartitioner::new(Extent::new([0, 9, 0, 0, 0, 0]), 4).with_duplicate_nodes(false);
        rcb.partition().unwrap();
        assert_eq!(rcb.number_of_total_extents(), 4);
        assert_eq!(sorted_i_ranges(&rcb), vec![(0, 2), (3, 4), (5, 7), (8, 9)]);
        let sizes: Vec<u64> = rcb.extents().iter().map(Extent::num_nodes).collect();
        assert_eq!(sizes.iter().sum::<u64>(), 10);
    }

    #[test]
    fn traversal_order_splits_lower_slot_first_on_ties() {
        let mut rcb =
            ExtentPartitioner::new(Extent::new([0, 9, 0, 0, 0, 0]), 4).with_duplicate_nodes(false);
        rcb.partition().unwrap();
        // [0,4] (slot 0) and [5,9] (slot 1) tie at 5 nodes; slot 0 splits first.
        let ranges: Vec<_> = rcb.extents().iter().map(|e| (e[0], e[1])).collect();
        assert_eq!(ranges, vec![(0, 2), (5, 7), (3, 4), (8, 9)]);
    }

    #[test]
    fn duplicate_nodes_share_one_layer() {
        let mut rcb = ExtentPartitioner::new(Extent::new([0, 9, 0, 0, 0, 0]), 2);
        rcb.partition().unwrap();
        assert_eq!(rcb.partition_extent(0), Extent::new([0, 4, 0, 0, 0, 0]));
        assert_eq!(rcb.partition_extent(1), Extent::new([4, 9, 0, 0, 0, 0]));
    }

    #[test]
    fn splits_along_longest_axis() {
        let mut rcb =
            ExtentPartitioner::new(Extent::new([0, 3, 0, 15, 0, 7]), 2).with_duplicate_nodes(false);
        rcb.partition().unwrap();
        assert_eq!(rcb.partition_extent(0), Extent::new([0, 3, 0, 7, 0, 7]));
        assert_eq!(rcb.partition_extent(1), Extent::new([0, 3, 8, 15, 0, 7]));
    }

    #[test]
    fn extent_spanning_full_i32_range_partitions() {
        let global = Extent::new([i32::MIN, i32::MAX, i32::MIN, i32::MAX, i32::MIN, i32::MAX]);
        for duplicate in [false, true] {
            let mut rcb = ExtentPartitioner::new(global, 8)
                .with_duplicate_nodes(duplicate)
                .with_ghost_layers(1);
            rcb.partition().unwrap();
            assert_eq!(rcb.number_of_total_extents(), 8);
            assert!(rcb.extents().iter().all(|e| !e.is_empty()));
        }

        let mut halves = ExtentPartitioner::new(global, 2).with_duplicate_nodes(false);
        halves.partition().unwrap();
        assert_eq!(halves.partition_extent(0).range(Axis::I), (i32::MIN, 0));
        assert_eq!(halves.partition_extent(1).range(Axis::I), (1, i32::MAX));
    }

    #[test]
    fn single_partition_is_global_extent() {
        let global = Extent::new([0, 5, 0, 5, 0, 5]);
        let mut rcb = ExtentPartitioner::new(global, 1);
        rcb.partition().unwrap();
        assert_eq!(rcb.extents(), &[global]);
    }

    #[test]
    fn ghost_layers_grow_active_axes_without_clamping() {
        let global = Extent::new([0, 9, 0, 9, 0, 0]);
        let mut rcb = ExtentPartitioner::new(global, 2)
            .with_duplicate_nodes(false)
            .with_ghost_layers(1);
        rcb.partition().unwrap();
        // K is inactive for an XY plane and stays untouched.
        assert_eq!(rcb.partition_extent(0), Extent::new([-1, 5, -1, 10, 0, 0]));
        assert_eq!(rcb.partition_extent(1), Extent::new([4, 10, -1, 10, 0, 0]));
    }

    #[test]
    fn partition_is_idempotent_until_reconfigured() {
        let mut rcb = ExtentPartitioner::new(Extent::new([0, 7, 0, 0, 0, 0]), 2);
        rcb.partition().unwrap();
        let first = rcb.extents().to_vec();
        rcb.partition().unwrap();
        assert_eq!(rcb.extents(), first.as_slice());

        rcb.set_number_of_partitions(4);
        assert!(!rcb.is_partitioned());
        assert_eq!(rcb.number_of_total_extents(), 0);
        rcb.partition().unwrap();
        assert_eq!(rcb.number_of_total_extents(), 4);

        rcb.set_global_extent(Extent::new([0, 15, 0, 0, 0, 0]));
        assert!(!rcb.is_partitioned());
        rcb.set_number_of_ghost_layers(2);
        rcb.set_duplicate_nodes(false);
        rcb.partition().unwrap();
        assert_eq!(rcb.ghost_layers(), 2);
        assert!(!rcb.duplicate_nodes());
    }

    #[test]
    fn zero_partitions_rejected() {
        let mut rcb = ExtentPartitioner::new(Extent::new([0, 7, 0, 0, 0, 0]), 0);
        assert_eq!(
            rcb.partition(),
            Err(PartitionError::InvalidPartitionCount { requested: 0 })
        );
    }

    #[test]
    fn exclusive_split_rejects_more_partitions_than_nodes() {
        let mut rcb =
            ExtentPartitioner::new(Extent::new([0, 2, 0, 0, 0, 0]), 4).with_duplicate_nodes(false);
        assert_eq!(
            rcb.partition(),
            Err(PartitionError::TooManyPartitions {
                requested: 4,
                nodes: 3
            })
        );
    }

    #[test]
    fn single_point_with_one_partition_passes_through() {
        let point = Extent::new([3, 3, 3, 3, 3, 3]);
        let mut rcb = ExtentPartitioner::new(point, 1);
        rcb.partition().unwrap();
        assert_eq!(rcb.extents(), &[point]);
    }

    // A single point cannot be split, so only the global extent comes back
    // and the partition-count postcondition fires.
    #[test]
    #[should_panic(expected = "produced 1 extents, expected 3")]
    fn single_point_short_circuit_trips_postcondition() {
        let mut rcb = ExtentPartitioner::new(Extent::new([3, 3, 3, 3, 3, 3]), 3);
        let _ = rcb.partition();
    }

    #[test]
    #[should_panic(expected = "produced 1 extents, expected 2")]
    fn empty_extent_short_circuit_trips_postcondition() {
        let mut rcb = ExtentPartitioner::new(Extent::new([5, 0, 0, 0, 0, 0]), 2);
        let _ = rcb.partition();
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_index_panics() {
        let mut rcb = ExtentPartitioner::new(Extent::new([0, 7, 0, 0, 0, 0]), 2);
        rcb.partition().unwrap();
        let _ = rcb.partition_extent(2);
    }

    #[test]
    fn split_extent_halves() {
        let parent = Extent::new([5, 9, 0, 0, 0, 0]);
        assert_eq!(
            split_extent(&parent, Axis::I, false),
            (
                Extent::new([5, 7, 0, 0, 0, 0]),
                Extent::new([8, 9, 0, 0, 0, 0])
            )
        );
        assert_eq!(
            split_extent(&parent, Axis::I, true),
            (
                Extent::new([5, 7, 0, 0, 0, 0]),
                Extent::new([7, 9, 0, 0, 0, 0])
            )
        );
    }
}
