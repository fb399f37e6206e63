//! Clustered router: sorts each 4-lane cluster on its own and stitches the
//! clusters together at running offsets.

use crate::simd::{Stride, VectorOps, lane_groups};

use super::apply::apply_clusters;
use super::classify::classify;
use super::network::{CLUSTER, CLUSTER4, CLUSTERS, LANE_BITS, sort_lanes, tag_lanes};

/// Per-cluster gather index and kept counts for one group.
#[derive(Clone, Copy, Debug)]
pub struct ClusterRoute<R> {
    pub index: R,
    pub lens: [u8; CLUSTERS],
}

impl<R> ClusterRoute<R> {
    #[inline]
    pub fn kept(&self) -> usize {
        self.lens.iter().map(|&len| usize::from(len)).sum()
    }
}

#[inline(always)]
pub fn route_cluster<V: VectorOps>(ops: V, mask: V::Reg) -> ClusterRoute<V::Reg> {
    let sorted = sort_lanes(ops, tag_lanes(ops, mask), &CLUSTER4);

    // 0xFF + 1 wraps to 0: one per kept lane, none per discarded lane.
    let keep = ops.add(mask, ops.splat(1));
    let pairs = ops.add(keep, ops.slide_down(keep, Stride::One));
    let quads = ops.add(pairs, ops.slide_down(pairs, Stride::Two));
    let sums = ops.to_array(quads);

    ClusterRoute {
        index: ops.and(sorted, ops.splat(LANE_BITS)),
        lens: std::array::from_fn(|c| sums[c * CLUSTER]),
    }
}

/// Compacts whole groups of `input` into `out`, returning the kept count.
///
/// # Panics
/// Panics if `out` is shorter than `input`.
#[inline(always)]
pub fn compact<V: VectorOps>(ops: V, input: &[u8], out: &mut [u8]) -> usize {
    let mut written = 0;
    for group in lane_groups(input) {
        let x = ops.load(group);
        let route = route_cluster(ops, classify(ops, x));
        written += apply_clusters(ops, x, route.index, &route.lens, out, written);
    }
    written
}
