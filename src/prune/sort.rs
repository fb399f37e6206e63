//! Sorting-network router: the general form, correct for any mask.
//!
//! Sorting the tagged lane indices ascending puts the kept lanes first in
//! their original order and the discarded lanes after them, so the sorted
//! vector with the tag stripped is the gather index itself.

use crate::simd::{LANES, VectorOps, lane_groups};

use super::apply::{Route, apply};
use super::classify::classify;
use super::network::{LANE_BITS, SORT16, sort_lanes, tag_lanes};

/// Kept lanes of a discard mask.
#[inline(always)]
pub fn kept_lanes<V: VectorOps>(ops: V, mask: V::Reg) -> usize {
    LANES - ops.movemask(mask).count_ones() as usize
}

/// Routes one group by sorting its tagged indices.
///
/// The lanes after `kept` address the discarded bytes, also in their
/// original order.
#[inline(always)]
pub fn route_sort<V: VectorOps>(ops: V, mask: V::Reg) -> Route<V::Reg> {
    let sorted = sort_lanes(ops, tag_lanes(ops, mask), &SORT16);
    Route {
        index: ops.and(sorted, ops.splat(LANE_BITS)),
        kept: kept_lanes(ops, mask),
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
        let route = route_sort(ops, classify(ops, x));
        apply(ops, x, route.index, out, written);
        written += route.kept;
    }
    written
}
