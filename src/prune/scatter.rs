//! Scatter router: no gather index at all. Each kept lane's destination is
//! the exclusive prefix sum of the keep flags, and one predicated scatter
//! writes the lanes straight to it.

use crate::simd::{ScatterOps, Stride, VectorOps, lane_groups};

use super::classify::classify;

/// Scatters the kept lanes of one group to the front of `out`. Returns the
/// kept count.
///
/// # Panics
/// Panics if `out` is shorter than the group's kept count.
#[inline(always)]
pub fn route_scatter<V: ScatterOps>(ops: V, x: V::Reg, mask: V::Reg, out: &mut [u8]) -> usize {
    let ones = ops.andnot(mask, ops.splat(1));
    let mut prfsum = ones;
    for by in Stride::SCAN {
        prfsum = ops.add(prfsum, ops.slide_up(prfsum, by));
    }
    let offsets = ops.sub(prfsum, ones);
    let keep = ops.andnot(mask, ops.splat(0xFF));

    ops.scatter(x, offsets, keep, out);
    usize::from(ops.reduce_add(ones))
}

/// Compacts whole groups of `input` into `out`, returning the kept count.
///
/// # Panics
/// Panics if `out` is shorter than `input`.
#[inline(always)]
pub fn compact<V: ScatterOps>(ops: V, input: &[u8], out: &mut [u8]) -> usize {
    let mut written = 0;
    for group in lane_groups(input) {
        let x = ops.load(group);
        let mask = classify(ops, x);
        written += route_scatter(ops, x, mask, &mut out[written..]);
    }
    written
}
