//! Prefix-sum router: the cheapest routing, valid for a restricted class of
//! discard patterns.
//!
//! Within one 16-lane group, the discarded lanes that come before the last
//! kept lane must form at most one contiguous run. Trailing discards are
//! unrestricted. For such a group every output lane from the run start on
//! reads from exactly `run` lanes further right, so one add routes it.
//! Other patterns compact incorrectly.

use crate::simd::{IOTA, LANES, Stride, VectorOps, lane_groups};

use super::apply::{Route, apply};
use super::batch::{Batch, Lanes, SupportedWidth};
use super::classify::{classify, discard_bits};

/// Whether a group's discard bits satisfy the prefix router's
/// precondition.
pub const fn single_interior_run(discards: u16) -> bool {
    let kept = !discards;
    if kept == 0 {
        return true;
    }
    let last_kept = 15 - kept.leading_zeros();
    let interior = discards & ((1u16 << last_kept) - 1);
    if interior == 0 {
        return true;
    }
    let run = interior >> interior.trailing_zeros();
    run & (run + 1) == 0
}

/// Whether every group of `batch` can be compacted by the prefix router.
pub fn prefix_routable<const N: usize>(batch: &Batch<N>) -> bool
where
    Lanes<N>: SupportedWidth,
{
    lane_groups(batch.as_bytes()).all(|group| single_interior_run(discard_bits(group)))
}

/// Routes one group by a running discard count.
#[inline(always)]
pub fn route_prefix<V: VectorOps>(ops: V, mask: V::Reg) -> Route<V::Reg> {
    debug_assert!(
        single_interior_run(ops.movemask(mask)),
        "prefix router applied to a group with more than one interior discard run"
    );

    // Mask lanes are 0xFF == -1, so the scan accumulates minus the
    // inclusive discard count.
    let mut prfsum = mask;
    for by in Stride::SCAN {
        prfsum = ops.add(prfsum, ops.slide_up(prfsum, by));
    }
    let discards = ops.last_lane(prfsum).wrapping_neg();

    let zero = ops.splat(0);
    let counts = ops.sub(zero, prfsum);
    // Kept lanes after the interior run all see the full run length.
    let run = ops.reduce_max(ops.andnot(mask, counts));
    let shift = ops.and(ops.cmpgt(counts, zero), ops.splat(run));

    Route {
        index: ops.add(ops.load(&IOTA), shift),
        kept: LANES - usize::from(discards),
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
        let route = route_prefix(ops, classify(ops, x));
        apply(ops, x, route.index, out, written);
        written += route.kept;
    }
    written
}
