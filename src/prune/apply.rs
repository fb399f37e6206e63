//! The gather-and-store half shared by the index-based routers.

use crate::simd::{LANES, VectorOps};

use super::network::{CLUSTER, CLUSTERS};

/// A gather index for one 16-lane group and the number of lanes it keeps.
#[derive(Clone, Copy, Debug)]
pub struct Route<R> {
    /// Lane selectors; the first `kept` lanes address the kept bytes in
    /// order.
    pub index: R,
    pub kept: usize,
}

/// Gathers `x` by `index` and stores all 16 result lanes at `out[at..]`.
///
/// Lanes past the group's kept count land in `out` too; callers only read
/// the kept prefix and the next group overwrites the rest.
///
/// # Panics
/// Panics if `out` is shorter than `at + 16`.
#[inline(always)]
pub fn apply<V: VectorOps>(ops: V, x: V::Reg, index: V::Reg, out: &mut [u8], at: usize) {
    let res = ops.to_array(ops.lookup(x, index));
    out[at..at + LANES].copy_from_slice(&res);
}

/// Gathers `x` by a per-cluster index and stores each 4-byte cluster at the
/// running sum of the previous clusters' lengths. Returns the group's kept
/// count.
///
/// # Panics
/// Panics if `out` is shorter than `at + 16`.
#[inline(always)]
pub fn apply_clusters<V: VectorOps>(
    ops: V,
    x: V::Reg,
    index: V::Reg,
    lens: &[u8; CLUSTERS],
    out: &mut [u8],
    at: usize,
) -> usize {
    let res = ops.to_array(ops.lookup(x, index));
    let mut pos = at;
    for (cluster, &len) in res.chunks_exact(CLUSTER).zip(lens) {
        out[pos..pos + CLUSTER].copy_from_slice(cluster);
        pos += usize::from(len);
    }
    pos - at
}
