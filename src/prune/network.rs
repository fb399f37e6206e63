//! Fixed comparator networks and their lane tables.
//!
//! A network is a list of layers; a layer is a set of disjoint comparators
//! `(lo, hi)` that leave the smaller value on wire `lo`. For the vector form
//! each layer becomes a [`Stage`]: lane `i` fetches its partner's value,
//! then keeps the min or the max. Lanes without a comparator are their own
//! partner, so min and max agree and the lane passes through.

use crate::simd::{IOTA, LANES, VectorOps};

/// Tag bit OR'ed into the index of a discarded lane. It lifts every
/// discarded lane above every kept one while the low bits keep the
/// discarded lanes distinct.
pub const DISCARD_TAG: u8 = 0x80;

/// Bits of a tagged index that address a lane.
pub const LANE_BITS: u8 = 0x0F;

/// One network layer in lane-table form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Stage {
    /// Lane whose value lane `i` is compared with.
    pub partner: [u8; LANES],
    /// `0xFF` where lane `i` is the upper wire of its comparator and keeps
    /// the max.
    pub upper: [u8; LANES],
}

pub type Layer = &'static [(u8, u8)];

impl Stage {
    /// Builds a stage from a layer over `width` wires, repeated across the
    /// register every `width` lanes.
    pub const fn from_layer(layer: &[(u8, u8)], width: usize) -> Self {
        let mut partner = IOTA;
        let mut upper = [0u8; LANES];
        let mut base = 0;
        while base < LANES {
            let mut k = 0;
            while k < layer.len() {
                let (lo, hi) = layer[k];
                let lo = base + lo as usize;
                let hi = base + hi as usize;
                partner[lo] = hi as u8;
                partner[hi] = lo as u8;
                upper[hi] = 0xFF;
                k += 1;
            }
            base += width;
        }
        Stage { partner, upper }
    }
}

const fn stages<const L: usize>(layers: &[Layer; L], width: usize) -> [Stage; L] {
    let mut out = [Stage {
        partner: IOTA,
        upper: [0u8; LANES],
    }; L];
    let mut i = 0;
    while i < L {
        out[i] = Stage::from_layer(layers[i], width);
        i += 1;
    }
    out
}

/// Green's 60-comparator, 10-layer sorting network for 16 inputs. The
/// first four layers merge along the hypercube dimensions; the remaining
/// six clean up the middle wires.
pub const SORT16_LAYERS: [Layer; 10] = [
    &[(0, 1), (2, 3), (4, 5), (6, 7), (8, 9), (10, 11), (12, 13), (14, 15)],
    &[(0, 2), (1, 3), (4, 6), (5, 7), (8, 10), (9, 11), (12, 14), (13, 15)],
    &[(0, 4), (1, 5), (2, 6), (3, 7), (8, 12), (9, 13), (10, 14), (11, 15)],
    &[(0, 8), (1, 9), (2, 10), (3, 11), (4, 12), (5, 13), (6, 14), (7, 15)],
    &[(5, 10), (6, 9), (3, 12), (13, 14), (7, 11), (1, 2), (4, 8)],
    &[(1, 4), (7, 13), (2, 8), (11, 14), (5, 6), (9, 10)],
    &[(2, 4), (11, 13), (3, 8), (7, 12)],
    &[(6, 8), (10, 12), (3, 5), (7, 9)],
    &[(3, 4), (5, 6), (7, 8), (9, 10), (11, 12)],
    &[(6, 7), (8, 9)],
];

/// Optimal 5-comparator network for 4 inputs.
pub const SORT4_LAYERS: [Layer; 3] = [&[(0, 1), (2, 3)], &[(0, 2), (1, 3)], &[(1, 2)]];

/// Width of one cluster in the clustered router.
pub const CLUSTER: usize = 4;

/// Clusters per 16-lane register.
pub const CLUSTERS: usize = LANES / CLUSTER;

/// [`SORT16_LAYERS`] over the whole register.
pub const SORT16: [Stage; 10] = stages(&SORT16_LAYERS, LANES);

/// [`SORT4_LAYERS`] applied to each 4-lane cluster independently.
pub const CLUSTER4: [Stage; 3] = stages(&SORT4_LAYERS, CLUSTER);

/// Tagged index: the lane index, with [`DISCARD_TAG`] set on discarded
/// lanes.
#[inline(always)]
pub fn tag_lanes<V: VectorOps>(ops: V, mask: V::Reg) -> V::Reg {
    ops.or(ops.and(mask, ops.splat(DISCARD_TAG)), ops.load(&IOTA))
}

/// Runs `v` through the stages in order.
#[inline(always)]
pub fn sort_lanes<V: VectorOps>(ops: V, mut v: V::Reg, stages: &[Stage]) -> V::Reg {
    for stage in stages {
        let partner = ops.lookup(v, ops.load(&stage.partner));
        let lo = ops.min(v, partner);
        let hi = ops.max(v, partner);
        v = ops.select(ops.load(&stage.upper), hi, lo);
    }
    v
}

/// Scalar model of [`sort_lanes`], used to check the tables.
pub fn sort_lanes_scalar(mut v: [u8; LANES], stages: &[Stage]) -> [u8; LANES] {
    for stage in stages {
        v = std::array::from_fn(|i| {
            let other = v[usize::from(stage.partner[i])];
            if stage.upper[i] != 0 {
                v[i].max(other)
            } else {
                v[i].min(other)
            }
        });
    }
    v
}
