//! NEON backend for aarch64. NEON is mandatory on aarch64, so the token is
//! always constructible.
// Intrinsic safety differs across toolchain versions.
#![allow(unused_unsafe)]

use std::arch::aarch64::*;

use super::{Backend, LANES, Stride, VectorOps};

#[derive(Clone, Copy, Debug, Default)]
pub struct Neon;

/// Per-lane bit weights for building a movemask from two 8-lane halves.
const BIT_WEIGHTS: [u8; LANES] = [1, 2, 4, 8, 16, 32, 64, 128, 1, 2, 4, 8, 16, 32, 64, 128];

impl VectorOps for Neon {
    type Reg = uint8x16_t;

    const BACKEND: Backend = Backend::Neon;

    #[inline(always)]
    fn load(self, src: &[u8; LANES]) -> uint8x16_t {
        // SAFETY: src is exactly 16 readable bytes.
        unsafe { vld1q_u8(src.as_ptr()) }
    }

    #[inline(always)]
    fn store(self, v: uint8x16_t, dst: &mut [u8; LANES]) {
        // SAFETY: dst is exactly 16 writable bytes.
        unsafe { vst1q_u8(dst.as_mut_ptr(), v) }
    }

    #[inline(always)]
    fn splat(self, x: u8) -> uint8x16_t {
        unsafe { vdupq_n_u8(x) }
    }

    #[inline(always)]
    fn cmple(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vcleq_u8(a, b) }
    }

    #[inline(always)]
    fn cmpgt(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vcgtq_u8(a, b) }
    }

    #[inline(always)]
    fn and(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vandq_u8(a, b) }
    }

    #[inline(always)]
    fn or(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vorrq_u8(a, b) }
    }

    #[inline(always)]
    fn andnot(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        // bic computes first & !second
        unsafe { vbicq_u8(b, a) }
    }

    #[inline(always)]
    fn add(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vaddq_u8(a, b) }
    }

    #[inline(always)]
    fn sub(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vsubq_u8(a, b) }
    }

    #[inline(always)]
    fn min(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vminq_u8(a, b) }
    }

    #[inline(always)]
    fn max(self, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vmaxq_u8(a, b) }
    }

    #[inline(always)]
    fn select(self, mask: uint8x16_t, a: uint8x16_t, b: uint8x16_t) -> uint8x16_t {
        unsafe { vbslq_u8(mask, a, b) }
    }

    #[inline(always)]
    fn slide_up(self, v: uint8x16_t, by: Stride) -> uint8x16_t {
        unsafe {
            let zero = vdupq_n_u8(0);
            match by {
                Stride::One => vextq_u8::<15>(zero, v),
                Stride::Two => vextq_u8::<14>(zero, v),
                Stride::Four => vextq_u8::<12>(zero, v),
                Stride::Eight => vextq_u8::<8>(zero, v),
            }
        }
    }

    #[inline(always)]
    fn slide_down(self, v: uint8x16_t, by: Stride) -> uint8x16_t {
        unsafe {
            let zero = vdupq_n_u8(0);
            match by {
                Stride::One => vextq_u8::<1>(v, zero),
                Stride::Two => vextq_u8::<2>(v, zero),
                Stride::Four => vextq_u8::<4>(v, zero),
                Stride::Eight => vextq_u8::<8>(v, zero),
            }
        }
    }

    #[inline(always)]
    fn lookup(self, table: uint8x16_t, idx: uint8x16_t) -> uint8x16_t {
        // tbl already yields zero for out-of-range indices
        unsafe { vqtbl1q_u8(table, idx) }
    }

    #[inline(always)]
    fn movemask(self, mask: uint8x16_t) -> u16 {
        unsafe {
            let bits = vandq_u8(mask, vld1q_u8(BIT_WEIGHTS.as_ptr()));
            let lo = vaddv_u8(vget_low_u8(bits));
            let hi = vaddv_u8(vget_high_u8(bits));
            u16::from(lo) | (u16::from(hi) << 8)
        }
    }

    #[inline(always)]
    fn reduce_add(self, v: uint8x16_t) -> u8 {
        unsafe { vaddvq_u8(v) }
    }

    #[inline(always)]
    fn reduce_max(self, v: uint8x16_t) -> u8 {
        unsafe { vmaxvq_u8(v) }
    }

    #[inline(always)]
    fn last_lane(self, v: uint8x16_t) -> u8 {
        unsafe { vgetq_lane_u8::<15>(v) }
    }
}
