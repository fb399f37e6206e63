//! SSSE3 backend for x86_64.
//!
//! Everything except `pshufb` is SSE2, which x86_64 always has. The
//! [`Ssse3`] token can only be obtained from [`Ssse3::detect`], so holding
//! one proves the running CPU executes SSSE3.
// Intrinsic safety differs across toolchain versions.
#![allow(unused_unsafe)]

use std::arch::x86_64::*;

use super::{Backend, LANES, Stride, VectorOps};

#[derive(Clone, Copy, Debug)]
pub struct Ssse3 {
    _detected: (),
}

impl Ssse3 {
    /// Returns a token when the running CPU supports SSSE3.
    #[inline]
    pub fn detect() -> Option<Self> {
        if is_x86_feature_detected!("ssse3") {
            Some(Self { _detected: () })
        } else {
            None
        }
    }
}

impl VectorOps for Ssse3 {
    type Reg = __m128i;

    const BACKEND: Backend = Backend::Ssse3;

    #[inline(always)]
    fn load(self, src: &[u8; LANES]) -> __m128i {
        // SAFETY: src is exactly 16 readable bytes; loadu has no alignment requirement.
        unsafe { _mm_loadu_si128(src.as_ptr() as *const __m128i) }
    }

    #[inline(always)]
    fn store(self, v: __m128i, dst: &mut [u8; LANES]) {
        // SAFETY: dst is exactly 16 writable bytes.
        unsafe { _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, v) }
    }

    #[inline(always)]
    fn splat(self, x: u8) -> __m128i {
        unsafe { _mm_set1_epi8(x as i8) }
    }

    #[inline(always)]
    fn cmple(self, a: __m128i, b: __m128i) -> __m128i {
        // SSE2 has no unsigned compare: a <= b exactly when min(a, b) == a.
        unsafe { _mm_cmpeq_epi8(_mm_min_epu8(a, b), a) }
    }

    #[inline(always)]
    fn cmpgt(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_xor_si128(self.cmple(a, b), _mm_set1_epi8(-1)) }
    }

    #[inline(always)]
    fn and(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_and_si128(a, b) }
    }

    #[inline(always)]
    fn or(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_or_si128(a, b) }
    }

    #[inline(always)]
    fn andnot(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_andnot_si128(a, b) }
    }

    #[inline(always)]
    fn add(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_add_epi8(a, b) }
    }

    #[inline(always)]
    fn sub(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_sub_epi8(a, b) }
    }

    #[inline(always)]
    fn min(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_min_epu8(a, b) }
    }

    #[inline(always)]
    fn max(self, a: __m128i, b: __m128i) -> __m128i {
        unsafe { _mm_max_epu8(a, b) }
    }

    #[inline(always)]
    fn slide_up(self, v: __m128i, by: Stride) -> __m128i {
        unsafe {
            match by {
                Stride::One => _mm_slli_si128::<1>(v),
                Stride::Two => _mm_slli_si128::<2>(v),
                Stride::Four => _mm_slli_si128::<4>(v),
                Stride::Eight => _mm_slli_si128::<8>(v),
            }
        }
    }

    #[inline(always)]
    fn slide_down(self, v: __m128i, by: Stride) -> __m128i {
        unsafe {
            match by {
                Stride::One => _mm_srli_si128::<1>(v),
                Stride::Two => _mm_srli_si128::<2>(v),
                Stride::Four => _mm_srli_si128::<4>(v),
                Stride::Eight => _mm_srli_si128::<8>(v),
            }
        }
    }

    #[inline(always)]
    fn lookup(self, table: __m128i, idx: __m128i) -> __m128i {
        // pshufb zeroes a lane only when bit 7 of its index is set. Adding
        // 0x70 with saturation sets bit 7 for every index >= 16 and leaves
        // the low nibble of 0..16 intact.
        // SAFETY: the token exists only after SSSE3 was detected.
        unsafe { _mm_shuffle_epi8(table, _mm_adds_epu8(idx, _mm_set1_epi8(0x70))) }
    }

    #[inline(always)]
    fn movemask(self, mask: __m128i) -> u16 {
        unsafe { _mm_movemask_epi8(mask) as u16 }
    }

    #[inline(always)]
    fn reduce_add(self, v: __m128i) -> u8 {
        unsafe {
            let sad = _mm_sad_epu8(v, _mm_setzero_si128());
            let lo = _mm_cvtsi128_si32(sad);
            let hi = _mm_cvtsi128_si32(_mm_srli_si128::<8>(sad));
            (lo + hi) as u8
        }
    }

    #[inline(always)]
    fn reduce_max(self, v: __m128i) -> u8 {
        unsafe {
            let m = _mm_max_epu8(v, _mm_srli_si128::<8>(v));
            let m = _mm_max_epu8(m, _mm_srli_si128::<4>(m));
            let m = _mm_max_epu8(m, _mm_srli_si128::<2>(m));
            let m = _mm_max_epu8(m, _mm_srli_si128::<1>(m));
            _mm_cvtsi128_si32(m) as u8
        }
    }

    #[inline(always)]
    fn last_lane(self, v: __m128i) -> u8 {
        unsafe { (_mm_extract_epi16::<7>(v) >> 8) as u8 }
    }
}
