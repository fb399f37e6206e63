//! Array-backed backend. Every operation is a lane loop the compiler is
//! free to vectorize; it runs on any target and doubles as the reference
//! semantics for the intrinsic backends.

use super::{Backend, LANES, ScatterOps, Stride, VectorOps};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Portable;

type Reg = [u8; LANES];

#[inline(always)]
fn map2(a: Reg, b: Reg, f: impl Fn(u8, u8) -> u8) -> Reg {
    std::array::from_fn(|i| f(a[i], b[i]))
}

#[inline(always)]
fn mask(bit: bool) -> u8 {
    if bit { 0xFF } else { 0x00 }
}

impl VectorOps for Portable {
    type Reg = Reg;

    const BACKEND: Backend = Backend::Portable;

    #[inline(always)]
    fn load(self, src: &[u8; LANES]) -> Reg {
        *src
    }

    #[inline(always)]
    fn store(self, v: Reg, dst: &mut [u8; LANES]) {
        *dst = v;
    }

    #[inline(always)]
    fn splat(self, x: u8) -> Reg {
        [x; LANES]
    }

    #[inline(always)]
    fn cmple(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, |x, y| mask(x <= y))
    }

    #[inline(always)]
    fn cmpgt(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, |x, y| mask(x > y))
    }

    #[inline(always)]
    fn and(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, |x, y| x & y)
    }

    #[inline(always)]
    fn or(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, |x, y| x | y)
    }

    #[inline(always)]
    fn andnot(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, |x, y| !x & y)
    }

    #[inline(always)]
    fn add(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, u8::wrapping_add)
    }

    #[inline(always)]
    fn sub(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, u8::wrapping_sub)
    }

    #[inline(always)]
    fn min(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, Ord::min)
    }

    #[inline(always)]
    fn max(self, a: Reg, b: Reg) -> Reg {
        map2(a, b, Ord::max)
    }

    #[inline(always)]
    fn slide_up(self, v: Reg, by: Stride) -> Reg {
        let k = by.lanes();
        std::array::from_fn(|i| if i >= k { v[i - k] } else { 0 })
    }

    #[inline(always)]
    fn slide_down(self, v: Reg, by: Stride) -> Reg {
        let k = by.lanes();
        std::array::from_fn(|i| if i + k < LANES { v[i + k] } else { 0 })
    }

    #[inline(always)]
    fn lookup(self, table: Reg, idx: Reg) -> Reg {
        idx.map(|j| table.get(usize::from(j)).copied().unwrap_or(0))
    }

    #[inline(always)]
    fn movemask(self, m: Reg) -> u16 {
        m.iter()
            .enumerate()
            .fold(0u16, |bits, (i, &lane)| bits | (u16::from(lane >> 7) << i))
    }

    #[inline(always)]
    fn reduce_add(self, v: Reg) -> u8 {
        v.iter().fold(0u8, |acc, &x| acc.wrapping_add(x))
    }

    #[inline(always)]
    fn reduce_max(self, v: Reg) -> u8 {
        v.iter().copied().max().unwrap_or(0)
    }

    #[inline(always)]
    fn last_lane(self, v: Reg) -> u8 {
        v[LANES - 1]
    }
}

impl ScatterOps for Portable {
    #[inline(always)]
    fn scatter(self, src: Reg, offsets: Reg, keep: Reg, dst: &mut [u8]) {
        for ((&byte, &offset), &active) in src.iter().zip(&offsets).zip(&keep) {
            if active & 0x80 != 0 {
                dst[usize::from(offset)] = byte;
            }
        }
    }
}
