use crate::simd::VectorOps;

/// Threshold of the discard predicate: every byte at or below it goes.
pub const BLANK: u8 = b' ';

/// Scalar form of the discard predicate.
#[inline(always)]
pub const fn is_discard(byte: u8) -> bool {
    byte <= BLANK
}

/// Per-lane discard mask: `0xFF` where `x[i] <= b' '`, `0x00` elsewhere.
#[inline(always)]
pub fn classify<V: VectorOps>(ops: V, x: V::Reg) -> V::Reg {
    ops.cmple(x, ops.splat(BLANK))
}

/// Discard bits of one 16-byte group, bit `i` for lane `i`.
pub fn discard_bits(group: &[u8]) -> u16 {
    group
        .iter()
        .take(16)
        .enumerate()
        .fold(0u16, |bits, (i, &b)| bits | (u16::from(is_discard(b)) << i))
}
