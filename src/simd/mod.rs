//! 16-lane byte vector operations behind one capability-gated interface.
//!
//! The compaction kernels in [`crate::prune`] are written once against
//! [`VectorOps`] and instantiated per backend:
//! - [`Neon`](neon::Neon) on aarch64 (NEON is part of the base ISA)
//! - [`Ssse3`](x86::Ssse3) on x86_64, when `pshufb` is detected at runtime
//! - [`Portable`](portable::Portable) everywhere, lane by lane on arrays
//!
//! Only backends implementing [`ScatterOps`] can run the scatter router.

use std::fmt;
use std::str::FromStr;

pub mod portable;

#[cfg(target_arch = "x86_64")]
pub mod x86;

#[cfg(target_arch = "aarch64")]
pub mod neon;

#[cfg(test)]
mod tests;

pub use self::portable::Portable;

/// Number of byte lanes in one register.
pub const LANES: usize = 16;

/// Natural lane index `0..16`, the identity permutation.
pub const IOTA: [u8; LANES] = [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15];

/// Whole-lane shift distance used by the log-step scans.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stride {
    One = 1,
    Two = 2,
    Four = 4,
    Eight = 8,
}

impl Stride {
    /// Strides of a full 16-lane inclusive scan, in application order.
    pub const SCAN: [Stride; 4] = [Stride::One, Stride::Two, Stride::Four, Stride::Eight];

    #[inline]
    pub const fn lanes(self) -> usize {
        self as usize
    }
}

/// Data-parallel operations on one 16 x u8 register.
///
/// Masks are registers whose lanes are `0xFF` (true) or `0x00` (false).
/// Arithmetic wraps. Comparisons are unsigned.
pub trait VectorOps: Copy {
    type Reg: Copy;

    /// Which backend this token stands for.
    const BACKEND: Backend;

    fn load(self, src: &[u8; LANES]) -> Self::Reg;
    fn store(self, v: Self::Reg, dst: &mut [u8; LANES]);
    fn splat(self, x: u8) -> Self::Reg;

    fn cmple(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    fn cmpgt(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;

    fn and(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    fn or(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    /// `!a & b`
    fn andnot(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;

    fn add(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    fn sub(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    fn min(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;
    fn max(self, a: Self::Reg, b: Self::Reg) -> Self::Reg;

    /// Lane-wise `mask ? a : b`.
    #[inline(always)]
    fn select(self, mask: Self::Reg, a: Self::Reg, b: Self::Reg) -> Self::Reg {
        self.or(self.and(mask, a), self.andnot(mask, b))
    }

    /// Moves lane `i` to lane `i + by`; the low lanes fill with zero.
    fn slide_up(self, v: Self::Reg, by: Stride) -> Self::Reg;
    /// Moves lane `i` to lane `i - by`; the high lanes fill with zero.
    fn slide_down(self, v: Self::Reg, by: Stride) -> Self::Reg;

    /// Table lookup: lane `i` becomes `table[idx[i]]`, or zero when
    /// `idx[i] >= 16`.
    fn lookup(self, table: Self::Reg, idx: Self::Reg) -> Self::Reg;

    /// Bit `i` is the top bit of lane `i`.
    fn movemask(self, mask: Self::Reg) -> u16;
    /// Wrapping sum of all lanes.
    fn reduce_add(self, v: Self::Reg) -> u8;
    /// Largest lane.
    fn reduce_max(self, v: Self::Reg) -> u8;
    fn last_lane(self, v: Self::Reg) -> u8;

    #[inline(always)]
    fn to_array(self, v: Self::Reg) -> [u8; LANES] {
        let mut out = [0u8; LANES];
        self.store(v, &mut out);
        out
    }
}

/// Backends with a predicated scatter store.
pub trait ScatterOps: VectorOps {
    /// Stores `src[i]` to `dst[offsets[i]]` for every lane where `keep` is
    /// set, lowest lane first.
    ///
    /// # Panics
    /// Panics if an active lane's offset is out of bounds for `dst`.
    fn scatter(self, src: Self::Reg, offsets: Self::Reg, keep: Self::Reg, dst: &mut [u8]);
}

/// Splits `bytes` into whole 16-lane groups; a trailing partial group is
/// not yielded.
#[inline]
pub fn lane_groups(bytes: &[u8]) -> impl Iterator<Item = &[u8; LANES]> {
    bytes
        .chunks_exact(LANES)
        .filter_map(|chunk| <&[u8; LANES]>::try_from(chunk).ok())
}

/// Vector instruction set a kernel runs on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    Portable,
    Ssse3,
    Neon,
}

impl Backend {
    pub const ALL: [Backend; 3] = [Backend::Portable, Backend::Ssse3, Backend::Neon];

    pub const fn name(self) -> &'static str {
        match self {
            Backend::Portable => "portable",
            Backend::Ssse3 => "ssse3",
            Backend::Neon => "neon",
        }
    }

    /// Whether the backend has a masked scatter store.
    pub const fn has_scatter(self) -> bool {
        matches!(self, Backend::Portable)
    }

    /// Whether the running CPU can execute this backend.
    pub fn is_available(self) -> bool {
        match self {
            Backend::Portable => true,
            #[cfg(target_arch = "x86_64")]
            Backend::Ssse3 => x86::Ssse3::detect().is_some(),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => true,
            #[allow(unreachable_patterns)]
            _ => false,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Backend::ALL
            .into_iter()
            .find(|b| b.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown backend '{}'", s))
    }
}

/// Hardware capability descriptor handed to the kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    pub backend: Backend,
    pub scatter: bool,
}

impl Capabilities {
    /// Best backend for the running CPU.
    pub fn detect() -> Self {
        #[cfg(target_arch = "aarch64")]
        {
            Self::for_backend(Backend::Neon)
        }

        #[cfg(target_arch = "x86_64")]
        {
            if x86::Ssse3::detect().is_some() {
                Self::for_backend(Backend::Ssse3)
            } else {
                Self::portable()
            }
        }

        #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
        {
            Self::portable()
        }
    }

    pub const fn portable() -> Self {
        Self::for_backend(Backend::Portable)
    }

    pub const fn for_backend(backend: Backend) -> Self {
        Self {
            backend,
            scatter: backend.has_scatter(),
        }
    }
}
