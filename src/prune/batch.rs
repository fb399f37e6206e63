use std::fmt;
use std::str::FromStr;

use super::error::PruneError;

/// A fixed-size, 64-byte aligned batch of input bytes.
///
/// Only the widths in [`Width`] are usable with the kernels; the
/// [`SupportedWidth`] bound rejects anything else at compile time.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
#[repr(C, align(64))]
pub struct Batch<const N: usize>(pub [u8; N]);

impl<const N: usize> Batch<N> {
    pub const LEN: usize = N;

    #[inline]
    pub const fn new(bytes: [u8; N]) -> Self {
        Self(bytes)
    }

    /// Copies `src` into a batch. Returns `None` unless `src.len() == N`.
    #[inline]
    pub fn from_slice(src: &[u8]) -> Option<Self> {
        <[u8; N]>::try_from(src).ok().map(Self)
    }

    /// Copies up to `N` bytes of `src` and fills the rest with `fill`.
    pub fn padded(src: &[u8], fill: u8) -> Self {
        let mut bytes = [fill; N];
        let n = src.len().min(N);
        bytes[..n].copy_from_slice(&src[..n]);
        Self(bytes)
    }

    #[inline]
    pub const fn as_bytes(&self) -> &[u8; N] {
        &self.0
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8; N] {
        &mut self.0
    }
}

impl<const N: usize> Default for Batch<N> {
    fn default() -> Self {
        Self([0u8; N])
    }
}

impl<const N: usize> AsRef<[u8]> for Batch<N> {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl<const N: usize> fmt::Debug for Batch<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Batch<{}>(\"{}\")", N, self.0.escape_ascii())
    }
}

mod sealed {
    pub trait Sealed {}
}

/// Marker carrying a batch width as a type.
pub struct Lanes<const N: usize>;

/// Batch widths the kernels are built for.
pub trait SupportedWidth: sealed::Sealed {
    /// Number of 16-lane register groups per batch.
    const GROUPS: usize;
}

macro_rules! supported_width {
    ($($n:literal),*) => {
        $(
            impl sealed::Sealed for Lanes<$n> {}
            impl SupportedWidth for Lanes<$n> {
                const GROUPS: usize = $n / crate::simd::LANES;
            }
        )*
    };
}

supported_width!(16, 32, 64);

/// Runtime name for a supported batch width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Width {
    #[default]
    W16,
    W32,
    W64,
}

impl Width {
    pub const ALL: [Width; 3] = [Width::W16, Width::W32, Width::W64];

    #[inline]
    pub const fn lanes(self) -> usize {
        match self {
            Width::W16 => 16,
            Width::W32 => 32,
            Width::W64 => 64,
        }
    }
}

impl fmt::Display for Width {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lanes())
    }
}

impl FromStr for Width {
    type Err = PruneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "16" => Ok(Width::W16),
            "32" => Ok(Width::W32),
            "64" => Ok(Width::W64),
            other => Err(PruneError::InvalidWidth(other.to_string())),
        }
    }
}
