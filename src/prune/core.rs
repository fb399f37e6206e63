use std::fmt;
use std::str::FromStr;

use crate::simd::{Backend, Capabilities, Portable, VectorOps};

#[cfg(target_arch = "x86_64")]
use crate::simd::x86::Ssse3;

#[cfg(target_arch = "aarch64")]
use crate::simd::neon::Neon;

use super::batch::{Batch, Lanes, SupportedWidth};
use super::classify::is_discard;
use super::error::PruneError;
use super::{cluster, prefix, scatter, sort};

/// Index-generation strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// Branch-free scalar loop; the reference every other strategy must
    /// match.
    Scalar,
    /// Running discard count. Only correct when each 16-byte group has at
    /// most one discard run before its last kept byte.
    PrefixSum,
    /// Sort tagged indices with a 16-input network. Correct for any input.
    SortingNetwork,
    /// Sort 4-lane clusters and store them at running offsets. Correct for
    /// any input.
    Clustered,
    /// Predicated scatter to prefix-sum offsets. Correct for any input;
    /// needs a scatter-capable backend.
    Scatter,
}

impl Strategy {
    pub const ALL: [Strategy; 5] = [
        Strategy::Scalar,
        Strategy::PrefixSum,
        Strategy::SortingNetwork,
        Strategy::Clustered,
        Strategy::Scatter,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Strategy::Scalar => "scalar",
            Strategy::PrefixSum => "prefix",
            Strategy::SortingNetwork => "sort",
            Strategy::Clustered => "cluster",
            Strategy::Scatter => "scatter",
        }
    }

    pub const fn needs_scatter(self) -> bool {
        matches!(self, Strategy::Scatter)
    }

    /// Whether the strategy compacts every input correctly.
    pub const fn is_general(self) -> bool {
        !matches!(self, Strategy::PrefixSum)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Strategy {
    type Err = PruneError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Strategy::ALL
            .into_iter()
            .find(|strategy| strategy.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| PruneError::UnknownStrategy(s.to_string()))
    }
}

/// Scalar reference: every byte is written at `pos`, and `pos` advances
/// only past kept bytes. Returns the kept count.
///
/// # Panics
/// Panics if `out` is shorter than `input`.
#[inline]
pub fn compact_scalar(input: &[u8], out: &mut [u8]) -> usize {
    let out = &mut out[..input.len()];
    let mut pos = 0;
    for &b in input {
        out[pos] = b;
        pos += usize::from(!is_discard(b));
    }
    pos
}

/// Backend token picked when the pruner is built.
#[derive(Clone, Copy, Debug)]
enum Kernel {
    Portable(Portable),
    #[cfg(target_arch = "x86_64")]
    Ssse3(Ssse3),
    #[cfg(target_arch = "aarch64")]
    Neon(Neon),
}

impl Kernel {
    fn select(backend: Backend) -> Result<Self, PruneError> {
        match backend {
            Backend::Portable => Ok(Kernel::Portable(Portable)),
            #[cfg(target_arch = "x86_64")]
            Backend::Ssse3 => Ssse3::detect()
                .map(Kernel::Ssse3)
                .ok_or(PruneError::Unavailable(backend)),
            #[cfg(target_arch = "aarch64")]
            Backend::Neon => Ok(Kernel::Neon(Neon)),
            #[allow(unreachable_patterns)]
            _ => Err(PruneError::Unavailable(backend)),
        }
    }

    fn backend(self) -> Backend {
        match self {
            Kernel::Portable(_) => Portable::BACKEND,
            #[cfg(target_arch = "x86_64")]
            Kernel::Ssse3(_) => Ssse3::BACKEND,
            #[cfg(target_arch = "aarch64")]
            Kernel::Neon(_) => Neon::BACKEND,
        }
    }
}

/// A strategy bound to a backend the running CPU supports.
///
/// Building one is the only fallible step: it rejects the scatter strategy
/// on gather-only backends and backends the CPU lacks. After that every
/// call is total.
#[derive(Clone, Copy, Debug)]
pub struct Pruner {
    strategy: Strategy,
    kernel: Kernel,
}

impl Pruner {
    pub fn new(strategy: Strategy, caps: Capabilities) -> Result<Self, PruneError> {
        if strategy.needs_scatter() && !(caps.scatter && caps.backend.has_scatter()) {
            return Err(PruneError::Unsupported {
                strategy,
                backend: caps.backend,
            });
        }
        Ok(Self {
            strategy,
            kernel: Kernel::select(caps.backend)?,
        })
    }

    /// The strategy on the best backend of the running CPU.
    pub fn detect(strategy: Strategy) -> Result<Self, PruneError> {
        Self::new(strategy, Capabilities::detect())
    }

    #[inline]
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    #[inline]
    pub fn backend(&self) -> Backend {
        self.kernel.backend()
    }

    /// Compacts `batch` into `out` and returns the kept count. Only
    /// `out[..kept]` is meaningful.
    #[inline]
    pub fn compact<const N: usize>(&self, batch: &Batch<N>, out: &mut [u8; N]) -> usize
    where
        Lanes<N>: SupportedWidth,
    {
        self.compact_into(batch, out)
    }

    /// Like [`compact`](Self::compact) but writes into the first `N` bytes
    /// of a larger buffer, which lets callers chain batches at a running
    /// offset.
    ///
    /// # Panics
    /// Panics if `out` is shorter than `N`.
    #[inline]
    pub fn compact_into<const N: usize>(&self, batch: &Batch<N>, out: &mut [u8]) -> usize
    where
        Lanes<N>: SupportedWidth,
    {
        let input = batch.as_bytes();
        let out = &mut out[..N];
        match self.kernel {
            Kernel::Portable(ops) => match self.strategy {
                Strategy::Scatter => scatter::compact(ops, input, out),
                strategy => run(ops, strategy, input, out),
            },
            #[cfg(target_arch = "x86_64")]
            // SAFETY: the Ssse3 token only exists after runtime detection.
            Kernel::Ssse3(ops) => unsafe { run_ssse3(ops, self.strategy, input, out) },
            #[cfg(target_arch = "aarch64")]
            Kernel::Neon(ops) => run(ops, self.strategy, input, out),
        }
    }
}

/// Gather-based strategies on any backend.
#[inline(always)]
fn run<V: VectorOps>(ops: V, strategy: Strategy, input: &[u8], out: &mut [u8]) -> usize {
    match strategy {
        Strategy::Scalar => compact_scalar(input, out),
        Strategy::PrefixSum => prefix::compact(ops, input, out),
        Strategy::Clustered => cluster::compact(ops, input, out),
        // Pruner::new keeps Scatter away from gather-only backends.
        Strategy::SortingNetwork | Strategy::Scatter => sort::compact(ops, input, out),
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "ssse3")]
unsafe fn run_ssse3(ops: Ssse3, strategy: Strategy, input: &[u8], out: &mut [u8]) -> usize {
    run(ops, strategy, input, out)
}

/// Compacts one batch with `strategy` on the best backend for this CPU.
/// The scatter strategy runs on the portable backend, the only one with a
/// scatter store.
///
/// ```
/// use prune_rs::prune::{Batch, Strategy, compact};
///
/// let batch = Batch::<16>::padded(b"1234 678", b' ');
/// let (out, kept) = compact(&batch, Strategy::SortingNetwork).unwrap();
/// assert_eq!(&out.as_bytes()[..kept], b"1234678");
/// ```
pub fn compact<const N: usize>(
    batch: &Batch<N>,
    strategy: Strategy,
) -> Result<(Batch<N>, usize), PruneError>
where
    Lanes<N>: SupportedWidth,
{
    let caps = if strategy.needs_scatter() {
        Capabilities::portable()
    } else {
        Capabilities::detect()
    };
    let pruner = Pruner::new(strategy, caps)?;
    let mut out = Batch::<N>::default();
    let kept = pruner.compact(batch, out.as_bytes_mut());
    Ok((out, kept))
}
