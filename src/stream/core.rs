use std::io::{self, Read, Write};
use std::ops::AddAssign;

use rayon::prelude::*;

use crate::common::io::read_full;
use crate::prune::{Batch, Lanes, Pruner, SupportedWidth, Width, compact_scalar};

/// Stream buffer: 1MB. A multiple of every batch width, so only the final
/// read can end inside a batch.
pub const STREAM_BUF: usize = 1024 * 1024;

/// Inputs at or above this size are split across rayon workers.
pub const PARALLEL_THRESHOLD: usize = 4 * 1024 * 1024;

/// Smallest slice handed to one worker.
pub const PARALLEL_CHUNK: usize = 256 * 1024;

/// Byte and batch counters for one pruning pass.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub input: u64,
    pub kept: u64,
    /// Whole batches run through the vector kernel; the partial tail batch
    /// is not counted.
    pub batches: u64,
}

impl PruneStats {
    #[inline]
    pub fn discarded(&self) -> u64 {
        self.input - self.kept
    }
}

impl AddAssign for PruneStats {
    fn add_assign(&mut self, rhs: Self) {
        self.input += rhs.input;
        self.kept += rhs.kept;
        self.batches += rhs.batches;
    }
}

/// Chains whole `N`-byte batches of `data` into `out` at the running kept
/// offset. The partial last batch goes through the scalar loop.
fn prune_batches<const N: usize>(pruner: &Pruner, data: &[u8], out: &mut [u8]) -> PruneStats
where
    Lanes<N>: SupportedWidth,
{
    let out = &mut out[..data.len()];
    let mut batch = Batch::<N>::default();
    let mut written = 0;
    let mut batches = 0u64;

    let mut chunks = data.chunks_exact(N);
    for chunk in &mut chunks {
        batch.as_bytes_mut().copy_from_slice(chunk);
        // written <= consumed input, so all N bytes at `written` fit.
        written += pruner.compact_into(&batch, &mut out[written..]);
        batches += 1;
    }
    written += compact_scalar(chunks.remainder(), &mut out[written..]);

    PruneStats {
        input: data.len() as u64,
        kept: written as u64,
        batches,
    }
}

/// Appends the kept bytes of `data` to `out`.
pub fn prune_into(pruner: &Pruner, width: Width, data: &[u8], out: &mut Vec<u8>) -> PruneStats {
    let start = out.len();
    out.resize(start + data.len(), 0);
    let dst = &mut out[start..];
    let stats = match width {
        Width::W16 => prune_batches::<16>(pruner, data, dst),
        Width::W32 => prune_batches::<32>(pruner, data, dst),
        Width::W64 => prune_batches::<64>(pruner, data, dst),
    };
    out.truncate(start + stats.kept as usize);
    stats
}

/// Removes every blank and control byte from `data` on the calling thread.
pub fn prune_slice(pruner: &Pruner, width: Width, data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let stats = prune_into(pruner, width, data, &mut out);
    tracing::debug!(
        strategy = %pruner.strategy(),
        backend = %pruner.backend(),
        %width,
        input = stats.input,
        kept = stats.kept,
        batches = stats.batches,
        "pruned slice"
    );
    out
}

/// Like [`prune_slice`], but splits large inputs into batch-aligned chunks
/// pruned on rayon workers and concatenated in order.
pub fn prune_slice_parallel(pruner: &Pruner, width: Width, data: &[u8]) -> Vec<u8> {
    let num_threads = rayon::current_num_threads().max(1);
    if data.len() < PARALLEL_THRESHOLD || num_threads <= 1 {
        return prune_slice(pruner, width, data);
    }

    let chunk_size = chunk_size(data.len(), num_threads, width);
    let results: Vec<(Vec<u8>, PruneStats)> = data
        .par_chunks(chunk_size)
        .map(|chunk| {
            let mut buf = Vec::with_capacity(chunk.len());
            let stats = prune_into(pruner, width, chunk, &mut buf);
            (buf, stats)
        })
        .collect();

    let mut stats = PruneStats::default();
    let mut out = Vec::with_capacity(results.iter().map(|(buf, _)| buf.len()).sum());
    for (buf, part) in &results {
        out.extend_from_slice(buf);
        stats += *part;
    }
    tracing::debug!(
        strategy = %pruner.strategy(),
        backend = %pruner.backend(),
        %width,
        chunks = results.len(),
        input = stats.input,
        kept = stats.kept,
        batches = stats.batches,
        "pruned slice in parallel"
    );
    out
}

/// Per-worker chunk length: an even share of `len`, at least
/// [`PARALLEL_CHUNK`], rounded up to a whole number of batches.
pub(crate) fn chunk_size(len: usize, num_threads: usize, width: Width) -> usize {
    let lanes = width.lanes();
    len.div_ceil(num_threads)
        .max(PARALLEL_CHUNK)
        .next_multiple_of(lanes)
}

/// Prunes everything `reader` yields into `writer` through a fixed buffer.
pub fn prune_reader(
    pruner: &Pruner,
    width: Width,
    reader: &mut impl Read,
    writer: &mut impl Write,
) -> io::Result<PruneStats> {
    let mut buf = vec![0u8; STREAM_BUF];
    let mut out = Vec::with_capacity(STREAM_BUF);
    let mut stats = PruneStats::default();
    loop {
        let n = read_full(reader, &mut buf)?;
        if n == 0 {
            break;
        }
        out.clear();
        stats += prune_into(pruner, width, &buf[..n], &mut out);
        writer.write_all(&out)?;
        if n < buf.len() {
            break;
        }
    }
    tracing::debug!(
        strategy = %pruner.strategy(),
        backend = %pruner.backend(),
        %width,
        input = stats.input,
        kept = stats.kept,
        batches = stats.batches,
        "pruned stream"
    );
    Ok(stats)
}
