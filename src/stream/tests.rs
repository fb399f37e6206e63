use std::io::{self, Cursor, Read};

use super::core::chunk_size;
use super::*;
use crate::prune::{Pruner, Strategy, Width, is_discard};
use crate::simd::Capabilities;

fn reference(data: &[u8]) -> Vec<u8> {
    data.iter().copied().filter(|&b| !is_discard(b)).collect()
}

fn sample_text(len: usize) -> Vec<u8> {
    let words: [&[u8]; 6] = [b"alpha ", b"beta\t", b"  gamma\n", b"delta\r\n", b"\0eps", b"\xc3\xa9t\xc3\xa9 "];
    let mut out = Vec::with_capacity(len + 16);
    let mut i = 0usize;
    while out.len() < len {
        out.extend_from_slice(words[i % words.len()]);
        i = i.wrapping_mul(31).wrapping_add(7);
    }
    out.truncate(len);
    out
}

fn general_pruners() -> Vec<Pruner> {
    let mut pruners = vec![
        Pruner::detect(Strategy::SortingNetwork).unwrap(),
        Pruner::detect(Strategy::Clustered).unwrap(),
        Pruner::detect(Strategy::Scalar).unwrap(),
    ];
    pruners.push(Pruner::new(Strategy::Scatter, Capabilities::portable()).unwrap());
    pruners
}

#[test]
fn test_prune_slice_matches_reference() {
    for len in [0, 1, 15, 16, 17, 63, 64, 65, 1000] {
        let data = sample_text(len);
        let expected = reference(&data);
        for pruner in general_pruners() {
            for width in Width::ALL {
                assert_eq!(
                    prune_slice(&pruner, width, &data),
                    expected,
                    "{} at width {} len {}",
                    pruner.strategy(),
                    width,
                    len
                );
            }
        }
    }
}

#[test]
fn test_prune_into_appends() {
    let pruner = Pruner::detect(Strategy::SortingNetwork).unwrap();
    let mut out = b"head:".to_vec();
    let stats = prune_into(&pruner, Width::W32, b"one two three four five six seven eight", &mut out);
    assert_eq!(out, b"head:onetwothreefourfivesixseveneight");
    assert_eq!(stats.input, 39);
    assert_eq!(stats.kept, 32);
    assert_eq!(stats.discarded(), 7);
    assert_eq!(stats.batches, 1);
}

#[test]
fn test_prefix_on_routable_text() {
    // One blank per 16-byte group, and never more than one run before the
    // group's last kept byte.
    let data = b"abcdefg hijklmnoABCDEFG HIJKLMNO0123456 789abcdefxyz";
    let pruner = Pruner::detect(Strategy::PrefixSum).unwrap();
    assert_eq!(prune_slice(&pruner, Width::W16, data), reference(data));
}

#[test]
fn test_parallel_matches_sequential() {
    let data = sample_text(PARALLEL_THRESHOLD + 12_345);
    let expected = reference(&data);
    for pruner in general_pruners() {
        assert_eq!(prune_slice_parallel(&pruner, Width::W64, &data), expected, "{}", pruner.strategy());
    }
}

#[test]
fn test_parallel_below_threshold() {
    let pruner = Pruner::detect(Strategy::Clustered).unwrap();
    let data = sample_text(4096);
    assert_eq!(prune_slice_parallel(&pruner, Width::W16, &data), reference(&data));
}

#[test]
fn test_chunk_size_is_batch_aligned() {
    for width in Width::ALL {
        for (len, threads) in [(PARALLEL_THRESHOLD, 3), (PARALLEL_THRESHOLD * 7 + 5, 16), (100, 4)] {
            let size = chunk_size(len, threads, width);
            assert_eq!(size % width.lanes(), 0);
            assert!(size >= PARALLEL_CHUNK);
        }
    }
}

#[test]
fn test_prune_reader_spans_buffers() {
    let data = sample_text(STREAM_BUF * 2 + 77);
    let pruner = Pruner::detect(Strategy::SortingNetwork).unwrap();
    let mut out = Vec::new();
    let stats = prune_reader(&pruner, Width::W32, &mut Cursor::new(&data), &mut out).unwrap();
    let expected = reference(&data);
    assert_eq!(out, expected);
    assert_eq!(stats.input, data.len() as u64);
    assert_eq!(stats.kept, expected.len() as u64);
    assert_eq!(stats.batches, (data.len() / 32) as u64);
}

#[test]
fn test_prune_reader_empty() {
    let pruner = Pruner::detect(Strategy::Clustered).unwrap();
    let mut out = Vec::<u8>::new();
    let stats = prune_reader(&pruner, Width::W16, &mut io::empty(), &mut out).unwrap();
    assert_eq!(stats, PruneStats::default());
    assert!(out.is_empty());
}

#[test]
fn test_prune_reader_propagates_errors() {
    struct Failing;
    impl Read for Failing {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("disk on fire"))
        }
    }
    let pruner = Pruner::detect(Strategy::SortingNetwork).unwrap();
    let err = prune_reader(&pruner, Width::W16, &mut Failing, &mut Vec::<u8>::new()).unwrap_err();
    assert_eq!(err.to_string(), "disk on fire");
}

#[test]
fn test_stats_add_assign() {
    let mut total = PruneStats {
        input: 10,
        kept: 6,
        batches: 0,
    };
    total += PruneStats {
        input: 32,
        kept: 20,
        batches: 2,
    };
    assert_eq!(
        total,
        PruneStats {
            input: 42,
            kept: 26,
            batches: 2,
        }
    );
}

#[test]
fn test_prune_is_idempotent() {
    let pruner = Pruner::detect(Strategy::Clustered).unwrap();
    let once = prune_slice(&pruner, Width::W64, &sample_text(5000));
    assert_eq!(prune_slice(&pruner, Width::W16, &once), once);
}
