use proptest::prelude::*;

use super::*;

const P: Portable = Portable;

fn lanes(bytes: &[u8]) -> [u8; LANES] {
    let mut out = [0u8; LANES];
    out[..bytes.len()].copy_from_slice(bytes);
    out
}

/// Runs every operation on `ops` and on the portable backend and compares.
fn assert_matches_portable<V: VectorOps>(ops: V, a: [u8; LANES], b: [u8; LANES]) {
    let va = ops.load(&a);
    let vb = ops.load(&b);
    let name = V::BACKEND;

    assert_eq!(ops.to_array(va), a, "{}: load/store", name);
    assert_eq!(ops.to_array(ops.splat(a[3])), P.splat(a[3]), "{}: splat", name);
    assert_eq!(ops.to_array(ops.cmple(va, vb)), P.cmple(a, b), "{}: cmple", name);
    assert_eq!(ops.to_array(ops.cmpgt(va, vb)), P.cmpgt(a, b), "{}: cmpgt", name);
    assert_eq!(ops.to_array(ops.and(va, vb)), P.and(a, b), "{}: and", name);
    assert_eq!(ops.to_array(ops.or(va, vb)), P.or(a, b), "{}: or", name);
    assert_eq!(ops.to_array(ops.andnot(va, vb)), P.andnot(a, b), "{}: andnot", name);
    assert_eq!(ops.to_array(ops.add(va, vb)), P.add(a, b), "{}: add", name);
    assert_eq!(ops.to_array(ops.sub(va, vb)), P.sub(a, b), "{}: sub", name);
    assert_eq!(ops.to_array(ops.min(va, vb)), P.min(a, b), "{}: min", name);
    assert_eq!(ops.to_array(ops.max(va, vb)), P.max(a, b), "{}: max", name);

    let m = ops.cmple(va, vb);
    let pm = P.cmple(a, b);
    assert_eq!(ops.to_array(ops.select(m, va, vb)), P.select(pm, a, b), "{}: select", name);
    assert_eq!(ops.movemask(m), P.movemask(pm), "{}: movemask", name);

    for by in Stride::SCAN {
        assert_eq!(ops.to_array(ops.slide_up(va, by)), P.slide_up(a, by), "{}: slide_up {:?}", name, by);
        assert_eq!(ops.to_array(ops.slide_down(va, by)), P.slide_down(a, by), "{}: slide_down {:?}", name, by);
    }

    assert_eq!(ops.to_array(ops.lookup(va, vb)), P.lookup(a, b), "{}: lookup", name);
    assert_eq!(ops.reduce_add(va), P.reduce_add(a), "{}: reduce_add", name);
    assert_eq!(ops.reduce_max(va), P.reduce_max(a), "{}: reduce_max", name);
    assert_eq!(ops.last_lane(va), P.last_lane(a), "{}: last_lane", name);
}

fn for_each_native_backend(a: [u8; LANES], b: [u8; LANES]) {
    #[cfg(target_arch = "x86_64")]
    if let Some(ops) = x86::Ssse3::detect() {
        assert_matches_portable(ops, a, b);
    }
    #[cfg(target_arch = "aarch64")]
    assert_matches_portable(neon::Neon, a, b);
    let _ = (a, b);
}

// === portable semantics ===

#[test]
fn test_slide_up_fills_low_lanes_with_zero() {
    let v = P.slide_up(IOTA, Stride::Four);
    assert_eq!(v, [0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]);
}

#[test]
fn test_slide_down_fills_high_lanes_with_zero() {
    let v = P.slide_down(IOTA, Stride::Two);
    assert_eq!(v, [2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 0, 0]);
}

#[test]
fn test_lookup_out_of_range_is_zero() {
    let table = lanes(b"abcdefghijklmnop");
    let idx = [15, 0, 16, 0x80, 0xFF, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 31];
    let v = P.lookup(table, idx);
    assert_eq!(&v[..2], b"pa");
    assert_eq!(&v[2..5], &[0, 0, 0]);
    assert_eq!(v[15], 0);
}

#[test]
fn test_movemask_reads_top_bits() {
    let mut m = [0u8; LANES];
    m[0] = 0xFF;
    m[5] = 0x80;
    m[15] = 0xFF;
    m[7] = 0x7F;
    assert_eq!(P.movemask(m), 0b1000_0000_0010_0001);
}

#[test]
fn test_cmple_is_unsigned() {
    let a = lanes(&[0x00, 0x20, 0x21, 0x80, 0xFF]);
    let m = P.cmple(a, P.splat(b' '));
    assert_eq!(&m[..5], &[0xFF, 0xFF, 0x00, 0x00, 0x00]);
}

#[test]
fn test_reduce_add_wraps() {
    assert_eq!(P.reduce_add(P.splat(0xFF)), 0xF0);
    assert_eq!(P.reduce_add(P.splat(1)), 16);
}

#[test]
fn test_scatter_writes_active_lanes_only() {
    let src = lanes(b"abcdefghijklmnop");
    let mut keep = [0u8; LANES];
    keep[1] = 0xFF;
    keep[4] = 0xFF;
    let mut offsets = [0u8; LANES];
    offsets[1] = 0;
    offsets[4] = 1;
    let mut dst = [b'.'; 4];
    P.scatter(src, offsets, keep, &mut dst);
    assert_eq!(&dst, b"be..");
}

#[test]
fn test_scatter_lane_order_wins_on_overlap() {
    let src = IOTA;
    let keep = [0xFF; LANES];
    let offsets = [0u8; LANES];
    let mut dst = [0u8; 1];
    P.scatter(src, offsets, keep, &mut dst);
    assert_eq!(dst[0], 15);
}

// === capabilities ===

#[test]
fn test_portable_capabilities_have_scatter() {
    let caps = Capabilities::portable();
    assert_eq!(caps.backend, Backend::Portable);
    assert!(caps.scatter);
}

#[test]
fn test_detected_backend_is_available() {
    let caps = Capabilities::detect();
    assert!(caps.backend.is_available());
    assert_eq!(caps.scatter, caps.backend.has_scatter());
}

#[test]
fn test_backend_names_round_trip() {
    for b in Backend::ALL {
        assert_eq!(b.name().parse::<Backend>(), Ok(b));
    }
    assert!("avx9000".parse::<Backend>().is_err());
}

#[test]
fn test_lane_groups_skip_partial_tail() {
    let data = [7u8; 40];
    assert_eq!(lane_groups(&data).count(), 2);
}

// === native backends agree with portable ===

#[test]
fn test_native_backend_edge_values() {
    let a = [0, 1, 0x1F, 0x20, 0x21, 0x7F, 0x80, 0x81, 0xFE, 0xFF, 16, 15, 17, 31, 32, 0x70];
    let b = [0xFF, 0x20, 0x20, 0x20, 0x20, 0x80, 0x7F, 0x81, 0xFF, 0xFE, 0, 1, 2, 3, 4, 5];
    for_each_native_backend(a, b);
    for_each_native_backend(b, a);
    for_each_native_backend(a, IOTA);
}

proptest! {
    #[test]
    fn prop_native_backend_matches_portable(a in any::<[u8; 16]>(), b in any::<[u8; 16]>()) {
        for_each_native_backend(a, b);
    }
}
