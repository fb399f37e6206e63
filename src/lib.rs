// Allow lints that fire on the lane-table and intrinsic code
#![allow(
    clippy::needless_range_loop,
    clippy::identity_op,
    clippy::len_without_is_empty,
    clippy::doc_lazy_continuation,
    clippy::manual_range_contains,
    clippy::too_many_arguments
)]

/// Use mimalloc as the global allocator for the library and binary.
/// The stream driver allocates one output buffer per input and per rayon
/// chunk; mimalloc's thread-local caches keep those cheap.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

pub mod common;
pub mod prune;
pub mod simd;
pub mod stream;
