//! Blank-pruning kernels: remove every byte `<= b' '` from a fixed-size
//! batch and pack the rest to the front, in order.
//!
//! Each strategy has the same shape: classify the lanes, route them with a
//! gather index (or scatter offsets), then apply. Batches of 32 and 64
//! bytes run as consecutive 16-lane groups, each stored at the running
//! offset of the groups before it.

mod apply;
mod batch;
mod classify;
mod cluster;
mod core;
mod error;
mod network;
mod prefix;
mod scatter;
mod sort;


pub use self::apply::{Route, apply, apply_clusters};
pub use self::batch::{Batch, Lanes, SupportedWidth, Width};
pub use self::classify::{BLANK, classify, discard_bits, is_discard};
pub use self::cluster::{ClusterRoute, route_cluster};
pub use self::core::{Pruner, Strategy, compact, compact_scalar};
pub use self::error::PruneError;
pub use self::network::{
    CLUSTER, CLUSTER4, CLUSTERS, DISCARD_TAG, LANE_BITS, Layer, SORT4_LAYERS, SORT16,
    SORT16_LAYERS, Stage, sort_lanes, sort_lanes_scalar, tag_lanes,
};
pub use self::prefix::{prefix_routable, route_prefix, single_interior_run};
pub use self::scatter::route_scatter;
pub use self::sort::{kept_lanes, route_sort};
