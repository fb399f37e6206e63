use thiserror::Error;

use super::core::Strategy;
use crate::simd::Backend;

/// Configuration errors. The kernels themselves cannot fail once a
/// [`Pruner`](super::Pruner) has been built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PruneError {
    #[error("the {strategy} strategy needs a scatter store, which the {backend} backend lacks")]
    Unsupported { strategy: Strategy, backend: Backend },

    #[error("the {0} backend is not available on this CPU")]
    Unavailable(Backend),

    #[error("unknown strategy '{0}' (expected one of: scalar, prefix, sort, cluster, scatter)")]
    UnknownStrategy(String),

    #[error("invalid batch width '{0}' (expected 16, 32 or 64)")]
    InvalidWidth(String),
}
