//! Fatal chain conditions.
//!
//! The chain is deterministic given its RNG seed, so none of these are
//! retried: each one points at a structural problem with the input plan or
//! with the swap index.

/// Errors surfaced by plan construction and by the swap chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// No legal swap exists, so no proposal can be drawn.
    #[error("Chain is stuck at step {step}: no legal swaps remain")]
    StuckChain { step: u64 },

    /// Degenerate or inconsistent setup (empty graph, bad labels, ...).
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A pair drawn from the swap set is not a cross-district pair.
    /// The swap index is corrupt.
    #[error("Drew degenerate swap ({x}, {y}) at step {step}")]
    DegenerateSwap { x: usize, y: usize, step: u64 },

    /// A pair drawn from the swap set would break contiguity. The local
    /// (2-hop) update missed a legality change on this graph.
    #[error("Drew stale swap ({x}, {y}) at step {step}; try the full update mode")]
    StaleSwap { x: usize, y: usize, step: u64 },

    /// The stats writer could not write its output.
    #[error("Stats writer failed: {0}")]
    WriterFailed(String),
}

impl ChainError {
    pub(crate) fn config(msg: impl Into<String>) -> ChainError {
        ChainError::InvalidConfiguration(msg.into())
    }
}
