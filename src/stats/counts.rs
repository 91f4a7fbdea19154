//! Chain accept/reject statistics.
use serde::Serialize;
use std::ops::Add;

/// Accepted and rejected proposal counts over a span of chain steps.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ChainCounts {
    /// Proposals committed to the plan.
    pub accepted: u64,
    /// Proposals discarded by the Hastings coin flip (self-loops).
    pub rejected: u64,
}

impl Add for ChainCounts {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        ChainCounts {
            accepted: self.accepted + other.accepted,
            rejected: self.rejected + other.rejected,
        }
    }
}

impl ChainCounts {
    /// The total number of steps (accepted or not).
    pub fn sum(&self) -> u64 {
        self.accepted + self.rejected
    }

    /// The fraction of proposals that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.sum() == 0 {
            return 0.0;
        }
        self.accepted as f64 / self.sum() as f64
    }
}
