//! Acceptance probabilities for swap proposals.
pub type AcceptanceProb = f64;

/// The Hastings correction for uniform proposals over a state-dependent
/// swap set: `min(1, |current| / |proposed|)`.
///
/// A proposal that leaves no legal swaps is never accepted.
pub fn hastings_ratio(current_swaps: usize, proposed_swaps: usize) -> AcceptanceProb {
    if proposed_swaps == 0 {
        return 0.0;
    }
    (current_swaps as f64 / proposed_swaps as f64).min(1.0)
}
