//! Seat-count statistics over a chain's trajectory.
use crate::plan::Plan;
use serde::Serialize;

/// Running per-district majority outcomes and the seat-count histogram.
///
/// Every visited state is tallied once, including the initial plan; after
/// `n` chain steps the histogram therefore sums to `n + 1`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WinStatistics {
    /// The party whose seats are counted.
    target_party: u8,
    /// The number of target-party precincts a district needs to be won.
    win_threshold: u32,
    /// Target-party precincts in each district under the current plan.
    dist_counts: Vec<u32>,
    /// `seat_wins[k]` is the number of visited states in which the target
    /// party held exactly `k` districts.
    seat_wins: Vec<u64>,
    /// The number of visited states in which each district was held.
    dist_wins: Vec<u64>,
    /// Seats held under the current plan.
    seats: usize,
}

impl WinStatistics {
    /// Tallies the initial plan.
    ///
    /// # Arguments
    ///
    /// * `plan` - The starting plan of the chain.
    /// * `target_party` - The party label (0 or 1) whose seats are counted.
    /// * `win_threshold` - Target-party precincts needed for a majority
    ///   (`floor(dist_size / 2) + 1` for districts of `dist_size` precincts).
    pub fn new(plan: &Plan, target_party: u8, win_threshold: u32) -> WinStatistics {
        let num_dists = plan.num_dists as usize;
        let mut stats = WinStatistics {
            target_party,
            win_threshold,
            dist_counts: plan.dist_party_counts(target_party),
            seat_wins: vec![0; num_dists + 1],
            dist_wins: vec![0; num_dists],
            seats: 0,
        };
        stats.tally();
        stats
    }

    /// Records one chain step. `plan` is the committed plan after the step;
    /// `x` and `y` are the precincts that exchanged districts (pass `x == y`
    /// for a rejected proposal).
    pub fn record_step(&mut self, plan: &Plan, x: usize, y: usize) {
        if x != y {
            let dist_x = plan.assignments[x] as usize;
            let dist_y = plan.assignments[y] as usize;
            // `x` moved from `dist_y` into `dist_x` and `y` the other way.
            if plan.parties[x] == self.target_party {
                self.dist_counts[dist_x] += 1;
                self.dist_counts[dist_y] -= 1;
            }
            if plan.parties[y] == self.target_party {
                self.dist_counts[dist_y] += 1;
                self.dist_counts[dist_x] -= 1;
            }
        }
        self.tally();
    }

    /// Recounts held districts and adds one visit to the histogram.
    fn tally(&mut self) {
        let mut seats = 0;
        for (dist, &count) in self.dist_counts.iter().enumerate() {
            if count >= self.win_threshold {
                seats += 1;
                self.dist_wins[dist] += 1;
            }
        }
        self.seats = seats;
        self.seat_wins[seats] += 1;
    }

    /// Seats held under the current plan.
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// The seat-count histogram (length `num_dists + 1`).
    pub fn seat_wins(&self) -> &[u64] {
        &self.seat_wins
    }

    /// Target-party precincts per district under the current plan.
    pub fn dist_counts(&self) -> &[u32] {
        &self.dist_counts
    }

    /// Visited states in which each district was held.
    pub fn dist_wins(&self) -> &[u64] {
        &self.dist_wins
    }

    pub fn target_party(&self) -> u8 {
        self.target_party
    }

    pub fn win_threshold(&self) -> u32 {
        self.win_threshold
    }

    /// The number of tallied states.
    pub fn total(&self) -> u64 {
        self.seat_wins.iter().sum()
    }
}
