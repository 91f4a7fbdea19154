//! The index of currently legal swaps.
//!
//! A [SwapSet] is built once from scratch ([SwapSet::build_full]) and then
//! patched after every tentative swap ([SwapSet::update]). Every mutation
//! made by an update is recorded in an [UndoLog], so a rejected proposal
//! can be rolled back exactly, including the sampling order of the pairs.
use crate::buffers::{BallBuffer, VisitBuffer};
use crate::contiguity::is_valid_swap_buffered;
use crate::graph::Graph;
use crate::plan::Plan;
use rand::Rng;
use std::collections::HashMap;
use std::str::FromStr;

/// An unordered precinct pair, stored with the smaller index first.
pub type SwapPair = (usize, usize);

/// The hop radius re-examined around a swapped pair by a local update.
pub const LOCAL_UPDATE_DEPTH: usize = 2;

/// Normalizes a precinct pair so that the smaller index comes first.
#[inline]
pub fn swap_pair(x: usize, y: usize) -> SwapPair {
    if x < y {
        (x, y)
    } else {
        (y, x)
    }
}

/// Strategies for patching a [SwapSet] after a swap.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateMode {
    /// Re-test only pairs touching the 2-hop ball around the swapped
    /// precincts. Fast, but not exact on every graph.
    Local,
    /// Re-test every pair.
    Full,
}

impl FromStr for UpdateMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<UpdateMode, String> {
        match raw {
            "local" => Ok(UpdateMode::Local),
            "full" => Ok(UpdateMode::Full),
            bad => Err(format!("invalid update mode '{}'", bad)),
        }
    }
}

/// A single recorded mutation of a [SwapSet].
#[derive(Clone, Debug, PartialEq, Eq)]
enum SwapOp {
    /// `pair` was pushed onto the end of the pair list.
    Inserted(SwapPair),
    /// `pair` was removed from position `index` (the last pair was moved
    /// into its slot).
    Removed { pair: SwapPair, index: usize },
}

/// The delta applied to a [SwapSet] by one or more updates.
#[derive(Clone, Debug, Default)]
pub struct UndoLog {
    ops: Vec<SwapOp>,
}

impl UndoLog {
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

/// Reusable scratch space for swap set updates.
pub struct SwapBuffer {
    /// The neighborhood around the last swapped pair.
    pub ball: BallBuffer,
    /// Traversal buffer for the contiguity oracle.
    pub visit: VisitBuffer,
}

impl SwapBuffer {
    /// Creates a new [SwapBuffer] for a graph of size `n`.
    pub fn new(n: usize) -> SwapBuffer {
        SwapBuffer {
            ball: BallBuffer::new(n),
            visit: VisitBuffer::new(n),
        }
    }
}

/// The set of all currently legal swaps.
///
/// Pairs are kept in a vector (for uniform sampling) with a position
/// index (for O(1) membership updates).
#[derive(Clone, Debug, Default)]
pub struct SwapSet {
    pairs: Vec<SwapPair>,
    positions: HashMap<SwapPair, usize>,
}

impl SwapSet {
    /// Tests every cross-district pair of precincts. O(n²) oracle calls.
    pub fn build_full(graph: &Graph, plan: &Plan) -> SwapSet {
        let mut swaps = SwapSet::default();
        let mut visit = VisitBuffer::new(graph.len());
        for x in 0..graph.len() {
            for y in (x + 1)..graph.len() {
                if is_valid_swap_buffered(graph, plan, x, y, &mut visit) {
                    swaps.positions.insert((x, y), swaps.pairs.len());
                    swaps.pairs.push((x, y));
                }
            }
        }
        swaps
    }

    /// The number of legal swaps.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Checks whether swapping `x` and `y` is currently legal.
    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.positions.contains_key(&swap_pair(x, y))
    }

    /// Iterates over the legal swaps in sampling order.
    pub fn iter(&self) -> impl Iterator<Item = &SwapPair> {
        self.pairs.iter()
    }

    /// Returns the legal swaps in sorted order (for comparisons).
    pub fn sorted_pairs(&self) -> Vec<SwapPair> {
        let mut pairs = self.pairs.clone();
        pairs.sort_unstable();
        pairs
    }

    /// Draws a legal swap uniformly at random.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<SwapPair> {
        if self.pairs.is_empty() {
            return None;
        }
        Some(self.pairs[rng.gen_range(0..self.pairs.len())])
    }

    /// Patches the set after `x` and `y` have exchanged districts in `plan`.
    ///
    /// In [UpdateMode::Local], every precinct within two hops of `x` or `y`
    /// is re-tested against every other precinct; pairs with neither
    /// endpoint in that ball keep their previous legality. In
    /// [UpdateMode::Full], every pair is re-tested.
    ///
    /// All mutations are appended to `log`.
    pub fn update(
        &mut self,
        graph: &Graph,
        plan: &Plan,
        x: usize,
        y: usize,
        mode: UpdateMode,
        buf: &mut SwapBuffer,
        log: &mut UndoLog,
    ) {
        match mode {
            UpdateMode::Full => {
                for z in 0..graph.len() {
                    for w in (z + 1)..graph.len() {
                        let legal = is_valid_swap_buffered(graph, plan, z, w, &mut buf.visit);
                        self.set((z, w), legal, log);
                    }
                }
            }
            UpdateMode::Local => {
                buf.ball.fill(graph, &[x, y], LOCAL_UPDATE_DEPTH);
                for idx in 0..buf.ball.nodes.len() {
                    let z = buf.ball.nodes[idx];
                    for w in 0..graph.len() {
                        // Pairs inside the ball are visited from both ends;
                        // test them once.
                        if w == z || (w < z && buf.ball.contains(w)) {
                            continue;
                        }
                        let legal = is_valid_swap_buffered(graph, plan, z, w, &mut buf.visit);
                        self.set(swap_pair(z, w), legal, log);
                    }
                }
            }
        }
    }

    /// Reverts every mutation in `log` (most recent first), restoring
    /// the set and its sampling order exactly.
    pub fn rollback(&mut self, log: &mut UndoLog) {
        while let Some(op) = log.ops.pop() {
            match op {
                SwapOp::Inserted(pair) => {
                    let last = self.pairs.pop();
                    debug_assert_eq!(last, Some(pair));
                    self.positions.remove(&pair);
                }
                SwapOp::Removed { pair, index } => {
                    if index == self.pairs.len() {
                        self.pairs.push(pair);
                    } else {
                        let moved = std::mem::replace(&mut self.pairs[index], pair);
                        self.positions.insert(moved, self.pairs.len());
                        self.pairs.push(moved);
                    }
                    self.positions.insert(pair, index);
                }
            }
        }
    }

    /// Brings the membership of `pair` in line with `legal`.
    fn set(&mut self, pair: SwapPair, legal: bool, log: &mut UndoLog) {
        if legal {
            if !self.positions.contains_key(&pair) {
                self.positions.insert(pair, self.pairs.len());
                self.pairs.push(pair);
                log.ops.push(SwapOp::Inserted(pair));
            }
        } else if let Some(index) = self.positions.remove(&pair) {
            self.pairs.swap_remove(index);
            if index < self.pairs.len() {
                self.positions.insert(self.pairs[index], index);
            }
            log.ops.push(SwapOp::Removed { pair, index });
        }
    }
}
