//! The precinct swap Markov chain.
//!
//! Each step draws a legal swap uniformly from the [SwapSet], applies it
//! tentatively, patches the swap set, and accepts with the Hastings
//! probability `min(1, |S| / |S'|)`. A rejected proposal is rolled back
//! through the swap set's undo log and by swapping the two precincts back,
//! so it leaves no trace on the committed state.
use crate::acceptance::{hastings_ratio, AcceptanceProb};
use crate::config::{ChainParams, UpdateMode};
use crate::contiguity::is_valid_swap_buffered;
use crate::error::ChainError;
use crate::graph::Graph;
use crate::plan::Plan;
use crate::stats::{ChainCounts, WinStatistics};
use crate::swaps::{SwapBuffer, SwapSet, UndoLog};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

pub mod run;

/// The result of a single chain step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// `x` and `y` exchanged districts.
    Accepted { x: usize, y: usize, prob: AcceptanceProb },
    /// The proposal to exchange `x` and `y` was discarded.
    Rejected { x: usize, y: usize, prob: AcceptanceProb },
}

/// A running swap chain: the committed plan, its swap set and the seat
/// statistics of every visited state.
pub struct ChainEngine<'g> {
    graph: &'g Graph,
    plan: Plan,
    swaps: SwapSet,
    stats: WinStatistics,
    mode: UpdateMode,
    rng: SmallRng,
    buf: SwapBuffer,
    log: UndoLog,
    step: u64,
    counts: ChainCounts,
}

impl<'g> ChainEngine<'g> {
    /// Validates `params` against the starting plan and builds the initial
    /// swap set from scratch.
    pub fn new(graph: &'g Graph, plan: Plan, params: &ChainParams) -> Result<Self, ChainError> {
        params.validate(graph, &plan)?;
        let swaps = SwapSet::build_full(graph, &plan);
        let stats = WinStatistics::new(&plan, params.target_party, params.win_threshold());
        debug!(
            nodes = graph.len(),
            num_dists = plan.num_dists,
            swaps = swaps.len(),
            seats = stats.seats(),
            "built initial swap set"
        );
        Ok(ChainEngine {
            graph,
            plan,
            swaps,
            stats,
            mode: params.update_mode,
            rng: SmallRng::seed_from_u64(params.rng_seed),
            buf: SwapBuffer::new(graph.len()),
            log: UndoLog::default(),
            step: 0,
            counts: ChainCounts::default(),
        })
    }

    /// Runs one propose / evaluate / commit-or-discard cycle.
    pub fn step(&mut self) -> Result<StepOutcome, ChainError> {
        let (x, y) = self
            .swaps
            .sample(&mut self.rng)
            .ok_or(ChainError::StuckChain { step: self.step })?;
        if x == y || self.plan.assignments[x] == self.plan.assignments[y] {
            return Err(ChainError::DegenerateSwap { x, y, step: self.step });
        }
        if !is_valid_swap_buffered(self.graph, &self.plan, x, y, &mut self.buf.visit) {
            return Err(ChainError::StaleSwap { x, y, step: self.step });
        }

        let current = self.swaps.len();
        self.plan.swap(x, y);
        self.log.clear();
        self.swaps
            .update(self.graph, &self.plan, x, y, self.mode, &mut self.buf, &mut self.log);
        let prob = hastings_ratio(current, self.swaps.len());
        let accept = self.rng.gen::<f64>() < prob;
        trace!(step = self.step, x, y, current, proposed = self.swaps.len(), prob, accept);
        self.step += 1;

        if accept {
            self.log.clear();
            self.stats.record_step(&self.plan, x, y);
            self.counts.accepted += 1;
            Ok(StepOutcome::Accepted { x, y, prob })
        } else {
            self.swaps.rollback(&mut self.log);
            self.plan.swap(x, y);
            self.stats.record_step(&self.plan, x, x);
            self.counts.rejected += 1;
            Ok(StepOutcome::Rejected { x, y, prob })
        }
    }

    /// Runs `n` steps.
    pub fn run(&mut self, n: u64) -> Result<(), ChainError> {
        for _ in 0..n {
            self.step()?;
        }
        Ok(())
    }

    /// The committed plan.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// The committed swap set.
    pub fn swaps(&self) -> &SwapSet {
        &self.swaps
    }

    pub fn stats(&self) -> &WinStatistics {
        &self.stats
    }

    /// Accepted/rejected counts since the start of the chain.
    pub fn counts(&self) -> ChainCounts {
        self.counts
    }

    /// The number of steps executed so far.
    pub fn steps(&self) -> u64 {
        self.step
    }

    /// Consumes the engine, returning its final state.
    pub fn into_parts(self) -> (Plan, SwapSet, WinStatistics, ChainCounts) {
        (self.plan, self.swaps, self.stats, self.counts)
    }
}
