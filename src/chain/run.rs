//! Runners for the swap chain.
//!
//! A runner drives a [ChainEngine] for a fixed number of steps and streams
//! accepted swaps to a [StatsWriter] running on its own thread. The writer
//! keeps its own replica of the plan, rebuilt from the accepted swaps, so
//! it never observes the engine's tentative state.
use super::{ChainEngine, StepOutcome};
use crate::config::ChainParams;
use crate::error::ChainError;
use crate::graph::Graph;
use crate::plan::Plan;
use crate::stats::{ChainCounts, StatsWriter, WinStatistics};
use crate::swaps::{SwapPair, SwapSet};
use crossbeam::scope;
use crossbeam_channel::bounded;
use std::io;
use tracing::{error, info, warn};

/// Determines how many accepted swaps the stats thread can lag behind by
/// (compared to the head of the chain).
const STATS_CHANNEL_CAPACITY: usize = 16;

/// Information necessary to compute statistics about an accepted swap.
struct StepPacket {
    /// The current step count of the chain.
    step: u64,
    /// The accepted swap (only `None` when the termination sentinel is set).
    swap: Option<SwapPair>,
    /// Counts since the last accepted swap (including this one).
    counts: ChainCounts,
    /// Seats held after the swap.
    seats: usize,
    /// A sentinel used to kill the stats thread.
    terminate: bool,
}

/// The final state of a chain run.
pub struct ChainResult {
    /// The last committed plan.
    pub plan: Plan,
    /// The legal swaps under `plan`.
    pub swaps: SwapSet,
    /// Seat statistics over every visited state.
    pub stats: WinStatistics,
    /// Accepted/rejected totals.
    pub counts: ChainCounts,
}

/// Runs a swap chain from `plan` for `params.num_steps` steps and writes
/// accepted swaps through `writer`.
///
/// A chain error takes precedence over a writer error. If the writer
/// fails, the chain stops at the next accepted swap and the run returns
/// [ChainError::WriterFailed].
///
/// # Arguments
///
/// * `graph` - The graph associated with `plan`.
/// * `plan` - The plan to start the chain run from.
/// * `writer` - The statistics writer.
/// * `params` - The parameters of the chain run.
pub fn run_chain(
    graph: &Graph,
    plan: &Plan,
    mut writer: Box<dyn StatsWriter>,
    params: &ChainParams,
) -> Result<ChainResult, ChainError> {
    let mut engine = ChainEngine::new(graph, plan.clone(), params)?;
    let (stats_send, stats_recv) = bounded::<StepPacket>(STATS_CHANNEL_CAPACITY);
    info!(
        num_steps = params.num_steps,
        rng_seed = params.rng_seed,
        update_mode = ?params.update_mode,
        swaps = engine.swaps().len(),
        "starting chain"
    );

    let (outcome, written) = scope(|scope| {
        // Start stats thread.
        let stats_thread = {
            let mut plan = plan.clone();
            let stats = engine.stats().clone();
            scope.spawn(move |_| -> io::Result<()> {
                writer.init(graph, &plan, &stats)?;
                while let Ok(next) = stats_recv.recv() {
                    if next.terminate {
                        return writer.close(&next.counts);
                    }
                    if let Some((x, y)) = next.swap {
                        plan.swap(x, y);
                        writer.step(next.step, graph, &plan, (x, y), &next.counts, next.seats)?;
                    }
                }
                Ok(())
            })
        };

        let mut rejected = 0;
        let mut result = Ok(());
        while engine.steps() < params.num_steps {
            match engine.step() {
                Ok(StepOutcome::Accepted { x, y, .. }) => {
                    let packet = StepPacket {
                        step: engine.steps(),
                        swap: Some((x, y)),
                        counts: ChainCounts { accepted: 1, rejected },
                        seats: engine.stats().seats(),
                        terminate: false,
                    };
                    if stats_send.send(packet).is_err() {
                        // The stats thread has exited; its error is
                        // collected below.
                        break;
                    }
                    rejected = 0;
                }
                Ok(StepOutcome::Rejected { .. }) => rejected += 1,
                Err(e) => {
                    warn!(error = %e, "chain halted");
                    result = Err(e);
                    break;
                }
            }
        }

        // Terminate the stats thread.
        let _ = stats_send.send(StepPacket {
            step: engine.steps(),
            swap: None,
            counts: ChainCounts { accepted: 0, rejected },
            seats: engine.stats().seats(),
            terminate: true,
        });
        let written = stats_thread
            .join()
            .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
        (result, written)
    })
    .unwrap_or_else(|panic| std::panic::resume_unwind(panic));
    outcome?;
    if let Err(e) = written {
        error!(error = %e, step = engine.steps(), "stats writer failed");
        return Err(ChainError::WriterFailed(e.to_string()));
    }

    let (plan, swaps, stats, counts) = engine.into_parts();
    info!(
        accepted = counts.accepted,
        rejected = counts.rejected,
        seat_wins = ?stats.seat_wins(),
        "chain finished"
    );
    Ok(ChainResult {
        plan,
        swaps,
        stats,
        counts,
    })
}
