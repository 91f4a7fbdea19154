use crate::graph::Graph;
use crate::plan::Plan;
use crate::stats::{ChainCounts, WinStatistics};
use crate::swaps::SwapPair;
use serde_json::{json, to_value};
use std::io::Result;

/// A standard interface for writing steps and statistics to stdout.
///
/// Writers run on their own thread and only ever observe committed
/// plans: the chain sends each accepted swap after the step is complete.
pub trait StatsWriter: Send {
    /// Prints data from the initial plan.
    fn init(&mut self, graph: &Graph, plan: &Plan, stats: &WinStatistics) -> Result<()>;

    /// Prints deltas generated from an accepted swap
    /// which has been applied to `plan`.
    ///
    /// `counts` covers the steps since the previous accepted swap
    /// (including this one); `seats` is the seat count after the swap.
    fn step(
        &mut self,
        step: u64,
        graph: &Graph,
        plan: &Plan,
        swap: SwapPair,
        counts: &ChainCounts,
        seats: usize,
    ) -> Result<()>;

    /// Cleans up after the last step (useful for testing).
    /// `counts` holds the self-loops after the last accepted swap.
    fn close(&mut self, counts: &ChainCounts) -> Result<()>;
}

/// Writes chain statistics in TSV (tab-separated values) format.
/// Each accepted swap in the chain is a line; no statistics are saved
/// about the initial plan.
///
/// Rows in the output contain the following columns:
///   * `step` - The step count at the accepted swap (including self-loops).
///   * `rejected` - The number of self-loops since the last accepted swap.
///   * `x`, `y` - The swapped precincts.
///   * `x_dist`, `y_dist` - The new districts of `x` and `y`.
///   * `seats` - The number of districts held by the target party.
pub struct TSVWriter {}

/// Writes statistics in JSONL (JSON Lines) format.
pub struct JSONLWriter {
    /// Determines whether per-district target-party counts should be
    /// saved for each step.
    dist_counts: bool,
    /// Determines whether to compute cut edge counts for each step.
    cut_edges_count: bool,
    /// The party whose precincts are counted.
    target_party: u8,
}

/// Writes assignments in space-delimited format (with step number prefix).
pub struct AssignmentsOnlyWriter {}

impl TSVWriter {
    pub fn new() -> TSVWriter {
        TSVWriter {}
    }
}

impl JSONLWriter {
    pub fn new(dist_counts: bool, cut_edges_count: bool, target_party: u8) -> JSONLWriter {
        JSONLWriter {
            dist_counts,
            cut_edges_count,
            target_party,
        }
    }
}

impl AssignmentsOnlyWriter {
    pub fn new() -> AssignmentsOnlyWriter {
        AssignmentsOnlyWriter {}
    }

    fn assignments_str(plan: &Plan) -> String {
        plan.assignments
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<String>>()
            .join(" ")
    }
}

impl StatsWriter for TSVWriter {
    fn init(&mut self, _graph: &Graph, _plan: &Plan, _stats: &WinStatistics) -> Result<()> {
        // TSV column header.
        println!("step\trejected\tx\ty\tx_dist\ty_dist\tseats");
        Ok(())
    }

    fn step(
        &mut self,
        step: u64,
        _graph: &Graph,
        plan: &Plan,
        swap: SwapPair,
        counts: &ChainCounts,
        seats: usize,
    ) -> Result<()> {
        let (x, y) = swap;
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            step,
            counts.rejected,
            x,
            y,
            plan.assignments[x],
            plan.assignments[y],
            seats
        );
        Ok(())
    }

    fn close(&mut self, _counts: &ChainCounts) -> Result<()> {
        Ok(())
    }
}

impl StatsWriter for JSONLWriter {
    fn init(&mut self, graph: &Graph, plan: &Plan, stats: &WinStatistics) -> Result<()> {
        let mut init = json!({
            "num_dists": plan.num_dists,
            "target_party": stats.target_party(),
            "target_share": plan.party_share(stats.target_party()),
            "win_threshold": stats.win_threshold(),
            "dist_counts": stats.dist_counts(),
            "seats": stats.seats(),
        });
        if self.cut_edges_count {
            if let Some(obj) = init.as_object_mut() {
                obj.insert("num_cut_edges".to_string(), to_value(plan.cut_edges(graph).len())?);
            }
        }
        println!("{}", json!({ "init": init }));
        Ok(())
    }

    fn step(
        &mut self,
        step: u64,
        graph: &Graph,
        plan: &Plan,
        swap: SwapPair,
        counts: &ChainCounts,
        seats: usize,
    ) -> Result<()> {
        let (x, y) = swap;
        let mut record = json!({
            "step": step,
            "swap": (x, y),
            "dists": (plan.assignments[x], plan.assignments[y]),
            "counts": counts,
            "seats": seats,
        });
        if let Some(obj) = record.as_object_mut() {
            if self.dist_counts {
                obj.insert(
                    "dist_counts".to_string(),
                    to_value(plan.dist_party_counts(self.target_party))?,
                );
            }
            if self.cut_edges_count {
                obj.insert("num_cut_edges".to_string(), to_value(plan.cut_edges(graph).len())?);
            }
        }
        println!("{}", json!({ "step": record }));
        Ok(())
    }

    fn close(&mut self, counts: &ChainCounts) -> Result<()> {
        if counts.rejected > 0 {
            println!("{}", json!({ "tail": counts }));
        }
        Ok(())
    }
}

impl StatsWriter for AssignmentsOnlyWriter {
    fn init(&mut self, _graph: &Graph, plan: &Plan, _stats: &WinStatistics) -> Result<()> {
        println!("0,{}", AssignmentsOnlyWriter::assignments_str(plan));
        Ok(())
    }

    fn step(
        &mut self,
        step: u64,
        _graph: &Graph,
        plan: &Plan,
        _swap: SwapPair,
        _counts: &ChainCounts,
        _seats: usize,
    ) -> Result<()> {
        println!("{},{}", step, AssignmentsOnlyWriter::assignments_str(plan));
        Ok(())
    }

    fn close(&mut self, _counts: &ChainCounts) -> Result<()> {
        Ok(())
    }
}
