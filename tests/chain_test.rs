// End-to-end tests for chain runs: reproducibility, histogram bookkeeping
// and failure modes.
use std::io::{Error as IOError, ErrorKind, Result as IOResult};
use std::sync::{Arc, Mutex};
use swapwalk::chain::run::run_chain;
use swapwalk::config::{ChainParams, UpdateMode};
use swapwalk::error::ChainError;
use swapwalk::graph::Graph;
use swapwalk::init::stripes;
use swapwalk::plan::Plan;
use swapwalk::stats::{ChainCounts, StatsWriter, WinStatistics};
use swapwalk::swaps::{SwapPair, SwapSet};

use rstest::rstest;
use test_fixtures::default_fixture;

/// A single accepted swap as seen by a writer.
type Record = (u64, SwapPair, usize);

/// A writer that records every accepted swap into a shared log.
struct RecordingWriter {
    records: Arc<Mutex<Vec<Record>>>,
}

impl StatsWriter for RecordingWriter {
    fn init(&mut self, _graph: &Graph, _plan: &Plan, _stats: &WinStatistics) -> IOResult<()> {
        Ok(())
    }

    fn step(
        &mut self,
        step: u64,
        _graph: &Graph,
        _plan: &Plan,
        swap: SwapPair,
        _counts: &ChainCounts,
        seats: usize,
    ) -> IOResult<()> {
        self.records.lock().unwrap().push((step, swap, seats));
        Ok(())
    }

    fn close(&mut self, _counts: &ChainCounts) -> IOResult<()> {
        Ok(())
    }
}

/// A writer whose output stream breaks at a fixed callback.
struct BrokenWriter {
    fail_on_init: bool,
    /// The number of accepted swaps written before the stream breaks.
    steps_before_failure: usize,
}

impl BrokenWriter {
    fn broken_pipe() -> IOError {
        IOError::new(ErrorKind::BrokenPipe, "stdout closed")
    }
}

impl StatsWriter for BrokenWriter {
    fn init(&mut self, _graph: &Graph, _plan: &Plan, _stats: &WinStatistics) -> IOResult<()> {
        if self.fail_on_init {
            return Err(BrokenWriter::broken_pipe());
        }
        Ok(())
    }

    fn step(
        &mut self,
        _step: u64,
        _graph: &Graph,
        _plan: &Plan,
        _swap: SwapPair,
        _counts: &ChainCounts,
        _seats: usize,
    ) -> IOResult<()> {
        if self.steps_before_failure == 0 {
            return Err(BrokenWriter::broken_pipe());
        }
        self.steps_before_failure -= 1;
        Ok(())
    }

    fn close(&mut self, _counts: &ChainCounts) -> IOResult<()> {
        Ok(())
    }
}

fn params(num_dists: u32, dist_size: u32, num_steps: u64, rng_seed: u64) -> ChainParams {
    ChainParams {
        num_dists,
        dist_size,
        num_steps,
        rng_seed,
        target_party: 0,
        update_mode: UpdateMode::Local,
    }
}

fn full_params(num_dists: u32, dist_size: u32, num_steps: u64, rng_seed: u64) -> ChainParams {
    ChainParams {
        update_mode: UpdateMode::Full,
        ..params(num_dists, dist_size, num_steps, rng_seed)
    }
}

/// Runs a chain and returns its recorded swaps along with the final state.
fn recorded_run(
    graph: &Graph,
    plan: &Plan,
    params: &ChainParams,
) -> (Vec<Record>, Vec<u64>, Vec<u64>, Plan) {
    let records = Arc::new(Mutex::new(Vec::new()));
    let writer = Box::new(RecordingWriter {
        records: records.clone(),
    }) as Box<dyn StatsWriter>;
    let result = run_chain(graph, plan, writer, params).unwrap();
    let records = records.lock().unwrap().clone();
    (
        records,
        result.stats.seat_wins().to_vec(),
        result.stats.dist_wins().to_vec(),
        result.plan,
    )
}

#[rstest]
fn test_same_seed_same_trajectory(#[values(0, 153434375)] rng_seed: u64) {
    let (graph, plan) = default_fixture("6x6");
    let params = full_params(6, 6, 500, rng_seed);
    let first = recorded_run(&graph, &plan, &params);
    let second = recorded_run(&graph, &plan, &params);
    assert!(!first.0.is_empty());
    assert_eq!(first.0, second.0);
    assert_eq!(first.1, second.1);
    assert_eq!(first.2, second.2);
    assert_eq!(first.3, second.3);
}

#[rstest]
fn test_histogram_conservation(#[values(0, 1, 10, 250)] num_steps: u64) {
    let (graph, plan) = default_fixture("3x3");
    let params = params(3, 3, num_steps, 7);
    let (records, seat_wins, dist_wins, _) = recorded_run(&graph, &plan, &params);
    assert_eq!(seat_wins.len(), 4);
    assert_eq!(seat_wins.iter().sum::<u64>(), num_steps + 1);
    // Each held district contributes one visit per state, so the
    // per-district totals add up to the seat-weighted histogram.
    let weighted: u64 = seat_wins
        .iter()
        .enumerate()
        .map(|(seats, &count)| seats as u64 * count)
        .sum();
    assert_eq!(dist_wins.iter().sum::<u64>(), weighted);
    assert!(records.len() as u64 <= num_steps);
}

#[rstest]
#[case(vec![0, 1, 1, 0], vec![1, 0, 0])]
#[case(vec![0, 0, 1, 1], vec![0, 1, 0])]
#[case(vec![0, 0, 0, 0], vec![0, 0, 1])]
fn test_zero_steps_2x2(#[case] parties: Vec<u8>, #[case] expected: Vec<u64>) {
    // Districts are the rows {a, b} and {c, d}.
    let graph = Graph::rect_grid(2, 2);
    let plan = Plan::from_labels(&graph, &[0, 0, 1, 1], &parties).unwrap();
    let (records, seat_wins, _, final_plan) = recorded_run(&graph, &plan, &params(2, 2, 0, 0));
    assert!(records.is_empty());
    assert_eq!(seat_wins, expected);
    assert_eq!(final_plan, plan);
}

#[test]
fn test_stripes_run() {
    let (graph, plan) = stripes(4, 4, &[0, 1, 1, 0, 1, 0, 0, 1, 1, 1, 0, 0, 0, 1, 0, 1]).unwrap();
    let (_, seat_wins, _, final_plan) = recorded_run(&graph, &plan, &full_params(4, 4, 300, 12));
    assert_eq!(seat_wins.iter().sum::<u64>(), 301);
    assert!(final_plan.is_contiguous(&graph));
    assert!(final_plan.dist_nodes.iter().all(|nodes| nodes.len() == 4));
}

#[test]
fn test_stuck_chain() {
    // 0 - 1 - 2 - 3 split as {0, 1} / {2, 3}: every swap disconnects.
    let path = Graph::from_neighbors(vec![vec![1], vec![0, 2], vec![1, 3], vec![2]]);
    let plan = Plan::from_labels(&path, &[0, 0, 1, 1], &[0, 1, 0, 1]).unwrap();
    let writer = Box::new(RecordingWriter {
        records: Arc::new(Mutex::new(Vec::new())),
    }) as Box<dyn StatsWriter>;
    let result = run_chain(&path, &plan, writer, &params(2, 2, 10, 0));
    assert_eq!(result.err(), Some(ChainError::StuckChain { step: 0 }));
}

#[test]
fn test_invalid_configuration() {
    let (graph, plan) = default_fixture("3x3");
    let writer = Box::new(RecordingWriter {
        records: Arc::new(Mutex::new(Vec::new())),
    }) as Box<dyn StatsWriter>;
    let result = run_chain(&graph, &plan, writer, &params(3, 4, 10, 0));
    assert!(matches!(result, Err(ChainError::InvalidConfiguration(_))));
}

#[test]
fn test_isolated_singleton_never_swappable() {
    // Node 4 has no neighbors; any swap would strand it in a larger district.
    let graph = Graph::from_neighbors(vec![vec![1], vec![0, 2], vec![1, 3], vec![2], vec![]]);
    let plan = Plan::from_labels(&graph, &[0, 0, 1, 1, 2], &[0; 5]).unwrap();
    let swaps = SwapSet::build_full(&graph, &plan);
    assert!(swaps.iter().all(|&(x, y)| x != 4 && y != 4));
}

#[rstest]
#[case(true, 0)]
#[case(false, 0)]
#[case(false, 3)]
fn test_writer_failure_is_reported(
    #[case] fail_on_init: bool,
    #[case] steps_before_failure: usize,
) {
    let (graph, plan) = default_fixture("6x6");
    let writer = Box::new(BrokenWriter {
        fail_on_init,
        steps_before_failure,
    }) as Box<dyn StatsWriter>;
    let result = run_chain(&graph, &plan, writer, &full_params(6, 6, 500, 153434375));
    match result {
        Err(ChainError::WriterFailed(msg)) => assert!(msg.contains("stdout closed")),
        Err(e) => panic!("unexpected chain error: {}", e),
        Ok(_) => panic!("a broken writer must fail the run"),
    }
}
