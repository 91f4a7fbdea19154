// Tests for the bounded-radius swap set update. A swap can change the
// legality of pairs arbitrarily far away, so the local update is only
// exact on some graphs; the full update is exact everywhere.
use swapwalk::contiguity::is_valid_swap;
use swapwalk::graph::Graph;
use swapwalk::plan::Plan;
use swapwalk::swaps::{SwapBuffer, SwapSet, UndoLog, UpdateMode};

use rstest::rstest;
use test_fixtures::default_fixture;

const E: usize = 8;
const W: usize = 9;

/// An 8-cycle `c0..c7` (nodes 0-7) with a pendant `e` on `c1` and a node
/// `w` bridging `c3` and `c4`. District 0 is `{e, c1, ..., c7}`, district 1
/// is `{w}` and district 2 is `{c0}`.
///
/// Swapping `e` and `c0` closes the cycle inside district 0, which makes
/// the swap `(c4, w)` legal even though neither endpoint is within two hops
/// of `e` or `c0`.
fn ring_with_spur() -> (Graph, Plan) {
    let mut neighbors: Vec<Vec<usize>> = (0..8).map(|i| vec![(i + 7) % 8, (i + 1) % 8]).collect();
    neighbors.push(vec![1]);
    neighbors.push(vec![3, 4]);
    neighbors[1].push(E);
    neighbors[3].push(W);
    neighbors[4].push(W);
    let graph = Graph::from_neighbors(neighbors);
    let assignments = vec![2, 0, 0, 0, 0, 0, 0, 0, 0, 1];
    let plan = Plan::from_labels(&graph, &assignments, &[0; 10]).unwrap();
    (graph, plan)
}

#[test]
fn test_far_pair_flips_legality() {
    let (graph, mut plan) = ring_with_spur();
    assert!(is_valid_swap(&graph, &plan, E, 0));
    assert!(!is_valid_swap(&graph, &plan, 4, W));
    plan.swap(E, 0);
    assert!(plan.is_contiguous(&graph));
    assert!(is_valid_swap(&graph, &plan, 4, W));
}

#[test]
fn test_local_update_misses_far_pair() {
    let (graph, mut plan) = ring_with_spur();
    let mut swaps = SwapSet::build_full(&graph, &plan);
    assert!(swaps.contains(E, 0));
    assert!(!swaps.contains(4, W));

    plan.swap(E, 0);
    let mut buf = SwapBuffer::new(graph.len());
    let mut log = UndoLog::default();
    swaps.update(&graph, &plan, E, 0, UpdateMode::Local, &mut buf, &mut log);
    assert!(!swaps.contains(4, W));
    assert!(SwapSet::build_full(&graph, &plan).contains(4, W));
}

#[test]
fn test_full_update_matches_rebuild() {
    let (graph, mut plan) = ring_with_spur();
    let mut swaps = SwapSet::build_full(&graph, &plan);
    let before: Vec<_> = swaps.iter().cloned().collect();
    plan.swap(E, 0);
    let mut buf = SwapBuffer::new(graph.len());
    let mut log = UndoLog::default();
    swaps.update(&graph, &plan, E, 0, UpdateMode::Full, &mut buf, &mut log);
    assert!(swaps.contains(4, W));
    assert_eq!(
        swaps.sorted_pairs(),
        SwapSet::build_full(&graph, &plan).sorted_pairs()
    );

    // Undoing the swap restores the original set and sampling order.
    swaps.rollback(&mut log);
    let after: Vec<_> = swaps.iter().cloned().collect();
    assert_eq!(after, before);
}

/// Walks every legal first swap from the fixture and checks that both
/// update modes agree with a rebuild on grids where locality holds.
#[rstest]
fn test_local_update_exact_on_grid(
    #[values(UpdateMode::Local, UpdateMode::Full)] mode: UpdateMode,
) {
    let (graph, plan) = default_fixture("3x3");
    let swaps = SwapSet::build_full(&graph, &plan);
    let mut buf = SwapBuffer::new(graph.len());
    for &(x, y) in swaps.iter() {
        let mut next_plan = plan.clone();
        next_plan.swap(x, y);
        let mut next = swaps.clone();
        let mut log = UndoLog::default();
        next.update(&graph, &next_plan, x, y, mode, &mut buf, &mut log);
        assert_eq!(
            next.sorted_pairs(),
            SwapSet::build_full(&graph, &next_plan).sorted_pairs()
        );
        for &(z, w) in next.iter() {
            let mut second = next_plan.clone();
            second.swap(z, w);
            let mut after = next.clone();
            let mut log = UndoLog::default();
            after.update(&graph, &second, z, w, mode, &mut buf, &mut log);
            assert_eq!(
                after.sorted_pairs(),
                SwapSet::build_full(&graph, &second).sorted_pairs()
            );
        }
    }
}
