//! The swap contiguity oracle.
//!
//! Swapping `x` (in district `Dx`) with `y` (in district `Dy`) replaces `x`
//! by `y` in `Dx` and `y` by `x` in `Dy`. The new `Dx` is connected iff
//! every connected component of `Dx - {x}` contains a neighbor of `y`;
//! symmetrically for `Dy`. Rather than enumerating components, we
//! flood-fill `Dx - {x}` from the neighbors of `y` and check that the fill
//! reaches all of it.
use crate::buffers::VisitBuffer;
use crate::graph::Graph;
use crate::plan::Plan;

/// Decides whether exchanging the districts of `x` and `y` keeps both
/// affected districts contiguous.
///
/// Pairs in the same district (including `x == y`) are never valid.
pub fn is_valid_swap(graph: &Graph, plan: &Plan, x: usize, y: usize) -> bool {
    let mut buf = VisitBuffer::new(graph.len());
    is_valid_swap_buffered(graph, plan, x, y, &mut buf)
}

/// [is_valid_swap] with a caller-provided traversal buffer.
pub fn is_valid_swap_buffered(
    graph: &Graph,
    plan: &Plan,
    x: usize,
    y: usize,
    buf: &mut VisitBuffer,
) -> bool {
    if plan.assignments[x] == plan.assignments[y] {
        return false;
    }
    bridges_remainder(graph, plan, x, y, buf) && bridges_remainder(graph, plan, y, x, buf)
}

/// Checks that `inserted` touches every component of the district of
/// `removed` once `removed` is taken out.
fn bridges_remainder(
    graph: &Graph,
    plan: &Plan,
    removed: usize,
    inserted: usize,
    buf: &mut VisitBuffer,
) -> bool {
    let dist = plan.assignments[removed];
    let remainder = plan.dist_size(dist as usize) - 1;
    if remainder == 0 {
        return true;
    }

    buf.clear();
    buf.visit(removed);
    let mut reached = 0;
    for &seed in graph.neighbors[inserted].iter() {
        if plan.assignments[seed] == dist && buf.visit(seed) {
            reached += 1;
            buf.queue.push_back(seed);
        }
    }
    while let Some(next) = buf.queue.pop_front() {
        for &neighbor in graph.neighbors[next].iter() {
            if plan.assignments[neighbor] == dist && buf.visit(neighbor) {
                reached += 1;
                buf.queue.push_back(neighbor);
            }
        }
    }
    reached == remainder
}
