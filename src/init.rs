//! Utility functions for building graph and plan data.
use crate::error::ChainError;
use crate::graph::Graph;
use crate::plan::Plan;
use anyhow::{bail, Context, Result};
use std::convert::TryFrom;
use rand::Rng;
use serde_json::Value;
use std::fs;

/// Builds the toy instance: a grid of `num_dists` columns and `dist_size`
/// rows, where column `i` is district `i`.
///
/// The node at (`row`, `col`) has index `row * num_dists + col`.
pub fn stripes(
    num_dists: u32,
    dist_size: u32,
    parties: &[u8],
) -> Result<(Graph, Plan), ChainError> {
    if num_dists == 0 || dist_size == 0 {
        return Err(ChainError::config(format!(
            "Degenerate grid: {} districts of size {}",
            num_dists, dist_size
        )));
    }
    let (cols, rows) = (num_dists as usize, dist_size as usize);
    let graph = Graph::rect_grid(rows, cols);
    let assignments: Vec<u32> = (0..rows * cols).map(|node| (node % cols) as u32).collect();
    let plan = Plan::from_labels(&graph, &assignments, parties)?;
    Ok((graph, plan))
}

/// Draws independent party labels: each precinct holds `party` with
/// probability `share` and the other party otherwise.
pub fn random_parties<R: Rng + ?Sized>(n: usize, party: u8, share: f64, rng: &mut R) -> Vec<u8> {
    (0..n)
        .map(|_| if rng.gen::<f64>() < share { party } else { 1 - party })
        .collect()
}

/// Loads graph and plan data in the NetworkX `adjacency_data` format
/// used by [GerryChain](https://github.com/mggg/gerrychain). Returns a
/// [anyhow::Result] containing a [Graph] and a [Plan] upon a successful
/// load.
///
/// # Arguments
///
/// * `path` - the path of the graph JSON file.
/// * `assignment_col` - A column in the graph JSON corresponding to a
///    a seed plan. This column should be integer-valued and 1-indexed.
/// * `party_col` - A column in the graph JSON holding 0/1 party labels.
pub fn from_networkx(path: &str, assignment_col: &str, party_col: &str) -> Result<(Graph, Plan)> {
    let (graph, data) = graph_from_networkx(path)?;
    let plan = plan_from_networkx(&graph, &data, assignment_col, party_col)?;
    Ok((graph, plan))
}

/// Reads a seed plan out of the node attributes of a NetworkX
/// `adjacency_data` JSON tree.
pub fn plan_from_networkx(
    graph: &Graph,
    data: &Value,
    assignment_col: &str,
    party_col: &str,
) -> Result<Plan> {
    let raw_nodes = data["nodes"].as_array().context("Could not find `nodes`")?;
    let mut assignments = Vec::<u32>::with_capacity(raw_nodes.len());
    let mut parties = Vec::<u8>::with_capacity(raw_nodes.len());
    for (index, node) in raw_nodes.iter().enumerate() {
        let assignment = node[assignment_col]
            .as_u64()
            .with_context(|| format!("Node {} has no integer `{}`", index, assignment_col))?;
        if assignment == 0 {
            bail!("Assignments must be 1-indexed (node {})", index);
        }
        let assignment = u32::try_from(assignment - 1).with_context(|| {
            format!("Assignment {} of node {} is out of range", assignment, index)
        })?;
        assignments.push(assignment);
        let party = node[party_col]
            .as_u64()
            .with_context(|| format!("Node {} has no integer `{}`", index, party_col))?;
        if party > 1 {
            bail!("Invalid party label {} (node {})", party, index);
        }
        parties.push(party as u8);
    }
    Ok(Plan::from_labels(graph, &assignments, &parties)?)
}

/// Loads graph data in the NetworkX `adjacency_data` format. Returns a
/// [anyhow::Result] containing a [Graph] and the raw graph JSON tree upon
/// a successful load.
pub fn graph_from_networkx(path: &str) -> Result<(Graph, Value)> {
    let raw = fs::read_to_string(path).with_context(|| format!("Could not load graph {}", path))?;
    let data: Value = serde_json::from_str(&raw).context("Could not parse graph JSON")?;

    let raw_nodes = data["nodes"].as_array().context("Could not find `nodes`")?;
    let raw_adj = data["adjacency"]
        .as_array()
        .context("Could not find `adjacency`")?;
    let num_nodes = raw_nodes.len();
    if raw_adj.len() != num_nodes {
        bail!(
            "Mismatch: {} nodes, {} adjacency lists",
            num_nodes,
            raw_adj.len()
        );
    }
    let mut neighbors = Vec::<Vec<usize>>::with_capacity(num_nodes);
    for (index, adj) in raw_adj.iter().enumerate() {
        let node_neighbors = adj
            .as_array()
            .with_context(|| format!("Adjacency of node {} is not a list", index))?
            .iter()
            .map(|n| {
                n["id"]
                    .as_u64()
                    .map(|id| id as usize)
                    .filter(|&id| id < num_nodes)
                    .with_context(|| format!("Bad neighbor of node {}", index))
            })
            .collect::<Result<Vec<usize>>>()?;
        neighbors.push(node_neighbors);
    }
    Ok((Graph::from_neighbors(neighbors), data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use serde_json::json;

    fn two_node_data(parties: (u64, u64), dists: (u64, u64)) -> Value {
        json!({
            "nodes": [
                {"id": 0, "district": dists.0, "party": parties.0},
                {"id": 1, "district": dists.1, "party": parties.1},
            ],
            "adjacency": [[{"id": 1}], [{"id": 0}]],
        })
    }

    #[test]
    fn stripes_are_columns() {
        let (graph, plan) = stripes(3, 2, &[0; 6]).unwrap();
        assert_eq!(graph.len(), 6);
        assert_eq!(plan.assignments, vec![0, 1, 2, 0, 1, 2]);
        assert_eq!(plan.dist_nodes, vec![vec![0, 3], vec![1, 4], vec![2, 5]]);
    }

    #[test]
    fn stripes_degenerate() {
        assert!(matches!(
            stripes(0, 5, &[]),
            Err(ChainError::InvalidConfiguration(_))
        ));
        assert!(matches!(
            stripes(5, 0, &[]),
            Err(ChainError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn random_parties_extremes() {
        let mut rng = SmallRng::seed_from_u64(7);
        assert_eq!(random_parties(5, 0, 1.0, &mut rng), vec![0; 5]);
        assert_eq!(random_parties(5, 0, 0.0, &mut rng), vec![1; 5]);
        assert_eq!(random_parties(5, 1, 1.0, &mut rng), vec![1; 5]);
    }

    #[test]
    fn random_parties_deterministic() {
        let a = random_parties(50, 0, 0.5, &mut SmallRng::seed_from_u64(42));
        let b = random_parties(50, 0, 0.5, &mut SmallRng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn plan_from_networkx_one_indexed() {
        let graph = Graph::from_neighbors(vec![vec![1], vec![0]]);
        let data = two_node_data((0, 1), (1, 2));
        let plan = plan_from_networkx(&graph, &data, "district", "party").unwrap();
        assert_eq!(plan.assignments, vec![0, 1]);
        assert_eq!(plan.parties, vec![0, 1]);
    }

    #[test]
    fn plan_from_networkx_rejects_wide_party() {
        let graph = Graph::from_neighbors(vec![vec![1], vec![0]]);
        let data = two_node_data((256, 0), (1, 1));
        assert!(plan_from_networkx(&graph, &data, "district", "party").is_err());
        let data = two_node_data((2, 0), (1, 1));
        assert!(plan_from_networkx(&graph, &data, "district", "party").is_err());
    }

    #[test]
    fn plan_from_networkx_rejects_wide_assignment() {
        let graph = Graph::from_neighbors(vec![vec![1], vec![0]]);
        let data = two_node_data((0, 0), (1, 1 << 33));
        assert!(plan_from_networkx(&graph, &data, "district", "party").is_err());
        let data = two_node_data((0, 0), (0, 1));
        assert!(plan_from_networkx(&graph, &data, "district", "party").is_err());
    }
}
