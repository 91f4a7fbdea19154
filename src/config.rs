//! Chain parameters and helpers for parsing configuration strings.
use crate::error::ChainError;
use crate::graph::Graph;
use crate::plan::Plan;
pub use crate::swaps::UpdateMode;
use anyhow::{bail, Context, Result};
use serde_json::Value;

/// Parameters of a swap chain run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainParams {
    /// The number of districts (`D`).
    pub num_dists: u32,
    /// The number of precincts per district (`S`).
    pub dist_size: u32,
    /// The number of chain steps, accepted and rejected alike.
    pub num_steps: u64,
    /// The seed of the RNG used to draw and accept proposals.
    pub rng_seed: u64,
    /// The party whose seats are counted.
    pub target_party: u8,
    /// How the swap set is patched after each proposal.
    pub update_mode: UpdateMode,
}

impl ChainParams {
    /// Target-party precincts a district needs for a majority.
    pub fn win_threshold(&self) -> u32 {
        self.dist_size / 2 + 1
    }

    /// Checks the parameters against the graph and starting plan.
    ///
    /// Swaps preserve district sizes, so every district must already hold
    /// exactly `dist_size` precincts.
    pub fn validate(&self, graph: &Graph, plan: &Plan) -> Result<(), ChainError> {
        if self.num_dists == 0 || self.dist_size == 0 {
            return Err(ChainError::config(format!(
                "Degenerate dimensions: {} districts of size {}",
                self.num_dists, self.dist_size
            )));
        }
        let expected = self.num_dists as usize * self.dist_size as usize;
        if graph.len() != expected {
            return Err(ChainError::config(format!(
                "Mismatch: graph has {} nodes, expected {} districts x {} nodes",
                graph.len(),
                self.num_dists,
                self.dist_size
            )));
        }
        if plan.num_dists != self.num_dists {
            return Err(ChainError::config(format!(
                "Mismatch: plan has {} districts, expected {}",
                plan.num_dists, self.num_dists
            )));
        }
        for (dist, nodes) in plan.dist_nodes.iter().enumerate() {
            if nodes.len() != self.dist_size as usize {
                return Err(ChainError::config(format!(
                    "District {} has {} nodes, expected {}",
                    dist,
                    nodes.len(),
                    self.dist_size
                )));
            }
        }
        if self.target_party > 1 {
            return Err(ChainError::config(format!(
                "Invalid target party {}",
                self.target_party
            )));
        }
        Ok(())
    }
}

/// Parses a JSON array of 0/1 party labels, e.g. `[0, 1, 1, 0]`.
pub fn parse_party_labels(raw: &str) -> Result<Vec<u8>> {
    let data: Value = serde_json::from_str(raw).context("Could not parse party labels")?;
    let labels = data.as_array().context("Party labels must be a JSON array")?;
    labels
        .iter()
        .map(|label| match label.as_u64() {
            Some(p) if p <= 1 => Ok(p as u8),
            _ => bail!("Invalid party label {}", label),
        })
        .collect()
}
