//! Districting plans with party labels.
use crate::buffers::VisitBuffer;
use crate::error::ChainError;
use crate::graph::Graph;

/// A districting plan on top of a [Graph], plus a fixed party label
/// per precinct. The graph is referenced implicitly (we don't store a
/// reference to it).
#[derive(Clone, Debug, PartialEq)]
pub struct Plan {
    /// The number of districts in the plan.
    pub num_dists: u32,
    /// An assignment vector mapping precincts to district labels.
    pub assignments: Vec<u32>,
    /// A party vector mapping precincts to party labels (0 or 1).
    /// Party labels never change over a chain run.
    pub parties: Vec<u8>,
    /// The precincts in each district (a list-of-lists representation).
    /// This should be consistent with `assignments`.
    pub dist_nodes: Vec<Vec<usize>>,
}

impl Plan {
    /// Builds a plan from 0-indexed district labels and party labels.
    ///
    /// Every district in `0..=max(assignments)` must be non-empty and
    /// contiguous.
    pub fn from_labels(
        graph: &Graph,
        assignments: &[u32],
        parties: &[u8],
    ) -> Result<Plan, ChainError> {
        if assignments.is_empty() {
            return Err(ChainError::config("Empty assignment vector"));
        }
        if assignments.len() != graph.len() {
            return Err(ChainError::config(format!(
                "Mismatch: graph has {} nodes, assignment vector has {} nodes",
                graph.len(),
                assignments.len()
            )));
        }
        if parties.len() != graph.len() {
            return Err(ChainError::config(format!(
                "Mismatch: graph has {} nodes, party vector has {} nodes",
                graph.len(),
                parties.len()
            )));
        }
        if let Some(bad) = parties.iter().find(|&&p| p > 1) {
            return Err(ChainError::config(format!("Invalid party label {}", bad)));
        }
        // Every district needs a node, so labels are bounded by the node count.
        if let Some(bad) = assignments.iter().find(|&&a| a as usize >= assignments.len()) {
            return Err(ChainError::config(format!(
                "Invalid district label {} for {} nodes",
                bad,
                assignments.len()
            )));
        }
        let num_dists = assignments.iter().max().map_or(0, |&max| max + 1);

        let mut dist_nodes = vec![Vec::<usize>::new(); num_dists as usize];
        for (node, &assignment) in assignments.iter().enumerate() {
            dist_nodes[assignment as usize].push(node);
        }
        for (dist, nodes) in dist_nodes.iter().enumerate() {
            if nodes.is_empty() {
                return Err(ChainError::config(format!("District {} has no nodes", dist)));
            }
        }
        let plan = Plan {
            num_dists,
            assignments: assignments.to_vec(),
            parties: parties.to_vec(),
            dist_nodes,
        };
        if let Some(dist) = plan.first_disconnected(graph) {
            return Err(ChainError::config(format!(
                "District {} is not contiguous",
                dist
            )));
        }
        Ok(plan)
    }

    /// Builds a plan from space-delimited, 0-indexed district labels
    /// and party labels.
    pub fn from_label_strs(
        graph: &Graph,
        assignments: &str,
        parties: &str,
    ) -> Result<Plan, ChainError> {
        let assignments: Vec<u32> = assignments
            .split_whitespace()
            .map(|a| a.parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|_| ChainError::config("Could not parse assignments"))?;
        let parties: Vec<u8> = parties
            .split_whitespace()
            .map(|p| p.parse::<u8>())
            .collect::<Result<_, _>>()
            .map_err(|_| ChainError::config("Could not parse parties"))?;
        Plan::from_labels(graph, &assignments, &parties)
    }

    /// Exchanges the district labels of `x` and `y`.
    ///
    /// Swapping is its own inverse, which is how rejected proposals
    /// are rolled back.
    pub fn swap(&mut self, x: usize, y: usize) {
        let dist_x = self.assignments[x];
        let dist_y = self.assignments[y];
        if dist_x == dist_y {
            return;
        }
        self.assignments[x] = dist_y;
        self.assignments[y] = dist_x;
        for &dist in [dist_x, dist_y].iter() {
            for node in self.dist_nodes[dist as usize].iter_mut() {
                if *node == x {
                    *node = y;
                } else if *node == y {
                    *node = x;
                }
            }
        }
    }

    /// The number of precincts in district `dist`.
    pub fn dist_size(&self, dist: usize) -> usize {
        self.dist_nodes[dist].len()
    }

    /// Counts the precincts holding `party` in each district.
    pub fn dist_party_counts(&self, party: u8) -> Vec<u32> {
        self.dist_nodes
            .iter()
            .map(|nodes| nodes.iter().filter(|&&n| self.parties[n] == party).count() as u32)
            .collect()
    }

    /// The share of all precincts holding `party`.
    pub fn party_share(&self, party: u8) -> f64 {
        if self.parties.is_empty() {
            return 0.0;
        }
        let count = self.parties.iter().filter(|&&p| p == party).count();
        count as f64 / self.parties.len() as f64
    }

    /// The indices of edges in `graph` that connect different districts.
    pub fn cut_edges(&self, graph: &Graph) -> Vec<usize> {
        graph
            .edges
            .iter()
            .enumerate()
            .filter(|(_, edge)| self.assignments[edge.0] != self.assignments[edge.1])
            .map(|(idx, _)| idx)
            .collect()
    }

    /// Checks that every district induces a connected subgraph.
    pub fn is_contiguous(&self, graph: &Graph) -> bool {
        self.first_disconnected(graph).is_none()
    }

    /// Returns the lowest-labeled disconnected district, if any.
    fn first_disconnected(&self, graph: &Graph) -> Option<usize> {
        let mut buf = VisitBuffer::new(graph.len());
        for (dist, nodes) in self.dist_nodes.iter().enumerate() {
            if nodes.is_empty() {
                continue;
            }
            buf.clear();
            buf.visit(nodes[0]);
            buf.queue.push_back(nodes[0]);
            let mut seen = 1;
            while let Some(next) = buf.queue.pop_front() {
                for &neighbor in graph.neighbors[next].iter() {
                    if self.assignments[neighbor] as usize == dist && buf.visit(neighbor) {
                        seen += 1;
                        buf.queue.push_back(neighbor);
                    }
                }
            }
            if seen != nodes.len() {
                return Some(dist);
            }
        }
        None
    }
}
