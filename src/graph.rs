//! A lightweight precinct adjacency graph.

/// Edges are pairs of node indices.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Edge(pub usize, pub usize);

/// A lightweight, immutable precinct graph.
///
/// Precincts are represented implicitly by their indices `0..n`; the
/// topology never changes over the course of a chain run.
#[derive(Clone, Debug)]
pub struct Graph {
    /// The graph's edges, represented as pairs of node indices,
    /// sorted by the first element of the pair.
    pub edges: Vec<Edge>,
    /// The graph's adjacencies (list-of-lists format).
    pub neighbors: Vec<Vec<usize>>,
}

impl Graph {
    /// Builds a graph from an adjacency list. Each undirected edge
    /// should appear in both endpoints' lists.
    pub fn from_neighbors(neighbors: Vec<Vec<usize>>) -> Graph {
        let mut edges = Vec::<Edge>::new();
        for (node, adj) in neighbors.iter().enumerate() {
            for &neighbor in adj.iter() {
                if neighbor > node {
                    edges.push(Edge(node, neighbor));
                }
            }
        }
        Graph { edges, neighbors }
    }

    /// Returns a `rows` x `cols` grid graph with rook adjacency.
    /// The node at (`row`, `col`) has index `row * cols + col`.
    pub fn rect_grid(rows: usize, cols: usize) -> Graph {
        let mut neighbors = vec![Vec::<usize>::with_capacity(4); rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                let node = row * cols + col;
                if row > 0 {
                    neighbors[node].push(node - cols);
                }
                if col > 0 {
                    neighbors[node].push(node - 1);
                }
                if col + 1 < cols {
                    neighbors[node].push(node + 1);
                }
                if row + 1 < rows {
                    neighbors[node].push(node + cols);
                }
            }
        }
        Graph::from_neighbors(neighbors)
    }

    /// The number of precincts in the graph.
    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }
}
