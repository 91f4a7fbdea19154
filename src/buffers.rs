//! Buffer data structures to avoid memory reallocation.
pub use self::ball::BallBuffer;
pub use self::visit::VisitBuffer;

/// Buffers are intended to be lightweight, reusable containers
/// that improve the efficiency of inner loops. Fields are intended
/// to be mutated directly, and invariants are not strictly enforced.

/// Buffer for breadth-first traversals.
mod visit {
    use std::collections::VecDeque;

    /// A reusable visited set and queue for traversals over a graph of
    /// size `n`.
    ///
    /// Marks are epoch-stamped: bumping `epoch` clears the set in O(1).
    pub struct VisitBuffer {
        /// The epoch at which each node was last marked.
        pub marks: Vec<u32>,
        /// The current epoch. A node is visited iff `marks[node] == epoch`.
        pub epoch: u32,
        /// The traversal frontier.
        pub queue: VecDeque<usize>,
    }

    impl VisitBuffer {
        /// Creates a new [VisitBuffer] for a graph of size `n`.
        pub fn new(n: usize) -> VisitBuffer {
            VisitBuffer {
                marks: vec![0; n],
                epoch: 1,
                queue: VecDeque::with_capacity(n),
            }
        }

        /// Resets the buffer.
        pub fn clear(&mut self) {
            self.queue.clear();
            if self.epoch == u32::MAX {
                self.marks.fill(0);
                self.epoch = 0;
            }
            self.epoch += 1;
        }

        /// Marks `node` as visited. Returns `false` if it already was.
        #[inline]
        pub fn visit(&mut self, node: usize) -> bool {
            if self.marks[node] == self.epoch {
                return false;
            }
            self.marks[node] = self.epoch;
            true
        }

        #[inline]
        pub fn visited(&self, node: usize) -> bool {
            self.marks[node] == self.epoch
        }
    }
}

/// Buffer for bounded-depth neighborhoods.
mod ball {
    use super::VisitBuffer;
    use crate::graph::Graph;

    /// A reusable buffer for the set of nodes within a fixed hop
    /// distance of a set of seed nodes.
    pub struct BallBuffer {
        /// The nodes in the ball, in BFS order (seeds first).
        pub nodes: Vec<usize>,
        /// Hop distance of each entry in `nodes`.
        depths: Vec<usize>,
        visit: VisitBuffer,
    }

    impl BallBuffer {
        /// Creates a new [BallBuffer] for a graph of size `n`.
        pub fn new(n: usize) -> BallBuffer {
            BallBuffer {
                nodes: Vec::with_capacity(n),
                depths: Vec::with_capacity(n),
                visit: VisitBuffer::new(n),
            }
        }

        /// Collects every node within `depth` hops of any of `seeds`.
        pub fn fill(&mut self, graph: &Graph, seeds: &[usize], depth: usize) {
            self.nodes.clear();
            self.depths.clear();
            self.visit.clear();
            for &seed in seeds.iter() {
                if self.visit.visit(seed) {
                    self.nodes.push(seed);
                    self.depths.push(0);
                }
            }
            let mut head = 0;
            while head < self.nodes.len() {
                let (node, d) = (self.nodes[head], self.depths[head]);
                head += 1;
                if d == depth {
                    continue;
                }
                for &neighbor in graph.neighbors[node].iter() {
                    if self.visit.visit(neighbor) {
                        self.nodes.push(neighbor);
                        self.depths.push(d + 1);
                    }
                }
            }
        }

        /// Checks whether `node` is in the last filled ball.
        #[inline]
        pub fn contains(&self, node: usize) -> bool {
            self.visit.visited(node)
        }
    }
}
