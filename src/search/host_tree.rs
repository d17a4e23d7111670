//! Host-resident balanced k-d tree over a flat coordinate mirror.
//!
//! The tree owns the only host-side copy of the point coordinates. It is
//! built once per dataset snapshot and never mutated afterwards; all three
//! query modes traverse it read-only, so shared references can be queried
//! concurrently without locking.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Maximum number of points in a leaf node before we split.
const LEAF_SIZE: usize = 16;

/// A single neighbor candidate: original dataset index and squared
/// Euclidean distance to the query point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Neighbor {
    pub index: usize,
    pub distance2: f64,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap by distance: the current worst candidate sits on top and
        // is evicted first once the heap is full.
        self.distance2
            .partial_cmp(&other.distance2)
            .unwrap_or(Ordering::Equal)
    }
}

/// Internal node representation stored in a flat array.
#[derive(Debug, Clone)]
enum Node {
    /// Interior node: split dimension, split value, child node indices.
    Split {
        dim: usize,
        value: f64,
        left: usize,
        right: usize,
    },
    /// Leaf node: range [start..end) into the reordered coordinate rows.
    Leaf { start: usize, end: usize },
}

/// Balanced k-d tree with runtime dimensionality.
///
/// Coordinates are stored row-major and reordered leaf-contiguous during the
/// build; `dataset_indices` maps each row position back to the original
/// dataset index.
#[derive(Debug, Clone)]
pub(crate) struct HostKdTree {
    nodes: Vec<Node>,
    coords: Vec<f64>,
    dataset_indices: Vec<usize>,
    dim: usize,
}

impl HostKdTree {
    /// Build a tree over `n` points of dimension `dim`, `coords.len() == n * dim`.
    ///
    /// The caller guarantees `n >= 1` and `dim >= 1`.
    pub fn build(coords: Vec<f64>, dim: usize) -> Self {
        debug_assert!(dim >= 1);
        debug_assert!(!coords.is_empty() && coords.len() % dim == 0);

        let n = coords.len() / dim;
        let mut tree = HostKdTree {
            nodes: Vec::new(),
            coords,
            dataset_indices: (0..n).collect(),
            dim,
        };

        let mut order: Vec<usize> = (0..n).collect();
        tree.build_recursive(&mut order, 0, n);

        // Reorder rows leaf-contiguous so each leaf scans a dense range.
        let mut coords = vec![0.0; tree.coords.len()];
        let mut dataset_indices = vec![0; n];
        for (new_pos, &old_pos) in order.iter().enumerate() {
            coords[new_pos * dim..(new_pos + 1) * dim]
                .copy_from_slice(&tree.coords[old_pos * dim..(old_pos + 1) * dim]);
            dataset_indices[new_pos] = tree.dataset_indices[old_pos];
        }
        tree.coords = coords;
        tree.dataset_indices = dataset_indices;

        tree
    }

    pub fn len(&self) -> usize {
        self.dataset_indices.len()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// The flat row-major coordinate mirror (leaf-contiguous order).
    pub fn coords(&self) -> &[f64] {
        &self.coords
    }

    fn build_recursive(&mut self, order: &mut [usize], start: usize, end: usize) -> usize {
        let count = end - start;

        if count <= LEAF_SIZE {
            let node_idx = self.nodes.len();
            self.nodes.push(Node::Leaf { start, end });
            return node_idx;
        }

        let split_dim = self.pick_split_dim(&order[start..end]);
        let median = count / 2;
        {
            let slice = &mut order[start..end];
            let coords = &self.coords;
            let dim = self.dim;
            slice.select_nth_unstable_by(median, |&a, &b| {
                coords[a * dim + split_dim]
                    .partial_cmp(&coords[b * dim + split_dim])
                    .unwrap_or(Ordering::Equal)
            });
        }
        let median_pos = start + median;
        let split_value = self.coords[order[median_pos] * self.dim + split_dim];

        // Placeholder, overwritten once both children are in place.
        let node_idx = self.nodes.len();
        self.nodes.push(Node::Leaf { start: 0, end: 0 });

        let left = self.build_recursive(order, start, median_pos);
        let right = self.build_recursive(order, median_pos, end);

        self.nodes[node_idx] = Node::Split {
            dim: split_dim,
            value: split_value,
            left,
            right,
        };

        node_idx
    }

    /// Split along the dimension with the largest coordinate spread.
    fn pick_split_dim(&self, order: &[usize]) -> usize {
        let mut best_dim = 0;
        let mut best_spread = f64::NEG_INFINITY;

        for d in 0..self.dim {
            let mut lo = f64::INFINITY;
            let mut hi = f64::NEG_INFINITY;
            for &idx in order {
                let v = self.coords[idx * self.dim + d];
                if v < lo {
                    lo = v;
                }
                if v > hi {
                    hi = v;
                }
            }
            let spread = hi - lo;
            if spread > best_spread {
                best_spread = spread;
                best_dim = d;
            }
        }

        best_dim
    }

    #[inline]
    fn distance2(&self, pos: usize, query: &[f64]) -> f64 {
        let row = &self.coords[pos * self.dim..(pos + 1) * self.dim];
        let mut sum = 0.0;
        for (a, b) in row.iter().zip(query) {
            let d = a - b;
            sum += d * d;
        }
        sum
    }

    /// The `k` nearest neighbors, sorted ascending by squared distance.
    ///
    /// The caller guarantees `1 <= k <= self.len()` and
    /// `query.len() == self.dim`; exactly `k` neighbors are returned.
    pub fn knn(&self, query: &[f64], k: usize) -> Vec<Neighbor> {
        let mut heap = BinaryHeap::with_capacity(k);
        self.knn_recursive(0, query, k, f64::INFINITY, &mut heap);
        heap.into_sorted_vec()
    }

    fn knn_recursive(
        &self,
        node_idx: usize,
        query: &[f64],
        k: usize,
        radius2: f64,
        heap: &mut BinaryHeap<Neighbor>,
    ) {
        match self.nodes[node_idx] {
            Node::Leaf { start, end } => {
                for pos in start..end {
                    let d2 = self.distance2(pos, query);
                    if d2 > radius2 {
                        continue;
                    }
                    if heap.len() < k {
                        heap.push(Neighbor {
                            index: self.dataset_indices[pos],
                            distance2: d2,
                        });
                    } else if d2 < heap.peek().map_or(f64::INFINITY, |w| w.distance2) {
                        heap.pop();
                        heap.push(Neighbor {
                            index: self.dataset_indices[pos],
                            distance2: d2,
                        });
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim] - value;
                let diff2 = diff * diff;

                let (near, far) = if query[dim] <= value {
                    (left, right)
                } else {
                    (right, left)
                };

                self.knn_recursive(near, query, k, radius2, heap);

                let worst = heap.peek().map_or(f64::INFINITY, |w| w.distance2);
                if diff2 <= radius2 && (heap.len() < k || diff2 < worst) {
                    self.knn_recursive(far, query, k, radius2, heap);
                }
            }
        }
    }

    /// All neighbors with squared distance <= `radius2`, in discovery order.
    pub fn radius(&self, query: &[f64], radius2: f64) -> Vec<Neighbor> {
        let mut results = Vec::new();
        self.radius_recursive(0, query, radius2, &mut results);
        results
    }

    fn radius_recursive(
        &self,
        node_idx: usize,
        query: &[f64],
        radius2: f64,
        results: &mut Vec<Neighbor>,
    ) {
        match self.nodes[node_idx] {
            Node::Leaf { start, end } => {
                for pos in start..end {
                    let d2 = self.distance2(pos, query);
                    if d2 <= radius2 {
                        results.push(Neighbor {
                            index: self.dataset_indices[pos],
                            distance2: d2,
                        });
                    }
                }
            }
            Node::Split {
                dim,
                value,
                left,
                right,
            } => {
                let diff = query[dim] - value;
                let diff2 = diff * diff;

                let (near, far) = if query[dim] <= value {
                    (left, right)
                } else {
                    (right, left)
                };

                self.radius_recursive(near, query, radius2, results);

                if diff2 <= radius2 {
                    self.radius_recursive(far, query, radius2, results);
                }
            }
        }
    }

    /// Up to `max_nn` neighbors within `radius2`, sorted ascending.
    ///
    /// The caller guarantees `max_nn >= 1`.
    pub fn hybrid(&self, query: &[f64], radius2: f64, max_nn: usize) -> Vec<Neighbor> {
        let k = max_nn.min(self.len());
        let mut heap = BinaryHeap::with_capacity(k);
        self.knn_recursive(0, query, k, radius2, &mut heap);
        heap.into_sorted_vec()
    }
}
