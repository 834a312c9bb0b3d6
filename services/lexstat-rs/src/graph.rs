//! Threshold graphs over the words of one concept.

use ndarray::Array2;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::types::DistanceEdge;

/// Undirected graph linking words whose distance is at or below a threshold
pub struct CognateGraph {
    graph: UnGraph<usize, f64>,
}

impl CognateGraph {
    /// Create graph with `n` isolated nodes
    pub fn new(n: usize) -> Self {
        let mut graph = UnGraph::with_capacity(n, 0);
        for idx in 0..n {
            graph.add_node(idx);
        }
        Self { graph }
    }

    /// Build graph from a distance matrix, keeping edges with distance <= threshold
    pub fn from_distances(distances: &Array2<f64>, threshold: f64) -> Self {
        let n = distances.nrows();
        let mut cognate_graph = Self::new(n);
        for i in 0..n {
            for j in i + 1..n {
                let distance = distances[[i, j]];
                if distance <= threshold {
                    cognate_graph.add_edge(DistanceEdge::new(i, j, distance));
                }
            }
        }
        cognate_graph
    }

    pub fn add_edge(&mut self, edge: DistanceEdge) {
        self.graph.add_edge(
            NodeIndex::new(edge.source),
            NodeIndex::new(edge.target),
            edge.distance.0,
        );
    }

    /// Connected components, members ascending, ordered by first member
    pub fn components(&self) -> Vec<Vec<usize>> {
        let mut component_map = vec![0; self.graph.node_count()];
        let mut current_component = 0;

        for node_idx in self.graph.node_indices() {
            if component_map[node_idx.index()] == 0 {
                current_component += 1;
                self.mark_component(node_idx, current_component, &mut component_map);
            }
        }

        let mut components = vec![Vec::new(); current_component];
        for node_idx in self.graph.node_indices() {
            components[component_map[node_idx.index()] - 1].push(self.graph[node_idx]);
        }
        for members in &mut components {
            members.sort_unstable();
        }
        components
    }

    /// Mark connected component using DFS
    fn mark_component(&self, start: NodeIndex, component_id: usize, component_map: &mut [usize]) {
        let mut stack = vec![start];
        while let Some(node) = stack.pop() {
            if component_map[node.index()] != 0 {
                continue;
            }
            component_map[node.index()] = component_id;

            for neighbor in self.graph.neighbors(node) {
                if component_map[neighbor.index()] == 0 {
                    stack.push(neighbor);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_components() {
        let distances = array![
            [0.0, 0.1, 0.9, 0.9],
            [0.1, 0.0, 0.2, 0.9],
            [0.9, 0.2, 0.0, 0.9],
            [0.9, 0.9, 0.9, 0.0],
        ];
        let graph = CognateGraph::from_distances(&distances, 0.3);
        assert_eq!(graph.components(), vec![vec![0, 1, 2], vec![3]]);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let distances = array![[0.0, 0.5], [0.5, 0.0]];
        assert_eq!(CognateGraph::from_distances(&distances, 0.5).components().len(), 1);
        assert_eq!(CognateGraph::from_distances(&distances, 0.49).components().len(), 2);
    }

    #[test]
    fn test_empty_graph() {
        let graph = CognateGraph::new(0);
        assert!(graph.components().is_empty());
    }
}
