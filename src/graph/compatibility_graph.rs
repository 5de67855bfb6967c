use std::collections::BTreeSet;

/// An undirected graph whose nodes are labelled by event identifiers.
///
/// Nodes are given by their index, from `0` to `n_nodes() - 1`.
/// Self loops are not allowed.
///
/// In a compatibility graph, there is an edge between two nodes iff the corresponding events may occur together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompatibilityGraph {
    labels: Vec<usize>,
    adjacency: Vec<BTreeSet<usize>>,
    n_edges: usize,
}

impl CompatibilityGraph {
    /// Builds a graph without edges given the labels of its nodes.
    ///
    /// # Example
    ///
    /// ```
    /// # use escover::graph::CompatibilityGraph;
    /// let mut graph = CompatibilityGraph::new_with_labels(vec![10, 20, 30]);
    /// graph.add_edge(0, 1);
    /// assert_eq!(3, graph.n_nodes());
    /// assert_eq!(1, graph.n_edges());
    /// assert_eq!(20, graph.label(1));
    /// ```
    pub fn new_with_labels(labels: Vec<usize>) -> Self {
        let adjacency = vec![BTreeSet::new(); labels.len()];
        Self {
            labels,
            adjacency,
            n_edges: 0,
        }
    }

    /// Returns the number of nodes.
    pub fn n_nodes(&self) -> usize {
        self.labels.len()
    }

    /// Returns the number of edges.
    pub fn n_edges(&self) -> usize {
        self.n_edges
    }

    /// Returns the label of a node.
    pub fn label(&self, node: usize) -> usize {
        self.labels[node]
    }

    /// Returns the labels of all the nodes, in index order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    /// Adds an edge between two distinct nodes.
    ///
    /// Adding an existing edge has no effect.
    ///
    /// # Panics
    ///
    /// Panics if the nodes are equal or out of bounds.
    pub fn add_edge(&mut self, n1: usize, n2: usize) {
        assert_ne!(n1, n2, "self loops are not allowed");
        if self.adjacency[n1].insert(n2) {
            self.adjacency[n2].insert(n1);
            self.n_edges += 1;
        }
    }

    /// Returns `true` iff the two nodes are adjacent.
    pub fn has_edge(&self, n1: usize, n2: usize) -> bool {
        self.adjacency[n1].contains(&n2)
    }

    /// Returns the degree of a node.
    pub fn degree(&self, node: usize) -> usize {
        self.adjacency[node].len()
    }

    /// Iterates over the neighbors of a node, by increasing index.
    pub fn neighbors(&self, node: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[node].iter().copied()
    }

    /// Iterates over the edges, each one given once with its lowest index first.
    pub fn iter_edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adjacency
            .iter()
            .enumerate()
            .flat_map(|(i, adj)| adj.range(i + 1..).map(move |j| (i, *j)))
    }

    /// Removes all the edges incident to a node.
    pub fn isolate(&mut self, node: usize) {
        let neighbors = std::mem::take(&mut self.adjacency[node]);
        self.n_edges -= neighbors.len();
        neighbors.into_iter().for_each(|n| {
            self.adjacency[n].remove(&node);
        });
    }

    /// Returns the highest node index among the nodes with at least one incident edge.
    pub fn highest_node_with_edges(&self) -> Option<usize> {
        (0..self.n_nodes()).rev().find(|n| !self.adjacency[*n].is_empty())
    }

    /// Returns `true` iff the nodes form a clique (pairwise adjacent nodes).
    pub fn is_clique(&self, nodes: &[usize]) -> bool {
        nodes.iter().enumerate().all(|(i, n1)| {
            nodes[i + 1..]
                .iter()
                .all(|n2| n1 != n2 && self.has_edge(*n1, *n2))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path_graph() -> CompatibilityGraph {
        let mut g = CompatibilityGraph::new_with_labels(vec![10, 20, 30]);
        g.add_edge(0, 1);
        g.add_edge(2, 1);
        g
    }

    #[test]
    fn test_edges() {
        let g = path_graph();
        assert_eq!(2, g.n_edges());
        assert!(g.has_edge(1, 0));
        assert!(g.has_edge(1, 2));
        assert!(!g.has_edge(0, 2));
        assert_eq!(vec![(0, 1), (1, 2)], g.iter_edges().collect::<Vec<_>>());
        assert_eq!(vec![0, 2], g.neighbors(1).collect::<Vec<_>>());
    }

    #[test]
    fn test_add_edge_twice() {
        let mut g = path_graph();
        g.add_edge(1, 0);
        assert_eq!(2, g.n_edges());
    }

    #[test]
    #[should_panic(expected = "self loops are not allowed")]
    fn test_self_loop() {
        path_graph().add_edge(1, 1);
    }

    #[test]
    fn test_isolate() {
        let mut g = path_graph();
        g.isolate(1);
        assert_eq!(0, g.n_edges());
        assert_eq!(0, g.degree(0));
        assert_eq!(None, g.highest_node_with_edges());
    }

    #[test]
    fn test_highest_node_with_edges() {
        let mut g = CompatibilityGraph::new_with_labels(vec![1, 2, 3, 4]);
        g.add_edge(0, 2);
        assert_eq!(Some(2), g.highest_node_with_edges());
    }

    #[test]
    fn test_is_clique() {
        let mut g = path_graph();
        assert!(g.is_clique(&[0, 1]));
        assert!(!g.is_clique(&[0, 1, 2]));
        g.add_edge(0, 2);
        assert!(g.is_clique(&[0, 1, 2]));
        assert!(!g.is_clique(&[0, 0]));
        assert!(g.is_clique(&[]));
    }
}
