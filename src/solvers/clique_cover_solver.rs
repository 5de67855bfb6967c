use super::{specs::CoverComputer, CoverProgress, ProgressListener, Test};
use crate::{
    graph::{self, CompatibilityGraph, MaxCliqueOracle},
    utils::CoverError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CoverPhase {
    Cliques,
    Pairs,
    Singletons,
    Done,
}

/// A greedy covering algorithm working on a compatibility graph.
///
/// Maximum cliques are extracted from the graph while they have more than two nodes;
/// each of them becomes a test and its nodes are isolated.
/// When the maximum cliques have two nodes, the highest node having neighbors is repeatedly paired with its lowest neighbor.
/// The nodes that remain uncovered then give a test each.
///
/// The graph is consumed by the algorithm: after the computation, it has no edges left.
///
/// # Example
///
/// ```
/// # use escover::graph::CompatibilityGraph;
/// # use escover::solvers::{CliqueCoverSolver, CoverComputer, Test};
/// let mut graph = CompatibilityGraph::new_with_labels(vec![10, 20, 30, 40]);
/// graph.add_edge(0, 1);
/// graph.add_edge(1, 2);
/// graph.add_edge(0, 2);
/// let mut solver = CliqueCoverSolver::new(graph);
/// let tests = solver.compute_cover().unwrap();
/// assert_eq!(vec![Test::new(vec![10, 20, 30]), Test::new(vec![40])], tests);
/// ```
pub struct CliqueCoverSolver {
    graph: CompatibilityGraph,
    clique_oracle: Box<dyn MaxCliqueOracle>,
    listeners: Vec<Box<dyn ProgressListener>>,
    covered: Vec<bool>,
    n_covered: usize,
    tests: Vec<Test>,
}

impl CliqueCoverSolver {
    /// Builds a new solver for a graph.
    ///
    /// The maximum clique oracle is the one returned by [default_clique_oracle](crate::graph::default_clique_oracle).
    pub fn new(graph: CompatibilityGraph) -> Self {
        Self::new_with_clique_oracle(graph, graph::default_clique_oracle())
    }

    /// Builds a new solver for a graph, given the maximum clique oracle.
    pub fn new_with_clique_oracle(
        graph: CompatibilityGraph,
        clique_oracle: Box<dyn MaxCliqueOracle>,
    ) -> Self {
        let n_nodes = graph.n_nodes();
        Self {
            graph,
            clique_oracle,
            listeners: vec![],
            covered: vec![false; n_nodes],
            n_covered: 0,
            tests: vec![],
        }
    }

    /// Adds a listener notified each time a test is accepted.
    pub fn add_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    /// Returns the graph, in its current state.
    pub fn graph(&self) -> &CompatibilityGraph {
        &self.graph
    }

    fn next_phase(&mut self, phase: CoverPhase) -> Result<CoverPhase, CoverError> {
        match phase {
            CoverPhase::Cliques => {
                let clique = self.clique_oracle.find_max_clique(&self.graph);
                if clique.len() >= 2 && !self.is_uncovered_clique(&clique) {
                    return Err(CoverError::InvalidClique(clique));
                }
                match clique.len() {
                    0 | 1 => Ok(CoverPhase::Singletons),
                    2 => Ok(CoverPhase::Pairs),
                    _ => {
                        self.accept(&clique);
                        if self.n_covered == self.graph.n_nodes() {
                            Ok(CoverPhase::Done)
                        } else {
                            Ok(CoverPhase::Cliques)
                        }
                    }
                }
            }
            CoverPhase::Pairs => match self.graph.highest_node_with_edges() {
                Some(highest) => {
                    let lowest_neighbor = self.graph.neighbors(highest).next();
                    if let Some(n) = lowest_neighbor {
                        self.accept(&[n, highest]);
                    }
                    Ok(CoverPhase::Pairs)
                }
                None => Ok(CoverPhase::Singletons),
            },
            CoverPhase::Singletons => {
                for node in 0..self.graph.n_nodes() {
                    if !self.covered[node] {
                        self.accept(&[node]);
                    }
                }
                Ok(CoverPhase::Done)
            }
            CoverPhase::Done => Ok(CoverPhase::Done),
        }
    }

    fn is_uncovered_clique(&self, nodes: &[usize]) -> bool {
        nodes
            .iter()
            .all(|n| *n < self.graph.n_nodes() && !self.covered[*n])
            && self.graph.is_clique(nodes)
    }

    fn accept(&mut self, nodes: &[usize]) {
        for node in nodes {
            self.covered[*node] = true;
            self.graph.isolate(*node);
        }
        self.n_covered += nodes.len();
        self.tests
            .push(Test::new(nodes.iter().map(|n| self.graph.label(*n)).collect()));
        let progress = CoverProgress {
            n_tests: self.tests.len(),
            n_covered: self.n_covered,
            n_total: self.graph.n_nodes(),
        };
        self.listeners
            .iter()
            .for_each(|l| l.on_cover_progress(&progress));
    }
}

impl CoverComputer for CliqueCoverSolver {
    fn compute_cover(&mut self) -> Result<Vec<Test>, CoverError> {
        let mut phase = if self.n_covered == self.graph.n_nodes() {
            CoverPhase::Done
        } else {
            CoverPhase::Cliques
        };
        while phase != CoverPhase::Done {
            phase = self.next_phase(phase)?;
        }
        Ok(std::mem::take(&mut self.tests))
    }
}
