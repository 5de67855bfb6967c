use super::CompatibilityGraph;
use std::time::{Duration, Instant};

/// A trait for maximum clique oracles.
///
/// An oracle returns a maximum clique of the graph, or the best clique it found if it was stopped before completion.
/// The returned clique is a list of node indices, sorted by increasing index.
/// An empty graph leads to an empty clique.
pub trait MaxCliqueOracle {
    /// Searches a maximum clique.
    fn find_max_clique(&mut self, graph: &CompatibilityGraph) -> Vec<usize>;
}

/// Returns the default maximum clique oracle, without time limit.
pub fn default_clique_oracle() -> Box<dyn MaxCliqueOracle> {
    Box::new(BranchAndBoundCliqueFinder::default())
}

/// The configuration of a [`BranchAndBoundCliqueFinder`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CliqueSearchConfig {
    /// The time allowed to each search; `None` means the search always runs to completion.
    pub time_limit: Option<Duration>,
}

/// A branch-and-bound maximum clique search using greedy colourings as bounds.
///
/// Candidate nodes are coloured greedily before each branching step;
/// since the nodes of a clique get distinct colours, the number of colours bounds the size of the cliques that can be reached.
/// When a time limit is set and reached, the best clique found so far is returned.
///
/// # Example
///
/// ```
/// # use escover::graph::{BranchAndBoundCliqueFinder, CompatibilityGraph, MaxCliqueOracle};
/// let mut graph = CompatibilityGraph::new_with_labels(vec![1, 2, 3, 4]);
/// graph.add_edge(0, 1);
/// graph.add_edge(1, 2);
/// graph.add_edge(0, 2);
/// graph.add_edge(2, 3);
/// let mut finder = BranchAndBoundCliqueFinder::default();
/// assert_eq!(vec![0, 1, 2], finder.find_max_clique(&graph));
/// ```
#[derive(Debug, Default)]
pub struct BranchAndBoundCliqueFinder {
    config: CliqueSearchConfig,
}

impl BranchAndBoundCliqueFinder {
    /// Builds a new clique finder using the given configuration.
    pub fn new(config: CliqueSearchConfig) -> Self {
        Self { config }
    }
}

impl MaxCliqueOracle for BranchAndBoundCliqueFinder {
    fn find_max_clique(&mut self, graph: &CompatibilityGraph) -> Vec<usize> {
        let deadline = self
            .config
            .time_limit
            .and_then(|t| Instant::now().checked_add(t));
        let mut search = CliqueSearch {
            graph,
            deadline,
            current: Vec::new(),
            best: Vec::new(),
            stopped: false,
        };
        let mut candidates = (0..graph.n_nodes()).collect::<Vec<usize>>();
        candidates.sort_by(|n1, n2| graph.degree(*n2).cmp(&graph.degree(*n1)).then(n1.cmp(n2)));
        if let Some(n) = candidates.first() {
            search.best.push(*n);
        }
        search.expand(candidates);
        let mut best = search.best;
        best.sort_unstable();
        best
    }
}

struct CliqueSearch<'a> {
    graph: &'a CompatibilityGraph,
    deadline: Option<Instant>,
    current: Vec<usize>,
    best: Vec<usize>,
    stopped: bool,
}

impl CliqueSearch<'_> {
    fn expand(&mut self, candidates: Vec<usize>) {
        let (ordered, colors) = self.color_sort(candidates);
        for i in (0..ordered.len()).rev() {
            if self.is_stopped() || self.current.len() + colors[i] <= self.best.len() {
                return;
            }
            let node = ordered[i];
            self.current.push(node);
            let new_candidates = ordered[..i]
                .iter()
                .copied()
                .filter(|n| self.graph.has_edge(node, *n))
                .collect::<Vec<usize>>();
            if new_candidates.is_empty() {
                if self.current.len() > self.best.len() {
                    self.best = self.current.clone();
                }
            } else {
                self.expand(new_candidates);
            }
            self.current.pop();
        }
    }

    // Orders the candidates by color class; the color of a node is an upper bound of the clique size among it and its predecessors.
    fn color_sort(&self, candidates: Vec<usize>) -> (Vec<usize>, Vec<usize>) {
        let mut classes: Vec<Vec<usize>> = Vec::new();
        for node in candidates {
            match classes
                .iter_mut()
                .find(|c| c.iter().all(|n| !self.graph.has_edge(node, *n)))
            {
                Some(class) => class.push(node),
                None => classes.push(vec![node]),
            }
        }
        let mut ordered = Vec::new();
        let mut colors = Vec::new();
        for (i, class) in classes.into_iter().enumerate() {
            colors.extend(std::iter::repeat(i + 1).take(class.len()));
            ordered.extend(class);
        }
        (ordered, colors)
    }

    fn is_stopped(&mut self) -> bool {
        if !self.stopped {
            if let Some(d) = self.deadline {
                self.stopped = Instant::now() >= d;
            }
        }
        self.stopped
    }
}
