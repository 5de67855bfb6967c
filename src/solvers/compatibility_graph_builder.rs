use super::ProgressListener;
use crate::{
    encodings::{CnfEncoding, CoverInstance},
    graph::CompatibilityGraph,
    sat::{self, SatSolverFactoryFn, SolvingResult, SolvingSession},
    utils::CoverError,
};

/// Builds the compatibility graph of the leaf variables of an instance.
///
/// The nodes of the graph are the leaf variables, in the order of the instance, labelled by their event identifiers.
/// Two nodes are linked iff the corresponding leaf events may occur together.
///
/// The graph is built with a single incremental SAT session:
/// the variables are processed from the last one to the first one;
/// each of them is required in a new scope, in which its compatibility with the lower variables is checked under assumptions.
///
/// # Example
///
/// ```
/// # use escover::events::{Event, EventStructure};
/// # use escover::encodings::CoverInstance;
/// # use escover::solvers::CompatibilityGraphBuilder;
/// let structure = EventStructure::new_with_events(vec![
///     Event::new(1, vec![], vec![]),
///     Event::new(2, vec![1], vec![]),
///     Event::new(3, vec![1], vec![2]),
///     Event::new(4, vec![1], vec![]),
/// ]).unwrap();
/// let instance = CoverInstance::from_event_structure(&structure);
/// let graph = CompatibilityGraphBuilder::new(&instance).build().unwrap();
/// assert_eq!(3, graph.n_nodes());
/// assert!(!graph.has_edge(0, 1));
/// assert!(graph.has_edge(0, 2));
/// assert!(graph.has_edge(1, 2));
/// ```
pub struct CompatibilityGraphBuilder<'a> {
    instance: &'a CoverInstance,
    solver_factory: Box<SatSolverFactoryFn>,
    listeners: Vec<Box<dyn ProgressListener>>,
}

impl<'a> CompatibilityGraphBuilder<'a> {
    /// Builds a new graph builder for an instance.
    ///
    /// The underlying SAT solver is one returned by [default_solver](crate::sat::default_solver).
    pub fn new(instance: &'a CoverInstance) -> Self {
        Self::new_with_sat_solver_factory(instance, Box::new(sat::default_solver))
    }

    /// Builds a new graph builder for an instance, given the SAT solver factory.
    pub fn new_with_sat_solver_factory(
        instance: &'a CoverInstance,
        solver_factory: Box<SatSolverFactoryFn>,
    ) -> Self {
        Self {
            instance,
            solver_factory,
            listeners: vec![],
        }
    }

    /// Adds a listener notified each time a variable has been processed.
    pub fn add_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    /// Builds the graph.
    ///
    /// A leaf event that cannot occur at all leads to a [`CoverError::UncoverableEvent`] error,
    /// and an undecided satisfiability check to a [`CoverError::InconclusiveOracle`] error.
    pub fn build(&self) -> Result<CompatibilityGraph, CoverError> {
        let encoding = CnfEncoding::new(self.instance)?;
        let leaf_literals = encoding.leaf_literals();
        let n = leaf_literals.len();
        let labels = self
            .instance
            .leaf_vars()
            .iter()
            .map(|v| v.event_id())
            .collect();
        let mut graph = CompatibilityGraph::new_with_labels(labels);
        let mut session = SolvingSession::new((self.solver_factory)());
        encoding.load_into_session(&mut session);
        for i in (0..n).rev() {
            session.push();
            session.add_clause(vec![leaf_literals[i]]);
            match session.solve() {
                SolvingResult::Satisfiable(_) => {}
                SolvingResult::Unsatisfiable => {
                    return Err(CoverError::UncoverableEvent(graph.label(i)))
                }
                SolvingResult::Unknown => {
                    return Err(inconclusive_error(graph.label(i), None));
                }
            }
            for j in 0..i {
                match session.solve_under_assumptions(&[leaf_literals[j]]) {
                    SolvingResult::Satisfiable(_) => graph.add_edge(i, j),
                    SolvingResult::Unsatisfiable => {}
                    SolvingResult::Unknown => {
                        return Err(inconclusive_error(graph.label(i), Some(graph.label(j))))
                    }
                }
            }
            session.pop();
            self.listeners
                .iter()
                .for_each(|l| l.on_graph_progress(n - i, n));
        }
        Ok(graph)
    }
}

fn inconclusive_error(event: usize, other: Option<usize>) -> CoverError {
    CoverError::InconclusiveOracle(match other {
        Some(o) => format!("checking the compatibility of events {} and {}", event, o),
        None => format!("checking whether event {} may occur", event),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::{Event, EventStructure},
        sat::{Literal, SatSolver, SolvingListener},
        solvers::CoverProgress,
    };
    use std::{cell::RefCell, rc::Rc};

    fn instance_of(events: Vec<Event>) -> CoverInstance {
        CoverInstance::from_event_structure(&EventStructure::new_with_events(events).unwrap())
    }

    #[test]
    fn test_scenario() {
        let instance = instance_of(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![1], vec![]),
            Event::new(3, vec![1], vec![2]),
        ]);
        let graph = CompatibilityGraphBuilder::new(&instance).build().unwrap();
        assert_eq!(&[2, 3], graph.labels());
        assert_eq!(0, graph.n_edges());
    }

    #[test]
    fn test_independent_leaves() {
        let instance = instance_of((1..=4).map(|i| Event::new(i, vec![], vec![])).collect());
        let graph = CompatibilityGraphBuilder::new(&instance).build().unwrap();
        assert_eq!(6, graph.n_edges());
    }

    #[test]
    fn test_conflict_through_predecessors() {
        let instance = instance_of(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![], vec![1]),
            Event::new(3, vec![1], vec![]),
            Event::new(4, vec![2], vec![]),
            Event::new(5, vec![], vec![]),
        ]);
        let graph = CompatibilityGraphBuilder::new(&instance).build().unwrap();
        assert_eq!(&[3, 4, 5], graph.labels());
        assert!(!graph.has_edge(0, 1));
        assert!(graph.has_edge(0, 2));
        assert!(graph.has_edge(1, 2));
    }

    #[test]
    fn test_uncoverable_event() {
        let instance = instance_of(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![1], vec![1]),
        ]);
        assert_eq!(
            Err(CoverError::UncoverableEvent(2)),
            CompatibilityGraphBuilder::new(&instance).build()
        );
    }

    struct UndecidedSolver(Box<dyn SatSolver>);

    impl SatSolver for UndecidedSolver {
        fn add_clause(&mut self, cl: Vec<Literal>) {
            self.0.add_clause(cl)
        }

        fn solve(&mut self) -> SolvingResult {
            SolvingResult::Unknown
        }

        fn solve_under_assumptions(&mut self, _assumptions: &[Literal]) -> SolvingResult {
            SolvingResult::Unknown
        }

        fn n_vars(&self) -> usize {
            self.0.n_vars()
        }

        fn reserve(&mut self, new_max_id: usize) {
            self.0.reserve(new_max_id)
        }

        fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
            self.0.add_listener(listener)
        }
    }

    #[test]
    fn test_inconclusive_oracle() {
        let instance = instance_of(vec![Event::new(1, vec![], vec![])]);
        let builder = CompatibilityGraphBuilder::new_with_sat_solver_factory(
            &instance,
            Box::new(|| Box::new(UndecidedSolver(sat::default_solver()))),
        );
        assert!(matches!(
            builder.build(),
            Err(CoverError::InconclusiveOracle(_))
        ));
    }

    struct RecordingListener(Rc<RefCell<Vec<(usize, usize)>>>);

    impl ProgressListener for RecordingListener {
        fn on_cover_progress(&self, _progress: &CoverProgress) {}

        fn on_graph_progress(&self, n_processed: usize, n_total: usize) {
            self.0.borrow_mut().push((n_processed, n_total));
        }
    }

    #[test]
    fn test_progress() {
        let instance = instance_of((1..=3).map(|i| Event::new(i, vec![], vec![])).collect());
        let records = Rc::new(RefCell::new(vec![]));
        let mut builder = CompatibilityGraphBuilder::new(&instance);
        builder.add_listener(Box::new(RecordingListener(Rc::clone(&records))));
        builder.build().unwrap();
        assert_eq!(vec![(1, 3), (2, 3), (3, 3)], *records.borrow());
    }
}
