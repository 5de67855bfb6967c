//! escover computes test suites covering the leaf events of event structures.
//!
//! An event structure is a set of events linked by causality (predecessors) and conflict relations.
//! A test is a set of leaf events that may occur together in a single run;
//! a cover is a set of tests whose union contains every leaf event.
//!
//! Two methods are available to compute a cover:
//! * [`CoverageOptimizer`](solvers::CoverageOptimizer) asks an optimization oracle, test after test,
//!   for a consistent set of events maximizing the number of uncovered leaf events;
//! * [`CompatibilityGraphBuilder`](solvers::CompatibilityGraphBuilder) builds the graph of the pairwise compatible leaf events,
//!   then [`CliqueCoverSolver`](solvers::CliqueCoverSolver) covers it by cliques.
//!
//! # Example
//!
//! ```
//! # use escover::events::{Event, EventStructure};
//! # use escover::encodings::CoverInstance;
//! # use escover::solvers::{CoverComputer, CoverageOptimizer};
//! let structure = EventStructure::new_with_events(vec![
//!     Event::new(1, vec![], vec![]),
//!     Event::new(2, vec![1], vec![]),
//!     Event::new(3, vec![1], vec![2]),
//! ]).unwrap();
//! let instance = CoverInstance::from_event_structure(&structure);
//! let tests = CoverageOptimizer::new(&instance).compute_cover().unwrap();
//! assert_eq!(2, tests.len());
//! ```

#![warn(missing_docs)]

pub mod encodings;

pub mod events;

pub mod formula;

pub mod graph;

pub mod io;

pub mod sat;

pub mod solvers;

pub mod utils;
