//! Algorithms computing sets of tests covering the leaf events.

mod clique_cover_solver;
pub use clique_cover_solver::CliqueCoverSolver;

mod compatibility_graph_builder;
pub use compatibility_graph_builder::CompatibilityGraphBuilder;

mod cover;
pub use cover::Test;

mod coverage_optimizer;
pub use coverage_optimizer::CoverageOptimizer;
pub use coverage_optimizer::OptimizerConfig;

mod progress;
pub use progress::CoverProgress;
pub use progress::ProgressListener;

mod specs;
pub use specs::CoverComputer;
