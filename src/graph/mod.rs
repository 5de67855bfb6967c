//! Compatibility graphs and the algorithms working on them.

mod cograph_checker;
pub use cograph_checker::is_cograph;

mod compatibility_graph;
pub use compatibility_graph::CompatibilityGraph;

mod max_clique;
pub use max_clique::default_clique_oracle;
pub use max_clique::BranchAndBoundCliqueFinder;
pub use max_clique::CliqueSearchConfig;
pub use max_clique::MaxCliqueOracle;
