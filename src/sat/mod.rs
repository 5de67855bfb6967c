//! SAT and optimization oracles used to compute covers.

mod cadical_solver;
pub use cadical_solver::CadicalSolver;

mod optimization_oracle;
pub use optimization_oracle::default_optimization_oracle;
pub use optimization_oracle::OptimizationOracle;
pub use optimization_oracle::OptimizationOracleFactoryFn;
pub use optimization_oracle::OptimizationResult;
pub use optimization_oracle::SatBasedOptimizer;

mod sat_solver;
#[cfg(test)]
pub(crate) use sat_solver::clause;
pub use sat_solver::default_solver;
pub use sat_solver::Assignment;
pub use sat_solver::Literal;
pub use sat_solver::SatSolver;
pub use sat_solver::SatSolverFactoryFn;
pub use sat_solver::SolvingListener;
pub use sat_solver::SolvingResult;
pub use sat_solver::Variable;

mod solving_session;
pub use solving_session::SolvingSession;
