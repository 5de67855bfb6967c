use super::{default_solver, Assignment, Literal, SatSolver, SolvingResult, SolvingSession};
use std::time::{Duration, Instant};

/// The result of a call to an optimization oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationResult {
    /// The hard constraints are satisfiable; the assignment is the solution found by the oracle.
    Solved(Assignment),
    /// The hard constraints are unsatisfiable.
    Infeasible,
    /// The oracle could not conclude in time.
    ///
    /// It may provide the best model it has found so far.
    Inconclusive(Option<Assignment>),
}

/// A trait for oracles maximizing the weight of satisfied soft literals under hard constraints.
///
/// Constraints are scoped: [push](Self::push) opens a scope and [pop](Self::pop) retracts
/// every hard clause and soft literal added since the matching `push`.
pub trait OptimizationOracle {
    /// Adds a hard clause, which must be satisfied by any solution.
    fn add_hard_clause(&mut self, cl: Vec<Literal>);

    /// Adds a soft literal; solutions should maximize the weight of satisfied soft literals.
    fn add_soft_literal(&mut self, lit: Literal, weight: usize);

    /// Declares the variables up to `n_vars`, even if they occur in no clause.
    fn reserve(&mut self, n_vars: usize);

    /// Opens a scope.
    fn push(&mut self);

    /// Closes the innermost scope.
    fn pop(&mut self);

    /// Sets the time allotted to each call to [optimize](Self::optimize).
    fn set_timeout(&mut self, timeout: Duration);

    /// Searches for a solution.
    fn optimize(&mut self) -> OptimizationResult;
}

/// The type of functions used to create new optimization oracles.
pub type OptimizationOracleFactoryFn = dyn Fn() -> Box<dyn OptimizationOracle>;

/// The default optimization oracle, built on top of the default SAT solver.
pub fn default_optimization_oracle() -> Box<dyn OptimizationOracle> {
    Box::new(SatBasedOptimizer::new(default_solver()))
}

/// An optimization oracle relying on a SAT solver.
///
/// A first model of the hard constraints is computed, then the set of satisfied soft literals
/// is extended one literal at a time (heaviest first) while the result remains satisfiable.
/// The returned solution is maximal with respect to inclusion of satisfied soft literals,
/// which may differ from the solution of maximal weight.
///
/// The timeout is checked between SAT calls and forwarded to the SAT solver.
/// When it expires, the best model computed so far is returned as an inconclusive result.
pub struct SatBasedOptimizer {
    session: SolvingSession,
    soft_literals: Vec<Vec<(Literal, usize)>>,
    timeout: Option<Duration>,
}

impl SatBasedOptimizer {
    /// Builds a new optimizer given the SAT solver to use.
    pub fn new(solver: Box<dyn SatSolver>) -> Self {
        Self {
            session: SolvingSession::new(solver),
            soft_literals: vec![vec![]],
            timeout: None,
        }
    }

    fn sorted_soft_literals(&self) -> Vec<Literal> {
        let mut soft = self
            .soft_literals
            .iter()
            .flatten()
            .copied()
            .collect::<Vec<(Literal, usize)>>();
        soft.sort_by(|a, b| b.1.cmp(&a.1));
        soft.into_iter().map(|(l, _)| l).collect()
    }
}

fn remaining_time(deadline: Option<Instant>) -> Option<Duration> {
    deadline.map(|d| d.saturating_duration_since(Instant::now()))
}

fn is_expired(deadline: Option<Instant>) -> bool {
    remaining_time(deadline).map_or(false, |r| r.is_zero())
}

impl OptimizationOracle for SatBasedOptimizer {
    fn add_hard_clause(&mut self, cl: Vec<Literal>) {
        self.session.add_clause(cl)
    }

    fn add_soft_literal(&mut self, lit: Literal, weight: usize) {
        if let Some(scope) = self.soft_literals.last_mut() {
            scope.push((lit, weight));
        }
    }

    fn reserve(&mut self, n_vars: usize) {
        self.session.reserve(n_vars)
    }

    fn push(&mut self) {
        self.session.push();
        self.soft_literals.push(vec![]);
    }

    fn pop(&mut self) {
        self.session.pop();
        self.soft_literals.pop();
    }

    fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    fn optimize(&mut self) -> OptimizationResult {
        let deadline = self.timeout.and_then(|t| Instant::now().checked_add(t));
        let soft = self.sorted_soft_literals();
        self.session.set_time_limit(remaining_time(deadline));
        let mut best = match self.session.solve() {
            SolvingResult::Satisfiable(model) => model,
            SolvingResult::Unsatisfiable => return OptimizationResult::Infeasible,
            SolvingResult::Unknown => return OptimizationResult::Inconclusive(None),
        };
        let mut kept = soft
            .iter()
            .filter(|l| best.satisfies(**l))
            .copied()
            .collect::<Vec<Literal>>();
        for lit in soft.iter() {
            if best.satisfies(*lit) {
                continue;
            }
            if is_expired(deadline) {
                return OptimizationResult::Inconclusive(Some(best));
            }
            kept.push(*lit);
            self.session.set_time_limit(remaining_time(deadline));
            match self.session.solve_under_assumptions(&kept) {
                SolvingResult::Satisfiable(model) => {
                    best = model;
                    kept = soft
                        .iter()
                        .filter(|l| best.satisfies(**l))
                        .copied()
                        .collect();
                }
                SolvingResult::Unsatisfiable => {
                    kept.pop();
                }
                SolvingResult::Unknown => return OptimizationResult::Inconclusive(Some(best)),
            }
        }
        OptimizationResult::Solved(best)
    }
}
