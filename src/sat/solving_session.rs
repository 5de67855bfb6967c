use super::{Literal, SatSolver, SolvingResult};
use std::time::Duration;

/// An incremental solving session with scoped constraints.
///
/// SAT solvers only accept new clauses; scopes are emulated with selector literals.
/// Opening a scope creates a fresh selector `s`; each clause added while the scope is the innermost one
/// is extended by `s`, and solving calls assume `-s` for all the open scopes.
/// Closing the scope adds the unit clause `s`, which satisfies (and thus retracts) all its clauses.
///
/// # Example
///
/// ```
/// # use escover::sat::{self, Literal, SolvingSession};
/// let mut session = SolvingSession::new(sat::default_solver());
/// session.add_clause(vec![Literal::from(-1), Literal::from(-2)]);
/// session.push();
/// session.add_clause(vec![Literal::from(1)]);
/// assert!(session.solve_under_assumptions(&[Literal::from(2)]).unwrap_model().is_none());
/// session.pop();
/// assert!(session.solve_under_assumptions(&[Literal::from(2)]).unwrap_model().is_some());
/// ```
pub struct SolvingSession {
    solver: Box<dyn SatSolver>,
    selectors: Vec<Literal>,
}

impl SolvingSession {
    /// Builds a new session over a SAT solver.
    ///
    /// The clauses already added to the solver are kept as permanent ones.
    pub fn new(solver: Box<dyn SatSolver>) -> Self {
        Self {
            solver,
            selectors: vec![],
        }
    }

    /// Adds a clause, retracted when the current scope is closed.
    ///
    /// If no scope is open, the clause is permanent.
    pub fn add_clause(&mut self, mut cl: Vec<Literal>) {
        if let Some(s) = self.selectors.last() {
            cl.push(*s);
        }
        self.solver.add_clause(cl);
    }

    /// Opens a new scope.
    pub fn push(&mut self) {
        let selector_id = 1 + self.solver.n_vars();
        self.solver.reserve(selector_id);
        self.selectors.push(Literal::from(selector_id as isize));
    }

    /// Closes the innermost scope, retracting the clauses added inside it.
    ///
    /// # Panics
    ///
    /// Panics if no scope is open.
    pub fn pop(&mut self) {
        let selector = self
            .selectors
            .pop()
            .expect("cannot close a scope since none is open");
        self.solver.add_clause(vec![selector]);
    }

    /// Returns the number of open scopes.
    pub fn n_scopes(&self) -> usize {
        self.selectors.len()
    }

    /// Solves the problem formed by the active clauses.
    pub fn solve(&mut self) -> SolvingResult {
        self.solve_under_assumptions(&[])
    }

    /// Solves the problem formed by the active clauses and the provided assumptions.
    pub fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> SolvingResult {
        let mut effective_assumptions = Vec::with_capacity(assumptions.len() + self.selectors.len());
        effective_assumptions.extend(self.selectors.iter().map(|s| s.negate()));
        effective_assumptions.extend_from_slice(assumptions);
        self.solver.solve_under_assumptions(&effective_assumptions)
    }

    /// Limits the time allotted to the next solving calls.
    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.solver.set_time_limit(limit)
    }

    /// Ensures the variables up to `new_max_id` are known, so that no selector uses them.
    pub fn reserve(&mut self, new_max_id: usize) {
        self.solver.reserve(new_max_id)
    }

    /// Returns the highest variable index known by the underlying solver.
    pub fn n_vars(&self) -> usize {
        self.solver.n_vars()
    }
}
