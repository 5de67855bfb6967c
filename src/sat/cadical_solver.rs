use super::{sat_solver::SolvingResult, Assignment, Literal, SatSolver, SolvingListener};
use cadical::{Solver as CadicalCSolver, Timeout};
use std::time::Duration;

/// A wrapper around the Cadical SAT solver.
///
/// Time limits are enforced through Cadical termination callbacks.
#[derive(Default)]
pub struct CadicalSolver {
    solver: CadicalCSolver,
    n_vars: usize,
    n_clauses: usize,
    listeners: Vec<Box<dyn SolvingListener>>,
}

fn to_i32_lit(l: Literal) -> i32 {
    isize::from(l) as i32
}

impl SatSolver for CadicalSolver {
    fn add_clause(&mut self, cl: Vec<Literal>) {
        cl.iter()
            .for_each(|l| self.n_vars = usize::max(self.n_vars, usize::from(l.var())));
        self.solver.add_clause(cl.into_iter().map(to_i32_lit));
        self.n_clauses += 1;
    }

    fn solve(&mut self) -> SolvingResult {
        self.solve_under_assumptions(&[])
    }

    fn solve_under_assumptions(&mut self, assumptions: &[Literal]) -> SolvingResult {
        assumptions
            .iter()
            .for_each(|l| self.n_vars = usize::max(self.n_vars, usize::from(l.var())));
        self.listeners
            .iter()
            .for_each(|l| l.solving_start(self.n_vars, self.n_clauses));
        let result = match self
            .solver
            .solve_with(assumptions.iter().map(|l| to_i32_lit(*l)))
        {
            Some(true) => {
                let max_var = self.solver.max_variable();
                let assignment =
                    Assignment::new((1..=max_var).map(|i| self.solver.value(i)).collect());
                SolvingResult::Satisfiable(assignment)
            }
            Some(false) => SolvingResult::Unsatisfiable,
            None => SolvingResult::Unknown,
        };
        self.listeners.iter().for_each(|l| l.solving_end(&result));
        result
    }

    fn n_vars(&self) -> usize {
        self.n_vars
    }

    fn reserve(&mut self, new_max_id: usize) {
        self.n_vars = usize::max(self.n_vars, new_max_id);
    }

    fn add_listener(&mut self, listener: Box<dyn SolvingListener>) {
        self.listeners.push(listener);
    }

    fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.solver
            .set_callbacks(limit.map(|d| Timeout::new(d.as_secs_f32())));
    }
}
