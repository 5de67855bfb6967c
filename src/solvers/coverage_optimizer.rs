use super::{specs::CoverComputer, CoverProgress, ProgressListener, Test};
use crate::{
    encodings::{CnfEncoding, CoverInstance},
    sat::{self, Assignment, Literal, OptimizationOracleFactoryFn, OptimizationResult},
    utils::CoverError,
};
use std::{collections::BTreeSet, time::Duration};

/// The parameters of a [`CoverageOptimizer`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OptimizerConfig {
    /// The timeout of the first optimization call.
    pub initial_timeout: Duration,
    /// The factor applied to the timeout after each inconclusive call that produced no test.
    pub timeout_growth: f64,
    /// The number of inconclusive calls in a row (without any new test) after which the search fails; `None` for no limit.
    pub max_inconclusive_retries: Option<usize>,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            initial_timeout: Duration::from_millis(u32::MAX as u64),
            timeout_growth: 1.5,
            max_inconclusive_retries: None,
        }
    }
}

/// A covering algorithm relying on an optimization oracle.
///
/// While some leaf events remain uncovered, the first of them (in the order of the instance) is required
/// and the oracle is asked to maximize the number of the other uncovered leaf events that hold.
/// The leaf events true in the returned model form a new test.
///
/// Each call to the oracle is bounded by a timeout.
/// If a call is inconclusive, the best model found by the oracle is used if it covers new events;
/// otherwise, the timeout grows and the call is repeated.
pub struct CoverageOptimizer<'a> {
    instance: &'a CoverInstance,
    oracle_factory: Box<OptimizationOracleFactoryFn>,
    config: OptimizerConfig,
    listeners: Vec<Box<dyn ProgressListener>>,
}

impl<'a> CoverageOptimizer<'a> {
    /// Builds a new optimizer for an instance.
    ///
    /// The underlying oracle is the one returned by [default_optimization_oracle](crate::sat::default_optimization_oracle).
    pub fn new(instance: &'a CoverInstance) -> Self {
        Self::new_with_oracle_factory(instance, Box::new(sat::default_optimization_oracle))
    }

    /// Builds a new optimizer for an instance, given the optimization oracle factory.
    pub fn new_with_oracle_factory(
        instance: &'a CoverInstance,
        oracle_factory: Box<OptimizationOracleFactoryFn>,
    ) -> Self {
        Self {
            instance,
            oracle_factory,
            config: OptimizerConfig::default(),
            listeners: vec![],
        }
    }

    /// Sets the configuration.
    pub fn set_config(&mut self, config: OptimizerConfig) {
        self.config = config;
    }

    /// Adds a listener notified of the progress of the search.
    pub fn add_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.listeners.push(listener);
    }

    fn grow_timeout(&self, timeout: Duration) -> Duration {
        Duration::try_from_secs_f64(timeout.as_secs_f64() * self.config.timeout_growth)
            .unwrap_or(Duration::MAX)
            .max(timeout)
    }

    fn notify_progress(&self, n_tests: usize, n_uncovered: usize) {
        let progress = CoverProgress {
            n_tests,
            n_covered: self.instance.n_leaf_vars() - n_uncovered,
            n_total: self.instance.n_leaf_vars(),
        };
        self.listeners
            .iter()
            .for_each(|l| l.on_cover_progress(&progress));
    }
}

// Removes the covered leaves from `to_cover` and returns the test if at least one of them was uncovered.
fn accept_model(
    model: &Assignment,
    leaf_literals: &[Literal],
    instance: &CoverInstance,
    to_cover: &mut BTreeSet<usize>,
) -> Option<Test> {
    let covered = leaf_literals
        .iter()
        .enumerate()
        .filter(|(_, l)| model.satisfies(**l))
        .map(|(i, _)| i)
        .collect::<Vec<usize>>();
    let n_new = covered.iter().filter(|i| to_cover.remove(i)).count();
    if n_new == 0 {
        return None;
    }
    Some(Test::new(
        covered
            .into_iter()
            .map(|i| instance.leaf_vars()[i].event_id())
            .collect(),
    ))
}

impl CoverComputer for CoverageOptimizer<'_> {
    fn compute_cover(&mut self) -> Result<Vec<Test>, CoverError> {
        let encoding = CnfEncoding::new(self.instance)?;
        let leaf_literals = encoding.leaf_literals();
        let mut oracle = (self.oracle_factory)();
        encoding.load_into_oracle(oracle.as_mut());
        let mut to_cover = (0..leaf_literals.len()).collect::<BTreeSet<usize>>();
        let mut tests = Vec::new();
        let mut timeout = self.config.initial_timeout;
        let mut n_fruitless = 0;
        self.notify_progress(0, to_cover.len());
        while let Some(first) = to_cover.first().copied() {
            oracle.push();
            oracle.add_hard_clause(vec![leaf_literals[first]]);
            to_cover
                .iter()
                .skip(1)
                .for_each(|i| oracle.add_soft_literal(leaf_literals[*i], 1));
            oracle.set_timeout(timeout);
            let result = oracle.optimize();
            oracle.pop();
            let new_test = match result {
                OptimizationResult::Infeasible => {
                    return Err(CoverError::UncoverableEvent(
                        self.instance.leaf_vars()[first].event_id(),
                    ))
                }
                OptimizationResult::Solved(model) => {
                    accept_model(&model, leaf_literals, self.instance, &mut to_cover)
                }
                OptimizationResult::Inconclusive(opt_model) => opt_model.and_then(|model| {
                    accept_model(&model, leaf_literals, self.instance, &mut to_cover)
                }),
            };
            match new_test {
                Some(test) => {
                    tests.push(test);
                    n_fruitless = 0;
                }
                None => {
                    n_fruitless += 1;
                    if self.config.max_inconclusive_retries.map_or(false, |m| n_fruitless >= m) {
                        return Err(CoverError::RetriesExhausted(n_fruitless));
                    }
                    timeout = self.grow_timeout(timeout);
                    self.listeners
                        .iter()
                        .for_each(|l| l.on_inconclusive_optimization(timeout));
                }
            }
            self.notify_progress(tests.len(), to_cover.len());
        }
        Ok(tests)
    }
}
