use std::time::Duration;

/// A snapshot of the progress of a covering algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoverProgress {
    /// The number of tests accepted so far.
    pub n_tests: usize,
    /// The number of leaf events covered so far.
    pub n_covered: usize,
    /// The total number of leaf events.
    pub n_total: usize,
}

impl CoverProgress {
    /// Returns the fraction of covered events, between 0 and 1.
    ///
    /// An instance with no event to cover is considered complete.
    pub fn fraction_done(&self) -> f64 {
        if self.n_total == 0 {
            1.
        } else {
            self.n_covered as f64 / self.n_total as f64
        }
    }
}

/// A trait for objects listening to the progress of the algorithms.
pub trait ProgressListener {
    /// Called after each iteration of a covering algorithm.
    fn on_cover_progress(&self, progress: &CoverProgress);

    /// Called each time the compatibility graph builder has processed a variable.
    fn on_graph_progress(&self, _n_processed: usize, _n_total: usize) {}

    /// Called when an optimization call was inconclusive and produced no test.
    ///
    /// The timeout given is the one the next call will use.
    fn on_inconclusive_optimization(&self, _next_timeout: Duration) {}
}
