use super::Test;
use crate::utils::CoverError;

/// A trait for the algorithms computing a set of tests covering all the leaf events.
pub trait CoverComputer {
    /// Computes the tests.
    ///
    /// Tests are returned in the order they were accepted.
    fn compute_cover(&mut self) -> Result<Vec<Test>, CoverError>;
}
