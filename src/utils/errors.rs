use thiserror::Error;

/// An error raised while reading a malformed input file.
///
/// The position is given by a line and a column, both starting at 1.
/// A value of 0 means the position is not relevant (for example at the end of the input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid input format at line {line} column {column}: {reason}")]
pub struct InputFormatError {
    line: usize,
    column: usize,
    reason: String,
}

impl InputFormatError {
    /// Builds a new input format error.
    pub fn new<S>(line: usize, column: usize, reason: S) -> Self
    where
        S: Into<String>,
    {
        Self {
            line,
            column,
            reason: reason.into(),
        }
    }

    /// Returns the line at which the error occurred.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the column at which the error occurred.
    pub fn column(&self) -> usize {
        self.column
    }

    /// Returns the reason of the error.
    pub fn reason(&self) -> &str {
        &self.reason
    }
}

/// The errors that prevent a covering run from completing.
///
/// These errors are not transient: they signal an inconsistency in the input model
/// or a misbehaving oracle, and the run cannot proceed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoverError {
    /// A leaf event cannot be part of any consistent set of events.
    #[error("event {0} cannot be covered: the model forbids it")]
    UncoverableEvent(usize),
    /// An expression has a shape the encoders cannot interpret.
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),
    /// An oracle that must give a definitive answer returned an inconclusive one.
    #[error("the oracle returned an inconclusive answer while {0}")]
    InconclusiveOracle(String),
    /// The optimization oracle was inconclusive too many times in a row.
    #[error("giving up after {0} inconclusive optimization attempts in a row")]
    RetriesExhausted(usize),
    /// The maximum clique oracle returned a set of nodes that is not a clique of uncovered nodes.
    #[error("the clique oracle returned an invalid clique: {0:?}")]
    InvalidClique(Vec<usize>),
    /// The compatibility graph is not a cograph.
    #[error("the compatibility graph is not a cograph")]
    NotACograph,
}
