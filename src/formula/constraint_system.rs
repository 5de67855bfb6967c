use super::FormulaRef;

/// A constraint system, given as a conjunction of assertions.
///
/// A constraint system is built once and is not modified by the algorithms that consume it.
#[derive(Debug, Clone, Default)]
pub struct ConstraintSystem {
    assertions: Vec<FormulaRef>,
}

impl ConstraintSystem {
    /// Adds an assertion to the system.
    pub fn assert(&mut self, f: FormulaRef) {
        self.assertions.push(f);
    }

    /// Iterates over the assertions.
    pub fn iter(&self) -> impl Iterator<Item = &FormulaRef> + '_ {
        self.assertions.iter()
    }

    /// Returns the number of assertions.
    pub fn len(&self) -> usize {
        self.assertions.len()
    }

    /// Returns `true` iff the system has no assertion.
    pub fn is_empty(&self) -> bool {
        self.assertions.is_empty()
    }
}
