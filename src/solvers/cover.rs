use std::fmt::Display;

/// A test: a set of leaf events that are jointly true in a consistent set of events.
///
/// Event identifiers are kept sorted and without duplicates.
/// Tests are displayed as a line starting by `t` followed by the identifiers.
///
/// # Example
///
/// ```
/// # use escover::solvers::Test;
/// let test = Test::new(vec![3, 1, 3]);
/// assert_eq!(&[1, 3], test.event_ids());
/// assert_eq!("t 1 3", test.to_string());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Test {
    event_ids: Vec<usize>,
}

impl Test {
    /// Builds a test from a list of event identifiers.
    pub fn new(mut event_ids: Vec<usize>) -> Self {
        event_ids.sort_unstable();
        event_ids.dedup();
        Self { event_ids }
    }

    /// Returns the identifiers of the events involved in this test, in increasing order.
    pub fn event_ids(&self) -> &[usize] {
        &self.event_ids
    }

    /// Returns the number of events in this test.
    pub fn len(&self) -> usize {
        self.event_ids.len()
    }

    /// Returns `true` iff this test contains no event.
    pub fn is_empty(&self) -> bool {
        self.event_ids.is_empty()
    }

    /// Returns `true` iff this test contains the event.
    pub fn contains(&self, event_id: usize) -> bool {
        self.event_ids.binary_search(&event_id).is_ok()
    }
}

impl Display for Test {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "t")?;
        for id in &self.event_ids {
            write!(f, " {}", id)?;
        }
        Ok(())
    }
}
