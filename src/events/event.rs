use std::fmt::Display;

/// An event of an event structure.
///
/// An event is identified by a unsigned integer.
/// It is associated with the list of events that must occur for it to occur (its predecessors),
/// and with the list of events that cannot occur together with it (its conflicts).
///
/// Events are immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    id: usize,
    predecessors: Vec<usize>,
    conflicts: Vec<usize>,
}

impl Event {
    /// Builds a new event.
    ///
    /// # Arguments
    ///
    /// * `id` - the identifier of the event
    /// * `predecessors` - the identifiers of the events this one requires
    /// * `conflicts` - the identifiers of the events this one excludes
    ///
    /// # Example
    ///
    /// ```
    /// # use escover::events::Event;
    /// let event = Event::new(3, vec![1], vec![2]);
    /// assert_eq!(3, event.id());
    /// assert_eq!(&[1], event.predecessors());
    /// assert_eq!(&[2], event.conflicts());
    /// ```
    pub fn new(id: usize, predecessors: Vec<usize>, conflicts: Vec<usize>) -> Self {
        Self {
            id,
            predecessors,
            conflicts,
        }
    }

    /// Returns the identifier of the event.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Returns the identifiers of the predecessors, in the order they were given.
    pub fn predecessors(&self) -> &[usize] {
        &self.predecessors
    }

    /// Returns the identifiers of the conflicting events, in the order they were given.
    pub fn conflicts(&self) -> &[usize] {
        &self.conflicts
    }
}

impl Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let join = |ids: &[usize]| {
            ids.iter()
                .map(|i| i.to_string())
                .collect::<Vec<String>>()
                .join(",")
        };
        write!(
            f,
            "({}, Event(pred=({}), icnf=({})))",
            self.id,
            join(&self.predecessors),
            join(&self.conflicts)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            "(3, Event(pred=(1,2), icnf=()))",
            Event::new(3, vec![1, 2], vec![]).to_string()
        );
    }
}
