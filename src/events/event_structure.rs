use super::Event;
use anyhow::{anyhow, Result};
use std::collections::{HashMap, HashSet};

/// A collection of events.
///
/// Events are kept in the order they were added.
/// Their identifiers must be unique.
///
/// The collection keeps track of the events that are predecessors of other events.
/// An event that is the predecessor of no event is a leaf event;
/// leaf events are the ones a test suite must cover.
#[derive(Debug, Default)]
pub struct EventStructure {
    events: Vec<Event>,
    id_to_index: HashMap<usize, usize>,
    predecessor_ids: HashSet<usize>,
}

impl EventStructure {
    /// Builds an event structure from a list of events.
    ///
    /// An error is returned if two events share the same identifier.
    ///
    /// # Example
    ///
    /// ```
    /// # use escover::events::{Event, EventStructure};
    /// let events = vec![
    ///     Event::new(1, vec![], vec![]),
    ///     Event::new(2, vec![1], vec![]),
    /// ];
    /// let structure = EventStructure::new_with_events(events).unwrap();
    /// assert!(!structure.is_leaf(1));
    /// assert!(structure.is_leaf(2));
    /// ```
    pub fn new_with_events(events: Vec<Event>) -> Result<Self> {
        let mut structure = EventStructure::default();
        for e in events {
            structure.add_event(e)?;
        }
        Ok(structure)
    }

    /// Adds an event to this structure.
    ///
    /// The leaf status of the events already in the structure is updated accordingly.
    /// An error is returned if an event with the same identifier is already present.
    pub fn add_event(&mut self, event: Event) -> Result<()> {
        if self.id_to_index.contains_key(&event.id()) {
            return Err(anyhow!("duplicate event identifier {}", event.id()));
        }
        self.predecessor_ids.extend(event.predecessors().iter().copied());
        self.id_to_index.insert(event.id(), self.events.len());
        self.events.push(event);
        Ok(())
    }

    /// Returns the number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` iff the structure contains no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Iterates over the events, in the order they were added.
    pub fn iter(&self) -> impl Iterator<Item = &Event> + '_ {
        self.events.iter()
    }

    /// Returns the event with the given identifier, if any.
    pub fn get_event(&self, id: usize) -> Option<&Event> {
        self.id_to_index.get(&id).map(|i| &self.events[*i])
    }

    /// Returns `true` iff an event with this identifier exists and is not the predecessor of any event.
    pub fn is_leaf(&self, id: usize) -> bool {
        self.id_to_index.contains_key(&id) && !self.predecessor_ids.contains(&id)
    }

    /// Returns the identifiers of the leaf events, in the order the events were added.
    pub fn leaf_ids(&self) -> Vec<usize> {
        self.events
            .iter()
            .map(|e| e.id())
            .filter(|id| !self.predecessor_ids.contains(id))
            .collect()
    }

    /// Returns the number of leaf events.
    pub fn n_leaves(&self) -> usize {
        self.events
            .iter()
            .filter(|e| !self.predecessor_ids.contains(&e.id()))
            .count()
    }

    /// Returns the identifiers referenced as predecessors or conflicts that match no event.
    pub fn dangling_references(&self) -> Vec<usize> {
        let mut dangling = self
            .events
            .iter()
            .flat_map(|e| e.predecessors().iter().chain(e.conflicts().iter()))
            .filter(|id| !self.id_to_index.contains_key(id))
            .copied()
            .collect::<Vec<usize>>();
        dangling.sort_unstable();
        dangling.dedup();
        dangling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leaves() {
        let structure = EventStructure::new_with_events(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![1], vec![]),
            Event::new(3, vec![1], vec![2]),
        ])
        .unwrap();
        assert_eq!(3, structure.len());
        assert_eq!(vec![2, 3], structure.leaf_ids());
        assert_eq!(2, structure.n_leaves());
        assert!(!structure.is_leaf(1));
        assert!(!structure.is_leaf(4));
    }

    #[test]
    fn test_leaf_status_is_updated() {
        let mut structure =
            EventStructure::new_with_events(vec![Event::new(1, vec![], vec![])]).unwrap();
        assert!(structure.is_leaf(1));
        structure.add_event(Event::new(2, vec![1], vec![])).unwrap();
        assert!(!structure.is_leaf(1));
        assert!(structure.is_leaf(2));
    }

    #[test]
    fn test_predecessor_declared_later() {
        let structure = EventStructure::new_with_events(vec![
            Event::new(2, vec![1], vec![]),
            Event::new(1, vec![], vec![]),
        ])
        .unwrap();
        assert_eq!(vec![2], structure.leaf_ids());
    }

    #[test]
    fn test_duplicate_id() {
        assert!(EventStructure::new_with_events(vec![
            Event::new(1, vec![], vec![]),
            Event::new(1, vec![], vec![]),
        ])
        .is_err());
    }

    #[test]
    fn test_get_event() {
        let structure =
            EventStructure::new_with_events(vec![Event::new(7, vec![], vec![3])]).unwrap();
        assert_eq!(&[3], structure.get_event(7).unwrap().conflicts());
        assert!(structure.get_event(3).is_none());
    }

    #[test]
    fn test_dangling_references() {
        let structure = EventStructure::new_with_events(vec![
            Event::new(1, vec![5], vec![4]),
            Event::new(2, vec![1], vec![4]),
        ])
        .unwrap();
        assert_eq!(vec![4, 5], structure.dangling_references());
    }
}
