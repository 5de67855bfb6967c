use crate::{
    events::EventStructure,
    formula::{ConstraintSystem, EventVar, Formula, FormulaRef},
};
use std::collections::HashMap;

/// An encoder from event structures to constraint systems.
///
/// Each event is bound to its [`EventVar`]; the following assertions are made for an event `v`:
///
/// * `v => p` for each predecessor `p`,
/// * `v => (not (or c1 ... cm))` if the event has conflicts `c1` to `cm`,
/// * `v or (not v)`, which makes the variable appear in the system even if the event is isolated.
///
/// The leaf variables are returned in the order the events appear in the structure.
///
/// # Example
///
/// ```
/// # use escover::events::{Event, EventStructure};
/// # use escover::encodings::EventStructureEncoder;
/// let structure = EventStructure::new_with_events(vec![
///     Event::new(1, vec![], vec![]),
///     Event::new(2, vec![1], vec![]),
/// ]).unwrap();
/// let (system, leaves) = EventStructureEncoder::default().encode(&structure);
/// assert_eq!(3, system.len());
/// assert_eq!("el2", leaves[0].name());
/// ```
#[derive(Default)]
pub struct EventStructureEncoder;

impl EventStructureEncoder {
    /// Encodes an event structure, returning the constraint system and the leaf variables.
    pub fn encode(&self, structure: &EventStructure) -> (ConstraintSystem, Vec<EventVar>) {
        let mut formula_vars = HashMap::new();
        let mut var_of = |id: usize| -> FormulaRef {
            formula_vars
                .entry(id)
                .or_insert_with(|| Formula::var(Self::event_var(structure, id).name()))
                .clone()
        };
        let mut system = ConstraintSystem::default();
        for event in structure.iter() {
            let v = var_of(event.id());
            event
                .predecessors()
                .iter()
                .for_each(|p| system.assert(Formula::implies(v.clone(), var_of(*p))));
            if !event.conflicts().is_empty() {
                let conflicts = event.conflicts().iter().map(|c| var_of(*c)).collect();
                system.assert(Formula::implies(
                    v.clone(),
                    Formula::not(Formula::or(conflicts)),
                ));
            }
            system.assert(Formula::or(vec![v.clone(), Formula::not(v)]));
        }
        let leaves = structure
            .leaf_ids()
            .into_iter()
            .map(|id| EventVar::new(id, true))
            .collect();
        (system, leaves)
    }

    /// Returns the variable bound to an event identifier.
    ///
    /// Identifiers that match no event are not leaves.
    pub fn event_var(structure: &EventStructure, id: usize) -> EventVar {
        EventVar::new(id, structure.is_leaf(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::Event;

    fn scenario() -> EventStructure {
        EventStructure::new_with_events(vec![
            Event::new(1, vec![], vec![]),
            Event::new(2, vec![1], vec![]),
            Event::new(3, vec![1], vec![2]),
        ])
        .unwrap()
    }

    #[test]
    fn test_leaves() {
        let (_, leaves) = EventStructureEncoder::default().encode(&scenario());
        assert_eq!(vec![EventVar::new(2, true), EventVar::new(3, true)], leaves);
    }

    #[test]
    fn test_assertions() {
        let (system, _) = EventStructureEncoder::default().encode(&scenario());
        let assertions = system.iter().map(|f| f.to_string()).collect::<Vec<_>>();
        assert_eq!(
            vec![
                "(or e1 (not e1))",
                "(=> el2 e1)",
                "(or el2 (not el2))",
                "(=> el3 e1)",
                "(=> el3 (not (or el2)))",
                "(or el3 (not el3))",
            ],
            assertions
        );
    }

    #[test]
    fn test_variables_are_shared() {
        let (system, _) = EventStructureEncoder::default().encode(&scenario());
        let implications = system
            .iter()
            .filter_map(|f| match f.as_ref() {
                Formula::Implies(_, c) if matches!(c.as_ref(), Formula::Var(_)) => Some(c.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(2, implications.len());
        assert!(std::rc::Rc::ptr_eq(&implications[0], &implications[1]));
    }

    #[test]
    fn test_dangling_reference_is_internal() {
        let structure =
            EventStructure::new_with_events(vec![Event::new(1, vec![], vec![7])]).unwrap();
        let (system, leaves) = EventStructureEncoder::default().encode(&structure);
        assert_eq!(vec![EventVar::new(1, true)], leaves);
        assert_eq!("(=> el1 (not (or e7)))", system.iter().next().unwrap().to_string());
    }

    #[test]
    fn test_empty_structure() {
        let (system, leaves) = EventStructureEncoder::default().encode(&EventStructure::default());
        assert!(system.is_empty());
        assert!(leaves.is_empty());
    }
}
