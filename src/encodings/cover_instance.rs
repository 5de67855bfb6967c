use super::EventStructureEncoder;
use crate::{
    events::EventStructure,
    formula::{self, ConstraintSystem, EventVar},
    utils::CoverError,
};

/// The input of the covering algorithms: a constraint system and the leaf variables to cover.
///
/// The order of the leaf variables is the enumeration order used by the algorithms.
#[derive(Debug, Clone, Default)]
pub struct CoverInstance {
    constraints: ConstraintSystem,
    leaf_vars: Vec<EventVar>,
}

impl CoverInstance {
    /// Builds an instance from its components.
    pub fn new(constraints: ConstraintSystem, leaf_vars: Vec<EventVar>) -> Self {
        Self {
            constraints,
            leaf_vars,
        }
    }

    /// Builds an instance by encoding an event structure.
    ///
    /// Leaf variables follow the order of the events in the structure.
    pub fn from_event_structure(structure: &EventStructure) -> Self {
        let (constraints, leaf_vars) = EventStructureEncoder::default().encode(structure);
        Self::new(constraints, leaf_vars)
    }

    /// Builds an instance from a constraint system, extracting its leaf variables.
    ///
    /// Leaf variables are sorted by event identifier.
    pub fn from_constraint_system(constraints: ConstraintSystem) -> Result<Self, CoverError> {
        let leaf_vars = formula::extract_leaf_vars(&constraints)?;
        Ok(Self::new(constraints, leaf_vars))
    }

    /// Returns the constraint system.
    pub fn constraints(&self) -> &ConstraintSystem {
        &self.constraints
    }

    /// Returns the leaf variables, in enumeration order.
    pub fn leaf_vars(&self) -> &[EventVar] {
        &self.leaf_vars
    }

    /// Returns the number of leaf variables.
    pub fn n_leaf_vars(&self) -> usize {
        self.leaf_vars.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{events::Event, formula::Formula};

    #[test]
    fn test_from_event_structure() {
        let structure = EventStructure::new_with_events(vec![
            Event::new(5, vec![], vec![]),
            Event::new(2, vec![5], vec![]),
            Event::new(1, vec![5], vec![]),
        ])
        .unwrap();
        let instance = CoverInstance::from_event_structure(&structure);
        assert_eq!(
            vec![2, 1],
            instance
                .leaf_vars()
                .iter()
                .map(|v| v.event_id())
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_from_constraint_system() {
        let mut system = ConstraintSystem::default();
        system.assert(Formula::or(vec![Formula::var("el4"), Formula::var("el2")]));
        system.assert(Formula::implies(Formula::var("el4"), Formula::var("e1")));
        let instance = CoverInstance::from_constraint_system(system).unwrap();
        assert_eq!(
            vec![EventVar::new(2, true), EventVar::new(4, true)],
            instance.leaf_vars()
        );
        assert_eq!(2, instance.constraints().len());
    }
}
