use super::{ConstraintSystem, EventVar, Formula};
use crate::utils::CoverError;
use std::{
    collections::{BTreeSet, HashSet, VecDeque},
    rc::Rc,
};

/// Collects the leaf event variables occurring in a constraint system.
///
/// This function is used when a constraint system is not built from an event structure
/// but given as is; the variables to cover are then the ones named after leaf events.
/// Variables are returned sorted by event identifier.
///
/// Sub-formulas shared by several parents are visited once.
/// Quantified formulas are explored through their body;
/// variables bound by quantifiers are not supported and lead to an error.
///
/// # Example
///
/// ```
/// # use escover::formula::{ConstraintSystem, EventVar, Formula, extract_leaf_vars};
/// let mut system = ConstraintSystem::default();
/// system.assert(Formula::implies(Formula::var("el2"), Formula::var("e1")));
/// assert_eq!(vec![EventVar::new(2, true)], extract_leaf_vars(&system).unwrap());
/// ```
pub fn extract_leaf_vars(system: &ConstraintSystem) -> Result<Vec<EventVar>, CoverError> {
    let mut vars = BTreeSet::new();
    let mut seen = HashSet::new();
    let mut work = system.iter().collect::<VecDeque<_>>();
    while let Some(current) = work.pop_front() {
        if !seen.insert(Rc::as_ptr(current)) {
            continue;
        }
        match current.as_ref() {
            Formula::Var(name) => {
                if let Some(v) = EventVar::from_name(name).filter(|v| v.is_leaf()) {
                    vars.insert(v);
                }
            }
            Formula::Bound(_) => {
                return Err(CoverError::UnsupportedExpression(current.to_string()));
            }
            _ => work.extend(current.children()),
        }
    }
    Ok(vars.into_iter().collect())
}
