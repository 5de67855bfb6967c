//! Boolean constraint systems and the event variables they are built on.

mod constraint_system;
pub use constraint_system::ConstraintSystem;

mod event_var;
pub use event_var::EventVar;

mod formula;
pub use formula::Formula;
pub use formula::FormulaRef;
pub use formula::Quantifier;

mod variable_extractor;
pub use variable_extractor::extract_leaf_vars;
