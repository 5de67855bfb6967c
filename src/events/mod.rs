//! This module contains the material used to define event structures.

mod event;
pub use event::Event;

mod event_structure;
pub use event_structure::EventStructure;
