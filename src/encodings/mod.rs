//! Objects used to translate event structures and constraint systems into solver inputs.

mod cnf_encoder;
pub use cnf_encoder::CnfEncoding;

mod cover_instance;
pub use cover_instance::CoverInstance;

mod event_structure_encoder;
pub use event_structure_encoder::EventStructureEncoder;
