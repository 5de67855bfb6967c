//! Miscellaneous components used in the library.

mod cover_method;
pub use cover_method::CoverMethod;

mod errors;
pub use errors::CoverError;
pub use errors::InputFormatError;
