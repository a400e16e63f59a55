//! Lab areas and area alias resolution
//!
//! Areas are reference data read from the store. Query operations take an
//! area alias (`all`, `cleanroom`, `robin`, ...) which resolves to a stable,
//! non-empty set of areas through [`AreaSelector`].

pub mod area;
pub mod selector;

pub use area::*;
pub use selector::*;
