//! Safe SQL builder: identifiers from the schema registry only, values as cast text parameters.

mod builder;
pub mod params;
pub use builder::*;
pub use params::*;
