pub mod location;
pub mod picking;
pub mod prefabs;
pub mod registry;
pub mod selection;

pub use location::*;
pub use registry::*;
pub use selection::*;
