pub mod mesh;
pub mod prefabs;

pub use mesh::*;
pub use prefabs::*;
