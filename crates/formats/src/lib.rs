pub mod heightmap;
pub mod mesh_io;
pub mod raw_heightmap;
pub mod report;

pub use heightmap::*;
pub use mesh_io::*;
pub use raw_heightmap::*;
pub use report::*;
