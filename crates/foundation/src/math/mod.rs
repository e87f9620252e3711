pub mod barycentric;
pub mod body;
pub mod projection;
pub mod vec;
pub mod wrap;

pub use barycentric::*;
pub use body::*;
pub use projection::*;
pub use vec::*;
pub use wrap::*;
