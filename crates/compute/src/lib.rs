pub mod config;
pub mod displace;

pub use config::*;
pub use displace::*;
