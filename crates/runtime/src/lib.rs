pub mod cancel;
pub mod metrics;
pub mod progress;

pub use cancel::*;
pub use metrics::*;
pub use progress::*;
