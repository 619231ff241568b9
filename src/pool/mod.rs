//! Pool module - work partitioning and the parallel kernel executor.

mod executor;
mod partition;

pub use executor::*;
pub use partition::*;
