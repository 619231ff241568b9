//! Pipeline module - the BAA step engine, convergence loop and rate evaluator.

mod logsum;
mod solver;
mod step;

pub use logsum::*;
pub use solver::*;
