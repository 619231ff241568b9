//! Core data models for delcap.
//!
//! Value objects are immutable once constructed; every semantic constraint is
//! checked up front so the solver fails before any work is dispatched.

mod channel;
mod config;
mod distribution;
mod error;
mod report;

pub use channel::*;
pub use config::*;
pub use distribution::*;
pub use error::*;
pub use report::*;
