//! delcap - Deletion-channel capacity estimation via the Blahut-Arimoto algorithm.
//!
//! ## Architecture
//!
//! The solver refines an input distribution toward the capacity-achieving one
//! by iterating a fixed-point step over an exponentially large input alphabet:
//!
//! - **Work Partitioner**: tiles the alphabet index range into contiguous
//!   chunks, one per worker slot
//! - **Parallel Kernel Executor**: runs one kernel invocation per chunk on a
//!   bounded per-phase pool and returns results in chunk order
//! - **Log-Domain Combiner**: merges per-chunk log-densities with log-sum-exp,
//!   so the worker count never changes the numbers a run produces
//! - **BAA Step Engine**: density phase, then alpha phase, then log-space
//!   normalization into the next distribution
//! - **Convergence Controller**: loops steps until the BAA bound drops below
//!   tolerance, then evaluates the achieved rate in bits
//!
//! Kernels exchange distributions and intermediate arrays with the driver
//! through files under the run's storage root. The snapshot is written once
//! per step by the controller and read by every chunk task; no mutable state
//! is shared between tasks.

pub mod kernel;
pub mod models;
pub mod pipeline;
pub mod pool;
pub mod store;

// Re-exports for convenience
pub use kernel::{ChannelKernel, Codeword, CodewordRole, DeletionKernel, KernelTask};
pub use models::{
    ChannelModel, DelcapError, Distribution, ExperimentConfig, Result, RunConfig, RunSummary,
};
pub use pipeline::{BaaOutcome, BaaSolver, IterationRecord, NoProgress, ProgressSink};
pub use pool::{dispatch, partition, Chunk};
