//! Channel kernels - the numeric functions evaluated per chunk.
//!
//! The solver treats a kernel as an opaque collaborator: each chunk task
//! carries a descriptor naming the codeword files, the distribution snapshot
//! and a scratch output location, and hands back a numeric payload. Large
//! arrays move between driver and kernel exclusively through those files.

mod codeword;
mod deletion;

pub use codeword::*;
pub use deletion::*;

use std::path::{Path, PathBuf};

use crate::models::{ChannelModel, Result};
use crate::pool::Chunk;

/// Everything a kernel invocation needs to process one chunk.
#[derive(Debug, Clone)]
pub struct KernelTask {
    /// The transmitted-index range this invocation covers
    pub chunk: Chunk,
    /// Transmitted codeword set
    pub transmitted_path: PathBuf,
    /// Received codeword set
    pub received_path: PathBuf,
    /// Distribution snapshot for this step
    pub snapshot_path: PathBuf,
    /// Where this invocation writes its own result
    pub scratch_path: PathBuf,
    /// Channel parameters
    pub channel: ChannelModel,
}

/// Per-chunk numeric kernels for one channel family.
///
/// All three functions are pure given the files they read; each also writes
/// its chunk result to `task.scratch_path` before returning it.
pub trait ChannelKernel: Send + Sync + 'static {
    /// Partial log-density `ln Σ_{k in chunk} Q_k · W(y|k)` for every
    /// received word `y`.
    fn log_densities(&self, task: &KernelTask) -> Result<Vec<f64>>;

    /// `ln α_k` for every `k` in the chunk; consumes the finalized
    /// whole-alphabet log-density array.
    fn alphas(&self, task: &KernelTask, log_den_all: &Path) -> Result<Vec<f64>>;

    /// This chunk's additive contribution to the mutual-information rate,
    /// in nats.
    fn rate_contribution(&self, task: &KernelTask, log_den_all: &Path) -> Result<f64>;
}
