//! Run summary persisted beside the final distribution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Summary of a converged BAA run, written to `summary.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Length of every transmitted codeword (bits)
    pub input_length: u32,

    /// Maximum length of a received codeword (bits)
    pub max_output_length: u32,

    /// Per-bit deletion probability
    pub deletion_probability: f64,

    /// Whether the received alphabet spans every length up to the maximum
    pub truncate_output: bool,

    /// Concurrent kernel tasks per phase
    pub worker_count: usize,

    /// Convergence tolerance the run was driven to
    pub tolerance: f64,

    /// Completed BAA steps
    pub iterations: usize,

    /// BAA bound achieved at convergence
    pub final_distance: f64,

    /// Mutual-information rate of the final distribution, in bits
    pub rate_bits: f64,

    /// Total runtime in seconds
    pub runtime_secs: f64,

    /// When the run finished
    pub completed_at: DateTime<Utc>,
}
