//! Convergence controller and rate evaluator.
//!
//! The controller drives BAA steps until the per-symbol log-ratio bound
//! drops below the run tolerance, then evaluates the rate of the converged
//! distribution. Every phase is synchronous from its point of view: a step
//! never overlaps another, and Phase B never starts before Phase A finished.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::kernel::{
    generate_codewords, ChannelKernel, CodewordRole, DeletionKernel, KernelTask,
};
use crate::models::{ChannelModel, DelcapError, Distribution, Result, RunConfig};
use crate::pool::{dispatch, partition};
use crate::store;

/// Per-iteration progress record, reported through a [`ProgressSink`].
#[derive(Debug, Clone, Copy)]
pub struct IterationRecord {
    /// 0-based iteration index
    pub index: usize,
    /// BAA bound after this step
    pub distance: f64,
    /// Seconds elapsed since the run started
    pub wall_time: f64,
}

/// Caller-supplied observer for iteration progress.
///
/// The loop itself carries no console concerns; this sink is its only
/// per-iteration output besides the final result.
pub trait ProgressSink {
    fn on_iteration(&mut self, record: &IterationRecord);
}

/// Default sink that reports nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn on_iteration(&mut self, _record: &IterationRecord) {}
}

/// Result of a converged BAA run.
#[derive(Debug, Clone)]
pub struct BaaOutcome {
    /// The capacity-achieving distribution estimate
    pub distribution: Distribution,
    /// BAA bound achieved on the last step
    pub distance: f64,
    /// Mutual-information rate of the distribution, in bits
    pub rate_bits: f64,
    /// Completed BAA steps
    pub iterations: usize,
}

/// Drives repeated BAA steps over a channel kernel.
pub struct BaaSolver {
    pub(crate) channel: ChannelModel,
    pub(crate) run: RunConfig,
    pub(crate) kernel: Arc<dyn ChannelKernel>,
}

impl BaaSolver {
    /// Create a solver over the binary deletion channel kernel.
    ///
    /// Fails fast on invalid channel or run parameters; nothing is ever
    /// dispatched from an unvalidated solver.
    pub fn new(channel: ChannelModel, run: RunConfig) -> Result<Self> {
        Self::with_kernel(channel, run, Arc::new(DeletionKernel))
    }

    /// Create a solver with a caller-supplied kernel.
    pub fn with_kernel(
        channel: ChannelModel,
        run: RunConfig,
        kernel: Arc<dyn ChannelKernel>,
    ) -> Result<Self> {
        channel.validate()?;
        run.validate()?;
        Ok(Self {
            channel,
            run,
            kernel,
        })
    }

    /// Create the storage root and generate both codeword sets.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.run.storage_root).map_err(|e| {
            DelcapError::storage(format!("creating {}", self.run.storage_root.display()), e)
        })?;
        generate_codewords(
            false,
            self.channel.input_length,
            &self.run.transmitted_path(),
            CodewordRole::Transmitted,
        )?;
        generate_codewords(
            self.channel.truncate_output,
            self.channel.max_output_length,
            &self.run.received_path(),
            CodewordRole::Received,
        )?;
        Ok(())
    }

    /// Run BAA from `initial` until the bound drops below the tolerance.
    ///
    /// There is no iteration cap; a non-convergent configuration loops until
    /// the caller bounds it externally. Any kernel, storage or setup failure
    /// aborts the run with no partial result.
    pub async fn run(
        &self,
        initial: Distribution,
        progress: &mut dyn ProgressSink,
    ) -> Result<BaaOutcome> {
        self.check_length(&initial)?;
        self.prepare()?;

        info!(
            input_length = self.channel.input_length,
            max_output_length = self.channel.max_output_length,
            deletion_probability = self.channel.deletion_probability,
            workers = self.run.worker_count,
            tolerance = self.run.tolerance,
            "Starting BAA run"
        );

        let start = Instant::now();
        let mut current = initial;
        let mut index = 0usize;

        loop {
            let next = self.step(&current).await?;
            let dist = distance(&next, &current);

            let record = IterationRecord {
                index,
                distance: dist,
                wall_time: start.elapsed().as_secs_f64(),
            };
            progress.on_iteration(&record);
            if self.run.verbose {
                info!(
                    iteration = index,
                    distance = dist,
                    runtime_secs = record.wall_time,
                    "BAA iteration"
                );
            } else {
                debug!(iteration = index, distance = dist, "BAA iteration");
            }

            current = next;
            if dist < self.run.tolerance {
                let rate_bits = self.rate(&current).await?;
                info!(
                    iterations = index + 1,
                    distance = dist,
                    rate_bits,
                    "BAA converged"
                );
                return Ok(BaaOutcome {
                    distribution: current,
                    distance: dist,
                    rate_bits,
                    iterations: index + 1,
                });
            }
            index += 1;
        }
    }

    /// Mutual-information rate of `q` through the channel, in bits.
    ///
    /// Recomputes the density phase for this exact `q` rather than reusing a
    /// prior step's arrays, then sums the per-chunk rate contributions.
    pub async fn rate(&self, q: &Distribution) -> Result<f64> {
        self.check_length(q)?;
        store::save_array(q.as_slice(), &self.run.current_q_path())?;
        self.density_phase().await?;

        let chunks = partition(self.channel.input_alphabet_size(), self.run.worker_count)?;
        let tasks = self.phase_tasks(&chunks, |c| self.run.rate_path(c.index));
        let kernel = Arc::clone(&self.kernel);
        let log_den_all = self.run.log_den_all_path();

        let parts = dispatch(self.run.worker_count, tasks, move |task: KernelTask| {
            let chunk = task.chunk.index;
            kernel
                .rate_contribution(&task, &log_den_all)
                .map_err(|e| e.for_chunk(chunk))
        })
        .await?;

        Ok(parts.iter().sum::<f64>() / std::f64::consts::LN_2)
    }

    pub(crate) fn check_length(&self, q: &Distribution) -> Result<()> {
        let expected = self.channel.input_alphabet_size();
        if q.len() != expected {
            return Err(DelcapError::InvalidDistribution(format!(
                "expected {} entries for this channel, found {}",
                expected,
                q.len()
            )));
        }
        Ok(())
    }
}

/// Maximum per-symbol `log2(next / current)` — the BAA bound on the gap to
/// capacity. A `0/0` ratio is defined as exactly `0`: a symbol of vanishing
/// probability contributes no information and cannot be the bottleneck.
pub(crate) fn distance(next: &Distribution, current: &Distribution) -> f64 {
    next.as_slice()
        .iter()
        .zip(current.as_slice())
        .map(|(n, c)| {
            let ratio = (n / c).log2();
            if ratio.is_nan() {
                0.0
            } else {
                ratio
            }
        })
        .fold(f64::NEG_INFINITY, f64::max)
}
