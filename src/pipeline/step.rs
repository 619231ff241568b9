//! Single BAA fixed-point step.
//!
//! Sub-steps carry a strict data dependency order: the distribution snapshot
//! is persisted before the density phase reads it, and the whole-alphabet
//! log-density array is persisted before the alpha phase reads it.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::debug;

use super::logsum::combine_log_columns;
use super::solver::BaaSolver;
use crate::kernel::KernelTask;
use crate::models::{DelcapError, Distribution, Result};
use crate::pool::{dispatch, partition, Chunk};
use crate::store;

impl BaaSolver {
    /// One fixed-point update of the input distribution.
    pub async fn step(&self, current: &Distribution) -> Result<Distribution> {
        self.check_length(current)?;
        store::save_array(current.as_slice(), &self.run.current_q_path())?;

        self.density_phase().await?;
        let alphas = self.alpha_phase().await?;

        // Normalize in log space: align on the maximum so exponentiation
        // cannot overflow, then divide by the sum.
        let max = alphas.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if !max.is_finite() {
            return Err(DelcapError::Internal(
                "every alpha is zero; the step cannot produce a distribution".to_string(),
            ));
        }
        let mut next: Vec<f64> = alphas.iter().map(|a| (a - max).exp()).collect();
        let sum: f64 = next.iter().sum();
        for value in &mut next {
            *value /= sum;
        }
        Distribution::from_probs(next)
    }

    /// Phase A: per-chunk log-densities, combined with log-sum-exp and
    /// persisted for Phase B and the rate evaluator.
    pub(crate) async fn density_phase(&self) -> Result<Vec<f64>> {
        let chunks = partition(self.channel.input_alphabet_size(), self.run.worker_count)?;
        let tasks = self.phase_tasks(&chunks, |c| self.run.log_den_path(c.index));
        let kernel = Arc::clone(&self.kernel);

        debug!(chunks = chunks.len(), "Dispatching density phase");
        let columns = dispatch(self.run.worker_count, tasks, move |task: KernelTask| {
            let chunk = task.chunk.index;
            kernel.log_densities(&task).map_err(|e| e.for_chunk(chunk))
        })
        .await?;

        let combined = combine_log_columns(&columns)?;
        store::save_array(&combined, &self.run.log_den_all_path())?;
        Ok(combined)
    }

    /// Phase B: per-chunk alphas, concatenated positionally so alphabet
    /// ordering survives the split.
    pub(crate) async fn alpha_phase(&self) -> Result<Vec<f64>> {
        let chunks = partition(self.channel.input_alphabet_size(), self.run.worker_count)?;
        let tasks = self.phase_tasks(&chunks, |c| self.run.alpha_path(c.index));
        let kernel = Arc::clone(&self.kernel);
        let log_den_all = self.run.log_den_all_path();

        debug!(chunks = chunks.len(), "Dispatching alpha phase");
        let parts = dispatch(self.run.worker_count, tasks, move |task: KernelTask| {
            let chunk = task.chunk.index;
            kernel
                .alphas(&task, &log_den_all)
                .map_err(|e| e.for_chunk(chunk))
        })
        .await?;

        let mut alphas = Vec::with_capacity(self.channel.input_alphabet_size());
        for part in parts {
            alphas.extend(part);
        }
        Ok(alphas)
    }

    pub(crate) fn phase_tasks(
        &self,
        chunks: &[Chunk],
        scratch: impl Fn(&Chunk) -> PathBuf,
    ) -> Vec<KernelTask> {
        chunks
            .iter()
            .map(|chunk| KernelTask {
                chunk: *chunk,
                transmitted_path: self.run.transmitted_path(),
                received_path: self.run.received_path(),
                snapshot_path: self.run.current_q_path(),
                scratch_path: scratch(chunk),
                channel: self.channel.clone(),
            })
            .collect()
    }
}
