//! The binary deletion channel kernel.
//!
//! Transition probabilities are complement-folded: a word and its bitwise
//! complement behave identically under deletion, so the channel is evaluated
//! over one representative per pair with the pair average as its transition
//! probability. The embedding count is the number of position subsets of the
//! transmitted word that spell the received word as a subsequence.

use std::path::Path;

use tracing::debug;

use super::{ChannelKernel, Codeword, KernelTask};
use crate::models::{DelcapError, Result};
use crate::store;

// Terms with a transition probability below these floors are skipped
// outright; `ln W` is not finite at zero.
const ALPHA_PROB_FLOOR: f64 = 1e-12;
const RATE_PROB_FLOOR: f64 = 1e-20;

/// Kernel for the i.i.d. binary deletion channel.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeletionKernel;

/// Number of position subsets of `x` that spell `y` as a subsequence.
///
/// Counts are accumulated in f64: they top out at `C(n, m)`, which stays
/// exactly representable for every word length the packed codewords allow.
fn count_embeddings(x: Codeword, y: Codeword) -> f64 {
    let n = x.len as usize;
    let m = y.len as usize;
    if m > n {
        return 0.0;
    }

    let mut ways = vec![0.0f64; m + 1];
    ways[0] = 1.0;
    for i in 0..n {
        let xi = x.bit(i as u8);
        for j in (1..=m).rev() {
            if y.bit((j - 1) as u8) == xi {
                ways[j] += ways[j - 1];
            }
        }
    }
    ways[m]
}

/// `W(y|k)`: probability of receiving `y` from the complement pair
/// represented by `x`, with per-bit deletion probability `d`.
fn transition_prob(x: Codeword, y: Codeword, d: f64) -> f64 {
    if y.len > x.len {
        return 0.0;
    }
    let embeddings = (count_embeddings(x, y) + count_embeddings(x.complement(), y)) / 2.0;
    if embeddings == 0.0 {
        return 0.0;
    }
    let deleted = i32::from(x.len - y.len);
    let kept = i32::from(y.len);
    embeddings * d.powi(deleted) * (1.0 - d).powi(kept)
}

struct KernelInputs {
    transmitted: Vec<Codeword>,
    received: Vec<Codeword>,
    snapshot: Vec<f64>,
}

fn load_inputs(task: &KernelTask) -> Result<KernelInputs> {
    let transmitted = store::load_codewords(&task.transmitted_path)?;
    let received = store::load_codewords(&task.received_path)?;
    let snapshot = store::load_array(&task.snapshot_path)?;

    if snapshot.len() != transmitted.len() {
        return Err(DelcapError::ArrayShape {
            path: task.snapshot_path.clone(),
            expected: transmitted.len(),
            found: snapshot.len(),
        });
    }
    if task.chunk.end > transmitted.len() {
        return Err(DelcapError::Internal(format!(
            "chunk {} ends at {} but the transmitted set holds {} words",
            task.chunk.index,
            task.chunk.end,
            transmitted.len()
        )));
    }

    Ok(KernelInputs {
        transmitted,
        received,
        snapshot,
    })
}

fn load_log_den(path: &Path, expected: usize) -> Result<Vec<f64>> {
    let log_den = store::load_array(path)?;
    if log_den.len() != expected {
        return Err(DelcapError::ArrayShape {
            path: path.to_owned(),
            expected,
            found: log_den.len(),
        });
    }
    Ok(log_den)
}

impl ChannelKernel for DeletionKernel {
    fn log_densities(&self, task: &KernelTask) -> Result<Vec<f64>> {
        let inputs = load_inputs(task)?;
        let d = task.channel.deletion_probability;

        let mut column = Vec::with_capacity(inputs.received.len());
        for y in &inputs.received {
            let mut density = 0.0;
            for k in task.chunk.start..task.chunk.end {
                density += inputs.snapshot[k] * transition_prob(inputs.transmitted[k], *y, d);
            }
            // ln(0) = -inf is a legitimate entry: no word in this chunk can
            // produce `y`.
            column.push(density.ln());
        }

        store::save_array(&column, &task.scratch_path)?;
        debug!(chunk = task.chunk.index, rows = column.len(), "Computed chunk log-densities");
        Ok(column)
    }

    fn alphas(&self, task: &KernelTask, log_den_all: &Path) -> Result<Vec<f64>> {
        let inputs = load_inputs(task)?;
        let log_den = load_log_den(log_den_all, inputs.received.len())?;
        let d = task.channel.deletion_probability;

        let mut alphas = Vec::with_capacity(task.chunk.len());
        for k in task.chunk.start..task.chunk.end {
            let q_k = inputs.snapshot[k];
            if q_k == 0.0 {
                // A symbol of zero probability stays at zero mass.
                alphas.push(f64::NEG_INFINITY);
                continue;
            }
            let ln_q = q_k.ln();
            let mut log_alpha = 0.0;
            for (j, y) in inputs.received.iter().enumerate() {
                let w = transition_prob(inputs.transmitted[k], *y, d);
                if w < ALPHA_PROB_FLOOR {
                    continue;
                }
                log_alpha += w * (ln_q + w.ln() - log_den[j]);
            }
            alphas.push(log_alpha);
        }

        store::save_array(&alphas, &task.scratch_path)?;
        debug!(chunk = task.chunk.index, symbols = alphas.len(), "Computed chunk alphas");
        Ok(alphas)
    }

    fn rate_contribution(&self, task: &KernelTask, log_den_all: &Path) -> Result<f64> {
        let inputs = load_inputs(task)?;
        let log_den = load_log_den(log_den_all, inputs.received.len())?;
        let d = task.channel.deletion_probability;

        let mut rate = 0.0;
        for k in task.chunk.start..task.chunk.end {
            let q_k = inputs.snapshot[k];
            if q_k == 0.0 {
                continue;
            }
            for (j, y) in inputs.received.iter().enumerate() {
                let w = transition_prob(inputs.transmitted[k], *y, d);
                if w < RATE_PROB_FLOOR {
                    continue;
                }
                rate += q_k * w * (w.ln() - log_den[j]);
            }
        }

        store::save_array(&[rate], &task.scratch_path)?;
        debug!(chunk = task.chunk.index, rate_nats = rate, "Computed chunk rate contribution");
        Ok(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{enumerate_codewords, CodewordRole};

    #[test]
    fn test_count_embeddings_basics() {
        let x = Codeword::new(0b101, 3);
        assert_eq!(count_embeddings(x, Codeword::new(0b11, 2)), 1.0);
        assert_eq!(count_embeddings(x, Codeword::new(0b01, 2)), 1.0);
        assert_eq!(count_embeddings(x, Codeword::new(0b1, 1)), 2.0);
        assert_eq!(count_embeddings(x, Codeword::new(0, 0)), 1.0);
        assert_eq!(count_embeddings(x, Codeword::new(0b1111, 4)), 0.0);
    }

    #[test]
    fn test_transition_probs_sum_to_one() {
        // Over every output of every length, the deletion channel is a
        // complete probability distribution; folding preserves that.
        let received = enumerate_codewords(true, 3, CodewordRole::Received);
        for bits in 0..4 {
            let x = Codeword::new(bits, 3);
            let total: f64 = received.iter().map(|y| transition_prob(x, *y, 0.3)).sum();
            assert!((total - 1.0).abs() < 1e-12, "sum was {total}");
        }
    }

    #[test]
    fn test_noiseless_transitions_split_across_the_pair() {
        let x = Codeword::new(0b001, 3);
        assert_eq!(transition_prob(x, x, 0.0), 0.5);
        assert_eq!(transition_prob(x, x.complement(), 0.0), 0.5);
        assert_eq!(transition_prob(x, Codeword::new(0b011, 3), 0.0), 0.0);
    }

    #[test]
    fn test_transition_prob_zero_for_longer_outputs() {
        let x = Codeword::new(0b01, 2);
        assert_eq!(transition_prob(x, Codeword::new(0b010, 3), 0.2), 0.0);
    }
}
