//! Work partitioner for the input alphabet.

use serde::{Deserialize, Serialize};

use crate::models::{ConfigError, Result};

/// A contiguous, half-open range of transmitted-codeword indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Position of this chunk within its phase
    pub index: usize,
    /// First codeword index covered
    pub start: usize,
    /// One past the last codeword index covered
    pub end: usize,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Split `[0, alphabet_size)` into `ceil(alphabet_size / worker_count)`-sized
/// contiguous chunks, one per worker slot.
///
/// The chunks tile the range exactly, with no gaps or overlaps, ordered by
/// index. Later stages rely on that order when they concatenate or sum
/// per-chunk results positionally. The last chunk may be shorter, and fewer
/// than `worker_count` chunks come back when the alphabet is smaller than the
/// pool.
pub fn partition(alphabet_size: usize, worker_count: usize) -> Result<Vec<Chunk>> {
    if worker_count == 0 {
        return Err(ConfigError::InvalidWorkerCount(worker_count).into());
    }
    if alphabet_size == 0 {
        return Err(ConfigError::EmptyAlphabet.into());
    }

    let chunk_size = (alphabet_size + worker_count - 1) / worker_count;
    let mut chunks = Vec::with_capacity(worker_count);
    let mut start = 0;
    while start < alphabet_size {
        let end = (start + chunk_size).min(alphabet_size);
        chunks.push(Chunk {
            index: chunks.len(),
            start,
            end,
        });
        start = end;
    }
    Ok(chunks)
}
