//! Packed bit codewords and set enumeration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::Result;
use crate::store;

/// A packed bit word of length at most 31.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Codeword {
    /// The bits, with position 0 at the most significant end of the word
    pub bits: u32,
    /// Number of bits in the word
    pub len: u8,
}

impl Codeword {
    pub fn new(bits: u32, len: u8) -> Self {
        debug_assert!(len <= 31);
        debug_assert!(u64::from(bits) < (1u64 << len));
        Self { bits, len }
    }

    /// Bit at position `i`, counting from the most significant end.
    pub fn bit(&self, i: u8) -> u8 {
        debug_assert!(i < self.len);
        ((self.bits >> (self.len - 1 - i)) & 1) as u8
    }

    /// Bitwise complement within the word's own length.
    pub fn complement(&self) -> Self {
        let mask = (1u32 << self.len) - 1;
        Self {
            bits: !self.bits & mask,
            len: self.len,
        }
    }
}

/// Which half of the channel a codeword set describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodewordRole {
    /// Channel outputs
    Received,
    /// Channel inputs, one representative per complement pair
    Transmitted,
}

/// Enumerate a codeword set in ascending numeric order.
///
/// Transmitted sets hold the `2^(length - 1)` words whose top bit is 0, the
/// complement-pair representatives. Received sets hold every word of exactly
/// `length` bits, or of every length `0..=length` when `truncate` is set.
pub fn enumerate_codewords(truncate: bool, length: u32, role: CodewordRole) -> Vec<Codeword> {
    match role {
        CodewordRole::Transmitted => (0..1u32 << (length - 1))
            .map(|bits| Codeword::new(bits, length as u8))
            .collect(),
        CodewordRole::Received => {
            let lengths = if truncate { 0..=length } else { length..=length };
            lengths
                .flat_map(|l| (0..1u32 << l).map(move |bits| Codeword::new(bits, l as u8)))
                .collect()
        }
    }
}

/// Enumerate a codeword set and persist it; invoked once per run during setup.
pub fn generate_codewords(
    truncate: bool,
    length: u32,
    destination: &Path,
    role: CodewordRole,
) -> Result<()> {
    let words = enumerate_codewords(truncate, length, role);
    store::save_codewords(&words, destination)
}
