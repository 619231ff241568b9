//! Error types for delcap.
//!
//! Taxonomy:
//! - Rejected input: bad channel/run configuration, malformed distributions
//! - Failed work: kernel tasks and the files they exchange
//! - Broken invariants: internal bugs, should not happen

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for delcap.
#[derive(Debug, Error)]
pub enum DelcapError {
    // ═══════════════════════════════════════════════════════════════════
    // REJECTED INPUT — caller handed us something unusable
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] super::ConfigError),

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    // ═══════════════════════════════════════════════════════════════════
    // FAILED WORK — a kernel task or its storage went bad
    // ═══════════════════════════════════════════════════════════════════

    #[error("Kernel task failed on chunk {chunk}: {message}")]
    KernelExecution { chunk: usize, message: String },

    #[error("Storage error: {context}")]
    Storage {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Codec error: {context}")]
    Codec {
        context: String,
        #[source]
        source: bincode::Error,
    },

    #[error("Array shape mismatch in {path}: expected {expected} entries, found {found}")]
    ArrayShape {
        path: PathBuf,
        expected: usize,
        found: usize,
    },

    // ═══════════════════════════════════════════════════════════════════
    // BROKEN INVARIANTS — bugs, should not happen
    // ═══════════════════════════════════════════════════════════════════

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DelcapError {
    /// Create a storage error with context.
    pub fn storage(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }

    /// Create a codec error with context.
    pub fn codec(context: impl Into<String>, source: bincode::Error) -> Self {
        Self::Codec {
            context: context.into(),
            source,
        }
    }

    /// Create a kernel execution error tagged with the failing chunk.
    pub fn kernel(chunk: usize, message: impl Into<String>) -> Self {
        Self::KernelExecution {
            chunk,
            message: message.into(),
        }
    }

    /// Tag an error with the chunk whose task raised it, unless already tagged.
    pub fn for_chunk(self, chunk: usize) -> Self {
        match self {
            tagged @ Self::KernelExecution { .. } => tagged,
            other => Self::kernel(chunk, other.to_string()),
        }
    }
}

/// Result type alias for delcap.
pub type Result<T> = std::result::Result<T, DelcapError>;
