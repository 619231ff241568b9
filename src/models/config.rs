//! Run configuration and experiment files.
//!
//! An experiment file is TOML with a `[channel]` table and a `[run]` table.
//! The run configuration owns every canonical file location under the storage
//! root; kernels and the solver never build paths themselves.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ChannelModel;

/// Immutable description of a particular execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding codeword sets, snapshots and scratch arrays
    pub storage_root: PathBuf,

    /// Number of concurrent kernel tasks per phase
    pub worker_count: usize,

    /// BAA bound at which the run is considered converged
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,

    /// Report every iteration at info level
    #[serde(default)]
    pub verbose: bool,
}

fn default_tolerance() -> f64 {
    0.05
}

impl RunConfig {
    /// Semantic validation, run before any work is dispatched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker_count == 0 {
            return Err(ConfigError::InvalidWorkerCount(self.worker_count));
        }
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(())
    }

    /// The transmitted codeword set.
    pub fn transmitted_path(&self) -> PathBuf {
        self.storage_root.join("transmitted.codewords")
    }

    /// The received codeword set.
    pub fn received_path(&self) -> PathBuf {
        self.storage_root.join("received.codewords")
    }

    /// The per-step distribution snapshot read by every kernel task.
    pub fn current_q_path(&self) -> PathBuf {
        self.storage_root.join("current_q.arr")
    }

    /// Scratch output of one density chunk.
    pub fn log_den_path(&self, chunk: usize) -> PathBuf {
        self.storage_root.join(format!("log_den_{chunk}.arr"))
    }

    /// Scratch output of one alpha chunk.
    pub fn alpha_path(&self, chunk: usize) -> PathBuf {
        self.storage_root.join(format!("alpha_{chunk}.arr"))
    }

    /// Scratch output of one rate chunk.
    pub fn rate_path(&self, chunk: usize) -> PathBuf {
        self.storage_root.join(format!("rate_{chunk}.arr"))
    }

    /// The combined whole-alphabet log-density array.
    pub fn log_den_all_path(&self) -> PathBuf {
        self.storage_root.join("log_den_all.arr")
    }

    /// The final distribution of a converged run.
    pub fn final_q_path(&self) -> PathBuf {
        self.storage_root.join("final_q.arr")
    }

    /// The JSON run summary.
    pub fn summary_path(&self) -> PathBuf {
        self.storage_root.join("summary.json")
    }
}

/// Top-level experiment file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Channel under study
    pub channel: ChannelModel,

    /// How to execute the run
    pub run: RunConfig,
}

impl ExperimentConfig {
    /// Load an experiment from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    /// Validate both halves of the experiment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.channel.validate()?;
        self.run.validate()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    #[error("Invalid tolerance: {0} (must be positive and finite)")]
    InvalidTolerance(f64),

    #[error("Invalid channel: {0}")]
    InvalidChannel(String),

    #[error("Input alphabet is empty; nothing to partition")]
    EmptyAlphabet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn run_config() -> RunConfig {
        RunConfig {
            storage_root: PathBuf::from("experiments/test"),
            worker_count: 4,
            tolerance: 0.05,
            verbose: false,
        }
    }

    #[test]
    fn test_from_file_applies_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[channel]
input_length = 5
max_output_length = 5
deletion_probability = 0.1

[run]
storage_root = "experiments/d01"
worker_count = 2
"#
        )
        .unwrap();

        let config = ExperimentConfig::from_file(file.path()).unwrap();
        assert!(!config.channel.truncate_output);
        assert_eq!(config.run.tolerance, 0.05);
        assert!(!config.run.verbose);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "not an experiment").unwrap();
        assert!(matches!(
            ExperimentConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_from_file_missing_file() {
        let path = PathBuf::from("/nonexistent/experiment.toml");
        assert!(matches!(
            ExperimentConfig::from_file(&path),
            Err(ConfigError::FileRead { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let mut config = run_config();
        config.worker_count = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_tolerance() {
        let mut config = run_config();
        config.tolerance = 0.0;
        assert!(config.validate().is_err());
        config.tolerance = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_canonical_paths() {
        let config = run_config();
        assert!(config.transmitted_path().ends_with("transmitted.codewords"));
        assert!(config.received_path().ends_with("received.codewords"));
        assert!(config.current_q_path().ends_with("current_q.arr"));
        assert!(config.log_den_path(3).ends_with("log_den_3.arr"));
        assert!(config.alpha_path(0).ends_with("alpha_0.arr"));
        assert!(config.rate_path(7).ends_with("rate_7.arr"));
        assert!(config.log_den_all_path().ends_with("log_den_all.arr"));
    }
}
