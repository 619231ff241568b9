//! Array and codeword persistence.
//!
//! Arrays legitimately contain `-inf` entries (log-densities of unreachable
//! symbols), so everything is encoded with bincode rather than a text codec.
//! Writes go through a temp-file-then-rename step, and a save always strictly
//! precedes any kernel read of the same destination within a step.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::kernel::Codeword;
use crate::models::{DelcapError, Result};

/// Persist a numeric array.
pub fn save_array(values: &[f64], destination: &Path) -> Result<()> {
    write_atomic(values, destination)
}

/// Load a numeric array.
pub fn load_array(path: &Path) -> Result<Vec<f64>> {
    read(path)
}

/// Persist a codeword set.
pub fn save_codewords(words: &[Codeword], destination: &Path) -> Result<()> {
    write_atomic(words, destination)
}

/// Load a codeword set.
pub fn load_codewords(path: &Path) -> Result<Vec<Codeword>> {
    read(path)
}

fn write_atomic<T: Serialize + ?Sized>(value: &T, destination: &Path) -> Result<()> {
    let temp_path = destination.with_extension("tmp");

    let file = File::create(&temp_path)
        .map_err(|e| DelcapError::storage(format!("creating {}", temp_path.display()), e))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value)
        .map_err(|e| DelcapError::codec(format!("encoding {}", destination.display()), e))?;
    writer
        .flush()
        .map_err(|e| DelcapError::storage(format!("flushing {}", temp_path.display()), e))?;
    drop(writer);

    fs::rename(&temp_path, destination)
        .map_err(|e| DelcapError::storage(format!("renaming into {}", destination.display()), e))
}

fn read<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path)
        .map_err(|e| DelcapError::storage(format!("opening {}", path.display()), e))?;
    bincode::deserialize_from(BufReader::new(file))
        .map_err(|e| DelcapError::codec(format!("decoding {}", path.display()), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_array_round_trip_with_neg_infinity() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dens.arr");
        let values = vec![0.5, -1234.75, f64::NEG_INFINITY, 0.0];

        save_array(&values, &path).unwrap();
        let loaded = load_array(&path).unwrap();
        assert_eq!(loaded, values);
    }

    #[test]
    fn test_save_overwrites_previous_array() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("q.arr");

        save_array(&[1.0, 0.0], &path).unwrap();
        save_array(&[0.25, 0.75], &path).unwrap();
        assert_eq!(load_array(&path).unwrap(), vec![0.25, 0.75]);
    }

    #[test]
    fn test_codeword_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("set.codewords");
        let words = vec![
            Codeword { bits: 0b000, len: 3 },
            Codeword { bits: 0b101, len: 3 },
            Codeword { bits: 0, len: 0 },
        ];

        save_codewords(&words, &path).unwrap();
        assert_eq!(load_codewords(&path).unwrap(), words);
    }

    #[test]
    fn test_load_missing_file_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let err = load_array(&dir.path().join("missing.arr")).unwrap_err();
        assert!(matches!(err, DelcapError::Storage { .. }));
    }
}
