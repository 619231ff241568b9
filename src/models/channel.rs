//! Channel model for the binary deletion channel.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Immutable description of a deletion channel.
///
/// Transmitted words are `input_length` bits. A word and its bitwise
/// complement have identical deletion behavior up to relabeling, so only one
/// representative per complement pair is enumerated and the input alphabet
/// holds `2^(input_length - 1)` words.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelModel {
    /// Length of every transmitted codeword (bits)
    pub input_length: u32,

    /// Maximum length of a received codeword (bits)
    pub max_output_length: u32,

    /// Probability that any single transmitted bit is deleted
    pub deletion_probability: f64,

    /// Whether the received alphabet spans every length up to
    /// `max_output_length`, or only words of exactly that length
    #[serde(default)]
    pub truncate_output: bool,
}

impl ChannelModel {
    /// Number of transmitted codewords (one representative per complement pair).
    pub fn input_alphabet_size(&self) -> usize {
        1usize << (self.input_length - 1)
    }

    /// Number of received codewords.
    pub fn output_alphabet_size(&self) -> usize {
        if self.truncate_output {
            (1usize << (self.max_output_length + 1)) - 1
        } else {
            1usize << self.max_output_length
        }
    }

    /// Semantic validation, run before any work is dispatched.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input_length == 0 {
            return Err(ConfigError::InvalidChannel(
                "input_length must be at least 1".to_string(),
            ));
        }
        if self.max_output_length == 0 {
            return Err(ConfigError::InvalidChannel(
                "max_output_length must be at least 1".to_string(),
            ));
        }
        if self.input_length > 31 || self.max_output_length > 31 {
            return Err(ConfigError::InvalidChannel(
                "codeword lengths above 31 bits do not fit the packed representation".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.deletion_probability) {
            return Err(ConfigError::InvalidChannel(format!(
                "deletion_probability {} is outside [0, 1]",
                self.deletion_probability
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel(truncate: bool) -> ChannelModel {
        ChannelModel {
            input_length: 3,
            max_output_length: 3,
            deletion_probability: 0.1,
            truncate_output: truncate,
        }
    }

    #[test]
    fn test_derived_alphabet_sizes() {
        assert_eq!(channel(false).input_alphabet_size(), 4);
        assert_eq!(channel(false).output_alphabet_size(), 8);
        assert_eq!(channel(true).output_alphabet_size(), 15);
    }

    #[test]
    fn test_validate_accepts_valid_channel() {
        assert!(channel(true).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_input_length() {
        let mut c = channel(false);
        c.input_length = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_deletion_probability() {
        let mut c = channel(false);
        c.deletion_probability = 1.5;
        assert!(c.validate().is_err());
        c.deletion_probability = -0.1;
        assert!(c.validate().is_err());
        c.deletion_probability = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_lengths() {
        let mut c = channel(false);
        c.input_length = 32;
        assert!(c.validate().is_err());
    }
}
