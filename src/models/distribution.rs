//! Input distribution over the transmitted alphabet.

use super::{DelcapError, Result};

/// Absolute slack allowed on the unit sum when accepting raw probabilities.
const UNIT_SUM_TOLERANCE: f64 = 1e-6;

/// A probability distribution over the transmitted codewords.
///
/// Constructed, never mutated: each BAA step produces a fresh distribution,
/// and the previous one survives only for the distance computation.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution(Vec<f64>);

impl Distribution {
    /// The uniform distribution over `n` symbols.
    pub fn uniform(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(DelcapError::InvalidDistribution(
                "cannot build a distribution over zero symbols".to_string(),
            ));
        }
        Ok(Self(vec![1.0 / n as f64; n]))
    }

    /// Validate and wrap raw probabilities.
    pub fn from_probs(probs: Vec<f64>) -> Result<Self> {
        if probs.is_empty() {
            return Err(DelcapError::InvalidDistribution(
                "cannot build a distribution over zero symbols".to_string(),
            ));
        }
        if probs.iter().any(|p| !p.is_finite() || *p < 0.0) {
            return Err(DelcapError::InvalidDistribution(
                "entries must be finite and non-negative".to_string(),
            ));
        }
        let sum: f64 = probs.iter().sum();
        if (sum - 1.0).abs() > UNIT_SUM_TOLERANCE {
            return Err(DelcapError::InvalidDistribution(format!(
                "entries sum to {sum}, not 1"
            )));
        }
        Ok(Self(probs))
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The probabilities, in symbol order.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_sums_to_one() {
        let q = Distribution::uniform(16).unwrap();
        let sum: f64 = q.as_slice().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
        assert_eq!(q.len(), 16);
    }

    #[test]
    fn test_uniform_rejects_empty() {
        assert!(Distribution::uniform(0).is_err());
    }

    #[test]
    fn test_from_probs_accepts_valid() {
        let q = Distribution::from_probs(vec![0.25, 0.25, 0.5]).unwrap();
        assert_eq!(q.as_slice(), &[0.25, 0.25, 0.5]);
    }

    #[test]
    fn test_from_probs_accepts_zero_entries() {
        assert!(Distribution::from_probs(vec![0.5, 0.5, 0.0, 0.0]).is_ok());
    }

    #[test]
    fn test_from_probs_rejects_negative() {
        assert!(Distribution::from_probs(vec![0.6, 0.5, -0.1]).is_err());
    }

    #[test]
    fn test_from_probs_rejects_wrong_sum() {
        assert!(Distribution::from_probs(vec![0.3, 0.3]).is_err());
    }

    #[test]
    fn test_from_probs_rejects_non_finite() {
        assert!(Distribution::from_probs(vec![f64::NAN, 1.0]).is_err());
        assert!(Distribution::from_probs(vec![f64::INFINITY, 0.0]).is_err());
    }
}
