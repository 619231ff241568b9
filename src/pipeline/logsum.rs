//! Log-domain combination of per-chunk density columns.

use crate::models::{DelcapError, Result};

/// Combine per-chunk log-density columns into whole-alphabet log-densities,
/// row by row, with the log-sum-exp identity: `m = max over chunks`, result
/// `= ln(Σ exp(v - m)) + m`.
///
/// Log-densities are typically large negative numbers; aligning on the row
/// maximum keeps the exponentials in range where summing raw densities would
/// underflow. The result is invariant to how the data was chunked, so the
/// worker count never changes the numbers a run produces.
pub fn combine_log_columns(columns: &[Vec<f64>]) -> Result<Vec<f64>> {
    let rows = match columns.first() {
        Some(column) => column.len(),
        None => {
            return Err(DelcapError::Internal(
                "no density columns to combine".to_string(),
            ))
        }
    };
    if columns.iter().any(|column| column.len() != rows) {
        return Err(DelcapError::Internal(
            "density columns differ in length".to_string(),
        ));
    }

    let mut combined = Vec::with_capacity(rows);
    for row in 0..rows {
        let m = columns
            .iter()
            .map(|column| column[row])
            .fold(f64::NEG_INFINITY, f64::max);
        if m == f64::NEG_INFINITY {
            // Every chunk reported zero density for this row.
            combined.push(f64::NEG_INFINITY);
            continue;
        }
        let sum: f64 = columns.iter().map(|column| (column[row] - m).exp()).sum();
        combined.push(sum.ln() + m);
    }
    Ok(combined)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Per-row log of the partial sum of `densities[start..end]`.
    fn partial_log_sums(densities: &[Vec<f64>], start: usize, end: usize) -> Vec<f64> {
        densities
            .iter()
            .map(|row| row[start..end].iter().sum::<f64>().ln())
            .collect()
    }

    #[test]
    fn test_single_column_is_identity() {
        let column = vec![-3.5, 0.0, f64::NEG_INFINITY, 12.25];
        let combined = combine_log_columns(&[column.clone()]).unwrap();
        assert_eq!(combined, column);
    }

    #[test]
    fn test_known_values() {
        let columns = vec![vec![0.1f64.ln()], vec![0.2f64.ln()], vec![0.3f64.ln()]];
        let combined = combine_log_columns(&columns).unwrap();
        assert!((combined[0] - 0.6f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn test_invariant_to_chunking() {
        let densities: Vec<Vec<f64>> = (0..5)
            .map(|row| (0..12).map(|k| 0.01 * ((row * 12 + k) as f64 + 1.0)).collect())
            .collect();

        let whole = combine_log_columns(&[partial_log_sums(&densities, 0, 12)]).unwrap();
        let split = combine_log_columns(&[
            partial_log_sums(&densities, 0, 5),
            partial_log_sums(&densities, 5, 9),
            partial_log_sums(&densities, 9, 12),
        ])
        .unwrap();

        for (a, b) in whole.iter().zip(&split) {
            assert!((a - b).abs() <= 1e-9 * a.abs().max(1.0));
        }
    }

    #[test]
    fn test_stable_for_large_negative_magnitudes() {
        // exp(-1000) underflows to zero; the shifted form must not.
        let columns = vec![vec![-1000.0 + 1f64.ln()], vec![-1000.0 + 2f64.ln()]];
        let combined = combine_log_columns(&columns).unwrap();
        assert!((combined[0] - (-1000.0 + 3f64.ln())).abs() < 1e-9);
    }

    #[test]
    fn test_all_neg_infinity_row_stays_neg_infinity() {
        let columns = vec![
            vec![f64::NEG_INFINITY, -1.0],
            vec![f64::NEG_INFINITY, -2.0],
        ];
        let combined = combine_log_columns(&columns).unwrap();
        assert_eq!(combined[0], f64::NEG_INFINITY);
        assert!(combined[1].is_finite());
    }

    #[test]
    fn test_ragged_columns_rejected() {
        let columns = vec![vec![0.0, 1.0], vec![0.0]];
        assert!(combine_log_columns(&columns).is_err());
    }

    #[test]
    fn test_empty_input_rejected() {
        assert!(combine_log_columns(&[]).is_err());
    }
}
