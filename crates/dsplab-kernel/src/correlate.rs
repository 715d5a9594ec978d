//! Direct-form convolution, correlation, Toeplitz systems, matched filtering.
//!
//! # Lag layout
//!
//! [`correlate`]`(u, v)` is `convolve(u, reverse(v))`, so with `|v| = M` the
//! output index `i` holds lag `i − (M − 1)`:
//!
//! ```text
//! R[M−1 + τ] = Σ_n u[n + τ]·v[n]
//! ```
//!
//! Zero lag sits at `M − 1` and positive lags (u delayed relative to v) follow.

use crate::error::{KernelError, Result};
use crate::linalg::Matrix;

/// Full linear convolution, length `|u| + |v| − 1`.
///
/// Either input empty yields an empty output.
pub fn convolve(u: &[f64], v: &[f64]) -> Vec<f64> {
    if u.is_empty() || v.is_empty() {
        return Vec::new();
    }
    let mut out = vec![0.0; u.len() + v.len() - 1];
    for (i, &a) in u.iter().enumerate() {
        if a == 0.0 {
            continue;
        }
        for (j, &b) in v.iter().enumerate() {
            out[i + j] += a * b;
        }
    }
    out
}

/// Full cross-correlation: `convolve(u, reverse(v))`.
pub fn correlate(u: &[f64], v: &[f64]) -> Vec<f64> {
    let reversed: Vec<f64> = v.iter().rev().copied().collect();
    convolve(u, &reversed)
}

/// Autocorrelation lags `0..=max_lag` of `x` (unnormalized).
///
/// Lags past the signal length are zero.
pub fn autocorrelation(x: &[f64], max_lag: usize) -> Vec<f64> {
    (0..=max_lag)
        .map(|lag| {
            x.iter()
                .skip(lag)
                .zip(x.iter())
                .map(|(a, b)| a * b)
                .sum()
        })
        .collect()
}

/// Symmetric Toeplitz matrix `M[i][j] = r[|i − j|]`, of size `|r| × |r|`.
pub fn toeplitz(r: &[f64]) -> Matrix {
    Matrix::from_fn(r.len(), r.len(), |i, j| r[i.abs_diff(j)])
}

/// Mean of squared differences between two equal-length sequences (0 when empty).
pub fn mean_square_error(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(KernelError::LengthMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    if a.is_empty() {
        return Ok(0.0);
    }
    let sum: f64 = a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum();
    Ok(sum / a.len() as f64)
}

/// Result of [`matched_filter`].
#[derive(Debug, Clone, PartialEq)]
pub struct MatchedFilterOutput {
    /// Filter output aligned to the received signal, same length.
    pub score: Vec<f64>,
    /// Index of the first maximum of `|score|`.
    pub peak: usize,
    /// Estimated start of the template in the received signal.
    ///
    /// Negative when the peak lies within half a template of the beginning.
    pub estimated_start: isize,
}

impl MatchedFilterOutput {
    /// True when the estimate is strictly within `tolerance` samples of `truth`.
    pub fn is_within(&self, truth: usize, tolerance: usize) -> bool {
        self.estimated_start.abs_diff(truth as isize) < tolerance
    }

    /// Peak score value.
    pub fn peak_value(&self) -> f64 {
        self.score.get(self.peak).copied().unwrap_or(0.0)
    }
}

/// Correlate `received` against `template` and locate the best match.
///
/// The template is convolved in reversed form and the output is cut to
/// `score = full[L/2 .. L/2 + N]` (integer division, `L = |template|`,
/// `N = |received|`), which centers each template-length window on its
/// score sample. The estimated start is `peak − L/2`.
pub fn matched_filter(received: &[f64], template: &[f64]) -> Result<MatchedFilterOutput> {
    if received.is_empty() {
        return Err(KernelError::invalid("received", "signal is empty"));
    }
    if template.is_empty() {
        return Err(KernelError::invalid("template", "template is empty"));
    }

    let offset = template.len() / 2;
    let full = correlate(received, template);
    let score = full[offset..offset + received.len()].to_vec();

    let mut peak = 0;
    let mut best = f64::NEG_INFINITY;
    for (i, v) in score.iter().enumerate() {
        if v.abs() > best {
            best = v.abs();
            peak = i;
        }
    }

    Ok(MatchedFilterOutput {
        score,
        peak,
        estimated_start: peak as isize - offset as isize,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convolve_identity_and_length() {
        let x = vec![1.0, -2.0, 3.0];
        assert_eq!(convolve(&x, &[1.0]), x);
        assert_eq!(convolve(&x, &[0.0, 1.0, 0.0]).len(), 5);
        assert!(convolve(&x, &[]).is_empty());
        assert_eq!(convolve(&[1.0, 1.0], &[1.0, 1.0]), vec![1.0, 2.0, 1.0]);
    }

    #[test]
    fn test_correlate_zero_lag_position() {
        let x = vec![1.0, 2.0, 3.0];
        let r = correlate(&x, &x);
        assert_eq!(r.len(), 5);
        assert_eq!(r[2], 14.0);
        assert_eq!(r[0], r[4]);
    }

    #[test]
    fn test_correlate_detects_delay() {
        let mut u = vec![0.0; 10];
        u[6] = 1.0;
        let mut v = vec![0.0; 10];
        v[2] = 1.0;
        let r = correlate(&u, &v);
        let peak = r
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        // Lag 4 sits at (M − 1) + 4.
        assert_eq!(peak, 9 + 4);
    }

    #[test]
    fn test_autocorrelation_matches_correlate() {
        let x = vec![0.5, -1.0, 2.0, 0.25];
        let r = autocorrelation(&x, 5);
        let full = correlate(&x, &x);
        for lag in 0..4 {
            assert!((r[lag] - full[3 + lag]).abs() < 1e-15);
        }
        assert_eq!(r[4], 0.0);
        assert_eq!(r[5], 0.0);
    }

    #[test]
    fn test_toeplitz_layout() {
        let m = toeplitz(&[3.0, 2.0, 1.0]);
        assert_eq!(m.row(0), &[3.0, 2.0, 1.0]);
        assert_eq!(m.row(1), &[2.0, 3.0, 2.0]);
        assert_eq!(m.row(2), &[1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_matched_filter_rect_pulse() {
        let template = vec![1.0; 60];
        let mut received = vec![0.0; 500];
        received[150..210].copy_from_slice(&template);
        let out = matched_filter(&received, &template).unwrap();
        assert_eq!(out.score.len(), 500);
        assert!(out.is_within(150, 10), "estimated {}", out.estimated_start);
        assert!((out.peak_value() - 60.0).abs() < 1e-12);
    }

    #[test]
    fn test_matched_filter_rejects_empty() {
        assert!(matched_filter(&[], &[1.0]).is_err());
        assert!(matched_filter(&[1.0], &[]).is_err());
    }

    #[test]
    fn test_mean_square_error() {
        assert_eq!(mean_square_error(&[1.0, 2.0], &[1.0, 4.0]).unwrap(), 2.0);
        assert!(mean_square_error(&[1.0], &[1.0, 2.0]).is_err());
    }
}
