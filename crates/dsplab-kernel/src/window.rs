//! Symmetric window functions for FIR design and spectral analysis.
//!
//! All windows are evaluated over `[0, N−1]` (the "symmetric" convention used
//! for filter design), so `w[n] == w[N−1−n]` up to rounding.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Window {
    /// Rectangular (no windowing)
    Rectangular,
    /// Hamming window
    #[default]
    Hamming,
    /// Hann window (raised cosine)
    Hann,
    /// Blackman window
    Blackman,
    /// Half-period sine taper `sin(π(n+½)/N)`
    Sine,
}

impl Window {
    /// All window kinds, in declaration order.
    pub const ALL: [Window; 5] = [
        Window::Rectangular,
        Window::Hamming,
        Window::Hann,
        Window::Blackman,
        Window::Sine,
    ];

    /// Window value at sample `n` of a `len`-sample window.
    pub fn value(&self, n: usize, len: usize) -> f64 {
        if len <= 1 {
            return 1.0;
        }
        let span = (len - 1) as f64;
        let x = 2.0 * PI * n as f64 / span;
        match self {
            Window::Rectangular => 1.0,
            Window::Hamming => 0.54 - 0.46 * x.cos(),
            Window::Hann => 0.5 - 0.5 * x.cos(),
            Window::Blackman => 0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos(),
            Window::Sine => (PI * (n as f64 + 0.5) / len as f64).sin(),
        }
    }

    /// Apply window to a buffer
    pub fn apply(&self, buffer: &mut [f64]) {
        let len = buffer.len();
        for (n, sample) in buffer.iter_mut().enumerate() {
            *sample *= self.value(n, len);
        }
    }

    /// Get window coefficients
    pub fn coefficients(&self, len: usize) -> Vec<f64> {
        (0..len).map(|n| self.value(n, len)).collect()
    }

    /// Lowercase name, as accepted by [`FromStr`].
    pub fn name(&self) -> &'static str {
        match self {
            Window::Rectangular => "rectangular",
            Window::Hamming => "hamming",
            Window::Hann => "hann",
            Window::Blackman => "blackman",
            Window::Sine => "sine",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Window {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rectangular" | "rect" | "none" => Ok(Window::Rectangular),
            "hamming" => Ok(Window::Hamming),
            "hann" | "hanning" => Ok(Window::Hann),
            "blackman" => Ok(Window::Blackman),
            "sine" => Ok(Window::Sine),
            other => Err(KernelError::invalid(
                "window",
                format!("unknown window '{other}'"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_hann() {
        let coeffs = Window::Hann.coefficients(101);
        assert!(coeffs[0].abs() < 1e-12);
        assert!(coeffs[100].abs() < 1e-12);
        assert!((coeffs[50] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_hamming_endpoints() {
        let coeffs = Window::Hamming.coefficients(32);
        assert!((coeffs[0] - 0.08).abs() < 1e-12);
        assert!((coeffs[31] - 0.08).abs() < 1e-12);
    }

    #[test]
    fn test_windows_are_symmetric() {
        for window in Window::ALL {
            let coeffs = window.coefficients(33);
            for n in 0..33 {
                assert!(
                    (coeffs[n] - coeffs[32 - n]).abs() < 1e-12,
                    "{window} asymmetric at {n}"
                );
            }
        }
    }

    #[test]
    fn test_single_sample_window() {
        for window in Window::ALL {
            assert_eq!(window.coefficients(1), vec![1.0]);
        }
    }

    #[test]
    fn test_apply_matches_coefficients() {
        let mut buffer = vec![2.0; 16];
        Window::Blackman.apply(&mut buffer);
        let coeffs = Window::Blackman.coefficients(16);
        for (b, c) in buffer.iter().zip(coeffs.iter()) {
            assert!((b - 2.0 * c).abs() < 1e-12);
        }
    }

    #[test]
    fn test_parse_names() {
        for window in Window::ALL {
            assert_eq!(window.name().parse::<Window>().unwrap(), window);
        }
        assert_eq!("Rect".parse::<Window>().unwrap(), Window::Rectangular);
        assert!("kaiser".parse::<Window>().is_err());
    }
}
