//! Scalar quantization: uniform mid-rise quantizer and Lloyd-Max design.

use std::f64::consts::PI;

use crate::error::{KernelError, Result};

/// Largest supported uniform quantizer resolution.
pub const MAX_BITS: u32 = 24;

/// Mid-rise uniform quantizer over `[−1, 1]` with `2^bits` levels.
///
/// ```text
/// Δ = 2 / 2^bits
/// idx = clamp(floor((x + 1) / Δ), 0, 2^bits − 1)
/// x̂ = idx·Δ + Δ/2 − 1
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformQuantizer {
    bits: u32,
}

/// Quantized signal and its error `x − x̂`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quantized {
    /// Reconstruction values.
    pub values: Vec<f64>,
    /// Per-sample quantization error.
    pub error: Vec<f64>,
}

impl UniformQuantizer {
    /// Create a quantizer with `bits` ∈ `1..=MAX_BITS`.
    pub fn new(bits: u32) -> Result<Self> {
        if bits == 0 || bits > MAX_BITS {
            return Err(KernelError::invalid(
                "bits",
                format!("{bits} is outside 1..={MAX_BITS}"),
            ));
        }
        Ok(Self { bits })
    }

    /// Resolution in bits.
    pub fn bits(&self) -> u32 {
        self.bits
    }

    /// Number of reconstruction levels, `2^bits`.
    pub fn levels(&self) -> usize {
        1usize << self.bits
    }

    /// Step size Δ.
    pub fn step(&self) -> f64 {
        2.0 / self.levels() as f64
    }

    /// Quantize one sample. Inputs outside `[−1, 1]` saturate.
    pub fn quantize_sample(&self, x: f64) -> f64 {
        let delta = self.step();
        let max_index = (self.levels() - 1) as f64;
        let index = ((x + 1.0) / delta).floor().clamp(0.0, max_index);
        index * delta + delta / 2.0 - 1.0
    }

    /// Quantize a whole signal.
    pub fn quantize(&self, signal: &[f64]) -> Quantized {
        let values: Vec<f64> = signal.iter().map(|&x| self.quantize_sample(x)).collect();
        let error = signal.iter().zip(&values).map(|(x, q)| x - q).collect();
        Quantized { values, error }
    }
}

/// Measured SNR in dB: `10·log10(P_signal / P_error)`.
///
/// Infinite when the error is identically zero.
pub fn snr_db(signal: &[f64], quantized: &[f64]) -> Result<f64> {
    if signal.len() != quantized.len() {
        return Err(KernelError::LengthMismatch {
            expected: signal.len(),
            actual: quantized.len(),
        });
    }
    if signal.is_empty() {
        return Err(KernelError::invalid("signal", "signal is empty"));
    }
    let p_sig: f64 = signal.iter().map(|x| x * x).sum();
    let p_err: f64 = signal
        .iter()
        .zip(quantized)
        .map(|(x, q)| (x - q) * (x - q))
        .sum();
    Ok(10.0 * (p_sig / p_err).log10())
}

/// Textbook SNR estimate: `6.02·bits + 1.76 (sine only) − 20·log10(1/amplitude)`.
///
/// The backoff term only applies for `amplitude < 1`.
pub fn theoretical_snr_db(bits: u32, amplitude: f64, sine: bool) -> f64 {
    let crest = if sine { 1.76 } else { 0.0 };
    let backoff = if amplitude < 1.0 {
        20.0 * (1.0 / amplitude).log10()
    } else {
        0.0
    };
    6.02 * f64::from(bits) + crest - backoff
}

/// Iteration cap used by [`LloydMax::converge_default`].
pub const LLOYD_MAX_ITERATIONS: usize = 20;

/// MSE change below which [`LloydMax::converge_default`] stops.
pub const LLOYD_MAX_TOLERANCE: f64 = 1e-6;

/// Lloyd-Max quantizer design over a sampled probability density.
///
/// Alternates two steps until the mean squared error settles:
///
/// 1. each centroid moves to the conditional mean of its cell;
/// 2. each boundary moves to the midpoint of its neighbouring centroids.
///
/// Grid points are assigned to exactly one cell (`b[i] ≤ x < b[i+1]`), so the
/// MSE is non-increasing.
#[derive(Debug, Clone)]
pub struct LloydMax {
    grid: Vec<f64>,
    pdf: Vec<f64>,
    step: f64,
    centroids: Vec<f64>,
    boundaries: Vec<f64>,
    mse_history: Vec<f64>,
}

impl LloydMax {
    /// Standard normal density on `[−4, 4]` with grid step 0.01 and centroids
    /// initialized uniformly over `[−3, 3]`.
    pub fn gaussian(levels: usize) -> Result<Self> {
        let norm = 1.0 / (2.0 * PI).sqrt();
        Self::new(levels, -4.0, 4.0, 0.01, |x| norm * (-0.5 * x * x).exp())
    }

    /// Sample `pdf` on `[min, max]` with spacing `step` and place `levels`
    /// initial centroids at the cell centres of `[−3, 3]`, clipped to the grid.
    pub fn new(
        levels: usize,
        min: f64,
        max: f64,
        step: f64,
        pdf: impl Fn(f64) -> f64,
    ) -> Result<Self> {
        if levels == 0 {
            return Err(KernelError::invalid("levels", "must be at least 1"));
        }
        if !(step > 0.0 && max > min) {
            return Err(KernelError::invalid(
                "grid",
                format!("need min < max and step > 0, got [{min}, {max}] step {step}"),
            ));
        }
        let points = ((max - min) / step).round() as usize + 1;
        let grid: Vec<f64> = (0..points).map(|k| min + k as f64 * step).collect();
        let pdf: Vec<f64> = grid.iter().map(|&x| pdf(x)).collect();

        let span = 6.0 / levels as f64;
        let centroids = (0..levels)
            .map(|i| (-3.0 + (i as f64 + 0.5) * span).clamp(min, max))
            .collect();

        let mut lm = Self {
            grid,
            pdf,
            step,
            centroids,
            boundaries: Vec::new(),
            mse_history: Vec::new(),
        };
        lm.update_boundaries();
        let mse = lm.mse();
        lm.mse_history.push(mse);
        Ok(lm)
    }

    /// Current reconstruction levels, ascending.
    pub fn centroids(&self) -> &[f64] {
        &self.centroids
    }

    /// Current decision boundaries (`levels − 1` values).
    pub fn boundaries(&self) -> &[f64] {
        &self.boundaries
    }

    /// MSE after initialization and after every iteration.
    pub fn mse_history(&self) -> &[f64] {
        &self.mse_history
    }

    /// Iterations performed so far.
    pub fn iterations(&self) -> usize {
        self.mse_history.len() - 1
    }

    fn cell_of(&self, x: f64) -> usize {
        self.boundaries.partition_point(|&b| b <= x)
    }

    fn update_boundaries(&mut self) {
        self.boundaries = self
            .centroids
            .windows(2)
            .map(|pair| 0.5 * (pair[0] + pair[1]))
            .collect();
    }

    /// Expected squared error of the current quantizer under the sampled pdf.
    pub fn mse(&self) -> f64 {
        self.grid
            .iter()
            .zip(&self.pdf)
            .map(|(&x, &p)| {
                let d = x - self.centroids[self.cell_of(x)];
                d * d * p * self.step
            })
            .sum()
    }

    /// One centroid/boundary update. Returns the new MSE.
    ///
    /// A cell with (numerically) no probability mass keeps its centroid.
    pub fn iterate(&mut self) -> f64 {
        let levels = self.centroids.len();
        let mut num = vec![0.0; levels];
        let mut den = vec![0.0; levels];
        for (&x, &p) in self.grid.iter().zip(&self.pdf) {
            let cell = self.cell_of(x);
            num[cell] += x * p * self.step;
            den[cell] += p * self.step;
        }
        for (i, c) in self.centroids.iter_mut().enumerate() {
            if den[i] >= 1e-9 {
                *c = num[i] / den[i];
            }
        }
        self.update_boundaries();

        let mse = self.mse();
        self.mse_history.push(mse);
        mse
    }

    /// Iterate until the MSE changes by less than `tolerance` or `max_iter`
    /// iterations have run. Returns the number of iterations performed.
    pub fn converge(&mut self, max_iter: usize, tolerance: f64) -> usize {
        let mut prev = f64::INFINITY;
        for i in 0..max_iter {
            let mse = self.iterate();
            if (prev - mse).abs() < tolerance {
                return i + 1;
            }
            prev = mse;
        }
        max_iter
    }

    /// [`converge`](Self::converge) with [`LLOYD_MAX_ITERATIONS`] and
    /// [`LLOYD_MAX_TOLERANCE`].
    pub fn converge_default(&mut self) -> usize {
        self.converge(LLOYD_MAX_ITERATIONS, LLOYD_MAX_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_levels() {
        let q = UniformQuantizer::new(2).unwrap();
        assert_eq!(q.levels(), 4);
        assert_eq!(q.step(), 0.5);
        assert_eq!(q.quantize_sample(-1.0), -0.75);
        assert_eq!(q.quantize_sample(0.1), 0.25);
        assert_eq!(q.quantize_sample(1.0), 0.75);
        assert_eq!(q.quantize_sample(5.0), 0.75);
        assert_eq!(q.quantize_sample(-5.0), -0.75);
    }

    #[test]
    fn test_uniform_error_bounded() {
        let q = UniformQuantizer::new(6).unwrap();
        let signal: Vec<f64> = (0..200).map(|i| (i as f64 * 0.05).sin() * 0.99).collect();
        let out = q.quantize(&signal);
        assert!(out.error.iter().all(|e| e.abs() <= q.step() / 2.0 + 1e-12));
    }

    #[test]
    fn test_rejects_bad_bits() {
        assert!(UniformQuantizer::new(0).is_err());
        assert!(UniformQuantizer::new(MAX_BITS + 1).is_err());
    }

    #[test]
    fn test_sine_snr_close_to_theory() {
        let q = UniformQuantizer::new(8).unwrap();
        let signal: Vec<f64> = (0..1000)
            .map(|i| (2.0 * PI * i as f64 / 999.0).sin())
            .collect();
        let out = q.quantize(&signal);
        let measured = snr_db(&signal, &out.values).unwrap();
        let theory = theoretical_snr_db(8, 1.0, true);
        assert!((measured - theory).abs() < 1.5, "{measured} vs {theory}");
    }

    #[test]
    fn test_theoretical_backoff() {
        assert!((theoretical_snr_db(8, 1.0, false) - 48.16).abs() < 1e-9);
        let half = theoretical_snr_db(8, 0.5, true);
        assert!((half - (48.16 + 1.76 - 20.0 * 2f64.log10())).abs() < 1e-9);
        assert_eq!(theoretical_snr_db(4, 2.0, false), theoretical_snr_db(4, 1.0, false));
    }

    #[test]
    fn test_lloyd_max_mse_non_increasing() {
        let mut lm = LloydMax::gaussian(4).unwrap();
        lm.converge(20, 0.0);
        let history = lm.mse_history();
        assert_eq!(history.len(), 21);
        for pair in history.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-12, "{} -> {}", pair[0], pair[1]);
        }
    }

    #[test]
    fn test_lloyd_max_gaussian_four_levels() {
        // Known optimum for N(0,1), 4 levels: ±0.4528, ±1.510; MSE ≈ 0.1175.
        let mut lm = LloydMax::gaussian(4).unwrap();
        lm.converge(200, 1e-12);
        let c = lm.centroids();
        assert!((c[2] - 0.4528).abs() < 0.02, "{c:?}");
        assert!((c[3] - 1.510).abs() < 0.02, "{c:?}");
        // The grid point at 0 belongs to the upper cell only.
        assert!((c[0] + c[3]).abs() < 0.02, "{c:?}");
        let mse = *lm.mse_history().last().unwrap();
        assert!((mse - 0.1175).abs() < 0.003, "mse {mse}");
    }

    #[test]
    fn test_converge_default_is_bounded() {
        let mut lm = LloydMax::gaussian(8).unwrap();
        let iters = lm.converge_default();
        assert!(iters <= LLOYD_MAX_ITERATIONS);
        assert_eq!(lm.iterations(), iters);
    }
}
